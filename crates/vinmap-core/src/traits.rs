//! Core traits for vinmap abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewWine, Wine, WineUpdate};

// =============================================================================
// WINE REPOSITORY
// =============================================================================

/// Document store holding one document per wine.
#[async_trait]
pub trait WineRepository: Send + Sync {
    /// Fetch every wine, oldest first.
    async fn list_all(&self) -> Result<Vec<Wine>>;

    /// Fetch a single wine by ID.
    async fn fetch(&self, id: Uuid) -> Result<Wine>;

    /// First wine whose name equals `name` exactly.
    async fn find_by_name(&self, name: &str) -> Result<Option<Wine>>;

    /// Insert a new wine and return it with its generated ID.
    async fn insert(&self, wine: NewWine) -> Result<Wine>;

    /// Merge the present fields of `update` into the stored document.
    async fn update(&self, id: Uuid, update: WineUpdate) -> Result<Wine>;

    /// Permanently delete a wine.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
