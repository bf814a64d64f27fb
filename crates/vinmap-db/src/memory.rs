//! In-memory wine repository.
//!
//! Same semantics as the PostgreSQL store; used by tests and when no
//! database is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use vinmap_core::{Error, NewWine, Result, Wine, WineRepository, WineUpdate};

#[derive(Default)]
pub struct MemoryWineRepository {
    wines: RwLock<BTreeMap<Uuid, Wine>>,
}

impl MemoryWineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records (ids are kept).
    pub fn with_wines(wines: impl IntoIterator<Item = Wine>) -> Self {
        Self {
            wines: RwLock::new(wines.into_iter().map(|w| (w.id, w)).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.wines.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.wines.read().await.is_empty()
    }
}

#[async_trait]
impl WineRepository for MemoryWineRepository {
    async fn list_all(&self) -> Result<Vec<Wine>> {
        let mut wines: Vec<Wine> = self.wines.read().await.values().cloned().collect();
        wines.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(wines)
    }

    async fn fetch(&self, id: Uuid) -> Result<Wine> {
        self.wines
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::WineNotFound(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Wine>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|w| w.name == name))
    }

    async fn insert(&self, wine: NewWine) -> Result<Wine> {
        let wine = Wine::from_new(Uuid::now_v7(), wine, Utc::now());
        self.wines.write().await.insert(wine.id, wine.clone());
        Ok(wine)
    }

    async fn update(&self, id: Uuid, update: WineUpdate) -> Result<Wine> {
        let mut wines = self.wines.write().await;
        let wine = wines.get_mut(&id).ok_or(Error::WineNotFound(id))?;
        wine.apply(&update);
        Ok(wine.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.wines
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::WineNotFound(id))
    }
}
