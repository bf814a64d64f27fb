//! # vinmap-core
//!
//! Core types, traits, and abstractions for the vinmap wine catalog.
//!
//! This crate provides the wine record model, the category inference
//! heuristic, the catalog filter and the repository trait that the other
//! vinmap crates depend on.

pub mod category;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use category::infer_category;
pub use error::{Error, PipelineStep, Result};
pub use filter::WineFilter;
pub use models::*;
pub use traits::*;
