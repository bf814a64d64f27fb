//! HTTP handlers for vinmap-api.

pub mod admin;
pub mod analyze;
pub mod meta;
pub mod wines;
