//! Service layer for shared server state.

pub mod admin_gate;
pub mod wine_store;

pub use admin_gate::{hash_password, AdminGate, AdminToken};
pub use wine_store::WineStore;
