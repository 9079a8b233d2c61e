//! GameGreenEco Core - Shared data models, types, errors and service ports

pub mod errors;
pub mod models;
pub mod store;
pub mod types;

pub use errors::{Error, Result};
pub use models::*;
pub use store::{EcoStore, SnapshotStore};
pub use types::*;
