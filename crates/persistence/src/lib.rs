//! GameGreenEco Persistence - Client-local storage and caching

pub mod cache;
pub mod sqlite;

pub use cache::ProfileCache;
pub use sqlite::{Database, SqliteSnapshotStore};
