//! SQLite persistence for the template catalog and usage history.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::StoreStats;
