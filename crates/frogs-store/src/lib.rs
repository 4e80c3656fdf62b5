pub mod database;
pub mod error;
pub mod kv;
pub mod memory;
pub mod notifications;
pub mod schema;

pub use database::Database;
pub use error::StoreError;
pub use kv::SqliteKv;
pub use memory::MemoryKv;
pub use notifications::{ScheduledNotification, SqliteNotifier};
