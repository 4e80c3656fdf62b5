pub mod clock;
pub mod errors;
pub mod ids;
pub mod notify;
pub mod rollover;
pub mod schedule;
pub mod state;
pub mod storage;
pub mod tasks;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{NotifyError, StorageError};
pub use ids::TaskId;
pub use notify::{NotificationHandle, Notifier};
pub use state::PersistedState;
pub use storage::KeyValueStore;
pub use tasks::{BigFrog, BigFrogTask, Daily, DailyTask, TaskKind, TaskRecord};
