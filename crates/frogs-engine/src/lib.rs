//! Rollover-aware task stores and the daily reminder scheduler.

pub mod daily;
pub mod mock;
pub mod reminder;
pub mod task_store;

pub use daily::DailyTaskStore;
pub use reminder::{ReminderConfig, ReminderOutcome, ReminderScheduler};
pub use task_store::{BigFrogStore, TaskStore};
