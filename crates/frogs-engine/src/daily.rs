use std::sync::Arc;

use frogs_core::{Clock, Daily, DailyTask, KeyValueStore, Notifier, StorageError, TaskId};

use crate::reminder::{ReminderConfig, ReminderOutcome, ReminderScheduler};
use crate::task_store::TaskStore;

/// Daily task list that re-evaluates the evening reminder after every
/// successful load and mutation.
pub struct DailyTaskStore {
    tasks: TaskStore<Daily>,
    reminder: ReminderScheduler,
    last_reminder: Option<ReminderOutcome>,
}

impl DailyTaskStore {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
        reminder: ReminderConfig,
    ) -> Self {
        Self {
            tasks: TaskStore::new(kv, clock.clone(), key),
            reminder: ReminderScheduler::new(notifier, clock, reminder),
            last_reminder: None,
        }
    }

    pub fn tasks(&self) -> Vec<DailyTask> {
        self.tasks.tasks()
    }

    /// Outcome of the most recent reminder cycle, if any has run.
    pub fn last_reminder(&self) -> Option<&ReminderOutcome> {
        self.last_reminder.as_ref()
    }

    /// Loads the list. When storage could not be read the reminder queue is
    /// left as it was.
    pub async fn load(&mut self) -> Result<Vec<DailyTask>, StorageError> {
        let tasks = self.tasks.load().await?;
        if self.tasks.is_loaded() {
            self.refresh_reminder(&tasks).await;
        }
        Ok(tasks)
    }

    pub fn is_loaded(&self) -> bool {
        self.tasks.is_loaded()
    }

    pub async fn add(&mut self, text: &str) -> Result<Vec<DailyTask>, StorageError> {
        let tasks = self.tasks.add(text, ()).await?;
        self.refresh_reminder(&tasks).await;
        Ok(tasks)
    }

    pub async fn toggle(&mut self, id: &TaskId) -> Result<Vec<DailyTask>, StorageError> {
        let tasks = self.tasks.toggle(id).await?;
        self.refresh_reminder(&tasks).await;
        Ok(tasks)
    }

    async fn refresh_reminder(&mut self, tasks: &[DailyTask]) {
        self.last_reminder = Some(self.reminder.reschedule(tasks).await);
    }
}
