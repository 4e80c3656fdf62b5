use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use parking_lot::Mutex;

use frogs_core::{NotificationHandle, Notifier, NotifyError};

/// A notification captured by [`RecordingNotifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedNotification {
    pub handle: NotificationHandle,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<Local>,
}

/// Notifier that keeps scheduled notifications in memory, for deterministic
/// testing without a delivery backend.
pub struct RecordingNotifier {
    scheduled: Mutex<Vec<RecordedNotification>>,
    permission: AtomicBool,
    fail_schedule: AtomicBool,
    fail_cancel: AtomicBool,
    cancel_calls: AtomicUsize,
    next_handle: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            scheduled: Mutex::new(Vec::new()),
            permission: AtomicBool::new(true),
            fail_schedule: AtomicBool::new(false),
            fail_cancel: AtomicBool::new(false),
            cancel_calls: AtomicUsize::new(0),
            next_handle: AtomicUsize::new(1),
        }
    }

    /// Notifications currently outstanding.
    pub fn scheduled(&self) -> Vec<RecordedNotification> {
        self.scheduled.lock().clone()
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::Relaxed)
    }

    pub fn set_permission(&self, granted: bool) {
        self.permission.store(granted, Ordering::Relaxed);
    }

    pub fn fail_schedule(&self, fail: bool) {
        self.fail_schedule.store(fail, Ordering::Relaxed);
    }

    pub fn fail_cancel(&self, fail: bool) {
        self.fail_cancel.store(fail, Ordering::Relaxed);
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn request_permission(&self) -> bool {
        self.permission.load(Ordering::Relaxed)
    }

    async fn schedule_one_shot(
        &self,
        title: &str,
        body: &str,
        fire_at: DateTime<Local>,
    ) -> Result<NotificationHandle, NotifyError> {
        if !self.permission.load(Ordering::Relaxed) {
            return Err(NotifyError::PermissionDenied);
        }
        if self.fail_schedule.load(Ordering::Relaxed) {
            return Err(NotifyError::Service("schedule failure injected".into()));
        }

        let n = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let handle = NotificationHandle::from_raw(format!("mock-{n}"));
        self.scheduled.lock().push(RecordedNotification {
            handle: handle.clone(),
            title: title.to_string(),
            body: body.to_string(),
            fire_at,
        });
        Ok(handle)
    }

    async fn cancel_all(&self) -> Result<(), NotifyError> {
        let _ = self.cancel_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_cancel.load(Ordering::Relaxed) {
            return Err(NotifyError::Service("cancel failure injected".into()));
        }
        self.scheduled.lock().clear();
        Ok(())
    }
}
