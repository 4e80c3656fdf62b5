use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::errors::NotifyError;

/// Identifies a scheduled notification within its notifier.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(String);

impl NotificationHandle {
    pub fn from_raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local alert delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Whether alerts may be scheduled. Asking again after a denial is
    /// allowed and must not fail.
    async fn request_permission(&self) -> bool;

    async fn schedule_one_shot(
        &self,
        title: &str,
        body: &str,
        fire_at: DateTime<Local>,
    ) -> Result<NotificationHandle, NotifyError>;

    /// Cancel every pending notification. Cancelling nothing is not an error.
    async fn cancel_all(&self) -> Result<(), NotifyError>;
}
