use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::{debug, info};

use frogs_core::{NotificationHandle, Notifier, NotifyError};

use crate::database::Database;
use crate::error::StoreError;

/// A reminder waiting in the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub handle: NotificationHandle,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<Local>,
}

/// Notifier backed by the `notifications` table.
///
/// Scheduling enqueues a row; a delivery loop drains due rows with
/// [`SqliteNotifier::take_due`]. Permission is granted iff reminders are
/// enabled.
#[derive(Clone)]
pub struct SqliteNotifier {
    db: Database,
    enabled: bool,
}

impl SqliteNotifier {
    pub fn new(db: Database, enabled: bool) -> Self {
        Self { db, enabled }
    }

    /// All queued reminders, soonest first.
    pub fn pending(&self) -> Result<Vec<ScheduledNotification>, StoreError> {
        self.db.with_conn(|conn| {
            let rows = conn
                .prepare("SELECT id, title, body, fire_at FROM notifications ORDER BY fire_at, id")?
                .query_map([], row_to_notification)?
                .collect::<Result<_, _>>()?;
            Ok(rows)
        })
    }

    /// Remove and return every reminder due at or before `now`.
    pub fn take_due(&self, now: DateTime<Local>) -> Result<Vec<ScheduledNotification>, StoreError> {
        let cutoff = now.timestamp();
        self.db.with_conn(|conn| {
            let due: Vec<ScheduledNotification> = conn
                .prepare(
                    "SELECT id, title, body, fire_at FROM notifications
                     WHERE fire_at <= ?1 ORDER BY fire_at, id",
                )?
                .query_map([cutoff], row_to_notification)?
                .collect::<Result<_, _>>()?;
            let _ = conn.execute("DELETE FROM notifications WHERE fire_at <= ?1", [cutoff])?;
            Ok(due)
        })
    }
}

#[async_trait]
impl Notifier for SqliteNotifier {
    async fn request_permission(&self) -> bool {
        self.enabled
    }

    async fn schedule_one_shot(
        &self,
        title: &str,
        body: &str,
        fire_at: DateTime<Local>,
    ) -> Result<NotificationHandle, NotifyError> {
        if !self.enabled {
            return Err(NotifyError::PermissionDenied);
        }

        let handle = NotificationHandle::from_raw(format!("notif_{}", uuid::Uuid::now_v7()));
        let now = Utc::now().to_rfc3339();
        self.db
            .with_conn(|conn| {
                let _ = conn.execute(
                    "INSERT INTO notifications (id, title, body, fire_at, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![handle.as_str(), title, body, fire_at.timestamp(), now],
                )?;
                Ok(())
            })
            .map_err(|e| NotifyError::Service(e.to_string()))?;

        info!(handle = %handle, fire_at = %fire_at.to_rfc3339(), "reminder queued");
        Ok(handle)
    }

    async fn cancel_all(&self) -> Result<(), NotifyError> {
        let removed = self
            .db
            .with_conn(|conn| Ok(conn.execute("DELETE FROM notifications", [])?))
            .map_err(|e| NotifyError::Service(e.to_string()))?;
        debug!(removed, "pending reminders cancelled");
        Ok(())
    }
}

fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduledNotification> {
    let id: String = row.get(0)?;
    let ts: i64 = row.get(3)?;
    let fire_at = Local.timestamp_opt(ts, 0).single().ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {ts}").into(),
        )
    })?;
    Ok(ScheduledNotification {
        handle: NotificationHandle::from_raw(id),
        title: row.get(1)?,
        body: row.get(2)?,
        fire_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn notifier(enabled: bool) -> SqliteNotifier {
        SqliteNotifier::new(Database::in_memory().unwrap(), enabled)
    }

    fn at(secs_from_now: i64) -> DateTime<Local> {
        let base = Local.timestamp_opt(1_800_000_000, 0).single().unwrap();
        base + Duration::seconds(secs_from_now)
    }

    #[tokio::test]
    async fn schedule_and_list() {
        let n = notifier(true);
        assert!(n.request_permission().await);

        let late = n.schedule_one_shot("Later", "b", at(60)).await.unwrap();
        let soon = n.schedule_one_shot("Soon", "a", at(10)).await.unwrap();

        let pending = n.pending().unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].handle, soon);
        assert_eq!(pending[0].fire_at, at(10));
        assert_eq!(pending[1].handle, late);
    }

    #[tokio::test]
    async fn disabled_denies() {
        let n = notifier(false);
        assert!(!n.request_permission().await);
        let err = n.schedule_one_shot("t", "b", at(0)).await.unwrap_err();
        assert_eq!(err, NotifyError::PermissionDenied);
        assert!(n.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_all_is_idempotent() {
        let n = notifier(true);
        n.cancel_all().await.unwrap();
        let _ = n.schedule_one_shot("t", "b", at(5)).await.unwrap();
        n.cancel_all().await.unwrap();
        n.cancel_all().await.unwrap();
        assert!(n.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn take_due_drains_only_due() {
        let n = notifier(true);
        let _ = n.schedule_one_shot("past", "b", at(-5)).await.unwrap();
        let _ = n.schedule_one_shot("now", "b", at(0)).await.unwrap();
        let _ = n.schedule_one_shot("future", "b", at(30)).await.unwrap();

        let due = n.take_due(at(0)).unwrap();
        let titles: Vec<&str> = due.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, ["past", "now"]);

        let left = n.pending().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "future");
        assert!(n.take_due(at(0)).unwrap().is_empty());
    }
}
