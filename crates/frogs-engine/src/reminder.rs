use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime};
use tracing::{debug, info, warn};

use frogs_core::schedule::{default_reminder_time, next_occurrence};
use frogs_core::{Clock, NotificationHandle, Notifier, NotifyError, TaskRecord};

/// When and what to remind about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub at: NaiveTime,
    pub title: String,
    pub body: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            at: default_reminder_time(),
            title: "Daily tasks pending".into(),
            body: "You still have unfinished daily tasks today.".into(),
        }
    }
}

/// Result of one cancel-then-maybe-schedule cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReminderOutcome {
    Scheduled {
        handle: NotificationHandle,
        fire_at: DateTime<Local>,
    },
    /// Every task is done; nothing scheduled.
    Suppressed,
    /// Reminders are switched off in settings.
    Disabled,
    PermissionDenied,
    Failed(String),
}

impl ReminderOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled { .. })
    }
}

/// Keeps at most one pending-tasks reminder outstanding, present iff some
/// task is incomplete. Recomputed from the task list on every call.
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: ReminderConfig,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>, config: ReminderConfig) -> Self {
        Self {
            notifier,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Cancel whatever was scheduled, then schedule the next reminder if any
    /// task is still incomplete. Failures are logged and reported in the
    /// outcome, never raised.
    pub async fn reschedule<T: TaskRecord>(&self, tasks: &[T]) -> ReminderOutcome {
        if let Err(e) = self.notifier.cancel_all().await {
            warn!(store = "daily", error = %e, "failed to cancel pending reminders");
        }

        if !self.config.enabled {
            return ReminderOutcome::Disabled;
        }

        let pending = tasks.iter().filter(|t| !t.is_completed()).count();
        if pending == 0 {
            debug!(store = "daily", "all daily tasks complete, reminder suppressed");
            return ReminderOutcome::Suppressed;
        }

        let now = self.clock.now();
        let Some(fire_at) = next_occurrence(&now, self.config.at) else {
            warn!(store = "daily", at = %self.config.at, "no valid reminder instant");
            return ReminderOutcome::Failed(format!("no local instant for {}", self.config.at));
        };

        if !self.notifier.request_permission().await {
            warn!(store = "daily", "notification permission denied, no reminder");
            return ReminderOutcome::PermissionDenied;
        }

        match self
            .notifier
            .schedule_one_shot(&self.config.title, &self.config.body, fire_at)
            .await
        {
            Ok(handle) => {
                info!(store = "daily", pending, fire_at = %fire_at.to_rfc3339(), "reminder scheduled");
                ReminderOutcome::Scheduled { handle, fire_at }
            }
            Err(NotifyError::PermissionDenied) => {
                warn!(store = "daily", "notification permission denied, no reminder");
                ReminderOutcome::PermissionDenied
            }
            Err(e) => {
                warn!(store = "daily", error = %e, "failed to schedule reminder");
                ReminderOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingNotifier;
    use chrono::{NaiveDate, NaiveDateTime};
    use frogs_core::{DailyTask, FixedClock, TaskId};

    fn local(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn task(id: &str, completed: bool) -> DailyTask {
        DailyTask {
            id: TaskId::from_raw(id),
            text: id.into(),
            completed,
        }
    }

    fn scheduler(now: NaiveDateTime) -> (Arc<RecordingNotifier>, Arc<FixedClock>, ReminderScheduler) {
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(FixedClock::at_local(now));
        let s = ReminderScheduler::new(notifier.clone(), clock.clone(), ReminderConfig::default());
        (notifier, clock, s)
    }

    #[tokio::test]
    async fn all_complete_schedules_nothing() {
        let (notifier, _clock, s) = scheduler(local(18, 12, 0));
        let outcome = s.reschedule(&[task("a", true), task("b", true)]).await;
        assert_eq!(outcome, ReminderOutcome::Suppressed);
        assert!(notifier.scheduled().is_empty());
        assert_eq!(notifier.cancel_calls(), 1);
    }

    #[tokio::test]
    async fn empty_list_schedules_nothing() {
        let (notifier, _clock, s) = scheduler(local(18, 12, 0));
        assert_eq!(s.reschedule::<DailyTask>(&[]).await, ReminderOutcome::Suppressed);
        assert!(notifier.scheduled().is_empty());
    }

    #[tokio::test]
    async fn incomplete_before_nine_schedules_tonight() {
        let (notifier, _clock, s) = scheduler(local(18, 12, 0));
        let outcome = s.reschedule(&[task("a", true), task("b", false)]).await;
        assert!(outcome.is_scheduled());

        let scheduled = notifier.scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].fire_at.naive_local(), local(18, 21, 0));
        assert_eq!(scheduled[0].title, "Daily tasks pending");
    }

    #[tokio::test]
    async fn incomplete_after_nine_schedules_tomorrow() {
        let (notifier, _clock, s) = scheduler(local(18, 21, 30));
        let _ = s.reschedule(&[task("a", false)]).await;
        assert_eq!(notifier.scheduled()[0].fire_at.naive_local(), local(19, 21, 0));
    }

    #[tokio::test]
    async fn suppression_then_reopen_schedules_exactly_one() {
        let (notifier, _clock, s) = scheduler(local(18, 8, 0));
        let mut tasks = vec![task("a", true), task("b", true)];
        let _ = s.reschedule(&tasks).await;
        assert!(notifier.scheduled().is_empty());

        tasks[1].completed = false;
        let _ = s.reschedule(&tasks).await;
        let _ = s.reschedule(&tasks).await;
        let scheduled = notifier.scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].fire_at.naive_local(), local(18, 21, 0));
    }

    #[tokio::test]
    async fn completing_everything_cancels_existing() {
        let (notifier, _clock, s) = scheduler(local(18, 8, 0));
        let _ = s.reschedule(&[task("a", false)]).await;
        assert_eq!(notifier.scheduled().len(), 1);

        let _ = s.reschedule(&[task("a", true)]).await;
        assert!(notifier.scheduled().is_empty());
    }

    #[tokio::test]
    async fn denied_permission_leaves_nothing() {
        let (notifier, _clock, s) = scheduler(local(18, 8, 0));
        notifier.set_permission(false);
        assert_eq!(
            s.reschedule(&[task("a", false)]).await,
            ReminderOutcome::PermissionDenied
        );
        assert!(notifier.scheduled().is_empty());
    }

    #[tokio::test]
    async fn scheduling_error_is_absorbed() {
        let (notifier, _clock, s) = scheduler(local(18, 8, 0));
        notifier.fail_schedule(true);
        let outcome = s.reschedule(&[task("a", false)]).await;
        assert!(matches!(outcome, ReminderOutcome::Failed(_)));
        assert!(notifier.scheduled().is_empty());
    }

    #[tokio::test]
    async fn cancel_error_does_not_block_scheduling() {
        let (notifier, _clock, s) = scheduler(local(18, 8, 0));
        notifier.fail_cancel(true);
        assert!(s.reschedule(&[task("a", false)]).await.is_scheduled());
    }

    #[tokio::test]
    async fn disabled_only_cancels() {
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(FixedClock::at_local(local(18, 8, 0)));
        let config = ReminderConfig {
            enabled: false,
            ..ReminderConfig::default()
        };
        let s = ReminderScheduler::new(notifier.clone(), clock, config);
        assert_eq!(s.reschedule(&[task("a", false)]).await, ReminderOutcome::Disabled);
        assert_eq!(notifier.cancel_calls(), 1);
        assert!(notifier.scheduled().is_empty());
    }

    #[tokio::test]
    async fn custom_time_is_honored() {
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(FixedClock::at_local(local(18, 6, 0)));
        let config = ReminderConfig {
            at: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            ..ReminderConfig::default()
        };
        let s = ReminderScheduler::new(notifier.clone(), clock.clone(), config);
        let _ = s.reschedule(&[task("a", false)]).await;
        assert_eq!(notifier.scheduled()[0].fire_at.naive_local(), local(18, 7, 30));

        clock.set_local(local(18, 7, 30));
        let _ = s.reschedule(&[task("a", false)]).await;
        assert_eq!(notifier.scheduled()[0].fire_at.naive_local(), local(19, 7, 30));
    }
}
