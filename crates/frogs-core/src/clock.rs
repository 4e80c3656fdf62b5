use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use parking_lot::Mutex;

/// Source of the current wall-clock moment.
///
/// Rollover compares against [`Clock::today`]; the reminder scheduler reads
/// [`Clock::now`]. Both are local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The machine's local clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at a settable moment (for testing).
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Build from a local wall-clock reading. Ambiguous or skipped local
    /// times (DST transitions) resolve to the earliest valid instant.
    pub fn at_local(naive: NaiveDateTime) -> Self {
        Self::new(resolve_local(naive))
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock() = now;
    }

    pub fn set_local(&self, naive: NaiveDateTime) {
        self.set(resolve_local(naive));
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock()
    }
}

fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}
