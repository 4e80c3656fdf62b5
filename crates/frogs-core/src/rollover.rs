use chrono::NaiveDate;

use crate::state::PersistedState;
use crate::tasks::TaskKind;

/// Outcome of applying the daily rollover to a persisted state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rollover<T> {
    pub state: PersistedState<T>,
    /// True when the state was stale and has been transformed. A rolled state
    /// must be written back before it is shown.
    pub rolled: bool,
}

/// Apply `K`'s rollover transform if `state` was not last normalized on
/// `today`. Never fails.
pub fn apply<K: TaskKind>(state: PersistedState<K::Task>, today: NaiveDate) -> Rollover<K::Task> {
    if !state.is_stale(today) {
        return Rollover {
            state,
            rolled: false,
        };
    }

    Rollover {
        state: PersistedState::new(today, K::roll_over(state.tasks)),
        rolled: true,
    }
}
