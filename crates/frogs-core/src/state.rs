use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::StorageError;
use crate::tasks::TaskRecord;

/// The durable record for one store: a task collection and the calendar day
/// it was last written or rolled over.
///
/// Encoded as JSON `{"lastDate": "YYYY-MM-DD" | null, "tasks": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: TaskRecord"))]
pub struct PersistedState<T> {
    #[serde(default, deserialize_with = "lenient_date")]
    pub last_date: Option<NaiveDate>,
    #[serde(default = "Vec::new")]
    pub tasks: Vec<T>,
}

impl<T: TaskRecord> PersistedState<T> {
    pub fn empty() -> Self {
        Self {
            last_date: None,
            tasks: Vec::new(),
        }
    }

    pub fn new(last_date: NaiveDate, tasks: Vec<T>) -> Self {
        Self {
            last_date: Some(last_date),
            tasks,
        }
    }

    /// Absent or unreadable dates are always stale.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.last_date != Some(today)
    }

    pub fn encode(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl<T: TaskRecord> Default for PersistedState<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Malformed or non-string dates decode as `None` so the state reads as stale.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match raw {
        Some(serde_json::Value::String(s)) => {
            let date = NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok();
            if date.is_none() {
                tracing::warn!(last_date = %s, "unreadable stored date, treating as stale");
            }
            date
        }
        Some(serde_json::Value::Null) | None => None,
        Some(other) => {
            tracing::warn!(last_date = %other, "non-string stored date, treating as stale");
            None
        }
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TaskId;
    use crate::tasks::{BigFrogTask, DailyTask};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn wire_format_matches_stored_documents() {
        let state = PersistedState::new(
            date(2026, 10, 18),
            vec![BigFrogTask {
                id: TaskId::from_raw("1718000000000"),
                text: "file taxes".into(),
                priority: 2,
                completed: false,
            }],
        );
        let json: serde_json::Value = serde_json::from_slice(&state.encode().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lastDate": "2026-10-18",
                "tasks": [{"id": "1718000000000", "text": "file taxes", "priority": 2, "completed": false}]
            })
        );
    }

    #[test]
    fn null_date_encodes_as_null() {
        let state = PersistedState::<DailyTask>::empty();
        let json: serde_json::Value = serde_json::from_slice(&state.encode().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"lastDate": null, "tasks": []}));
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let state = PersistedState::<DailyTask>::decode(b"{}").unwrap();
        assert_eq!(state, PersistedState::empty());
    }

    #[test]
    fn malformed_date_is_stale() {
        let state =
            PersistedState::<DailyTask>::decode(br#"{"lastDate":"18/10/2026","tasks":[]}"#).unwrap();
        assert_eq!(state.last_date, None);
        assert!(state.is_stale(date(2026, 10, 18)));

        let state = PersistedState::<DailyTask>::decode(br#"{"lastDate":20261018}"#).unwrap();
        assert!(state.is_stale(date(2026, 10, 18)));
    }

    #[test]
    fn same_day_is_not_stale() {
        let state = PersistedState::<DailyTask>::new(date(2026, 10, 18), vec![]);
        assert!(!state.is_stale(date(2026, 10, 18)));
        assert!(state.is_stale(date(2026, 10, 19)));
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let err = PersistedState::<DailyTask>::decode(b"not json").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    fn arb_frog() -> impl Strategy<Value = BigFrogTask> {
        ("[a-z0-9_]{1,12}", ".{0,24}", 1u32..50, any::<bool>()).prop_map(
            |(id, text, priority, completed)| BigFrogTask {
                id: TaskId::from_raw(id),
                text,
                priority,
                completed,
            },
        )
    }

    fn arb_date() -> impl Strategy<Value = Option<NaiveDate>> {
        prop::option::of((2000i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| date(y, m, d)))
    }

    proptest! {
        #[test]
        fn encode_decode_roundtrip(
            last_date in arb_date(),
            tasks in prop::collection::vec(arb_frog(), 0..8),
        ) {
            let state = PersistedState { last_date, tasks };
            let decoded = PersistedState::<BigFrogTask>::decode(&state.encode().unwrap()).unwrap();
            prop_assert_eq!(decoded, state);
        }
    }
}
