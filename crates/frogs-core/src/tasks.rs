use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ids::TaskId;

/// Behavior shared by every task variant held in a store.
pub trait TaskRecord:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn id(&self) -> &TaskId;
    fn text(&self) -> &str;
    fn is_completed(&self) -> bool;
    fn toggle(&mut self);
}

/// A kind of task list: which record it stores, how a new record is built,
/// what happens to it at the day boundary and how it is ordered for display.
pub trait TaskKind: Send + Sync + 'static {
    type Task: TaskRecord;
    /// Extra input accepted by `add` besides the text.
    type Options: Default + Send;

    /// Short name used in log fields.
    const NAME: &'static str;

    fn create(id: TaskId, text: String, options: Self::Options) -> Self::Task;

    /// Transform applied when the persisted date is not today.
    fn roll_over(tasks: Vec<Self::Task>) -> Vec<Self::Task>;

    /// Reorder a copy of the collection for display. Defaults to stored order.
    fn present(_tasks: &mut [Self::Task]) {}
}

/// Big-frog priority. Always at least 1; lower ranks first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u32);

impl Priority {
    pub const TOP: Priority = Priority(1);

    pub fn new(rank: u32) -> Self {
        Self(rank.max(1))
    }

    /// Clamp any integer into range: below 1 becomes the top rank, above
    /// `u32::MAX` saturates.
    pub fn clamped(rank: i64) -> Self {
        Self(u32::try_from(rank.max(1)).unwrap_or(u32::MAX))
    }

    /// Lenient parse of user input: anything that is not a positive integer
    /// becomes the top rank.
    pub fn parse(input: &str) -> Self {
        input
            .trim()
            .parse::<i64>()
            .map(Self::clamped)
            .unwrap_or(Self::TOP)
    }

    /// Priority as found in a stored document. Older clients wrote whatever
    /// `parseInt` produced, so zero, negatives, fractions and non-numbers
    /// all occur.
    fn from_stored(raw: &Value) -> Self {
        match raw {
            Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(i), _, _) => Self::clamped(i),
                (None, Some(_), _) => Self(u32::MAX),
                (None, None, Some(f)) if f.is_finite() => Self::clamped(f.trunc() as i64),
                _ => Self::TOP,
            },
            Value::String(s) => Self::parse(s),
            _ => Self::TOP,
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::TOP
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigFrogTask {
    pub id: TaskId,
    pub text: String,
    #[serde(default = "top_rank", deserialize_with = "lenient_priority")]
    pub priority: u32,
    pub completed: bool,
}

fn top_rank() -> u32 {
    Priority::TOP.get()
}

fn lenient_priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(Priority::from_stored(&raw).get())
}

impl TaskRecord for BigFrogTask {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTask {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

impl TaskRecord for DailyTask {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// High-priority tasks. Unfinished ones carry over at the top rank; finished
/// ones are cleared.
#[derive(Clone, Copy, Debug, Default)]
pub struct BigFrog;

impl TaskKind for BigFrog {
    type Task = BigFrogTask;
    type Options = Priority;

    const NAME: &'static str = "big_frog";

    fn create(id: TaskId, text: String, priority: Priority) -> BigFrogTask {
        BigFrogTask {
            id,
            text,
            priority: priority.get(),
            completed: false,
        }
    }

    fn roll_over(tasks: Vec<BigFrogTask>) -> Vec<BigFrogTask> {
        tasks
            .into_iter()
            .filter(|t| !t.completed)
            .map(|t| BigFrogTask {
                priority: Priority::TOP.get(),
                ..t
            })
            .collect()
    }

    fn present(tasks: &mut [BigFrogTask]) {
        // sort_by_key is stable: equal priorities keep insertion order.
        tasks.sort_by_key(|t| t.priority);
    }
}

/// Recurring tasks. Everything is kept; completion resets every day.
#[derive(Clone, Copy, Debug, Default)]
pub struct Daily;

impl TaskKind for Daily {
    type Task = DailyTask;
    type Options = ();

    const NAME: &'static str = "daily";

    fn create(id: TaskId, text: String, _options: ()) -> DailyTask {
        DailyTask {
            id,
            text,
            completed: false,
        }
    }

    fn roll_over(tasks: Vec<DailyTask>) -> Vec<DailyTask> {
        tasks
            .into_iter()
            .map(|t| DailyTask {
                completed: false,
                ..t
            })
            .collect()
    }
}
