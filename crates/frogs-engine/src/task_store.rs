use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use frogs_core::rollover::{self, Rollover};
use frogs_core::{Clock, KeyValueStore, PersistedState, StorageError, TaskId, TaskKind, TaskRecord};

/// Big-frog list.
pub type BigFrogStore = TaskStore<frogs_core::BigFrog>;

/// A task list persisted as one document under one key.
///
/// Every operation returns the presented view (already rolled over and
/// ordered by `K`). The in-memory collection only changes after the new
/// state has been written, so what is shown always matches what is stored.
///
/// Mutations need a successful load first. `add` and `toggle` retry the
/// load themselves and fail without writing while storage stays unreadable,
/// so an empty fallback view is never persisted over real tasks.
pub struct TaskStore<K: TaskKind> {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    tasks: Vec<K::Task>,
    loaded: bool,
    _kind: PhantomData<K>,
}

/// What a read of the stored document produced.
enum Stored<T> {
    Found(PersistedState<T>),
    /// Present but not decodable; shown as empty and left in place.
    Corrupt,
    /// Storage itself failed.
    Unavailable,
}

impl<K: TaskKind> TaskStore<K> {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, key: impl Into<String>) -> Self {
        Self {
            kv,
            clock,
            key: key.into(),
            tasks: Vec::new(),
            loaded: false,
            _kind: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current presented view without touching storage.
    pub fn tasks(&self) -> Vec<K::Task> {
        let mut view = self.tasks.clone();
        K::present(&mut view);
        view
    }

    /// Whether the current view reflects what storage holds.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Read the stored document, roll it over if it is from another day and
    /// write the rolled state back before presenting it.
    ///
    /// Unreadable storage or an undecodable document presents an empty list
    /// without writing anything back.
    #[instrument(skip_all, fields(store = K::NAME, key = %self.key))]
    pub async fn load(&mut self) -> Result<Vec<K::Task>, StorageError> {
        let today = self.clock.today();
        self.loaded = false;

        let stored = match self.read().await {
            Stored::Found(state) => state,
            Stored::Corrupt => {
                self.tasks.clear();
                self.loaded = true;
                return Ok(self.tasks());
            }
            Stored::Unavailable => {
                self.tasks.clear();
                return Ok(self.tasks());
            }
        };

        let Rollover { state, rolled } = rollover::apply::<K>(stored, today);
        if rolled {
            if let Err(e) = self.write(&state).await {
                self.tasks.clear();
                return Err(e);
            }
            info!(%today, remaining = state.tasks.len(), "rolled over to new day");
        }

        self.tasks = state.tasks;
        self.loaded = true;
        Ok(self.tasks())
    }

    /// Append a new task. Blank text is ignored and nothing is written.
    #[instrument(skip_all, fields(store = K::NAME, key = %self.key))]
    pub async fn add(&mut self, text: &str, options: K::Options) -> Result<Vec<K::Task>, StorageError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring blank task");
            return Ok(self.tasks());
        }

        self.ensure_loaded().await?;
        let task = K::create(TaskId::new(), text.to_string(), options);
        debug!(task_id = %task.id(), "adding task");

        let mut next = self.tasks.clone();
        next.push(task);
        self.commit(next).await
    }

    /// Flip completion of the task with `id`. Unknown ids change nothing.
    #[instrument(skip_all, fields(store = K::NAME, key = %self.key, task_id = %id))]
    pub async fn toggle(&mut self, id: &TaskId) -> Result<Vec<K::Task>, StorageError> {
        self.ensure_loaded().await?;
        let Some(index) = self.tasks.iter().position(|t| t.id() == id) else {
            debug!("toggle of unknown task ignored");
            return Ok(self.tasks());
        };

        let mut next = self.tasks.clone();
        next[index].toggle();
        self.commit(next).await
    }

    async fn commit(&mut self, tasks: Vec<K::Task>) -> Result<Vec<K::Task>, StorageError> {
        let state = PersistedState::new(self.clock.today(), tasks);
        self.write(&state).await?;
        self.tasks = state.tasks;
        Ok(self.tasks())
    }

    async fn ensure_loaded(&mut self) -> Result<(), StorageError> {
        if !self.loaded {
            let _ = self.load().await?;
        }
        if self.loaded {
            Ok(())
        } else {
            Err(StorageError::Unavailable(format!("tasks under {} could not be read", self.key)))
        }
    }

    async fn read(&self) -> Stored<K::Task> {
        match self.kv.get(&self.key).await {
            Ok(Some(bytes)) => match PersistedState::decode(&bytes) {
                Ok(state) => Stored::Found(state),
                Err(e) => {
                    warn!(error = %e, "stored tasks undecodable, showing empty list");
                    Stored::Corrupt
                }
            },
            Ok(None) => Stored::Found(PersistedState::empty()),
            Err(e) => {
                warn!(error = %e, kind = e.error_kind(), "failed to read tasks, showing empty list");
                Stored::Unavailable
            }
        }
    }

    async fn write(&self, state: &PersistedState<K::Task>) -> Result<(), StorageError> {
        let result = match state.encode() {
            Ok(bytes) => self.kv.set(&self.key, &bytes).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            error!(error = %e, kind = e.error_kind(), "failed to persist tasks");
        }
        result
    }
}
