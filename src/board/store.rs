//! In-memory task set for one board.
//!
//! The store is synchronous and never performs I/O. Callers fetch from the
//! server first and hand the result in, so a failed fetch leaves the
//! previous (stale but valid) list in place.
//!
//! A reload never shows a task older than its in-flight optimistic patch:
//! pending patches are re-applied on top of every list installed before the
//! move is committed or rolled back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use flowboard_common::{Task, TaskPatch};
use tracing::debug;

use super::api::BoardApi;
use crate::errors::{BoardError, BoardResult};

/// Handle shared by the move protocol, the realtime refresher and the view.
pub type SharedStore = Arc<Mutex<TaskStore>>;

/// Lock the store. A panic while holding the lock cannot leave a task half
/// written (every mutation is a whole-value assignment), so poisoning is
/// recovered rather than propagated.
pub fn lock(store: &SharedStore) -> MutexGuard<'_, TaskStore> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The task as it was before an optimistic patch.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    previous: Task,
}

impl Snapshot {
    pub fn task_id(&self) -> &str {
        &self.previous.id
    }

    pub fn previous(&self) -> &Task {
        &self.previous
    }
}

#[derive(Debug, Default)]
pub struct TaskStore {
    board_id: String,
    tasks: Vec<Task>,
    /// Optimistic patches not yet committed or rolled back, by task id.
    pending: HashMap<String, TaskPatch>,
    revision: u64,
    loaded: bool,
}

impl TaskStore {
    pub fn new(board_id: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            ..Default::default()
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether an authoritative list has been received at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Bumped on every change; views can skip recomputation when unchanged.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_pending(&self, task_id: &str) -> bool {
        self.pending.contains_key(task_id)
    }

    pub fn count_in_column(&self, column_id: &str) -> usize {
        self.tasks.iter().filter(|t| t.column_id == column_id).count()
    }

    /// Install the server's list as the new truth, keeping in-flight patches
    /// visible. A pending task missing from the list is forgotten.
    pub fn replace_all(&mut self, mut tasks: Vec<Task>) {
        self.pending.retain(|task_id, patch| {
            match tasks.iter_mut().find(|t| t.id == *task_id) {
                Some(task) => {
                    patch.apply_to(task);
                    true
                }
                None => {
                    debug!(task_id = %task_id, "pending task gone from server list");
                    false
                }
            }
        });
        self.tasks = tasks;
        self.loaded = true;
        self.revision += 1;
    }

    /// Apply `patch` to the task immediately, returning its previous state.
    pub fn apply_optimistic(&mut self, task_id: &str, patch: &TaskPatch) -> BoardResult<Snapshot> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| BoardError::TaskNotFound { id: task_id.to_string() })?;
        let snapshot = Snapshot {
            previous: task.clone(),
        };
        patch.apply_to(task);
        self.pending.insert(task_id.to_string(), patch.clone());
        self.revision += 1;
        debug!(task_id, column_id = ?patch.column_id, "applied optimistic patch");
        Ok(snapshot)
    }

    /// Keep the patched state; the task is no longer in flight.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.pending.remove(snapshot.task_id());
    }

    /// Restore the task to its pre-patch state. A task deleted in the
    /// meantime stays deleted.
    pub fn rollback(&mut self, snapshot: Snapshot) {
        self.pending.remove(snapshot.task_id());
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == snapshot.previous.id) {
            *task = snapshot.previous;
            self.revision += 1;
        }
    }

    /// Insert or replace a task the server just returned.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        self.revision += 1;
    }

    /// Drop a task after the server confirmed its deletion.
    pub fn remove(&mut self, task_id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == task_id)?;
        self.pending.remove(task_id);
        self.revision += 1;
        Some(self.tasks.remove(index))
    }
}

/// Fetch the board's tasks and install them. On failure the store is untouched.
pub async fn refresh(api: &dyn BoardApi, store: &SharedStore) -> BoardResult<usize> {
    let board_id = lock(store).board_id().to_string();
    let tasks = api.list_tasks(&board_id).await?;
    let count = tasks.len();
    lock(store).replace_all(tasks);
    debug!(board_id = %board_id, count, "task store refreshed");
    Ok(count)
}
