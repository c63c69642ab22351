//! Move protocol: relocate one task as a single logical operation.
//!
//! 1. Validate: the target column must exist; a move to the task's current
//!    slot is a no-op.
//! 2. Apply the relocation to the store optimistically.
//! 3. Send the move to the server.
//! 4. Interpret the verdict. A WIP conflict without `force` rolls the patch
//!    back and reports `Blocked`. Any other refusal rolls back and returns an
//!    error. Otherwise the patch is committed.
//! 5. On a failed request, roll back and return the error.
//!
//! Every path ends with a resync from the server, taken after the patch is
//! committed or rolled back so the store adopts the reloaded list as-is.
//! A move abandoned mid-flight (its future dropped) rolls back.
//!
//! Final ordering values always come from the server. The client proposes a
//! neighbour's position and never renumbers locally.

use std::sync::Arc;

use flowboard_common::{Board, MoveTaskRequest, TaskPatch, WipStatus};
use tracing::{debug, info, warn};

use super::api::BoardApi;
use super::store::{self, SharedStore, Snapshot};
use crate::errors::{BoardError, BoardResult};

/// "Move task T to column C [at position P] [force]".
#[derive(Debug, Clone, PartialEq)]
pub struct MoveIntent {
    pub task_id: String,
    pub column_id: String,
    pub position: Option<f64>,
    pub force: bool,
}

impl MoveIntent {
    pub fn new(task_id: impl Into<String>, column_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            column_id: column_id.into(),
            position: None,
            force: false,
        }
    }

    pub fn at_position(mut self, position: Option<f64>) -> Self {
        self.position = position;
        self
    }

    /// The same move, confirmed by the user to bypass the WIP limit.
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    fn to_request(&self) -> MoveTaskRequest {
        MoveTaskRequest {
            column_id: self.column_id.clone(),
            force_wip_override: self.force,
            position: self.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The task already sits where it was asked to go; nothing was sent.
    Unchanged,
    /// The server accepted the move and the store reflects it.
    Committed { wip_status: Option<WipStatus> },
    /// The target column is full. The store shows the server's placement,
    /// and the caller may retry with [`MoveIntent::forced`].
    Blocked { wip_status: WipStatus },
}

impl MoveOutcome {
    pub fn success(&self) -> bool {
        !matches!(self, MoveOutcome::Blocked { .. })
    }

    pub fn wip_status(&self) -> Option<&WipStatus> {
        match self {
            MoveOutcome::Unchanged => None,
            MoveOutcome::Committed { wip_status } => wip_status.as_ref(),
            MoveOutcome::Blocked { wip_status } => Some(wip_status),
        }
    }

    /// Turn a WIP block into `BoardError::WipConflict`.
    pub fn into_result(self) -> BoardResult<Option<WipStatus>> {
        match self {
            MoveOutcome::Unchanged => Ok(None),
            MoveOutcome::Committed { wip_status } => Ok(wip_status),
            MoveOutcome::Blocked { wip_status } => Err(BoardError::WipConflict(wip_status)),
        }
    }
}

/// An optimistic patch awaiting the server's verdict. Dropped unresolved,
/// it rolls the patch back.
struct InFlight<'a> {
    store: &'a SharedStore,
    snapshot: Option<Snapshot>,
}

impl InFlight<'_> {
    fn commit(mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            store::lock(self.store).commit(snapshot);
        }
    }

    fn rollback(mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            store::lock(self.store).rollback(snapshot);
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            debug!(task_id = snapshot.task_id(), "move abandoned, rolling back");
            store::lock(self.store).rollback(snapshot);
        }
    }
}

pub struct MoveProtocol {
    api: Arc<dyn BoardApi>,
    store: SharedStore,
}

impl MoveProtocol {
    pub fn new(api: Arc<dyn BoardApi>, store: SharedStore) -> Self {
        Self { api, store }
    }

    pub async fn execute(&self, board: &Board, intent: &MoveIntent) -> BoardResult<MoveOutcome> {
        if board.column(&intent.column_id).is_none() {
            return Err(BoardError::UnknownColumn {
                board_id: board.id.clone(),
                column_id: intent.column_id.clone(),
            });
        }

        let snapshot = {
            let mut store = store::lock(&self.store);
            let task = store
                .get(&intent.task_id)
                .ok_or_else(|| BoardError::TaskNotFound {
                    id: intent.task_id.clone(),
                })?;
            let same_slot = task.column_id == intent.column_id
                && intent.position.is_none_or(|p| p == task.position);
            if same_slot {
                return Ok(MoveOutcome::Unchanged);
            }
            if store.is_pending(&intent.task_id) {
                return Err(BoardError::Validation(format!(
                    "Task {} already has a move in flight",
                    intent.task_id
                )));
            }
            store.apply_optimistic(
                &intent.task_id,
                &TaskPatch::relocate(intent.column_id.clone(), intent.position),
            )?
        };
        let in_flight = InFlight {
            store: &self.store,
            snapshot: Some(snapshot),
        };

        let response = match self.api.move_task(&intent.task_id, &intent.to_request()).await {
            Ok(response) => response,
            Err(err) => {
                warn!(task_id = %intent.task_id, error = %err, "move failed, rolling back");
                in_flight.rollback();
                self.resync().await;
                return Err(err);
            }
        };

        let blocked = response
            .wip_status
            .clone()
            .filter(|w| w.at_limit && !intent.force);
        if let Some(wip_status) = blocked {
            in_flight.rollback();
            self.resync().await;
            warn!(
                task_id = %intent.task_id,
                column = %wip_status.column_name,
                count = wip_status.current_count,
                "move blocked by WIP limit"
            );
            return Ok(MoveOutcome::Blocked { wip_status });
        }

        if !response.success {
            in_flight.rollback();
            self.resync().await;
            warn!(
                task_id = %intent.task_id,
                column_id = %intent.column_id,
                forced = intent.force,
                "server refused move"
            );
            return Err(BoardError::Validation(format!(
                "Server rejected moving task {} to column {}",
                intent.task_id, intent.column_id
            )));
        }

        in_flight.commit();
        self.resync().await;
        info!(
            task_id = %intent.task_id,
            column_id = %intent.column_id,
            forced = intent.force,
            "move committed"
        );
        Ok(MoveOutcome::Committed {
            wip_status: response.wip_status,
        })
    }

    /// Reload from the server. A failed reload keeps whatever the store
    /// holds; the next successful refresh corrects it.
    async fn resync(&self) {
        if let Err(err) = store::refresh(self.api.as_ref(), &self.store).await {
            warn!(error = %err, "resync after move failed");
        }
    }
}
