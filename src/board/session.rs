//! One open board: its layout, its task store and the operations a board
//! view performs on them.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use flowboard_common::{Board, CreateTaskPayload, HintField, Task, TaskPatch, WipStatus};

use super::api::BoardApi;
use super::moves::{MoveIntent, MoveOutcome, MoveProtocol};
use super::realtime::{RealtimeChannel, store_refresher};
use super::store::{self, SharedStore, TaskStore};
use super::view::{self, ViewClock};
use crate::config::FlowboardConfig;
use crate::errors::{BoardError, BoardResult};

pub struct BoardSession {
    api: Arc<dyn BoardApi>,
    board: Board,
    store: SharedStore,
    moves: MoveProtocol,
    stale_after: Duration,
}

impl BoardSession {
    /// Load the board layout and its tasks.
    pub async fn open(api: Arc<dyn BoardApi>, board_id: &str) -> BoardResult<Self> {
        let board = api.get_board(board_id).await?;
        let store = TaskStore::new(board_id).into_shared();
        store::refresh(api.as_ref(), &store).await?;
        info!(board_id, columns = board.columns.len(), "board opened");
        Ok(Self {
            moves: MoveProtocol::new(api.clone(), store.clone()),
            api,
            board,
            store,
            stale_after: Duration::days(view::DEFAULT_STALE_DAYS),
        })
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_id(&self) -> &str {
        &self.board.id
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Copy of the current task list.
    pub fn tasks(&self) -> Vec<Task> {
        store::lock(&self.store).tasks().to_vec()
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        store::lock(&self.store).get(task_id).cloned()
    }

    /// Run `f` over the board and the live task list, e.g. to project a view.
    /// The store is locked for the duration of `f`.
    pub fn with_tasks<R>(&self, f: impl FnOnce(&Board, &[Task]) -> R) -> R {
        let guard = store::lock(&self.store);
        f(&self.board, guard.tasks())
    }

    pub fn clock(&self, now: DateTime<Utc>) -> ViewClock {
        ViewClock::new(now).with_stale_after(self.stale_after)
    }

    pub async fn refresh(&self) -> BoardResult<usize> {
        store::refresh(self.api.as_ref(), &self.store).await
    }

    /// Reload columns and projects, then the tasks.
    pub async fn reload_board(&mut self) -> BoardResult<()> {
        self.board = self.api.get_board(&self.board.id).await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn move_task(&self, intent: &MoveIntent) -> BoardResult<MoveOutcome> {
        self.moves.execute(&self.board, intent).await
    }

    pub async fn create_task(&self, payload: &CreateTaskPayload) -> BoardResult<Task> {
        if payload.board_id != self.board.id {
            return Err(BoardError::Validation(format!(
                "Task belongs to board {}, not {}",
                payload.board_id, self.board.id
            )));
        }
        self.check_column(&payload.column_id)?;
        if payload.title.trim().is_empty() {
            return Err(BoardError::Validation("Task title is required".into()));
        }
        if let Some(project_id) = &payload.project_id {
            if self.board.project(project_id).is_none() {
                return Err(BoardError::Validation(format!("Unknown project {}", project_id)));
            }
        }

        let task = self.api.create_task(payload).await?;
        info!(task_id = %task.id, column_id = %task.column_id, "task created");
        store::lock(&self.store).upsert(task.clone());
        Ok(task)
    }

    /// Edit task fields. Column changes go through [`BoardSession::move_task`]
    /// so WIP limits apply.
    pub async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> BoardResult<Task> {
        if patch.is_empty() {
            return Err(BoardError::Validation("Nothing to update".into()));
        }
        if patch.column_id.is_some() {
            return Err(BoardError::Validation(
                "Use a move to change a task's column".into(),
            ));
        }
        let task = self.api.update_task(task_id, patch).await?;
        store::lock(&self.store).upsert(task.clone());
        Ok(task)
    }

    /// Delete on the server, then locally. A failed delete leaves the store
    /// untouched.
    pub async fn delete_task(&self, task_id: &str) -> BoardResult<()> {
        self.api.delete_task(task_id).await?;
        store::lock(&self.store).remove(task_id);
        info!(task_id, "task deleted");
        Ok(())
    }

    /// Promote a server-suggested value into the task's own field.
    pub async fn accept_hint(&self, task_id: &str, field: HintField) -> BoardResult<Task> {
        let patch = {
            let store = store::lock(&self.store);
            let task = store.get(task_id).ok_or_else(|| BoardError::TaskNotFound {
                id: task_id.to_string(),
            })?;
            TaskPatch::from_hint(task, field).ok_or_else(|| {
                BoardError::Validation(format!("Task {} has no {} hint", task_id, field))
            })?
        };
        self.update_task(task_id, &patch).await
    }

    /// The server's WIP numbers for every column.
    pub async fn wip_status(&self) -> BoardResult<Vec<WipStatus>> {
        self.api.wip_status(&self.board.id).await
    }

    /// WIP numbers derived from the local store.
    pub fn wip_overlay(&self) -> Vec<WipStatus> {
        self.with_tasks(view::wip_overlay)
    }

    /// Open a realtime channel that reloads this session's store on every
    /// board update, already watching this board.
    pub fn watch(&self, config: &FlowboardConfig) -> RealtimeChannel {
        let channel = RealtimeChannel::connect(
            config.server.ws_url.clone(),
            config.server.token.clone(),
            &config.realtime,
            store_refresher(self.api.clone(), self.store.clone()),
        );
        channel.watch([self.board.id.clone()]);
        channel
    }

    fn check_column(&self, column_id: &str) -> BoardResult<()> {
        match self.board.column(column_id) {
            Some(_) => Ok(()),
            None => Err(BoardError::UnknownColumn {
                board_id: self.board.id.clone(),
                column_id: column_id.to_string(),
            }),
        }
    }
}
