//! In-memory `BoardApi` with server-side WIP enforcement, for tests.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Notify;

use flowboard_common::{
    Board, Column, ColumnType, CreateTaskPayload, MoveTaskRequest, MoveTaskResponse, Project,
    Task, TaskPatch, WipStatus,
};

use super::api::BoardApi;
use crate::errors::{BoardError, BoardResult};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub fn column(id: &str, name: &str, kind: ColumnType, position: i32, limit: Option<u32>) -> Column {
    Column {
        id: id.into(),
        name: name.into(),
        column_type: kind,
        position,
        wip_limit: limit,
    }
}

/// Inbox (no limit) → Doing (limit 2) → Done.
pub fn sample_board() -> Board {
    Board {
        id: "b1".into(),
        name: "Personal".into(),
        description: None,
        columns: vec![
            column("inbox", "Inbox", ColumnType::Input, 0, None),
            column("doing", "Doing", ColumnType::Context, 1, Some(2)),
            column("done", "Done", ColumnType::Done, 2, None),
        ],
        projects: vec![
            Project { id: "home".into(), name: "Home".into() },
            Project { id: "work".into(), name: "Work".into() },
        ],
    }
}

/// A task last moved `days_ago` days before [`now`].
pub fn task(id: &str, column_id: &str, days_ago: i64) -> Task {
    let moved = now() - Duration::days(days_ago);
    let mut t = Task::new(id, format!("Task {}", id), column_id, moved);
    t.last_moved_at = moved;
    t
}

#[derive(Default)]
struct FakeState {
    board: Option<Board>,
    tasks: Vec<Task>,
    fail_moves: bool,
    reject_moves: bool,
    fail_lists: bool,
    move_gate: Option<Arc<Notify>>,
    next_id: u32,
}

pub struct FakeBoardApi {
    state: Mutex<FakeState>,
    list_calls: AtomicUsize,
    move_calls: AtomicUsize,
}

impl FakeBoardApi {
    pub fn new(board: Board, tasks: Vec<Task>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                board: Some(board),
                tasks,
                ..Default::default()
            }),
            list_calls: AtomicUsize::new(0),
            move_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_moves(&self, fail: bool) {
        self.state.lock().unwrap().fail_moves = fail;
    }

    /// Answer every move with `{"success": false}` and no WIP status.
    pub fn reject_moves(&self, reject: bool) {
        self.state.lock().unwrap().reject_moves = reject;
    }

    /// Hold move requests until the returned gate is notified.
    pub fn hold_moves(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().move_gate = Some(gate.clone());
        gate
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().unwrap().fail_lists = fail;
    }

    /// Mutate server-side state behind the client's back.
    pub fn with_tasks<R>(&self, f: impl FnOnce(&mut Vec<Task>) -> R) -> R {
        f(&mut self.state.lock().unwrap().tasks)
    }

    pub fn server_task(&self, id: &str) -> Option<Task> {
        self.state.lock().unwrap().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn move_calls(&self) -> usize {
        self.move_calls.load(Ordering::SeqCst)
    }
}

fn status_for(board: &Board, column_id: &str, count: u32) -> Option<WipStatus> {
    let column = board.column(column_id)?;
    Some(WipStatus {
        column_id: column.id.clone(),
        column_name: column.name.clone(),
        current_count: count,
        wip_limit: column.wip_limit,
        at_limit: column.wip_limit.is_some_and(|l| count >= l),
    })
}

#[async_trait]
impl BoardApi for FakeBoardApi {
    async fn get_board(&self, board_id: &str) -> BoardResult<Board> {
        let state = self.state.lock().unwrap();
        state
            .board
            .clone()
            .filter(|b| b.id == board_id)
            .ok_or_else(|| BoardError::BoardNotFound { id: board_id.into() })
    }

    async fn list_tasks(&self, board_id: &str) -> BoardResult<Vec<Task>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.fail_lists {
            return Err(BoardError::Server { status: 503, message: "unavailable".into() });
        }
        if state.board.as_ref().is_none_or(|b| b.id != board_id) {
            return Err(BoardError::BoardNotFound { id: board_id.into() });
        }
        Ok(state.tasks.clone())
    }

    async fn move_task(
        &self,
        task_id: &str,
        request: &MoveTaskRequest,
    ) -> BoardResult<MoveTaskResponse> {
        self.move_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.state.lock().unwrap().move_gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut state = self.state.lock().unwrap();
        if state.reject_moves {
            return Ok(MoveTaskResponse { success: false, wip_status: None });
        }
        if state.fail_moves {
            return Err(BoardError::Server { status: 500, message: "move exploded".into() });
        }
        let board = state.board.clone().ok_or(BoardError::BoardNotFound { id: "?".into() })?;
        if board.column(&request.column_id).is_none() {
            return Err(BoardError::Server { status: 400, message: "unknown column".into() });
        }
        if !state.tasks.iter().any(|t| t.id == task_id) {
            return Err(BoardError::TaskNotFound { id: task_id.into() });
        }
        let count = state
            .tasks
            .iter()
            .filter(|t| t.column_id == request.column_id && t.id != task_id)
            .count() as u32;
        let wip_status = status_for(&board, &request.column_id, count);
        let at_limit = wip_status.as_ref().is_some_and(|w| w.at_limit);
        if at_limit && !request.force_wip_override {
            return Ok(MoveTaskResponse { success: false, wip_status });
        }
        let task = state.tasks.iter_mut().find(|t| t.id == task_id).unwrap();
        if task.column_id != request.column_id {
            task.last_moved_at = now();
        }
        task.column_id = request.column_id.clone();
        if let Some(position) = request.position {
            task.position = position;
        }
        Ok(MoveTaskResponse { success: true, wip_status })
    }

    async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> BoardResult<Task> {
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| BoardError::TaskNotFound { id: task_id.into() })?;
        patch.apply_to(task);
        task.updated_at = now();
        Ok(task.clone())
    }

    async fn create_task(&self, payload: &CreateTaskPayload) -> BoardResult<Task> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let mut task = Task::new(
            format!("new-{}", state.next_id),
            payload.title.clone(),
            payload.column_id.clone(),
            now(),
        );
        task.description = payload.description.clone();
        task.project_id = payload.project_id.clone();
        task.context = payload.context;
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn delete_task(&self, task_id: &str) -> BoardResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != task_id);
        if state.tasks.len() == before {
            return Err(BoardError::TaskNotFound { id: task_id.into() });
        }
        Ok(())
    }

    async fn wip_status(&self, board_id: &str) -> BoardResult<Vec<WipStatus>> {
        let state = self.state.lock().unwrap();
        let board = state
            .board
            .as_ref()
            .filter(|b| b.id == board_id)
            .ok_or_else(|| BoardError::BoardNotFound { id: board_id.into() })?;
        Ok(board
            .ordered_columns()
            .into_iter()
            .filter_map(|c| {
                let count = state.tasks.iter().filter(|t| t.column_id == c.id).count() as u32;
                status_for(board, &c.id, count)
            })
            .collect())
    }
}
