//! HTTP contract tests: `HttpBoardApi` and `BoardSession` against an axum
//! mock of the board service.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};

use flowboard::board::{BoardApi, BoardSession, HttpBoardApi, MoveIntent, MoveOutcome};
use flowboard::errors::BoardError;
use flowboard_common::{
    Board, Column, ColumnType, CreateTaskPayload, MoveTaskRequest, MoveTaskResponse, Project,
    Task, TaskPatch, WipStatus,
};

// =============================================================================
// Mock board service
// =============================================================================

#[derive(Default)]
struct MockState {
    board: Option<Board>,
    tasks: Vec<Task>,
    fail_moves: bool,
    auth_headers: Vec<String>,
    move_bodies: Vec<Value>,
    list_calls: usize,
    next_id: u32,
}

type Shared = Arc<Mutex<MockState>>;

fn column(id: &str, kind: ColumnType, position: i32, limit: Option<u32>) -> Column {
    Column {
        id: id.to_string(),
        name: id.to_uppercase(),
        column_type: kind,
        position,
        wip_limit: limit,
    }
}

fn board() -> Board {
    Board {
        id: "b1".to_string(),
        name: "Home".to_string(),
        description: None,
        columns: vec![
            column("done", ColumnType::Done, 2, None),
            column("inbox", ColumnType::Input, 0, None),
            column("doing", ColumnType::Context, 1, Some(2)),
        ],
        projects: vec![Project {
            id: "p1".to_string(),
            name: "Renovation".to_string(),
        }],
    }
}

fn task(id: &str, column_id: &str) -> Task {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() - Duration::days(1);
    Task::new(id, format!("Task {}", id), column_id, at)
}

fn record_auth(state: &mut MockState, headers: &HeaderMap) {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        state.auth_headers.push(value.to_string());
    }
}

fn occupancy(board: &Board, tasks: &[Task], column_id: &str, exclude: &str) -> Option<WipStatus> {
    let column = board.column(column_id)?;
    let count = tasks
        .iter()
        .filter(|t| t.column_id == column_id && t.id != exclude)
        .count() as u32;
    Some(WipStatus {
        column_id: column.id.clone(),
        column_name: column.name.clone(),
        current_count: count,
        wip_limit: column.wip_limit,
        at_limit: column.wip_limit.is_some_and(|l| count >= l),
    })
}

async fn get_board(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Board>, StatusCode> {
    let mut state = state.lock().unwrap();
    record_auth(&mut state, &headers);
    match &state.board {
        Some(board) if board.id == id => Ok(Json(board.clone())),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn list_tasks(
    State(state): State<Shared>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Task>>, StatusCode> {
    let mut state = state.lock().unwrap();
    state.list_calls += 1;
    if state.board.as_ref().is_none_or(|b| b.id != id) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(state.tasks.clone()))
}

async fn move_task(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.move_bodies.push(body.clone());
    if state.fail_moves {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "database unavailable"})),
        );
    }
    let request: MoveTaskRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(_) => return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad body"}))),
    };
    let Some(board) = state.board.clone() else {
        return (StatusCode::NOT_FOUND, Json(json!({})));
    };
    if !state.tasks.iter().any(|t| t.id == id) {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "no such task"})));
    }
    let wip_status = occupancy(&board, &state.tasks, &request.column_id, &id);
    let at_limit = wip_status.as_ref().is_some_and(|w| w.at_limit);
    if at_limit && !request.force_wip_override {
        let response = MoveTaskResponse {
            success: false,
            wip_status,
        };
        return (StatusCode::OK, Json(serde_json::to_value(response).unwrap()));
    }
    let moving = state.tasks.iter_mut().find(|t| t.id == id).unwrap();
    moving.column_id = request.column_id.clone();
    if let Some(position) = request.position {
        moving.position = position;
    }
    let response = MoveTaskResponse {
        success: true,
        wip_status,
    };
    (StatusCode::OK, Json(serde_json::to_value(response).unwrap()))
}

async fn update_task(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, StatusCode> {
    let mut state = state.lock().unwrap();
    let task = state
        .tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    patch.apply_to(task);
    Ok(Json(task.clone()))
}

async fn delete_task(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    let mut state = state.lock().unwrap();
    let before = state.tasks.len();
    state.tasks.retain(|t| t.id != id);
    if state.tasks.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn create_task(
    State(state): State<Shared>,
    Json(payload): Json<CreateTaskPayload>,
) -> (StatusCode, Json<Task>) {
    let mut state = state.lock().unwrap();
    state.next_id += 1;
    let mut created = task(&format!("srv-{}", state.next_id), &payload.column_id);
    created.title = payload.title;
    created.project_id = payload.project_id;
    state.tasks.push(created.clone());
    (StatusCode::CREATED, Json(created))
}

async fn wip_status(State(state): State<Shared>) -> Json<Vec<WipStatus>> {
    let state = state.lock().unwrap();
    let board = state.board.clone().unwrap();
    Json(
        board
            .ordered_columns()
            .into_iter()
            .filter_map(|c| occupancy(&board, &state.tasks, &c.id, ""))
            .collect(),
    )
}

/// Serve the mock on an ephemeral port; returns the API base URL.
async fn spawn_server(tasks: Vec<Task>) -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(MockState {
        board: Some(board()),
        tasks,
        ..Default::default()
    }));
    let app = Router::new()
        .route("/api/boards/{id}", get(get_board))
        .route("/api/boards/{id}/tasks", get(list_tasks))
        .route("/api/boards/{id}/wip-status", get(wip_status))
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/{id}", patch(update_task).delete(delete_task))
        .route("/api/tasks/{id}/move", post(move_task))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api/", addr), state)
}

async fn open_session(base_url: &str) -> BoardSession {
    let api: Arc<dyn BoardApi> = Arc::new(HttpBoardApi::new(base_url, Some("secret".into())));
    BoardSession::open(api, "b1").await.unwrap()
}

fn column_of(session: &BoardSession, id: &str) -> String {
    session.task(id).unwrap().column_id
}

// =============================================================================
// Loading
// =============================================================================

mod loading {
    use super::*;

    #[tokio::test]
    async fn test_open_sends_bearer_token() {
        let (url, state) = spawn_server(vec![task("t1", "inbox")]).await;
        let session = open_session(&url).await;
        assert_eq!(session.tasks().len(), 1);
        assert_eq!(state.lock().unwrap().auth_headers, vec!["Bearer secret"]);
    }

    #[tokio::test]
    async fn test_columns_come_back_in_board_order() {
        let (url, _state) = spawn_server(vec![]).await;
        let session = open_session(&url).await;
        let order: Vec<&str> = session
            .board()
            .ordered_columns()
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(order, vec!["inbox", "doing", "done"]);
    }

    #[tokio::test]
    async fn test_unknown_board_is_not_found() {
        let (url, _state) = spawn_server(vec![]).await;
        let api = HttpBoardApi::new(url, None);
        let err = api.get_board("missing").await.unwrap_err();
        assert!(matches!(err, BoardError::BoardNotFound { ref id } if id == "missing"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let api = HttpBoardApi::new("http://127.0.0.1:9/api", None);
        let err = api.list_tasks("b1").await.unwrap_err();
        assert!(matches!(err, BoardError::Network(_)));
        assert!(err.requires_resync());
    }
}

// =============================================================================
// Moves
// =============================================================================

mod moves {
    use super::*;

    #[tokio::test]
    async fn test_simple_move_commits_and_resyncs() {
        let (url, state) = spawn_server(vec![task("t", "inbox")]).await;
        let session = open_session(&url).await;

        let outcome = session.move_task(&MoveIntent::new("t", "doing")).await.unwrap();
        assert!(matches!(outcome, MoveOutcome::Committed { .. }));
        assert_eq!(column_of(&session, "t"), "doing");

        let state = state.lock().unwrap();
        assert_eq!(state.tasks[0].column_id, "doing");
        // Open plus the post-move reload.
        assert_eq!(state.list_calls, 2);
        assert_eq!(
            state.move_bodies[0],
            json!({"columnId": "doing", "forceWipOverride": false})
        );
    }

    #[tokio::test]
    async fn test_wip_block_then_forced_retry() {
        let (url, state) = spawn_server(vec![
            task("t", "inbox"),
            task("a", "doing"),
            task("b", "doing"),
        ])
        .await;
        let session = open_session(&url).await;

        let blocked = session.move_task(&MoveIntent::new("t", "doing")).await.unwrap();
        match &blocked {
            MoveOutcome::Blocked { wip_status } => {
                assert!(wip_status.at_limit);
                assert_eq!(wip_status.current_count, 2);
                assert_eq!(wip_status.wip_limit, Some(2));
            }
            other => panic!("Expected Blocked, got {:?}", other),
        }
        assert_eq!(column_of(&session, "t"), "inbox");

        let forced = session
            .move_task(&MoveIntent::new("t", "doing").forced())
            .await
            .unwrap();
        assert!(forced.success());
        assert_eq!(column_of(&session, "t"), "doing");
        assert_eq!(state.lock().unwrap().move_bodies[1]["forceWipOverride"], true);
    }

    #[tokio::test]
    async fn test_server_error_rolls_back_with_reason() {
        let (url, state) = spawn_server(vec![task("t", "inbox")]).await;
        let session = open_session(&url).await;
        state.lock().unwrap().fail_moves = true;

        let err = session
            .move_task(&MoveIntent::new("t", "done"))
            .await
            .unwrap_err();
        match &err {
            BoardError::Server { status, message } => {
                assert_eq!(*status, 500);
                assert_eq!(message, "database unavailable");
            }
            other => panic!("Expected Server error, got {:?}", other),
        }
        assert!(err.user_message().contains("database unavailable"));
        assert_eq!(column_of(&session, "t"), "inbox");
        assert_eq!(state.lock().unwrap().list_calls, 2);
    }

    #[tokio::test]
    async fn test_position_is_forwarded_unmodified() {
        let (url, state) = spawn_server(vec![task("t", "inbox"), task("u", "inbox")]).await;
        let session = open_session(&url).await;
        session
            .move_task(&MoveIntent::new("t", "inbox").at_position(Some(3.5)))
            .await
            .unwrap();
        assert_eq!(state.lock().unwrap().move_bodies[0]["position"], 3.5);
        assert_eq!(session.task("t").unwrap().position, 3.5);
    }
}

// =============================================================================
// Task CRUD
// =============================================================================

mod crud {
    use super::*;

    #[tokio::test]
    async fn test_create_update_delete() {
        let (url, state) = spawn_server(vec![]).await;
        let session = open_session(&url).await;

        let mut payload = CreateTaskPayload::new("b1", "inbox", "Buy tiles");
        payload.project_id = Some("p1".into());
        let created = session.create_task(&payload).await.unwrap();
        assert_eq!(created.id, "srv-1");
        assert_eq!(session.task("srv-1").unwrap().project_id.as_deref(), Some("p1"));

        let patch = TaskPatch {
            title: Some("Buy grout".into()),
            ..Default::default()
        };
        session.update_task("srv-1", &patch).await.unwrap();
        assert_eq!(session.task("srv-1").unwrap().title, "Buy grout");

        session.delete_task("srv-1").await.unwrap();
        assert!(session.task("srv-1").is_none());
        assert!(state.lock().unwrap().tasks.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_task_keeps_store() {
        let (url, state) = spawn_server(vec![task("t", "inbox")]).await;
        let session = open_session(&url).await;
        state.lock().unwrap().tasks.clear();

        let err = session.delete_task("t").await.unwrap_err();
        assert!(matches!(err, BoardError::TaskNotFound { .. }));
        assert!(session.task("t").is_some());
    }

    #[tokio::test]
    async fn test_wip_status_endpoint() {
        let (url, _state) = spawn_server(vec![task("a", "doing"), task("b", "doing")]).await;
        let session = open_session(&url).await;
        let statuses = session.wip_status().await.unwrap();
        assert_eq!(statuses.len(), 3);
        let doing = statuses.iter().find(|s| s.column_id == "doing").unwrap();
        assert!(doing.at_limit);
        assert_eq!(session.wip_overlay(), statuses);
    }
}
