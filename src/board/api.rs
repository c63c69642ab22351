//! REST seam to the board service.
//!
//! `BoardApi` is the only way the engine talks to the server, so the store,
//! the move protocol and the session can be driven by an in-memory fake in
//! tests. `HttpBoardApi` is the production implementation over `reqwest`.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use flowboard_common::{
    Board, CreateTaskPayload, MoveTaskRequest, MoveTaskResponse, Task, TaskPatch, WipStatus,
};

use crate::config::ServerConfig;
use crate::errors::{BoardError, BoardResult};

/// Longest server error body echoed back into a `BoardError::Server`.
const MAX_ERROR_BODY: usize = 200;

#[async_trait]
pub trait BoardApi: Send + Sync {
    /// `GET /boards/{boardId}`
    async fn get_board(&self, board_id: &str) -> BoardResult<Board>;

    /// `GET /boards/{boardId}/tasks`
    async fn list_tasks(&self, board_id: &str) -> BoardResult<Vec<Task>>;

    /// `POST /tasks/{taskId}/move`
    async fn move_task(
        &self,
        task_id: &str,
        request: &MoveTaskRequest,
    ) -> BoardResult<MoveTaskResponse>;

    /// `PATCH /tasks/{taskId}`
    async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> BoardResult<Task>;

    /// `POST /tasks`
    async fn create_task(&self, payload: &CreateTaskPayload) -> BoardResult<Task>;

    /// `DELETE /tasks/{taskId}`
    async fn delete_task(&self, task_id: &str) -> BoardResult<()>;

    /// `GET /boards/{boardId}/wip-status`
    async fn wip_status(&self, board_id: &str) -> BoardResult<Vec<WipStatus>>;
}

/// What a 404 means for the request that produced it.
enum Missing<'a> {
    Board(&'a str),
    Task(&'a str),
}

impl Missing<'_> {
    fn into_error(self) -> BoardError {
        match self {
            Missing::Board(id) => BoardError::BoardNotFound { id: id.to_string() },
            Missing::Task(id) => BoardError::TaskNotFound { id: id.to_string() },
        }
    }
}

pub struct HttpBoardApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBoardApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(server: &ServerConfig) -> Self {
        Self::new(server.api_url.clone(), server.token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, missing: Missing<'_>) -> BoardResult<Response> {
        let resp = builder.send().await.map_err(BoardError::Network)?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(missing.into_error());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BoardError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        missing: Missing<'_>,
    ) -> BoardResult<T> {
        let resp = self.send(builder, missing).await?;
        let body = resp.text().await.map_err(BoardError::Network)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull a human-readable reason out of an error body.
///
/// Accepts `{"error": ".."}` / `{"message": ".."}` JSON, otherwise falls back
/// to the (truncated) raw text.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn get_board(&self, board_id: &str) -> BoardResult<Board> {
        let builder = self.request(Method::GET, &format!("boards/{}", board_id));
        self.send_json(builder, Missing::Board(board_id)).await
    }

    async fn list_tasks(&self, board_id: &str) -> BoardResult<Vec<Task>> {
        let builder = self.request(Method::GET, &format!("boards/{}/tasks", board_id));
        self.send_json(builder, Missing::Board(board_id)).await
    }

    async fn move_task(
        &self,
        task_id: &str,
        request: &MoveTaskRequest,
    ) -> BoardResult<MoveTaskResponse> {
        let builder = self
            .request(Method::POST, &format!("tasks/{}/move", task_id))
            .json(request);
        self.send_json(builder, Missing::Task(task_id)).await
    }

    async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> BoardResult<Task> {
        let builder = self
            .request(Method::PATCH, &format!("tasks/{}", task_id))
            .json(patch);
        self.send_json(builder, Missing::Task(task_id)).await
    }

    async fn create_task(&self, payload: &CreateTaskPayload) -> BoardResult<Task> {
        let builder = self.request(Method::POST, "tasks").json(payload);
        self.send_json(builder, Missing::Board(&payload.board_id))
            .await
    }

    async fn delete_task(&self, task_id: &str) -> BoardResult<()> {
        let builder = self.request(Method::DELETE, &format!("tasks/{}", task_id));
        self.send(builder, Missing::Task(task_id)).await?;
        Ok(())
    }

    async fn wip_status(&self, board_id: &str) -> BoardResult<Vec<WipStatus>> {
        let builder = self.request(Method::GET, &format!("boards/{}/wip-status", board_id));
        self.send_json(builder, Missing::Board(board_id)).await
    }
}
