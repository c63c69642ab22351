//! CLI command implementations.
//!
//! | Module  | Commands handled                                 |
//! |---------|--------------------------------------------------|
//! | `board` | `Show`, `Wip`                                    |
//! | `task`  | `Move`, `Create`, `Edit`, `Delete`, `AcceptHint` |
//! | `watch` | `Watch`                                          |

pub mod board;
pub mod task;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use flowboard::board::{BoardApi, BoardSession, HttpBoardApi, TaskFilter};
use flowboard::config::FlowboardConfig;
use flowboard_common::{ColumnType, TaskContext};

pub use board::{cmd_show, cmd_wip};
pub use task::{TaskEdits, cmd_accept_hint, cmd_create, cmd_delete, cmd_edit, cmd_move};
pub use watch::cmd_watch;

pub(crate) fn api(config: &FlowboardConfig) -> Arc<dyn BoardApi> {
    Arc::new(HttpBoardApi::from_config(&config.server))
}

pub(crate) async fn open_session(config: &FlowboardConfig, board_id: &str) -> Result<BoardSession> {
    let session = BoardSession::open(api(config), board_id)
        .await
        .with_context(|| format!("Failed to open board {}", board_id))?;
    Ok(session.with_stale_after(config.stale_after()))
}

pub(crate) fn parse_context(value: Option<&str>) -> Result<Option<TaskContext>> {
    value
        .map(|v| v.parse::<TaskContext>().map_err(anyhow::Error::msg))
        .transpose()
}

pub fn parse_filter(
    search: Option<String>,
    context: Option<&str>,
    column_type: Option<&str>,
    project_id: Option<String>,
    stale_only: bool,
    hide_done: bool,
) -> Result<TaskFilter> {
    let column_type = column_type
        .map(|v| v.parse::<ColumnType>().map_err(anyhow::Error::msg))
        .transpose()?;
    Ok(TaskFilter {
        search: search.filter(|s| !s.trim().is_empty()),
        context: parse_context(context)?,
        column_type,
        project_id,
        stale_only,
        hide_done,
    })
}
