//! Task mutations: `flowboard move`, `create`, `edit`, `delete` and `accept-hint`.

use anyhow::{Context, Result};
use console::style;

use flowboard::board::{MoveIntent, MoveOutcome};
use flowboard::config::FlowboardConfig;
use flowboard::errors::BoardError;
use flowboard_common::{CreateTaskPayload, HintField, TaskPatch};

use super::{open_session, parse_context};

pub async fn cmd_move(
    config: &FlowboardConfig,
    board_id: &str,
    task_id: &str,
    column_id: &str,
    position: Option<f64>,
    force: bool,
) -> Result<()> {
    let session = open_session(config, board_id).await?;
    let mut intent = MoveIntent::new(task_id, column_id).at_position(position);
    if force {
        intent = intent.forced();
    }

    let column_name = session
        .board()
        .column(column_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| column_id.to_string());

    match session.move_task(&intent).await {
        Ok(MoveOutcome::Unchanged) => {
            println!("Task {} is already in {}.", task_id, column_name);
        }
        Ok(MoveOutcome::Committed { wip_status }) => {
            println!("{} {} → {}", style("Moved").green().bold(), task_id, column_name);
            if let Some((status, limit)) = wip_status.and_then(|s| s.wip_limit.map(|l| (s, l))) {
                let line = format!(
                    "{} now holds {}/{}",
                    status.column_name,
                    session_count(&session, column_id),
                    limit
                );
                if force && status.at_limit {
                    println!("  {} {}", style("⚠").yellow(), style(line).yellow());
                } else {
                    println!("  {}", style(line).dim());
                }
            }
        }
        Ok(MoveOutcome::Blocked { wip_status }) => {
            let err = BoardError::WipConflict(wip_status);
            println!("{} {}", style("⚠").yellow(), err.user_message());
            println!("  Re-run with {} to move it anyway.", style("--force").bold());
            return Err(err.into());
        }
        Err(err) => {
            println!("{} {}", style("Error:").red().bold(), err.user_message());
            if err.requires_resync() {
                println!("  {}", style("Local state was reloaded from the server.").dim());
            }
            return Err(err.into());
        }
    }
    Ok(())
}

fn session_count(session: &flowboard::board::BoardSession, column_id: &str) -> usize {
    flowboard::board::store::lock(session.store()).count_in_column(column_id)
}

pub async fn cmd_create(
    config: &FlowboardConfig,
    board_id: &str,
    column_id: &str,
    title: &str,
    description: Option<String>,
    project_id: Option<String>,
    context: Option<&str>,
) -> Result<()> {
    let session = open_session(config, board_id).await?;
    let mut payload = CreateTaskPayload::new(board_id, column_id, title);
    payload.description = description;
    payload.project_id = project_id;
    payload.context = parse_context(context)?;

    let task = session
        .create_task(&payload)
        .await
        .context("Failed to create task")?;
    println!("{} {} {}", style("Created").green().bold(), style(&task.id).dim(), task.title);
    Ok(())
}

/// Field edits for `flowboard edit`. Column changes go through `move`.
pub struct TaskEdits {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<String>,
    pub context: Option<String>,
    pub done: Option<bool>,
    pub waiting_for: Option<String>,
    pub tags: Vec<String>,
}

pub async fn cmd_edit(
    config: &FlowboardConfig,
    board_id: &str,
    task_id: &str,
    edits: TaskEdits,
) -> Result<()> {
    let patch = TaskPatch {
        title: edits.title,
        description: edits.description,
        project_id: edits.project_id,
        context: parse_context(edits.context.as_deref())?,
        is_done: edits.done,
        waiting_for: edits.waiting_for,
        tags: (!edits.tags.is_empty()).then_some(edits.tags),
        ..Default::default()
    };
    let session = open_session(config, board_id).await?;
    let task = session
        .update_task(task_id, &patch)
        .await
        .with_context(|| format!("Failed to update task {}", task_id))?;
    println!("{} {} {}", style("Updated").green().bold(), style(&task.id).dim(), task.title);
    Ok(())
}

pub async fn cmd_delete(config: &FlowboardConfig, board_id: &str, task_id: &str) -> Result<()> {
    let session = open_session(config, board_id).await?;
    session
        .delete_task(task_id)
        .await
        .with_context(|| format!("Failed to delete task {}", task_id))?;
    println!("{} {}", style("Deleted").green().bold(), task_id);
    Ok(())
}

pub async fn cmd_accept_hint(
    config: &FlowboardConfig,
    board_id: &str,
    task_id: &str,
    field: &str,
) -> Result<()> {
    let field: HintField = field.parse().map_err(anyhow::Error::msg)?;
    let session = open_session(config, board_id).await?;
    let task = session.accept_hint(task_id, field).await?;
    println!("{} {} hint for {}: {}", style("Accepted").green().bold(), field, task.id, task.title);
    Ok(())
}
