//! Request and response bodies for the board REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Task, TaskContext, TaskHints, WipStatus};

/// Body of `POST /tasks/{taskId}/move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    pub column_id: String,
    pub force_wip_override: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskResponse {
    pub success: bool,
    /// Absent for columns the server does not track.
    #[serde(default)]
    pub wip_status: Option<WipStatus>,
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub board_id: String,
    pub column_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<TaskContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
}

impl CreateTaskPayload {
    pub fn new(
        board_id: impl Into<String>,
        column_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            board_id: board_id.into(),
            column_id: column_id.into(),
            title: title.into(),
            description: None,
            project_id: None,
            context: None,
            due_at: None,
        }
    }
}

/// A partial set of task fields.
///
/// Serves both as the `PATCH /tasks/{taskId}` body and as the optimistic
/// patch the task store applies locally. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<TaskContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// The hints the task keeps. Set when a hint is accepted so the server
    /// drops it in the same request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<TaskHints>,
}

impl TaskPatch {
    pub fn relocate(column_id: impl Into<String>, position: Option<f64>) -> Self {
        Self {
            column_id: Some(column_id.into()),
            position,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy every set field onto `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(column_id) = &self.column_id {
            task.column_id = column_id.clone();
        }
        if let Some(position) = self.position {
            task.position = position;
        }
        if let Some(project_id) = &self.project_id {
            task.project_id = Some(project_id.clone());
        }
        if let Some(context) = self.context {
            task.context = Some(context);
        }
        if let Some(is_done) = self.is_done {
            task.is_done = is_done;
        }
        if let Some(waiting_for) = &self.waiting_for {
            task.waiting_for = Some(waiting_for.clone());
        }
        if let Some(due_at) = self.due_at {
            task.due_at = Some(due_at);
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.clone();
        }
        if let Some(hints) = &self.hints {
            task.hints = Some(hints.clone()).filter(|h| !h.is_empty());
        }
    }
}

/// Task field a server hint can be accepted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintField {
    Title,
    Description,
    Context,
}

impl HintField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Context => "context",
        }
    }
}

impl std::fmt::Display for HintField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HintField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "context" => Ok(Self::Context),
            _ => Err(format!("Invalid hint field: {}", s)),
        }
    }
}

impl TaskPatch {
    /// The patch that promotes the task's hint for `field` into the canonical
    /// field and clears that hint, or `None` when the task carries no such hint.
    pub fn from_hint(task: &Task, field: HintField) -> Option<Self> {
        let mut remaining = task.hints.clone()?;
        let mut patch = match field {
            HintField::Title => Self {
                title: Some(remaining.title.take()?),
                ..Default::default()
            },
            HintField::Description => Self {
                description: Some(remaining.description.take()?),
                ..Default::default()
            },
            HintField::Context => Self {
                context: Some(remaining.context.take()?),
                ..Default::default()
            },
        };
        patch.hints = Some(remaining);
        Some(patch)
    }
}
