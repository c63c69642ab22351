use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the synthetic swimlane that groups tasks without a project.
pub const UNASSIGNED_PROJECT_ID: &str = "unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Input,
    Clarify,
    Context,
    Waiting,
    Someday,
    Done,
    Archive,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "INPUT",
            Self::Clarify => "CLARIFY",
            Self::Context => "CONTEXT",
            Self::Waiting => "WAITING",
            Self::Someday => "SOMEDAY",
            Self::Done => "DONE",
            Self::Archive => "ARCHIVE",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INPUT" => Ok(Self::Input),
            "CLARIFY" => Ok(Self::Clarify),
            "CONTEXT" => Ok(Self::Context),
            "WAITING" => Ok(Self::Waiting),
            "SOMEDAY" => Ok(Self::Someday),
            "DONE" => Ok(Self::Done),
            "ARCHIVE" => Ok(Self::Archive),
            _ => Err(format!("Invalid column type: {}", s)),
        }
    }
}

/// GTD context tag: where or how a task gets done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskContext {
    Email,
    Meeting,
    Phone,
    Read,
    Watch,
    Desk,
    Other,
}

impl TaskContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Meeting => "MEETING",
            Self::Phone => "PHONE",
            Self::Read => "READ",
            Self::Watch => "WATCH",
            Self::Desk => "DESK",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EMAIL" => Ok(Self::Email),
            "MEETING" => Ok(Self::Meeting),
            "PHONE" => Ok(Self::Phone),
            "READ" => Ok(Self::Read),
            "WATCH" => Ok(Self::Watch),
            "DESK" => Ok(Self::Desk),
            "OTHER" => Ok(Self::Other),
            _ => Err(format!("Invalid task context: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub position: i32,
    /// `None` means the column accepts any number of tasks.
    #[serde(default)]
    pub wip_limit: Option<u32>,
}

/// A swimlane. Tasks reference projects by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
}

impl Project {
    pub fn unassigned() -> Self {
        Self {
            id: UNASSIGNED_PROJECT_ID.to_string(),
            name: "Unassigned".to_string(),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.id == UNASSIGNED_PROJECT_ID
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Board {
    /// Columns in left-to-right order. Positions are unique within a board,
    /// ties (a server bug) fall back to id order so the result stays total.
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        columns
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// Server-suggested field values not yet accepted into the task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHints {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub context: Option<TaskContext>,
}

impl TaskHints {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.context.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub column_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub context: Option<TaskContext>,
    #[serde(default)]
    pub position: f64,
    #[serde(default)]
    pub is_done: bool,
    /// Server-computed staleness. The view layer also derives it locally.
    #[serde(default)]
    pub stale: bool,
    #[serde(default)]
    pub waiting_for: Option<String>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    pub last_moved_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hints: Option<TaskHints>,
}

impl Task {
    /// A fresh task with every optional field empty and all timestamps at `now`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        column_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            column_id: column_id.into(),
            project_id: None,
            context: None,
            position: 0.0,
            is_done: false,
            stale: false,
            waiting_for: None,
            due_at: None,
            last_moved_at: now,
            created_at: now,
            updated_at: now,
            checklist: Vec::new(),
            tags: Vec::new(),
            hints: None,
        }
    }

    pub fn has_hints(&self) -> bool {
        self.hints.as_ref().is_some_and(|h| !h.is_empty())
    }
}

/// Column occupancy reported by the server in answer to a move attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WipStatus {
    pub column_id: String,
    pub column_name: String,
    pub current_count: u32,
    #[serde(default)]
    pub wip_limit: Option<u32>,
    pub at_limit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_column_type_roundtrip() {
        for s in &["INPUT", "CLARIFY", "CONTEXT", "WAITING", "SOMEDAY", "DONE", "ARCHIVE"] {
            let parsed: ColumnType = s.parse().unwrap();
            assert_eq!(parsed.as_str(), *s);
        }
        assert_eq!("waiting".parse::<ColumnType>().unwrap(), ColumnType::Waiting);
        assert!("backlog".parse::<ColumnType>().is_err());
    }

    #[test]
    fn test_task_context_roundtrip() {
        for s in &["EMAIL", "MEETING", "PHONE", "READ", "WATCH", "DESK", "OTHER"] {
            let parsed: TaskContext = s.parse().unwrap();
            assert_eq!(parsed.as_str(), *s);
        }
        assert!("GARDEN".parse::<TaskContext>().is_err());
    }

    #[test]
    fn test_serde_uses_uppercase_enum_tags() {
        assert_eq!(
            serde_json::to_string(&ColumnType::Someday).unwrap(),
            "\"SOMEDAY\""
        );
        assert_eq!(
            serde_json::from_str::<TaskContext>("\"PHONE\"").unwrap(),
            TaskContext::Phone
        );
    }

    #[test]
    fn test_column_deserializes_type_field() {
        let column: Column = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "name": "Doing",
            "type": "CONTEXT",
            "position": 2,
            "wipLimit": 3
        }))
        .unwrap();
        assert_eq!(column.column_type, ColumnType::Context);
        assert_eq!(column.wip_limit, Some(3));

        let unlimited: Column = serde_json::from_value(serde_json::json!({
            "id": "c0", "name": "Inbox", "type": "INPUT", "position": 0
        }))
        .unwrap();
        assert_eq!(unlimited.wip_limit, None);
    }

    #[test]
    fn test_task_minimal_payload_fills_defaults() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "title": "Call plumber",
            "columnId": "c1",
            "lastMovedAt": "2024-05-01T09:00:00Z",
            "createdAt": "2024-05-01T09:00:00Z",
            "updatedAt": "2024-05-01T09:00:00Z"
        }))
        .unwrap();
        assert_eq!(task.column_id, "c1");
        assert!(!task.stale);
        assert!(!task.is_done);
        assert!(task.tags.is_empty());
        assert!(task.hints.is_none());
        assert_eq!(task.last_moved_at, ts());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task::new("t1", "Read paper", "c1", ts());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["columnId"], "c1");
        assert_eq!(json["isDone"], false);
        assert!(json.get("lastMovedAt").is_some());
        assert!(json.get("column_id").is_none());
    }

    #[test]
    fn test_ordered_columns_sorts_by_position() {
        let board = Board {
            id: "b1".into(),
            name: "Home".into(),
            description: None,
            columns: vec![
                Column { id: "done".into(), name: "Done".into(), column_type: ColumnType::Done, position: 3, wip_limit: None },
                Column { id: "inbox".into(), name: "Inbox".into(), column_type: ColumnType::Input, position: 0, wip_limit: None },
                Column { id: "doing".into(), name: "Doing".into(), column_type: ColumnType::Context, position: 1, wip_limit: Some(2) },
            ],
            projects: vec![],
        };
        let ids: Vec<&str> = board.ordered_columns().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["inbox", "doing", "done"]);
        assert_eq!(board.column("doing").unwrap().wip_limit, Some(2));
        assert!(board.column("missing").is_none());
    }

    #[test]
    fn test_hints_emptiness() {
        let mut task = Task::new("t1", "x", "c1", ts());
        assert!(!task.has_hints());
        task.hints = Some(TaskHints::default());
        assert!(!task.has_hints());
        task.hints = Some(TaskHints {
            context: Some(TaskContext::Email),
            ..Default::default()
        });
        assert!(task.has_hints());
    }

    #[test]
    fn test_wip_status_from_server_shape() {
        let status: WipStatus = serde_json::from_value(serde_json::json!({
            "columnId": "doing",
            "columnName": "Doing",
            "currentCount": 2,
            "wipLimit": 2,
            "atLimit": true
        }))
        .unwrap();
        assert!(status.at_limit);
        assert_eq!(status.current_count, 2);
        assert_eq!(status.wip_limit, Some(2));
    }
}
