//! Pure projection of the task set into render-ready groupings.
//!
//! Every function here depends only on its arguments (including the clock
//! value), so a view can be recomputed on each render without drift.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use flowboard_common::{Board, Column, ColumnType, Project, Task, TaskContext, WipStatus};

/// Days without a column change after which an open task is stale.
pub const DEFAULT_STALE_DAYS: i64 = 7;

/// Active filter gates. A `None`/`false` gate is inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub context: Option<TaskContext>,
    pub column_type: Option<ColumnType>,
    pub project_id: Option<String>,
    /// Only stale tasks.
    pub stale_only: bool,
    pub hide_done: bool,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Clock and threshold a projection is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ViewClock {
    pub now: DateTime<Utc>,
    pub stale_after: Duration,
}

impl ViewClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            stale_after: Duration::days(DEFAULT_STALE_DAYS),
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }
}

/// Done tasks are never stale; otherwise the server flag or the age of the
/// last column change decides.
pub fn is_stale(task: &Task, clock: &ViewClock) -> bool {
    if task.is_done {
        return false;
    }
    task.stale || clock.now - task.last_moved_at >= clock.stale_after
}

/// Apply every active gate in order; all must pass.
pub fn matches(task: &Task, board: &Board, filter: &TaskFilter, clock: &ViewClock) -> bool {
    if let Some(needle) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let needle = needle.to_lowercase();
        let in_title = task.title.to_lowercase().contains(&needle);
        let in_description = task
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle));
        if !in_title && !in_description {
            return false;
        }
    }
    if let Some(context) = filter.context {
        if task.context != Some(context) {
            return false;
        }
    }
    if let Some(column_type) = filter.column_type {
        let resolved = board.column(&task.column_id).map(|c| c.column_type);
        if resolved != Some(column_type) {
            return false;
        }
    }
    if let Some(project_id) = filter.project_id.as_deref() {
        if task.project_id.as_deref() != Some(project_id) {
            return false;
        }
    }
    if filter.stale_only && !is_stale(task, clock) {
        return false;
    }
    if filter.hide_done && task.is_done {
        return false;
    }
    true
}

/// The tasks passing `filter`, in input order.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    board: &Board,
    filter: &TaskFilter,
    clock: &ViewClock,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| matches(t, board, filter, clock))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGroup<'a> {
    pub column: &'a Column,
    pub tasks: Vec<&'a Task>,
}

impl ColumnGroup<'_> {
    pub fn over_limit(&self) -> bool {
        self.column
            .wip_limit
            .is_some_and(|limit| self.tasks.len() as u32 > limit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Swimlane<'a> {
    pub project: Project,
    pub columns: Vec<ColumnGroup<'a>>,
}

impl Swimlane<'_> {
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

/// Oldest-moved first; equal timestamps keep their input order.
fn sort_bucket(tasks: &mut [&Task]) {
    tasks.sort_by_key(|t| t.last_moved_at);
}

fn bucket_by_column<'a>(board: &'a Board, tasks: &[&'a Task]) -> Vec<ColumnGroup<'a>> {
    let mut groups: Vec<ColumnGroup<'a>> = board
        .ordered_columns()
        .into_iter()
        .map(|column| ColumnGroup {
            column,
            tasks: Vec::new(),
        })
        .collect();
    for &task in tasks {
        match groups.iter_mut().find(|g| g.column.id == task.column_id) {
            Some(group) => group.tasks.push(task),
            None => warn!(
                task_id = %task.id,
                column_id = %task.column_id,
                "task references unknown column, left out of view"
            ),
        }
    }
    for group in &mut groups {
        sort_bucket(&mut group.tasks);
    }
    groups
}

/// One bucket per board column, in column order. Tasks whose column is not
/// on the board are dropped from the grouping.
pub fn group_by_column<'a>(
    tasks: &'a [Task],
    board: &'a Board,
    filter: &TaskFilter,
    clock: &ViewClock,
) -> Vec<ColumnGroup<'a>> {
    let filtered = filter_tasks(tasks, board, filter, clock);
    bucket_by_column(board, &filtered)
}

/// One lane per board project, then an `unassigned` lane if any filtered
/// task lacks a known project; each lane is bucketed by column.
pub fn group_by_swimlane<'a>(
    tasks: &'a [Task],
    board: &'a Board,
    filter: &TaskFilter,
    clock: &ViewClock,
) -> Vec<Swimlane<'a>> {
    let filtered = filter_tasks(tasks, board, filter, clock);
    let mut lanes: Vec<Swimlane<'a>> = board
        .projects
        .iter()
        .map(|project| {
            let lane_tasks: Vec<&Task> = filtered
                .iter()
                .copied()
                .filter(|t| t.project_id.as_deref() == Some(project.id.as_str()))
                .collect();
            Swimlane {
                project: project.clone(),
                columns: bucket_by_column(board, &lane_tasks),
            }
        })
        .collect();

    let unassigned: Vec<&Task> = filtered
        .iter()
        .copied()
        .filter(|t| {
            t.project_id
                .as_deref()
                .is_none_or(|id| board.project(id).is_none())
        })
        .collect();
    if !unassigned.is_empty() {
        lanes.push(Swimlane {
            project: Project::unassigned(),
            columns: bucket_by_column(board, &unassigned),
        });
    }
    lanes
}

/// Client-side column occupancy for highlighting full columns between
/// server round trips. Display only; the server decides WIP verdicts.
pub fn wip_overlay(board: &Board, tasks: &[Task]) -> Vec<WipStatus> {
    board
        .ordered_columns()
        .into_iter()
        .map(|column| {
            let count = tasks.iter().filter(|t| t.column_id == column.id).count() as u32;
            WipStatus {
                column_id: column.id.clone(),
                column_name: column.name.clone(),
                current_count: count,
                wip_limit: column.wip_limit,
                at_limit: column.wip_limit.is_some_and(|l| count >= l),
            }
        })
        .collect()
}
