//! Drag-and-drop gesture state, independent of any input library.
//!
//! ```text
//! Idle ──start──> Dragging ──drop──> ResolvingDrop ──settled──> Idle
//!                    │   └──drop (no-op)───────────────────────> Idle
//!                    └──cancel──────────────────────────────────> Idle
//! ```
//!
//! The host UI forwards its pointer/touch callbacks as `on_drag_start`,
//! `on_drag_over`, `on_drop` and `on_cancel` with already-resolved target
//! ids. A drop that changes placement yields a [`MoveIntent`] for the move
//! protocol; the machine stays in `ResolvingDrop` until the host reports the
//! move settled, so a new drag cannot start on top of an unfinished one.

use flowboard_common::Board;

use super::moves::MoveIntent;
use super::store::TaskStore;

/// What the pointer is over: a column body or a task card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragTarget {
    Column(String),
    Task(String),
}

/// Lookups the machine needs to resolve targets.
pub trait DropSurface {
    fn has_column(&self, column_id: &str) -> bool;
    fn column_of_task(&self, task_id: &str) -> Option<String>;
    fn position_of_task(&self, task_id: &str) -> Option<f64>;
}

/// [`DropSurface`] over the current board and task store.
pub struct BoardSurface<'a> {
    board: &'a Board,
    store: &'a TaskStore,
}

impl<'a> BoardSurface<'a> {
    pub fn new(board: &'a Board, store: &'a TaskStore) -> Self {
        Self { board, store }
    }
}

impl DropSurface for BoardSurface<'_> {
    fn has_column(&self, column_id: &str) -> bool {
        self.board.column(column_id).is_some()
    }

    fn column_of_task(&self, task_id: &str) -> Option<String> {
        self.store.get(task_id).map(|t| t.column_id.clone())
    }

    fn position_of_task(&self, task_id: &str) -> Option<f64> {
        self.store.get(task_id).map(|t| t.position)
    }
}

/// The column a target stands for, if it is on the board.
pub fn resolve_column(target: &DragTarget, surface: &dyn DropSurface) -> Option<String> {
    let column_id = match target {
        DragTarget::Column(id) => id.clone(),
        DragTarget::Task(id) => surface.column_of_task(id)?,
    };
    surface.has_column(&column_id).then_some(column_id)
}

/// Position proposed for a drop: the one held by the task occupying the
/// slot. Dropping on a column body proposes nothing and the server appends.
pub fn position_for_drop(target: &DragTarget, surface: &dyn DropSurface) -> Option<f64> {
    match target {
        DragTarget::Task(id) => surface.position_of_task(id),
        DragTarget::Column(_) => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        task_id: String,
        source_column: String,
        hovered_column: Option<String>,
    },
    ResolvingDrop {
        task_id: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropResolution {
    Move(MoveIntent),
    NoOp,
}

#[derive(Debug)]
pub struct DragMachine {
    state: DragState,
}

impl Default for DragMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DragMachine {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// The task being dragged or whose drop is being resolved.
    pub fn active_task(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { task_id, .. } | DragState::ResolvingDrop { task_id } => {
                Some(task_id)
            }
        }
    }

    /// Column to highlight while dragging.
    pub fn highlighted_column(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { hovered_column, .. } => hovered_column.as_deref(),
            _ => None,
        }
    }

    /// Pick up a task. Returns `false` (and stays put) if a gesture or a
    /// drop is already in progress or the task is unknown.
    pub fn on_drag_start(&mut self, task_id: &str, surface: &dyn DropSurface) -> bool {
        if self.state != DragState::Idle {
            return false;
        }
        let Some(source_column) = surface.column_of_task(task_id) else {
            return false;
        };
        self.state = DragState::Dragging {
            task_id: task_id.to_string(),
            source_column,
            hovered_column: None,
        };
        true
    }

    /// Track the hovered column. `None` means the pointer left every drop
    /// surface, which clears the highlight.
    pub fn on_drag_over(
        &mut self,
        target: Option<&DragTarget>,
        surface: &dyn DropSurface,
    ) -> Option<&str> {
        if let DragState::Dragging { hovered_column, .. } = &mut self.state {
            *hovered_column = target.and_then(|t| resolve_column(t, surface));
        }
        self.highlighted_column()
    }

    /// Release the task over `target`. Dropping outside any surface cancels.
    pub fn on_drop(&mut self, target: Option<&DragTarget>, surface: &dyn DropSurface) -> DropResolution {
        let DragState::Dragging {
            task_id,
            source_column,
            ..
        } = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return DropResolution::NoOp;
        };
        let Some(target) = target else {
            return DropResolution::NoOp;
        };
        if matches!(target, DragTarget::Task(id) if *id == task_id) {
            return DropResolution::NoOp;
        }
        let Some(column_id) = resolve_column(target, surface) else {
            return DropResolution::NoOp;
        };
        let position = position_for_drop(target, surface);
        if column_id == source_column && position.is_none() {
            return DropResolution::NoOp;
        }

        self.state = DragState::ResolvingDrop {
            task_id: task_id.clone(),
        };
        DropResolution::Move(MoveIntent::new(task_id, column_id).at_position(position))
    }

    /// Abort the gesture. Never touches the store.
    pub fn on_cancel(&mut self) {
        if matches!(self.state, DragState::Dragging { .. }) {
            self.state = DragState::Idle;
        }
    }

    /// The move handed off by `on_drop` committed, was blocked or failed.
    pub fn on_move_settled(&mut self) {
        if matches!(self.state, DragState::ResolvingDrop { .. }) {
            self.state = DragState::Idle;
        }
    }
}
