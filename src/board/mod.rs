//! Board engine: task placement and synchronisation for one kanban board.
//!
//! ## Overview
//!
//! A board view holds the server's task list in memory, lets the user drag
//! tasks between columns, shows each move immediately and reconciles with
//! the server once it answers. Column WIP limits are enforced by the server;
//! a move into a full column is reported back with the column's occupancy
//! so the caller can retry with an explicit override. Other clients' edits
//! arrive over a WebSocket and trigger reloads.
//!
//! ## Module Map
//!
//! ```text
//!  pointer / CLI input
//!         │
//!         v
//!  drag.rs  (DragMachine)  ── MoveIntent ──┐
//!                                          v
//!                     moves.rs  (MoveProtocol)
//!                       │  optimistic patch    │ POST /tasks/{id}/move
//!                       v                      v
//!                  store.rs  <── reload ── api.rs  (BoardApi, HttpBoardApi)
//!                 (TaskStore)                  ^
//!                       ^                      │ GET /boards/{id}/tasks
//!                       │ refresh callback     │
//!                  realtime.rs  (RealtimeChannel) <── board:update (WebSocket)
//!                       │
//!                       v
//!                  view.rs  (group_by_column, group_by_swimlane)
//! ```
//!
//! ## Supporting Modules
//!
//! | Module     | Responsibility                                            |
//! |------------|-----------------------------------------------------------|
//! | `session`  | `BoardSession`: board layout + store + CRUD entry points   |
//! | `view`     | Pure filters and groupings, client-side WIP overlay        |
//! | `realtime` | `BoardEvent` decoding, ref-counted watch set, reconnects   |
//!
//! ## Typical Move Flow
//!
//! 1. `DragMachine::on_drop` resolves the target column and proposed
//!    position into a `MoveIntent`.
//! 2. `MoveProtocol::execute` validates the column, patches the store and
//!    sends the move.
//! 3. On a WIP block the patch is rolled back and the store reloaded; the
//!    caller gets `MoveOutcome::Blocked` with the column's `WipStatus`.
//! 4. Otherwise the store is reloaded so positions match the server's
//!    numbering, and the move commits.

pub mod api;
pub mod drag;
pub mod moves;
pub mod realtime;
pub mod session;
pub mod store;
pub mod view;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{BoardApi, HttpBoardApi};
pub use drag::{DragMachine, DragTarget, DropResolution};
pub use moves::{MoveIntent, MoveOutcome, MoveProtocol};
pub use realtime::{BoardEvent, RealtimeChannel};
pub use session::BoardSession;
pub use store::{SharedStore, TaskStore};
pub use view::{TaskFilter, ViewClock};
