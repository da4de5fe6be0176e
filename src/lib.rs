//! # Kanban Core
//!
//! State for a three-column kanban board (backlog, doing, done).
//!
//! [`BoardStore`] owns the board, applies every change to it and writes a
//! snapshot to a [`Storage`] backend after each one. [`DragTracker`] follows
//! a drag-and-drop gesture and turns the drop into a [`BoardStore::move_task`]
//! call. Rendering is left to the host.

pub mod domain;
pub mod drag;
pub mod error;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use domain::{
    board::{Board, BoardConfig, ColumnTitles},
    column::{Column, ColumnId},
    task::{DeadlineStatus, NewTask, Priority, Task, TaskId, TaskPatch},
};
pub use drag::{DataTransfer, DragPayload, DragState, DragTracker, DropOutcome, MemoryTransfer};
pub use error::{KanbanError, Result};
pub use storage::{MemoryStorage, Storage};
pub use store::BoardStore;
