pub mod board;
pub mod column;
pub mod snapshot;
pub mod task;

pub use board::{Board, BoardConfig, ColumnTitles};
pub use column::{Column, ColumnId};
pub use task::{DeadlineStatus, NewTask, Priority, Task, TaskId, TaskPatch};
