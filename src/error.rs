use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanbanError>;

#[derive(Debug, Error)]
pub enum KanbanError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Task id appears more than once: {0}")]
    DuplicateTaskId(String),

    #[error("Column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("Task with empty id")]
    EmptyTaskId,

    #[error("Column stored under '{key}' reports id '{id}'")]
    ColumnMismatch { key: String, id: String },

    #[error("Task {0} has empty text")]
    EmptyTaskText(String),
}
