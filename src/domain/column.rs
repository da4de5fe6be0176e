use crate::domain::task::{Task, TaskId};
use crate::error::KanbanError;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// The fixed set of workflow columns, in board order
///
/// Serialized in lowercase. Parsing, through either [`FromStr`] or serde,
/// ignores case and surrounding whitespace and accepts `todo` and
/// `in-progress` for backlog and doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnId {
    Backlog,
    Doing,
    Done,
}

impl ColumnId {
    pub const ALL: [ColumnId; 3] = [Self::Backlog, Self::Doing, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backlog" | "todo" => Ok(Self::Backlog),
            "doing" | "in-progress" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            _ => Err(KanbanError::UnknownColumn(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A workflow column and its ordered tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub items: Vec<Task>,
}

impl Column {
    pub fn new(id: ColumnId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn position_of(&self, task_id: &TaskId) -> Option<usize> {
        self.items.iter().position(|task| task.id() == task_id)
    }

    pub fn get(&self, task_id: &TaskId) -> Option<&Task> {
        self.items.iter().find(|task| task.id() == task_id)
    }

    pub fn get_mut(&mut self, task_id: &TaskId) -> Option<&mut Task> {
        self.items.iter_mut().find(|task| task.id() == task_id)
    }

    /// Removes and returns the task, keeping the order of the rest
    pub fn take(&mut self, task_id: &TaskId) -> Option<Task> {
        let index = self.position_of(task_id)?;
        Some(self.items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
