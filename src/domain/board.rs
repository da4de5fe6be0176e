use crate::domain::column::{Column, ColumnId};
use crate::domain::task::{Task, TaskId, TaskPatch};
use crate::error::{KanbanError, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};

/// Display titles for the three columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnTitles {
    pub backlog: String,
    pub doing: String,
    pub done: String,
}

impl ColumnTitles {
    pub fn get(&self, id: ColumnId) -> &str {
        match id {
            ColumnId::Backlog => &self.backlog,
            ColumnId::Doing => &self.doing,
            ColumnId::Done => &self.done,
        }
    }
}

impl Default for ColumnTitles {
    fn default() -> Self {
        Self {
            backlog: "Backlog".to_string(),
            doing: "Doing".to_string(),
            done: "Done".to_string(),
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Key the snapshot is stored under
    pub storage_key: String,
    /// Key of the older flat task list, read only when `storage_key` is empty
    pub legacy_key: Option<String>,
    pub titles: ColumnTitles,
}

impl BoardConfig {
    pub const DEFAULT_STORAGE_KEY: &'static str = "kanban-columns";
    pub const DEFAULT_LEGACY_KEY: &'static str = "tasks";

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_legacy_key(mut self, key: Option<String>) -> Self {
        self.legacy_key = key;
        self
    }

    pub fn with_titles(mut self, titles: ColumnTitles) -> Self {
        self.titles = titles;
        self
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_key: Self::DEFAULT_STORAGE_KEY.to_string(),
            legacy_key: Some(Self::DEFAULT_LEGACY_KEY.to_string()),
            titles: ColumnTitles::default(),
        }
    }
}

/// Kanban board state: exactly one column per [`ColumnId`]
///
/// Every task id appears in exactly one column. Only the board store
/// mutates a board; everyone else reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    columns: [Column; 3],
}

fn slot(id: ColumnId) -> usize {
    match id {
        ColumnId::Backlog => 0,
        ColumnId::Doing => 1,
        ColumnId::Done => 2,
    }
}

impl Board {
    /// Creates a board with three empty columns
    pub fn new(titles: &ColumnTitles) -> Self {
        Self {
            columns: ColumnId::ALL.map(|id| Column::new(id, titles.get(id))),
        }
    }

    /// Builds a board from stored columns, filling in any that are missing
    ///
    /// Fails when a column's id disagrees with its key, when the same task
    /// id shows up twice, or when a task has a blank id or blank text.
    pub fn from_columns(
        mut stored: BTreeMap<ColumnId, Column>,
        titles: &ColumnTitles,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for (key, column) in &stored {
            if *key != column.id {
                return Err(KanbanError::ColumnMismatch {
                    key: key.to_string(),
                    id: column.id.to_string(),
                });
            }
            for task in &column.items {
                if task.text().trim().is_empty() {
                    return Err(KanbanError::EmptyTaskText(task.id().to_string()));
                }
                if task.id().is_empty() {
                    return Err(KanbanError::EmptyTaskId);
                }
                if !seen.insert(task.id().clone()) {
                    return Err(KanbanError::DuplicateTaskId(task.id().to_string()));
                }
            }
        }

        Ok(Self {
            columns: ColumnId::ALL.map(|id| {
                stored
                    .remove(&id)
                    .unwrap_or_else(|| Column::new(id, titles.get(id)))
            }),
        })
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[slot(id)]
    }

    fn column_mut(&mut self, id: ColumnId) -> &mut Column {
        &mut self.columns[slot(id)]
    }

    /// Columns in workflow order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Finds a task anywhere on the board
    pub fn find_task(&self, task_id: &TaskId) -> Option<(ColumnId, &Task)> {
        self.columns
            .iter()
            .find_map(|column| column.get(task_id).map(|task| (column.id, task)))
    }

    pub fn contains_task(&self, task_id: &TaskId) -> bool {
        self.find_task(task_id).is_some()
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.task_count() == 0
    }

    pub(crate) fn push(&mut self, column: ColumnId, task: Task) {
        self.column_mut(column).items.push(task);
    }

    pub(crate) fn remove(&mut self, column: ColumnId, task_id: &TaskId) -> Option<Task> {
        self.column_mut(column).take(task_id)
    }

    pub(crate) fn update(&mut self, column: ColumnId, task_id: &TaskId, patch: TaskPatch) -> bool {
        self.column_mut(column)
            .get_mut(task_id)
            .map(|task| task.apply(patch))
            .unwrap_or(false)
    }

    /// Moves a task to the end of another column
    ///
    /// Returns false without touching anything when the columns are the
    /// same or the task is not in `from`.
    pub(crate) fn move_task(&mut self, task_id: &TaskId, from: ColumnId, to: ColumnId) -> bool {
        if from == to {
            return false;
        }
        match self.column_mut(from).take(task_id) {
            Some(task) => {
                self.column_mut(to).items.push(task);
                true
            }
            None => false,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(&ColumnTitles::default())
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in &self.columns {
            map.serialize_entry(&column.id, column)?;
        }
        map.end()
    }
}
