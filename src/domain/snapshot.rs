//! Encoding and decoding of persisted board snapshots.
//!
//! The current layout is a JSON object keyed by column id. Older boards
//! stored a flat array of tasks under a separate key, each task carrying a
//! `status` naming its column; those are migrated on read.

use crate::domain::board::{Board, ColumnTitles};
use crate::domain::column::{Column, ColumnId};
use crate::domain::task::Task;
use crate::error::{KanbanError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Deserialize)]
struct FlatTask {
    #[serde(flatten)]
    task: Task,
    #[serde(default)]
    status: Option<ColumnId>,
}

/// Serializes the board into its stored form
pub fn encode(board: &Board) -> Result<String> {
    Ok(serde_json::to_string(board)?)
}

/// Parses a stored snapshot
///
/// `titles` name any column the snapshot does not mention.
pub fn decode(text: &str, titles: &ColumnTitles) -> Result<Board> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => {
            let mut stored = BTreeMap::new();
            for (key, value) in map {
                let id: ColumnId = key.parse()?;
                let column: Column = serde_json::from_value(value)?;
                // Aliases collapse: `todo` and `backlog` are the same column
                if stored.insert(id, column).is_some() {
                    return Err(KanbanError::DuplicateColumn(id.to_string()));
                }
            }
            Board::from_columns(stored, titles)
        }
        Value::Array(items) => {
            let flat: Vec<FlatTask> = serde_json::from_value(Value::Array(items))?;
            migrate_flat(flat, titles)
        }
        other => Err(KanbanError::Serialization(serde::de::Error::custom(
            format!("expected an object or array snapshot, found {}", kind(&other)),
        ))),
    }
}

fn migrate_flat(flat: Vec<FlatTask>, titles: &ColumnTitles) -> Result<Board> {
    let mut stored: BTreeMap<ColumnId, Column> = ColumnId::ALL
        .iter()
        .map(|&id| (id, Column::new(id, titles.get(id))))
        .collect();

    for entry in flat {
        let column = entry.status.unwrap_or(ColumnId::Backlog);
        if let Some(target) = stored.get_mut(&column) {
            target.items.push(entry.task);
        }
    }

    Board::from_columns(stored, titles)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
