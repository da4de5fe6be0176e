//! Drag session tracking.
//!
//! A session starts when a card is picked up and ends on drop or cancel.
//! The card's identity is written into the platform drag payload as well as
//! kept here. On drop the payload wins; the tracked state is only consulted
//! when the payload is missing or unreadable.

use crate::domain::{ColumnId, TaskId};
use crate::storage::Storage;
use crate::store::BoardStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// MIME type the payload is stored under
pub const PAYLOAD_FORMAT: &str = "text/plain";

/// The platform's drag data carrier
pub trait DataTransfer {
    fn set_data(&mut self, format: &str, data: &str);

    /// Returns `None` when nothing is stored for `format`
    fn get_data(&self, format: &str) -> Option<String>;
}

/// In-memory [`DataTransfer`]
#[derive(Debug, Clone, Default)]
pub struct MemoryTransfer {
    data: HashMap<String, String>,
}

impl MemoryTransfer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataTransfer for MemoryTransfer {
    fn set_data(&mut self, format: &str, data: &str) {
        self.data.insert(format.to_string(), data.to_string());
    }

    fn get_data(&self, format: &str) -> Option<String> {
        self.data.get(format).cloned()
    }
}

#[cfg(feature = "web")]
impl DataTransfer for web_sys::DataTransfer {
    fn set_data(&mut self, format: &str, data: &str) {
        if let Err(err) = web_sys::DataTransfer::set_data(self, format, data) {
            warn!(?err, "could not write drag payload");
        }
    }

    fn get_data(&self, format: &str) -> Option<String> {
        web_sys::DataTransfer::get_data(self, format)
            .ok()
            .filter(|data| !data.is_empty())
    }
}

/// Identity of the dragged card, as carried in the drag payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
    #[serde(rename = "fromCol", alias = "fromColumn")]
    pub from_column: ColumnId,
}

impl DragPayload {
    pub fn new(task_id: TaskId, from_column: ColumnId) -> Self {
        Self {
            task_id,
            from_column,
        }
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parses a payload; anything without a usable task id and column is `None`
    pub fn decode(text: &str) -> Option<Self> {
        serde_json::from_str::<Self>(text)
            .ok()
            .filter(|payload| !payload.task_id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task_id: TaskId,
        source: ColumnId,
    },
    Hovering {
        task_id: TaskId,
        source: ColumnId,
        target: ColumnId,
    },
}

/// What a drop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The task changed columns
    Moved,
    /// A task and source column were recovered but the move had no effect
    Unchanged,
    /// Neither the payload nor the tracker identified a task
    NoSession,
}

#[derive(Debug, Default)]
pub struct DragTracker {
    state: DragState,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    /// The card currently being dragged, for styling it
    pub fn dragging_task(&self) -> Option<&TaskId> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { task_id, .. } | DragState::Hovering { task_id, .. } => {
                Some(task_id)
            }
        }
    }

    /// The column under the pointer, for highlighting it
    pub fn hovered_column(&self) -> Option<ColumnId> {
        match &self.state {
            DragState::Hovering { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Picks up a card and records its identity in the payload
    pub fn begin_drag(
        &mut self,
        column: ColumnId,
        task_id: TaskId,
        transfer: &mut impl DataTransfer,
    ) {
        match DragPayload::new(task_id.clone(), column).encode() {
            Ok(payload) => transfer.set_data(PAYLOAD_FORMAT, &payload),
            Err(error) => warn!(%error, "could not encode drag payload"),
        }

        debug!(%task_id, %column, "drag started");
        self.state = DragState::Dragging {
            task_id,
            source: column,
        };
    }

    pub fn hover_column(&mut self, column: ColumnId) {
        let state = std::mem::take(&mut self.state);
        self.state = match state {
            DragState::Idle => DragState::Idle,
            DragState::Dragging { task_id, source }
            | DragState::Hovering {
                task_id, source, ..
            } => DragState::Hovering {
                task_id,
                source,
                target: column,
            },
        };
    }

    /// Clears the hovered column without ending the drag
    pub fn leave_column(&mut self) {
        let state = std::mem::take(&mut self.state);
        self.state = match state {
            DragState::Hovering { task_id, source, .. } => DragState::Dragging { task_id, source },
            other => other,
        };
    }

    /// Drops onto `column`, moving the task through the store
    ///
    /// The tracker is idle afterwards whatever the outcome.
    pub fn drop<S: Storage>(
        &mut self,
        column: ColumnId,
        transfer: &impl DataTransfer,
        store: &mut BoardStore<S>,
    ) -> DropOutcome {
        let tracked = std::mem::take(&mut self.state);

        let payload = transfer
            .get_data(PAYLOAD_FORMAT)
            .and_then(|text| DragPayload::decode(&text))
            .or_else(|| {
                trace!("drag payload unreadable, falling back to tracked state");
                match tracked {
                    DragState::Idle => None,
                    DragState::Dragging { task_id, source }
                    | DragState::Hovering {
                        task_id, source, ..
                    } => Some(DragPayload::new(task_id, source)),
                }
            });

        let Some(payload) = payload else {
            debug!(%column, "drop without a drag session");
            return DropOutcome::NoSession;
        };

        if store.move_task(&payload.task_id, payload.from_column, column) {
            DropOutcome::Moved
        } else {
            DropOutcome::Unchanged
        }
    }

    /// Abandons the drag
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!("drag cancelled");
        }
        self.state = DragState::Idle;
    }
}
