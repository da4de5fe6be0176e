use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Opaque identifier for a task, unique across the whole board
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            _ => Err(format!(
                "Invalid priority '{}'. Valid priorities: low, normal, high",
                s
            )),
        }
    }
}

/// How close a task is to its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    None,
    Overdue,
    DueSoon,
    Scheduled,
}

/// A task is due soon when its deadline is less than this far away
pub const DUE_SOON_WINDOW_HOURS: i64 = 48;

/// A kanban task
///
/// `id` and `created_at` are fixed at construction. Everything else changes
/// through [`Task::apply`], which refuses to blank out the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    #[serde(alias = "title")]
    text: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: Priority,
    #[serde(
        default,
        deserialize_with = "deserialize_deadline",
        skip_serializing_if = "Option::is_none"
    )]
    deadline: Option<DateTime<Utc>>,
    #[serde(
        default = "Utc::now",
        serialize_with = "serialize_millis",
        deserialize_with = "deserialize_created_at"
    )]
    created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task with normal priority, no deadline and an empty description
    pub fn new(id: TaskId, text: String) -> Self {
        Self {
            id,
            text,
            description: String::new(),
            priority: Priority::Normal,
            deadline: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Merges the patch into this task, returning whether anything changed
    pub fn apply(&mut self, patch: TaskPatch) -> bool {
        let before = self.clone();

        if let Some(text) = patch.text {
            let text = text.trim();
            if !text.is_empty() {
                self.text = text.to_string();
            }
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }

        *self != before
    }

    /// Classifies the deadline relative to `now`
    pub fn deadline_status(&self, now: DateTime<Utc>) -> DeadlineStatus {
        match self.deadline {
            None => DeadlineStatus::None,
            Some(deadline) if deadline <= now => DeadlineStatus::Overdue,
            Some(deadline) if deadline - now < Duration::hours(DUE_SOON_WINDOW_HOURS) => {
                DeadlineStatus::DueSoon
            }
            Some(_) => DeadlineStatus::Scheduled,
        }
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub text: String,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builds the task, or `None` when the text is blank
    pub fn into_task(self, id: TaskId) -> Option<Task> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }

        let mut task = Task::new(id, text.to_string());
        task.priority = self.priority.unwrap_or_default();
        task.deadline = self.deadline;
        task.description = self.description.unwrap_or_default();
        Some(task)
    }
}

/// Partial update for a task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    /// `Some(None)` clears the deadline
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(Some(deadline));
        self
    }

    pub fn clear_deadline(mut self) -> Self {
        self.deadline = Some(None);
        self
    }
}

/// Timestamps as they appear in stored snapshots
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Fractional(f64),
    Text(String),
}

impl RawTimestamp {
    fn parse(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
            Self::Fractional(ms) => Utc.timestamp_millis_opt(ms as i64).single(),
            Self::Text(text) => parse_timestamp(&text),
        }
    }
}

/// Parses RFC 3339, or a zone-less `datetime-local` value taken as UTC
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_deadline<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    // An unreadable deadline is dropped rather than failing the whole snapshot
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| serde_json::from_value::<RawTimestamp>(value).ok())
        .and_then(RawTimestamp::parse))
}

fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawTimestamp::deserialize(deserializer)?;
    raw.parse()
        .ok_or_else(|| serde::de::Error::custom("invalid createdAt timestamp"))
}

fn serialize_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(value.timestamp_millis())
}
