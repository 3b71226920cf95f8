/// Task and subtask models
///
/// A task belongs to exactly one user and optionally references one of that
/// user's categories. Subtasks are an ordered set owned by the task and are
/// replaced as a whole when the task is updated.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     category_id BIGINT REFERENCES categories(id) ON DELETE SET NULL,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status TEXT NOT NULL DEFAULT 'pending',
///     priority TEXT NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
///
/// CREATE TABLE subtasks (
///     id BIGSERIAL PRIMARY KEY,
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::category::Category;

/// Task workflow status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Pending,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// Converts status to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Checks if the task is finished
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Error returned when a stored status or priority string is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(ParseEnumError {
                kind: "task status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(ParseEnumError {
                kind: "task priority",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TaskPriority {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checklist item inside a task
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task with its category and live subtasks loaded
///
/// Soft-deleted tasks and subtasks are never materialized into this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Referenced category (nulled when the category is deleted)
    pub category_id: Option<i64>,

    /// Category row, joined only when owned by the same user
    pub category: Option<Category>,

    pub title: String,

    pub description: String,

    pub status: TaskStatus,

    pub priority: TaskPriority,

    pub due_date: Option<DateTime<Utc>>,

    /// Subtasks in insertion order
    pub subtasks: Vec<Subtask>,

    pub created_at: DateTime<Utc>,

    /// Last modification; the completion chart buckets completed tasks by this
    pub updated_at: DateTime<Utc>,
}

/// Subtask entry of a create/update payload
///
/// Entries carrying the `id` of an existing subtask update it in place,
/// entries without an `id` are inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskInput {
    #[serde(default)]
    pub id: Option<i64>,

    pub title: String,

    #[serde(default)]
    pub is_completed: bool,
}

/// Client-supplied task fields
///
/// Every field is optional so the same type serves create and partial update.
/// `due_date` and `category_id` distinguish "absent" (`None`) from an explicit
/// `null` (`Some(None)`). Any ownership field in the request body is ignored:
/// the owner always comes from the authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskPayload {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,

    /// Full replacement set; `None` keeps the current subtasks
    #[serde(default)]
    pub subtasks: Option<Vec<SubtaskInput>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Fully resolved task contents handed to the store
///
/// Built from a payload on create, or from the current task overlaid with a
/// payload on update. `subtasks`, when present, is the complete desired set;
/// `None` leaves the stored subtasks untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub subtasks: Option<Vec<SubtaskInput>>,
}

impl TaskDraft {
    /// Builds a draft for a new task, applying status/priority defaults
    ///
    /// # Errors
    ///
    /// Returns a message if the title is missing or blank.
    pub fn for_create(payload: TaskPayload) -> Result<Self, String> {
        let title = payload
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| "Task title is required".to_string())?;

        Ok(Self {
            category_id: payload.category_id.flatten(),
            title,
            description: payload.description.unwrap_or_default(),
            status: payload.status.unwrap_or_default(),
            priority: payload.priority.unwrap_or_default(),
            due_date: payload.due_date.flatten(),
            subtasks: payload.subtasks,
        })
    }

    /// Overlays `payload` onto an existing task
    ///
    /// # Errors
    ///
    /// Returns a message if the payload sets the title to a blank string.
    pub fn for_update(current: &Task, payload: TaskPayload) -> Result<Self, String> {
        let title = match payload.title {
            Some(t) if t.trim().is_empty() => return Err("Task title cannot be blank".to_string()),
            Some(t) => t,
            None => current.title.clone(),
        };

        Ok(Self {
            category_id: payload.category_id.unwrap_or(current.category_id),
            title,
            description: payload
                .description
                .unwrap_or_else(|| current.description.clone()),
            status: payload.status.unwrap_or(current.status),
            priority: payload.priority.unwrap_or(current.priority),
            due_date: payload.due_date.unwrap_or(current.due_date),
            subtasks: payload.subtasks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let now = Utc::now();
        Task {
            id: 7,
            user_id: 1,
            category_id: Some(3),
            category: None,
            title: "Write report".to_string(),
            description: "Quarterly numbers".to_string(),
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            due_date: Some(now),
            subtasks: vec![Subtask {
                id: 11,
                task_id: 7,
                title: "Collect data".to_string(),
                is_completed: true,
                created_at: now,
                updated_at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_priority_strings() {
        assert_eq!("high".parse::<TaskPriority>(), Ok(TaskPriority::High));
        assert_eq!(TaskPriority::Low.to_string(), "low");
        assert!("urgent".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_payload_distinguishes_null_from_absent() {
        let payload: TaskPayload =
            serde_json::from_str(r#"{"due_date": null, "title": "x"}"#).unwrap();
        assert_eq!(payload.due_date, Some(None));
        assert_eq!(payload.category_id, None);
    }

    #[test]
    fn test_payload_ignores_user_id() {
        let payload: TaskPayload =
            serde_json::from_str(r#"{"title": "x", "user_id": 99}"#).unwrap();
        assert_eq!(payload.title.as_deref(), Some("x"));
    }

    #[test]
    fn test_payload_rejects_unknown_status() {
        let result = serde_json::from_str::<TaskPayload>(r#"{"status": "done"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_draft_for_create_applies_defaults() {
        let draft = TaskDraft::for_create(TaskPayload {
            title: Some("Buy milk".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(draft.status, TaskStatus::Pending);
        assert_eq!(draft.priority, TaskPriority::Medium);
        assert_eq!(draft.description, "");
        assert_eq!(draft.subtasks, None);
    }

    #[test]
    fn test_draft_for_create_requires_title() {
        assert!(TaskDraft::for_create(TaskPayload::default()).is_err());
        assert!(TaskDraft::for_create(TaskPayload {
            title: Some("   ".to_string()),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_draft_for_update_keeps_absent_fields() {
        let task = sample_task();
        let draft = TaskDraft::for_update(
            &task,
            TaskPayload {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(draft.status, TaskStatus::Completed);
        assert_eq!(draft.title, task.title);
        assert_eq!(draft.category_id, Some(3));
        assert_eq!(draft.due_date, task.due_date);
        assert_eq!(draft.subtasks, None);
    }

    #[test]
    fn test_draft_for_update_clears_nullable_fields() {
        let task = sample_task();
        let draft = TaskDraft::for_update(
            &task,
            TaskPayload {
                due_date: Some(None),
                category_id: Some(None),
                subtasks: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(draft.due_date, None);
        assert_eq!(draft.category_id, None);
        assert_eq!(draft.subtasks, Some(vec![]));
    }

    #[test]
    fn test_task_serialization_shape() {
        let json = serde_json::to_value(sample_task()).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["subtasks"][0]["is_completed"], true);
        assert!(json.get("deleted_at").is_none());
    }
}
