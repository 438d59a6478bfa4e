use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::user_email::UserEmail;

/// Opaque identifier assigned by the store on creation, stable for the
/// record's lifetime.
pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

/// Task is the sole domain entity: the document fields plus the identifier
/// the store attached to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    pub user_email: UserEmail,
    pub created_at: DateTime<Utc>,
}

/// Creation payload carrying every field except the id the store assigns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    pub user_email: UserEmail,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Builds a creation payload, rejecting blank required fields.
    pub fn validated(
        title: &str,
        description: &str,
        priority: Priority,
        user_email: UserEmail,
    ) -> Result<NewTask, ModelError> {
        if title.trim().is_empty() {
            return Err(ModelError::EmptyField("title"));
        }
        if description.trim().is_empty() {
            return Err(ModelError::EmptyField("description"));
        }

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            priority,
            completed: false,
            user_email,
            created_at: Utc::now(),
        })
    }
}

/// Partial update touching only the named fields of a record, leaving the
/// others untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Edit-submit patch: title, description and priority, never `completed`
    /// or `createdAt`.
    pub fn edit(title: &str, description: &str, priority: Priority) -> Self {
        Self {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            priority: Some(priority),
            completed: None,
        }
    }

    /// Toggle patch: flips `completed` and nothing else.
    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            description: None,
            priority: None,
            completed: Some(completed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
    }

    /// Applies the named fields onto stored document fields.
    pub fn apply(&self, fields: &mut NewTask) {
        if let Some(title) = &self.title {
            fields.title = title.clone();
        }
        if let Some(description) = &self.description {
            fields.description = description.clone();
        }
        if let Some(priority) = self.priority {
            fields.priority = priority;
        }
        if let Some(completed) = self.completed {
            fields.completed = completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;

    fn owner() -> UserEmail {
        UserEmail::try_from("a@x.com").unwrap()
    }

    #[test]
    fn test_validated_defaults() {
        // GIVEN
        let draft = NewTask::validated("T1", "D1", Priority::default(), owner()).unwrap();

        // THEN
        assert_eq!(draft.title, "T1");
        assert_eq!(draft.description, "D1");
        assert_eq!(draft.priority, Priority::Low);
        assert!(!draft.completed, "new tasks start uncompleted");
        assert_eq!(draft.user_email, owner());
    }

    #[test]
    fn test_validated_rejects_blank_fields() {
        assert_eq!(
            NewTask::validated("", "D1", Priority::Low, owner()),
            Err(ModelError::EmptyField("title"))
        );
        assert_eq!(
            NewTask::validated("T1", "   ", Priority::Low, owner()),
            Err(ModelError::EmptyField("description"))
        );
    }

    #[test]
    fn test_patch_apply_touches_only_named_fields() {
        // GIVEN
        let mut fields = NewTask::validated("T1", "D1", Priority::Low, owner()).unwrap();
        let created_at = fields.created_at;

        // WHEN
        TaskPatch::completed(true).apply(&mut fields);

        // THEN
        assert!(fields.completed);
        assert_eq!(fields.title, "T1");
        assert_eq!(fields.description, "D1");
        assert_eq!(fields.priority, Priority::Low);
        assert_eq!(fields.created_at, created_at);

        // WHEN
        TaskPatch::edit("T2", "D2", Priority::High).apply(&mut fields);

        // THEN
        assert_eq!(fields.title, "T2");
        assert_eq!(fields.description, "D2");
        assert_eq!(fields.priority, Priority::High);
        assert!(fields.completed, "edit patch must not alter completed");
        assert_eq!(fields.created_at, created_at);
    }

    #[test]
    fn test_patch_serializes_named_fields_only() {
        let body = serde_json::to_value(&TaskPatch::completed(true)).unwrap();
        assert_eq!(body, serde_json::json!({ "completed": true }));

        let body = serde_json::to_value(&TaskPatch::edit("T2", "D2", Priority::Medium)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "title": "T2",
                "description": "D2",
                "priority": "Medium"
            })
        );
    }
}
