//! Task data structure and related functionality.
//!
//! This module defines the `Task` record persisted by the repository and the
//! `TaskDraft` used to create one before an id has been assigned.

use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A persisted work item.
///
/// Text fields decode to empty when absent or null, and unknown status or
/// priority text decodes to the default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Status,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    #[serde(default, rename = "dueDate", deserialize_with = "lenient_text")]
    pub due_date: String,
}

/// Task data without an id, as submitted from the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due_date: String,
}

impl Task {
    /// Build a task from a draft and a freshly generated id.
    pub fn from_draft(id: String, draft: TaskDraft) -> Self {
        Task {
            id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date,
        }
    }

    /// Strip the id, leaving the editable data.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            due_date: self.due_date.clone(),
        }
    }

    /// Textual value of the field a list is sorted by.
    pub fn sort_text(&self, key: SortKey) -> &str {
        match key {
            SortKey::Title => &self.title,
            SortKey::Status => self.status.as_str(),
            SortKey::Priority => self.priority.as_str(),
            SortKey::DueDate => &self.due_date,
        }
    }

    /// Whether any searchable field contains the already-lowercased needle.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
            || self.status.as_str().to_lowercase().contains(needle_lower)
            || self.priority.as_str().to_lowercase().contains(needle_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_decode_defensively() {
        let task: Task = serde_json::from_str(r#"{"id":"a1","title":"Legacy","status":"Blocked"}"#).unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.due_date, "");
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_null_and_non_string_fields_decode_as_text() {
        let task: Task = serde_json::from_str(
            r#"{"id":7,"title":null,"description":["x"],"status":null,"priority":3,"dueDate":null}"#,
        )
        .unwrap();
        assert_eq!(task.id, "7");
        assert_eq!(task.title, "");
        assert_eq!(task.description, r#"["x"]"#);
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, "");
    }

    #[test]
    fn test_field_names_match_stored_layout() {
        let task = Task {
            id: "x".into(),
            title: "Write report".into(),
            description: "Quarterly".into(),
            status: Status::Completed,
            priority: Priority::High,
            due_date: "2024-05-01".into(),
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "2024-05-01");
        assert_eq!(value["status"], "Completed");
        assert_eq!(value["priority"], "High");
    }

    #[test]
    fn test_matches_is_case_insensitive_across_fields() {
        let task = Task::from_draft(
            "x".into(),
            TaskDraft {
                title: "Book flights".into(),
                description: "Lisbon trip".into(),
                status: Status::InProgress,
                priority: Priority::High,
                due_date: "2024-06-01".into(),
            },
        );
        assert!(task.matches("high"));
        assert!(task.matches("lisbon"));
        assert!(task.matches("in prog"));
        assert!(!task.matches("low"));
    }
}
