//! Task form values and the validation rule applied before any write.

use crate::due::normalise_due;
use crate::fields::{Priority, Status};
use crate::form::{FieldErrors, FormValues};
use crate::task::{Task, TaskDraft};

/// Editable fields of the task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskField {
    Title,
    Description,
    Status,
    Priority,
    DueDate,
}

impl TaskField {
    pub fn label(self) -> &'static str {
        match self {
            TaskField::Title => "Title",
            TaskField::Description => "Description",
            TaskField::Status => "Status",
            TaskField::Priority => "Priority",
            TaskField::DueDate => "Due Date",
        }
    }
}

/// Raw text of each task field as typed into a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFormValues {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub due_date: String,
}

impl Default for TaskFormValues {
    fn default() -> Self {
        TaskFormValues {
            title: String::new(),
            description: String::new(),
            status: Status::default().as_str().to_string(),
            priority: Priority::default().as_str().to_string(),
            due_date: String::new(),
        }
    }
}

impl TaskFormValues {
    pub fn from_task(task: &Task) -> Self {
        TaskFormValues {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.as_str().to_string(),
            priority: task.priority.as_str().to_string(),
            due_date: task.due_date.clone(),
        }
    }

    /// Convert validated values into task data: text is trimmed, unknown
    /// status or priority text falls back to the default and recognised due
    /// date phrases become ISO dates.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            status: Status::parse(&self.status).unwrap_or_default(),
            priority: Priority::parse(&self.priority).unwrap_or_default(),
            due_date: normalise_due(&self.due_date),
        }
    }
}

impl FormValues for TaskFormValues {
    type Field = TaskField;

    fn get(&self, field: TaskField) -> &str {
        match field {
            TaskField::Title => &self.title,
            TaskField::Description => &self.description,
            TaskField::Status => &self.status,
            TaskField::Priority => &self.priority,
            TaskField::DueDate => &self.due_date,
        }
    }

    fn set(&mut self, field: TaskField, value: String) {
        match field {
            TaskField::Title => self.title = value,
            TaskField::Description => self.description = value,
            TaskField::Status => self.status = value,
            TaskField::Priority => self.priority = value,
            TaskField::DueDate => self.due_date = value,
        }
    }
}

pub const TITLE_REQUIRED: &str = "Title is required.";
pub const TITLE_TOO_SHORT: &str = "Title must be at least 3 characters.";
pub const DESCRIPTION_REQUIRED: &str = "Description is required.";
pub const DUE_DATE_REQUIRED: &str = "Due Date is required.";

/// Check every rule independently and report only the failing fields.
pub fn validate_task(values: &TaskFormValues) -> FieldErrors<TaskField> {
    let mut errors = FieldErrors::new();

    let title = values.title.trim();
    if title.is_empty() {
        errors.insert(TaskField::Title, TITLE_REQUIRED.to_string());
    } else if title.chars().count() < 3 {
        errors.insert(TaskField::Title, TITLE_TOO_SHORT.to_string());
    }

    if values.description.trim().is_empty() {
        errors.insert(TaskField::Description, DESCRIPTION_REQUIRED.to_string());
    }

    if values.due_date.trim().is_empty() {
        errors.insert(TaskField::DueDate, DUE_DATE_REQUIRED.to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormState;

    fn valid() -> TaskFormValues {
        TaskFormValues {
            title: "Pay rent".into(),
            description: "Transfer before the 1st".into(),
            status: "Pending".into(),
            priority: "High".into(),
            due_date: "2024-07-01".into(),
        }
    }

    #[test]
    fn test_valid_values_have_no_errors() {
        assert!(validate_task(&valid()).is_empty());
        let mut exactly_three = valid();
        exactly_three.title = "  abc  ".into();
        assert!(validate_task(&exactly_three).is_empty());
    }

    #[test]
    fn test_blank_title_is_required_error() {
        for title in ["", "   ", "\t\n"] {
            let mut v = valid();
            v.title = title.into();
            assert_eq!(validate_task(&v).get(&TaskField::Title).map(String::as_str), Some(TITLE_REQUIRED));
        }
    }

    #[test]
    fn test_short_title_is_length_error_not_required() {
        for title in ["a", "ab", " ab ", "é!"] {
            let mut v = valid();
            v.title = title.into();
            assert_eq!(validate_task(&v).get(&TaskField::Title).map(String::as_str), Some(TITLE_TOO_SHORT));
        }
    }

    #[test]
    fn test_all_rules_run_independently() {
        let errors = validate_task(&TaskFormValues::default());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[&TaskField::Title], TITLE_REQUIRED);
        assert_eq!(errors[&TaskField::Description], DESCRIPTION_REQUIRED);
        assert_eq!(errors[&TaskField::DueDate], DUE_DATE_REQUIRED);
    }

    #[test]
    fn test_task_form_flow() {
        let mut form = FormState::new(TaskFormValues::default(), validate_task);
        assert!(!form.validate());
        form.handle_change(TaskField::Title, "Renew passport".into());
        assert_eq!(form.error(TaskField::Title), None);
        assert_eq!(form.error(TaskField::Description), Some(DESCRIPTION_REQUIRED));
        form.handle_change(TaskField::Description, "Photos first".into());
        form.handle_change(TaskField::DueDate, "2024-09-30".into());
        assert!(form.validate());

        let draft = form.values().to_draft();
        assert_eq!(draft.title, "Renew passport");
        assert_eq!(draft.status, Status::Pending);
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.due_date, "2024-09-30");
    }

    #[test]
    fn test_to_draft_trims_and_parses() {
        let mut v = valid();
        v.title = "  Pay rent ".into();
        v.status = "In Progress".into();
        let draft = v.to_draft();
        assert_eq!(draft.title, "Pay rent");
        assert_eq!(draft.status, Status::InProgress);
        assert_eq!(draft.priority, Priority::High);
    }
}
