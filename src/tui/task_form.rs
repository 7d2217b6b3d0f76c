//! Task form handling for the terminal user interface.
//!
//! `TaskForm` pairs the generic form state with the widgets that edit it:
//! text inputs with cursors for title, description and due date, and cycling
//! selectors for status and priority. Every keystroke is pushed through
//! `FormState::handle_change`, so an error disappears as soon as its field is
//! touched.

use crate::{
    fields::{Priority, Status},
    form::FormState,
    task::{Task, TaskDraft},
    tui::input::InputField,
    validation::{validate_task, TaskField, TaskFormValues},
};

/// Visual and focus order of the form fields.
pub const FIELD_ORDER: [TaskField; 5] = [
    TaskField::Title,
    TaskField::Description,
    TaskField::Status,
    TaskField::Priority,
    TaskField::DueDate,
];

/// Task form for creating and editing tasks.
pub struct TaskForm {
    pub state: FormState<TaskFormValues>,
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub status: usize,
    pub priority: usize,
    pub current_field: usize,
}

impl TaskForm {
    /// Create an empty form with default status and priority.
    pub fn new() -> Self {
        Self::from_values(TaskFormValues::default())
    }

    /// Create a form populated from an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self::from_values(TaskFormValues::from_task(task))
    }

    fn from_values(values: TaskFormValues) -> Self {
        let status = Status::parse(&values.status)
            .and_then(|s| Status::ALL.iter().position(|&x| x == s))
            .unwrap_or(0);
        let priority = Priority::parse(&values.priority)
            .and_then(|p| Priority::ALL.iter().position(|&x| x == p))
            .unwrap_or(1);
        let mut form = TaskForm {
            title: InputField::with_value(&values.title),
            description: InputField::with_value(&values.description),
            due: InputField::with_value(&values.due_date),
            status,
            priority,
            current_field: 0,
            state: FormState::new(values, validate_task),
        };
        form.update_active_field();
        form
    }

    /// Field that currently has focus.
    pub fn current(&self) -> TaskField {
        FIELD_ORDER[self.current_field]
    }

    pub fn error(&self, field: TaskField) -> Option<&str> {
        self.state.error(field)
    }

    pub fn selected_status(&self) -> Status {
        Status::ALL[self.status]
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority]
    }

    /// Text input backing `field`, if it is a text field.
    pub fn input(&self, field: TaskField) -> Option<&InputField> {
        match field {
            TaskField::Title => Some(&self.title),
            TaskField::Description => Some(&self.description),
            TaskField::DueDate => Some(&self.due),
            TaskField::Status | TaskField::Priority => None,
        }
    }

    fn input_mut(&mut self, field: TaskField) -> Option<&mut InputField> {
        match field {
            TaskField::Title => Some(&mut self.title),
            TaskField::Description => Some(&mut self.description),
            TaskField::DueDate => Some(&mut self.due),
            TaskField::Status | TaskField::Priority => None,
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_ORDER.len();
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELD_ORDER.len() - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which text input shows as active.
    pub fn update_active_field(&mut self) {
        let current = self.current();
        self.title.active = current == TaskField::Title;
        self.description.active = current == TaskField::Description;
        self.due.active = current == TaskField::DueDate;
    }

    /// Push the focused text input's value into the form state.
    fn sync(&mut self, field: TaskField) {
        if let Some(value) = self.input(field).map(|i| i.value.clone()) {
            self.state.handle_change(field, value);
        }
    }

    /// Handle character input for the focused text field.
    pub fn handle_char(&mut self, c: char) {
        let field = self.current();
        if let Some(input) = self.input_mut(field) {
            input.handle_char(c);
            self.sync(field);
        }
    }

    /// Handle backspace input for the focused text field.
    pub fn handle_backspace(&mut self) {
        let field = self.current();
        if let Some(input) = self.input_mut(field) {
            input.handle_backspace();
            self.sync(field);
        }
    }

    /// Handle delete input for the focused text field.
    pub fn handle_delete(&mut self) {
        let field = self.current();
        if let Some(input) = self.input_mut(field) {
            input.handle_delete();
            self.sync(field);
        }
    }

    /// Move the cursor of a text field, or cycle a selector.
    pub fn handle_left_right(&mut self, right: bool) {
        let field = self.current();
        match field {
            TaskField::Status => {
                self.status = cycle(self.status, Status::ALL.len(), right);
                let label = self.selected_status().as_str().to_string();
                self.state.handle_change(TaskField::Status, label);
            }
            TaskField::Priority => {
                self.priority = cycle(self.priority, Priority::ALL.len(), right);
                let label = self.selected_priority().as_str().to_string();
                self.state.handle_change(TaskField::Priority, label);
            }
            _ => {
                if let Some(input) = self.input_mut(field) {
                    if right {
                        input.move_cursor_right();
                    } else {
                        input.move_cursor_left();
                    }
                }
            }
        }
    }

    /// Validate the form. Returns the task data when every rule passes;
    /// otherwise errors are recorded per field and focus jumps to the first one.
    pub fn submit(&mut self) -> Option<TaskDraft> {
        if self.state.validate() {
            return Some(self.state.values().to_draft());
        }
        if let Some(first) = FIELD_ORDER.iter().position(|f| self.state.error(*f).is_some()) {
            self.current_field = first;
            self.update_active_field();
        }
        None
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

fn cycle(idx: usize, len: usize, forward: bool) -> usize {
    if forward {
        (idx + 1) % len
    } else if idx == 0 {
        len - 1
    } else {
        idx - 1
    }
}
