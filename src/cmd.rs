//! Command implementations for the CLI interface.
//!
//! Each handler works against a `TaskRepository` over any store and writes
//! its report to the given writer, so the same code serves the binary and
//! the tests.

use std::io::Write;

use chrono::Local;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::due::format_due_relative;
use crate::error::{Error, Result};
use crate::fields::*;
use crate::form::FormState;
use crate::listing::{ListQuery, SortState};
use crate::repository::TaskRepository;
use crate::store::KeyValueStore;
use crate::task::Task;
use crate::validation::{validate_task, TaskField, TaskFormValues};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive UI (default).
    Ui,

    /// List one page of tasks.
    List {
        /// Case-insensitive text matched against title, description, status and priority.
        #[arg(long, short)]
        search: Option<String>,
        /// Sort key: title | status | priority | due.
        #[arg(long, value_enum, default_value_t = SortKey::DueDate)]
        sort: SortKey,
        /// Sort descending.
        #[arg(long)]
        desc: bool,
        /// 1-based page number; clamped to the last page.
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Add a new task.
    Add {
        /// Title, at least 3 characters.
        title: String,
        /// Description.
        #[arg(long, default_value = "")]
        desc: String,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "fri" or "in Nd".
        #[arg(long, default_value = "")]
        due: String,
        #[arg(long, value_enum, default_value_t = Status::Pending)]
        status: Status,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
    },

    /// Edit fields of an existing task.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },

    /// Delete a task by id.
    Delete { id: String },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Print one page of tasks with the page number clamped into range.
pub fn cmd_list<S: KeyValueStore>(
    repo: &TaskRepository<S>,
    out: &mut dyn Write,
    search: Option<String>,
    sort: SortKey,
    desc: bool,
    page: usize,
    page_size: usize,
) -> Result<()> {
    let mut query = ListQuery::new(page_size);
    query.set_search(search.unwrap_or_default());
    query.sort = SortState::new(
        sort,
        if desc { SortDirection::Descending } else { SortDirection::Ascending },
    );
    query.page = page;
    let page = query.refresh(repo.tasks());

    if page.tasks.is_empty() {
        writeln!(out, "No tasks found.")?;
        return Ok(());
    }
    print_table(out, &page.tasks)?;
    writeln!(
        out,
        "Page {} of {} ({} matching, {} total)",
        query.page,
        page.total_pages,
        page.total_matches,
        repo.len()
    )?;
    Ok(())
}

/// Validate and add a task, printing its new id.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add<S: KeyValueStore>(
    repo: &mut TaskRepository<S>,
    out: &mut dyn Write,
    title: String,
    desc: String,
    due: String,
    status: Status,
    priority: Priority,
) -> Result<()> {
    let values = TaskFormValues {
        title,
        description: desc,
        status: status.as_str().to_string(),
        priority: priority.as_str().to_string(),
        due_date: due,
    };
    let mut form = FormState::new(values, validate_task);
    if !form.validate() {
        return Err(validation_error(&form));
    }
    let task = repo.add(form.values().to_draft());
    report_persist_failure(repo, out)?;
    writeln!(out, "Added task {}: {}", task.id, task.title)?;
    Ok(())
}

/// Merge the given fields into an existing task, validate and update it.
#[allow(clippy::too_many_arguments)]
pub fn cmd_edit<S: KeyValueStore>(
    repo: &mut TaskRepository<S>,
    out: &mut dyn Write,
    id: String,
    title: Option<String>,
    desc: Option<String>,
    due: Option<String>,
    status: Option<Status>,
    priority: Option<Priority>,
) -> Result<()> {
    let existing = repo.get(&id).ok_or_else(|| Error::NotFound(id.clone()))?;
    let mut form = FormState::new(TaskFormValues::from_task(existing), validate_task);

    let changes = [
        (TaskField::Title, title),
        (TaskField::Description, desc),
        (TaskField::DueDate, due),
        (TaskField::Status, status.map(|s| s.as_str().to_string())),
        (TaskField::Priority, priority.map(|p| p.as_str().to_string())),
    ];
    for (field, value) in changes {
        if let Some(value) = value {
            form.handle_change(field, value);
        }
    }
    if !form.validate() {
        return Err(validation_error(&form));
    }

    let updated = Task::from_draft(id, form.values().to_draft());
    repo.update(updated.clone());
    report_persist_failure(repo, out)?;
    writeln!(out, "Updated task {}: {}", updated.id, updated.title)?;
    Ok(())
}

/// Delete a task. Deleting an unknown id is reported but is not an error.
pub fn cmd_delete<S: KeyValueStore>(
    repo: &mut TaskRepository<S>,
    out: &mut dyn Write,
    id: String,
) -> Result<()> {
    if repo.delete(&id) {
        report_persist_failure(repo, out)?;
        writeln!(out, "Deleted task {id}")?;
    } else {
        writeln!(out, "No task with id {id}")?;
    }
    Ok(())
}

/// Print a shell completion script for `tm`.
pub fn cmd_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "tm", out);
}

fn validation_error(form: &FormState<TaskFormValues>) -> Error {
    let messages: Vec<&str> = form.errors().values().map(String::as_str).collect();
    Error::InvalidInput(messages.join(" "))
}

fn report_persist_failure<S: KeyValueStore>(
    repo: &TaskRepository<S>,
    out: &mut dyn Write,
) -> Result<()> {
    if let Some(e) = repo.last_persist_error() {
        writeln!(out, "Warning: change kept in memory only, save failed: {e}")?;
    }
    Ok(())
}

/// Print tasks in a formatted table.
pub fn print_table(out: &mut dyn Write, tasks: &[&Task]) -> Result<()> {
    writeln!(
        out,
        "{:<22} {:<12} {:<7} {:<11} {:<10} {}",
        "ID", "Status", "Pri", "Due", "", "Title"
    )?;
    let today = Local::now().date_naive();
    for t in tasks {
        writeln!(
            out,
            "{:<22} {:<12} {:<7} {:<11} {:<10} {}",
            t.id,
            t.status.as_str(),
            t.priority.as_str(),
            truncate(&t.due_date, 11),
            format_due_relative(&t.due_date, today),
            t.title
        )?;
    }
    Ok(())
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
