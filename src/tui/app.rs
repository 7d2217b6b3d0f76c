//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the task repository,
//! the router and the list query, handles key input for each screen and
//! renders the list, the create/edit form and the delete confirmation.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::{
    due::format_due_relative,
    fields::SortKey,
    listing::ListQuery,
    repository::TaskRepository,
    router::{Router, View},
    store::KeyValueStore,
    task::Task,
    tui::{
        colors::{priority_color, status_color, ACCENT, DARK_RED},
        task_form::{TaskForm, FIELD_ORDER},
        utils::centered_rect,
    },
    validation::TaskField,
};

/// Main application state for the terminal user interface.
pub struct App<S: KeyValueStore> {
    repo: TaskRepository<S>,
    router: Router,
    query: ListQuery,
    page_ids: Vec<String>,
    total_matches: usize,
    table_state: TableState,
    task_form: TaskForm,
    search_active: bool,
    status_message: String,
}

impl<S: KeyValueStore> App<S> {
    /// Create the app over a loaded repository.
    pub fn new(repo: TaskRepository<S>, page_size: usize) -> Self {
        let mut app = App {
            repo,
            router: Router::new(),
            query: ListQuery::new(page_size),
            page_ids: Vec::new(),
            total_matches: 0,
            table_state: TableState::default(),
            task_form: TaskForm::new(),
            search_active: false,
            status_message: String::new(),
        };
        app.refresh_list();
        app
    }

    pub fn repo(&self) -> &TaskRepository<S> {
        &self.repo
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn form(&self) -> &TaskForm {
        &self.task_form
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Ids shown on the current page, in display order.
    pub fn page_ids(&self) -> &[String] {
        &self.page_ids
    }

    /// Re-run the list pipeline and keep the selection inside the page.
    ///
    /// Called after every mutation, search edit, sort change or page move.
    fn refresh_list(&mut self) {
        let page = self.query.refresh(self.repo.tasks());
        self.total_matches = page.total_matches;
        self.page_ids = page.tasks.iter().map(|t| t.id.clone()).collect();

        let selected = match self.table_state.selected() {
            _ if self.page_ids.is_empty() => None,
            Some(i) => Some(i.min(self.page_ids.len() - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);

        let repo = &self.repo;
        self.router.reconcile(|id| repo.contains(id));
    }

    fn selected_id(&self) -> Option<String> {
        self.table_state
            .selected()
            .and_then(|i| self.page_ids.get(i))
            .cloned()
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = match self.repo.last_persist_error() {
            Some(e) => format!("{msg} (not saved: {e})"),
            None => msg,
        };
    }

    fn open_create(&mut self) {
        self.task_form = TaskForm::new();
        self.router.create();
    }

    fn open_edit(&mut self) {
        let Some(id) = self.selected_id() else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        if let Some(task) = self.repo.get(&id) {
            self.task_form = TaskForm::from_task(task);
            self.router.edit(&id);
        }
    }

    /// Handle one key press. Returns true when the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if matches!(key, KeyCode::Char('c')) && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        let repo = &self.repo;
        self.router.reconcile(|id| repo.contains(id));

        if self.router.delete_confirm().is_some() {
            self.handle_confirm_input(key);
            return false;
        }
        match self.router.view().clone() {
            View::List => self.handle_list_input(key),
            View::Create => {
                self.handle_form_input(key, None);
                false
            }
            View::Edit(id) => {
                self.handle_form_input(key, Some(id));
                false
            }
        }
    }

    /// Handle keyboard input when in the task list view.
    fn handle_list_input(&mut self, key: KeyCode) -> bool {
        if self.search_active {
            self.handle_search_input(key);
            return false;
        }

        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.query.search.is_empty() {
                    return true;
                }
                self.query.set_search(String::new());
                self.refresh_list();
                self.set_status_message("Search cleared".to_string());
            }
            KeyCode::Up => {
                if let Some(selected) = self.table_state.selected() {
                    if selected > 0 {
                        self.table_state.select(Some(selected - 1));
                    }
                }
            }
            KeyCode::Down => {
                if let Some(selected) = self.table_state.selected() {
                    if selected + 1 < self.page_ids.len() {
                        self.table_state.select(Some(selected + 1));
                    }
                }
            }
            KeyCode::Left | KeyCode::PageUp => {
                self.query.prev_page();
                self.table_state.select(Some(0));
                self.refresh_list();
            }
            KeyCode::Right | KeyCode::PageDown => {
                self.query.next_page();
                self.table_state.select(Some(0));
                self.refresh_list();
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.sort_by(SortKey::ALL[idx]);
            }
            KeyCode::F(n @ 1..=4) => self.sort_by(SortKey::ALL[n as usize - 1]),
            KeyCode::Char('/') => {
                self.search_active = true;
                self.set_status_message(
                    "Search: type to filter, Enter to keep, Esc to clear".to_string(),
                );
            }
            KeyCode::Char('a') | KeyCode::Char('n') => self.open_create(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit(),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.router.request_delete(&id);
                }
            }
            _ => {}
        }
        false
    }

    fn sort_by(&mut self, key: SortKey) {
        self.query.toggle_sort(key);
        self.refresh_list();
        self.set_status_message(format!(
            "Sorted by {} {}",
            key.label(),
            self.query.sort.direction.arrow()
        ));
    }

    /// Handle keyboard input while the search line is focused.
    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.search_active = false;
                self.query.set_search(String::new());
                self.refresh_list();
                self.status_message.clear();
            }
            KeyCode::Enter => {
                self.search_active = false;
                let msg = if self.query.search.is_empty() {
                    "Search cleared".to_string()
                } else {
                    format!("Search '{}' ({} tasks)", self.query.search, self.total_matches)
                };
                self.set_status_message(msg);
            }
            KeyCode::Backspace => {
                let mut search = self.query.search.clone();
                if search.pop().is_some() {
                    self.query.set_search(search);
                    self.refresh_list();
                }
            }
            KeyCode::Char(c) => {
                let mut search = self.query.search.clone();
                search.push(c);
                self.query.set_search(search);
                self.refresh_list();
            }
            _ => {}
        }
    }

    /// Handle keyboard input in the create form (`editing` is None) or the edit form.
    fn handle_form_input(&mut self, key: KeyCode, editing: Option<String>) {
        match key {
            KeyCode::Esc => {
                self.router.cancel();
                self.set_status_message("Cancelled".to_string());
            }
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Home => {
                let field = self.task_form.current();
                match field {
                    TaskField::Title => self.task_form.title.move_home(),
                    TaskField::Description => self.task_form.description.move_home(),
                    TaskField::DueDate => self.task_form.due.move_home(),
                    _ => {}
                }
            }
            KeyCode::End => {
                let field = self.task_form.current();
                match field {
                    TaskField::Title => self.task_form.title.move_end(),
                    TaskField::Description => self.task_form.description.move_end(),
                    TaskField::DueDate => self.task_form.due.move_end(),
                    _ => {}
                }
            }
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => self.submit_form(editing),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
    }

    /// Validate the form and write it through the repository.
    fn submit_form(&mut self, editing: Option<String>) {
        let Some(draft) = self.task_form.submit() else {
            self.set_status_message("Please fix the highlighted fields".to_string());
            return;
        };
        match editing {
            None => {
                let task = self.repo.add(draft);
                debug!(id = %task.id, "created from form");
                self.router.saved();
                self.refresh_list();
                self.set_status_message(format!("Task created: {}", task.title));
            }
            Some(id) => {
                let title = draft.title.clone();
                self.repo.update(Task::from_draft(id, draft));
                self.router.saved();
                self.refresh_list();
                self.set_status_message(format!("Task updated: {title}"));
            }
        }
    }

    /// Handle keyboard input in the delete confirmation overlay.
    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.router.confirm_delete() {
                    let title = self.repo.get(&id).map(|t| t.title.clone()).unwrap_or_default();
                    self.repo.delete(&id);
                    self.refresh_list();
                    self.set_status_message(format!("Deleted: {title}"));
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.router.cancel_delete();
            }
            _ => {}
        }
    }

    /// Poll for and handle one keyboard event. Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(false);
                }
                self.status_message.clear();
                return Ok(self.handle_key(key.code, key.modifiers));
            }
        }
        Ok(false)
    }

    /// Render the task list: header, current page and paging footer.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let search_text = if self.search_active || !self.query.search.is_empty() {
            format!("Search: {}", self.query.search)
        } else {
            "Press / to search".to_string()
        };
        let header_text = vec![Line::from(vec![
            Span::styled("TASKS", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                search_text,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];
        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, chunks[0]);

        let sort = self.query.sort;
        let header_cells = SortKey::ALL
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let arrow = if *key == sort.key { sort.direction.arrow() } else { "" };
                format!("{} {}{}", i + 1, key.label(), arrow)
            })
            .chain(std::iter::once("Description".to_string()))
            .map(|h| Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(ACCENT).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .page_ids
            .iter()
            .filter_map(|id| self.repo.get(id))
            .map(|task| {
                let due = format!(
                    "{} ({})",
                    task.due_date,
                    format_due_relative(&task.due_date, today)
                );
                Row::new(vec![
                    Cell::from(task.title.clone()),
                    Cell::from(task.status.as_str()).style(Style::default().fg(status_color(task.status))),
                    Cell::from(task.priority.as_str()).style(Style::default().fg(priority_color(task.priority))),
                    Cell::from(due),
                    Cell::from(task.description.clone()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(26),
            Constraint::Min(20),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{})",
                self.total_matches,
                self.repo.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[1], &mut self.table_state);

        let footer = if self.query.total_pages() == 0 {
            "No tasks".to_string()
        } else {
            format!(
                "Page {} of {}  ←/→ page  a add  e edit  d delete  1-4 sort  q quit",
                self.query.page,
                self.query.total_pages()
            )
        };
        f.render_widget(Paragraph::new(footer).alignment(Alignment::Center), chunks[2]);
    }

    /// Render the create or edit form with inline validation errors.
    fn render_task_form(&mut self, f: &mut Frame, area: Rect, is_edit: bool) {
        let title = if is_edit { "Edit Task" } else { "New Task" };
        let outer = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT));
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let mut constraints: Vec<Constraint> = FIELD_ORDER
            .iter()
            .flat_map(|_| [Constraint::Length(3), Constraint::Length(1)])
            .collect();
        constraints.push(Constraint::Min(0));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let current = self.task_form.current();
        for (i, field) in FIELD_ORDER.iter().copied().enumerate() {
            let focused = field == current;
            let error = self.task_form.error(field);
            let border = match (focused, error.is_some()) {
                (_, true) => Style::default().fg(Color::Red),
                (true, false) => Style::default().fg(Color::Yellow),
                _ => Style::default(),
            };
            let value = match field {
                TaskField::Status => format!("◀ {} ▶", self.task_form.selected_status()),
                TaskField::Priority => format!("◀ {} ▶", self.task_form.selected_priority()),
                _ => self
                    .task_form
                    .input(field)
                    .map(|input| input.value.clone())
                    .unwrap_or_default(),
            };
            let label = if field == TaskField::DueDate {
                "Due Date (YYYY-MM-DD, today, fri, in 3d)".to_string()
            } else {
                field.label().to_string()
            };
            let block = Block::default().title(label).borders(Borders::ALL).border_style(border);
            f.render_widget(Paragraph::new(value).block(block), chunks[i * 2]);

            if let Some(message) = error {
                f.render_widget(
                    Paragraph::new(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
                    chunks[i * 2 + 1],
                );
            }

            if focused {
                if let Some(input) = self.task_form.input(field) {
                    let rect = chunks[i * 2];
                    f.set_cursor_position((cursor_column(rect, input.cursor), rect.y + 1));
                }
            }
        }

        let help = Paragraph::new("Tab/↑↓ move  ←/→ cursor or choice  Enter save  Esc cancel")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(help, chunks[FIELD_ORDER.len() * 2]);
    }

    /// Render the delete confirmation overlay.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let title = self
            .router
            .delete_confirm()
            .and_then(|id| self.repo.get(id))
            .map(|t| t.title.clone())
            .unwrap_or_default();
        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Delete this task?",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(title),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(e) = self.repo.last_persist_error() {
            format!("Changes are not being saved: {e}")
        } else {
            match self.router.view() {
                View::List => format!("Tasks: {} | a add, / search, q quit", self.repo.len()),
                View::Create => "Add New Task".to_string(),
                View::Edit(_) => "Edit Task".to_string(),
            }
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(ACCENT).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the active screen.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.router.view() {
            View::List => {
                self.render_task_list(f, chunks[0]);
                if self.router.delete_confirm().is_some() {
                    self.render_confirm(f, chunks[0]);
                }
            }
            View::Create => self.render_task_form(f, chunks[0], false),
            View::Edit(_) => self.render_task_form(f, chunks[0], true),
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Terminal column for a text cursor inside a bordered box, kept within the box.
fn cursor_column(rect: Rect, cursor: usize) -> u16 {
    let offset = u16::try_from(cursor).unwrap_or(u16::MAX);
    rect.x
        .saturating_add(1)
        .saturating_add(offset)
        .min(rect.right().saturating_sub(2))
}
