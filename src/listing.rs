//! List derivation: search, then sort, then paginate.
//!
//! `derive_page` is pure. Keeping the requested page inside the computed
//! page count is the caller's job; [`ListQuery`] does that for the list screen
//! and the `list` command.

use std::cmp::Ordering;

use crate::fields::{SortDirection, SortKey};
use crate::task::Task;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Active sort key and direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        SortState { key, direction }
    }

    /// Selecting the active key flips direction; a new key starts ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// One page of derived results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    pub tasks: Vec<&'a Task>,
    pub total_pages: usize,
    pub total_matches: usize,
}

/// Keep tasks whose title, description, status or priority contains `search`, ignoring case.
pub fn filter_tasks<'a>(tasks: &'a [Task], search: &str) -> Vec<&'a Task> {
    if search.is_empty() {
        return tasks.iter().collect();
    }
    let needle = search.to_lowercase();
    tasks.iter().filter(|t| t.matches(&needle)).collect()
}

/// Stable sort on the field text. Equal keys keep their order in either direction.
pub fn sort_tasks(tasks: &mut [&Task], sort: SortState) {
    tasks.sort_by(|a, b| {
        let ord = compare_on(a, b, sort.key);
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Number of pages needed for `count` items; zero when there are none.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    count.div_ceil(size)
}

/// Slice out 1-based `page`. Out-of-range pages yield an empty slice.
pub fn paginate<'t, 'a>(tasks: &'t [&'a Task], page: usize, page_size: usize) -> &'t [&'a Task] {
    let size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(size);
    if page == 0 || start >= tasks.len() {
        return &[];
    }
    let end = (start + size).min(tasks.len());
    &tasks[start..end]
}

/// Run the whole pipeline.
pub fn derive_page<'a>(
    tasks: &'a [Task],
    search: &str,
    sort: SortState,
    page: usize,
    page_size: usize,
) -> Page<'a> {
    let mut matched = filter_tasks(tasks, search);
    sort_tasks(&mut matched, sort);
    let total_matches = matched.len();
    Page {
        tasks: paginate(&matched, page, page_size).to_vec(),
        total_pages: total_pages(total_matches, page_size),
        total_matches,
    }
}

/// Pull a page number back inside `1..=total_pages` (1 when there are no pages).
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Search, sort and paging state of a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub sort: SortState,
    pub page: usize,
    pub page_size: usize,
    total_pages: usize,
}

impl ListQuery {
    pub fn new(page_size: usize) -> Self {
        ListQuery {
            search: String::new(),
            sort: SortState::default(),
            page: 1,
            page_size: page_size.max(1),
            total_pages: 0,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Re-derive the page for `tasks`, clamping the page number first.
    ///
    /// Call after any change to the tasks, the search term or the sort.
    pub fn refresh<'a>(&mut self, tasks: &'a [Task]) -> Page<'a> {
        let mut matched = filter_tasks(tasks, &self.search);
        sort_tasks(&mut matched, self.sort);
        self.total_pages = total_pages(matched.len(), self.page_size);
        self.page = clamp_page(self.page, self.total_pages);
        Page {
            tasks: paginate(&matched, self.page, self.page_size).to_vec(),
            total_pages: self.total_pages,
            total_matches: matched.len(),
        }
    }

    pub fn set_search(&mut self, search: String) {
        self.search = search;
        self.page = 1;
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery::new(DEFAULT_PAGE_SIZE)
    }
}

/// Compare two tasks on the text of one field.
pub fn compare_on(a: &Task, b: &Task, key: SortKey) -> Ordering {
    a.sort_text(key).cmp(b.sort_text(key))
}
