//! Task repository backed by a key-value store.
//!
//! The repository owns the in-memory task collection. Every mutation
//! re-serialises the whole collection to the store; a failed write is logged
//! and otherwise ignored, so the in-memory state stays authoritative for the
//! rest of the session.

use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::store::KeyValueStore;
use crate::task::{Task, TaskDraft};

/// Key under which the collection is stored.
pub const STORAGE_KEY: &str = "tasks";

/// In-memory task collection with write-through persistence.
#[derive(Debug)]
pub struct TaskRepository<S: KeyValueStore> {
    store: S,
    tasks: Vec<Task>,
    last_persist_error: Option<String>,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Load the collection from `store`, starting empty on missing or unreadable data.
    pub fn load(store: S) -> Self {
        let tasks = match store.get(STORAGE_KEY) {
            Ok(Some(buf)) if buf.trim().is_empty() => Vec::new(),
            Ok(Some(buf)) => match deserialize_tasks(&buf) {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!("Error parsing stored tasks, starting fresh: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Error reading stored tasks, starting fresh: {e}");
                Vec::new()
            }
        };
        debug!(count = tasks.len(), "loaded tasks");
        TaskRepository {
            store,
            tasks,
            last_persist_error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Message of the most recent failed write, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Append a new task with a freshly generated id and persist.
    pub fn add(&mut self, draft: TaskDraft) -> Task {
        let task = Task::from_draft(generate_id(), draft);
        debug!(id = %task.id, "adding task");
        self.tasks.push(task.clone());
        self.persist();
        task
    }

    /// Replace the stored task with the same id. Returns false when no task matched.
    pub fn update(&mut self, task: Task) -> bool {
        let replaced = match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                debug!(id = %task.id, "updating task");
                *slot = task;
                true
            }
            None => {
                debug!(id = %task.id, "update skipped, no such task");
                false
            }
        };
        self.persist();
        replaced
    }

    /// Remove the task with `id` if present. Returns whether one was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        debug!(id, removed, "deleting task");
        self.persist();
        removed
    }

    /// Write the whole collection to the store, logging rather than returning failures.
    fn persist(&mut self) {
        match self.try_persist() {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                error!("Failed to save tasks: {e}");
                self.last_persist_error = Some(e.to_string());
            }
        }
    }

    fn try_persist(&mut self) -> Result<()> {
        let data = serialize_tasks(&self.tasks)?;
        self.store.set(STORAGE_KEY, &data)
    }
}

/// Serialise a collection to its stored JSON text.
pub fn serialize_tasks(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Parse stored JSON text back into a collection.
pub fn deserialize_tasks(buf: &str) -> Result<Vec<Task>> {
    Ok(serde_json::from_str(buf)?)
}

/// Generate a task id from the current time in milliseconds and random bits.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", to_base36(millis), &random[..8])
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::fields::{Priority, Status};
    use crate::store::{FileStore, MemoryStore};

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            description: format!("{title} details"),
            status: Status::Pending,
            priority: Priority::Medium,
            due_date: "2024-03-01".into(),
        }
    }

    fn repo_with(titles: &[&str]) -> TaskRepository<MemoryStore> {
        let mut repo = TaskRepository::load(MemoryStore::new());
        for t in titles {
            repo.add(draft(t));
        }
        repo
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let repo = TaskRepository::load(MemoryStore::new());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_load_malformed_content_is_empty() {
        let repo = TaskRepository::load(MemoryStore::with_entry(STORAGE_KEY, "{not json"));
        assert!(repo.is_empty());
        let repo = TaskRepository::load(MemoryStore::with_entry(STORAGE_KEY, "   "));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_add_assigns_id_and_persists() {
        let mut repo = repo_with(&["Alpha"]);
        let input = draft("Bravo");
        let added = repo.add(input.clone());

        assert_eq!(repo.len(), 2);
        let found = repo.get(&added.id).unwrap();
        assert_eq!(found.to_draft(), input);
        assert_eq!(found, &added);

        let stored = deserialize_tasks(repo.store().raw(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored, repo.tasks());
    }

    #[test]
    fn test_update_replaces_only_matching_task() {
        let mut repo = repo_with(&["Alpha", "Bravo", "Charlie"]);
        let before = repo.tasks().to_vec();
        let mut changed = before[1].clone();
        changed.title = "Bravo renamed".into();
        changed.status = Status::Completed;

        assert!(repo.update(changed.clone()));
        assert_eq!(repo.get(&changed.id), Some(&changed));
        assert_eq!(repo.tasks()[0], before[0]);
        assert_eq!(repo.tasks()[2], before[2]);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut repo = repo_with(&["Alpha"]);
        let before = repo.tasks().to_vec();
        let ghost = Task::from_draft("missing".into(), draft("Ghost"));
        assert!(!repo.update(ghost));
        assert_eq!(repo.tasks(), before.as_slice());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut repo = repo_with(&["Alpha", "Bravo"]);
        let id = repo.tasks()[0].id.clone();

        assert!(repo.delete(&id));
        let after_once = repo.tasks().to_vec();
        assert!(!repo.delete(&id));
        assert_eq!(repo.tasks(), after_once.as_slice());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_failed_writes_keep_memory_state() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);
        let mut repo = TaskRepository::load(store);

        let added = repo.add(draft("Alpha"));
        assert_eq!(repo.len(), 1);
        assert!(repo.get(&added.id).is_some());
        assert!(repo.last_persist_error().is_some());
        assert!(repo.store().raw(STORAGE_KEY).is_none());
    }

    #[test]
    fn test_reload_from_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = TaskRepository::load(FileStore::new(dir.path()));
        repo.add(draft("Alpha"));
        repo.add(draft("Bravo"));
        let saved = repo.tasks().to_vec();

        let reloaded = TaskRepository::load(FileStore::new(dir.path()));
        assert_eq!(reloaded.tasks(), saved.as_slice());
    }

    #[test]
    fn test_serialization_round_trip() {
        let repo = repo_with(&["Alpha", "Bravo", "Charlie"]);
        for n in [0, 1, 3] {
            let tasks = &repo.tasks()[..n];
            let text = serialize_tasks(tasks).unwrap();
            assert_eq!(deserialize_tasks(&text).unwrap(), tasks);
        }
    }

    #[test]
    fn test_null_field_record_survives_load_and_add() {
        let stored = r#"[
            {"id":"a","title":"Good","description":"d","status":"Pending","priority":"Low","dueDate":"2024-01-01"},
            {"id":"b","title":null,"description":"d","status":"Completed","priority":"High","dueDate":null}
        ]"#;
        let mut repo = TaskRepository::load(MemoryStore::with_entry(STORAGE_KEY, stored));
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get("b").map(|t| t.title.as_str()), Some(""));

        repo.add(draft("New one"));
        let saved = deserialize_tasks(repo.store().raw(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(saved.len(), 3);
        assert!(saved.iter().any(|t| t.id == "a"));
        assert!(saved.iter().any(|t| t.id == "b" && t.status == Status::Completed));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<String> = (0..500).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
