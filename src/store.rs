//! The task store: CRUD, filtering and lookup over the backing document.
//!
//! Every operation re-reads the document from disk. Mutations hold the
//! writer lock for the whole read-modify-write span and replace the file
//! atomically, so a failed mutation leaves the last good document in place.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::lock::{FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::query::{sort_tasks, TaskFilter, TaskSort};
use crate::storage::DocumentFile;
use crate::task::{Document, NewTask, Task, TaskPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// How long a mutation waits for the writer lock
    pub lock_timeout_ms: u64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

/// Store health and size summary
#[derive(Debug, Clone, Serialize)]
pub struct StoreInfo {
    pub status: &'static str,
    pub path: PathBuf,
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub total: usize,
    pub open: usize,
    pub completed: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    file: DocumentFile,
    options: StoreOptions,
}

impl TaskStore {
    /// Open the store at `path` with default options
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open the store, creating the directory and an empty document if needed
    ///
    /// Fails with `StorageUnavailable` when the location cannot be created or
    /// written and `CorruptData` when an existing file is not a valid document.
    pub fn open_with(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self> {
        let file = DocumentFile::new(path);
        file.ensure_dir()?;

        let _lock = FileLock::acquire(file.lock_path(), options.lock_timeout_ms)?;
        if file.exists() {
            file.load()?;
        } else {
            file.create(&Document::empty())?;
            tracing::info!(path = %file.path().display(), "initialized empty task store");
        }

        Ok(Self { file, options })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Point-in-time copy of the whole document
    pub fn snapshot(&self) -> Result<Document> {
        self.file.load()
    }

    /// Tasks matching every supplied filter, in document order
    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let document = self.file.load()?;
        Ok(filter.apply(document.tasks))
    }

    /// `list` followed by a stable sort
    pub fn list_sorted(&self, filter: &TaskFilter, sort: TaskSort) -> Result<Vec<Task>> {
        let mut tasks = self.list(filter)?;
        sort_tasks(&mut tasks, sort);
        Ok(tasks)
    }

    /// Look up a task; `Ok(None)` when no task has this id
    pub fn get(&self, id: &str) -> Result<Option<Task>> {
        let document = self.file.load()?;
        Ok(document.find(id).cloned())
    }

    /// Like `get`, but absence is `Error::NotFound`
    pub fn require(&self, id: &str) -> Result<Task> {
        self.get(id)?.ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub fn create(&self, fields: NewTask) -> Result<Task> {
        let task = self.mutate(|document| {
            let task = Task::new(generate_task_id(document), fields, Utc::now());
            document.tasks.push(task.clone());
            Ok(task)
        })?;
        tracing::info!(id = %task.id, "created task");
        Ok(task)
    }

    /// Shallow-merge `patch` into the task
    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        let task = self.mutate(|document| {
            let task = document
                .find_mut(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            task.apply(patch, Utc::now());
            Ok(task.clone())
        })?;
        tracing::info!(id = %task.id, "updated task");
        Ok(task)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.mutate(|document| {
            document
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| Error::NotFound(id.to_string()))
        })?;
        tracing::info!(id, "deleted task");
        Ok(())
    }

    /// Flip between open and completed
    pub fn toggle(&self, id: &str) -> Result<Task> {
        let task = self.mutate(|document| {
            let task = document
                .find_mut(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            task.toggle(Utc::now());
            Ok(task.clone())
        })?;
        tracing::info!(id = %task.id, status = %task.status, "toggled task");
        Ok(task)
    }

    pub fn info(&self) -> Result<StoreInfo> {
        let document = self.file.load()?;
        let completed = document.tasks.iter().filter(|t| t.is_completed()).count();
        Ok(StoreInfo {
            status: "ok",
            path: self.file.path().to_path_buf(),
            version: document.meta.version,
            created_at: document.meta.created_at,
            total: document.tasks.len(),
            open: document.tasks.len() - completed,
            completed,
            timestamp: Utc::now(),
        })
    }

    /// Run `f` against a freshly loaded document under the writer lock and
    /// persist the result. Nothing is written when `f` fails.
    fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let _lock = FileLock::acquire(self.file.lock_path(), self.options.lock_timeout_ms)?;

        let mut document = self.file.load()?;
        let result = f(&mut document)?;
        self.file.persist(&document)?;

        Ok(result)
    }
}

fn generate_task_id(document: &Document) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !document.contains(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SortKey, SortOrder};
    use crate::task::TaskStatus;
    use std::fs;
    use tempfile::TempDir;

    fn open_store(temp: &TempDir) -> TaskStore {
        TaskStore::open(temp.path().join("data/db.json")).unwrap()
    }

    #[test]
    fn open_creates_directory_and_empty_document() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        assert!(store.path().is_file());
        let document = store.snapshot().unwrap();
        assert!(document.tasks.is_empty());
        assert_eq!(document.meta.version, crate::task::SCHEMA_VERSION);
    }

    #[test]
    fn open_fails_on_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = TaskStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::CorruptData { .. }));
    }

    #[test]
    fn create_assigns_fresh_fields() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let task = store
            .create(NewTask::new("Buy milk").due_date("2024-01-05").category("home"))
            .unwrap();

        assert!(!task.id.is_empty());
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(store.get(&task.id).unwrap(), Some(task));
    }

    #[test]
    fn update_merges_and_bumps_updated_at() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        let task = store
            .create(NewTask::new("Buy milk").description("semi-skimmed"))
            .unwrap();

        let updated = store
            .update(
                &task.id,
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..TaskPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, task.title);
        assert_eq!(updated.description, task.description);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at > task.updated_at);
    }

    #[test]
    fn missing_ids_are_not_found_and_do_not_write() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create(NewTask::new("keep me")).unwrap();
        let before = fs::read(store.path()).unwrap();

        assert!(store.get("nope").unwrap().is_none());
        assert!(store.require("nope").unwrap_err().is_not_found());
        assert!(store.update("nope", TaskPatch::default()).unwrap_err().is_not_found());
        assert!(store.toggle("nope").unwrap_err().is_not_found());
        assert!(store.delete("nope").unwrap_err().is_not_found());

        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn list_sorted_applies_filter_then_sort() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        store.create(NewTask::new("b").category("x")).unwrap();
        store.create(NewTask::new("a").category("x")).unwrap();
        store.create(NewTask::new("c").category("y")).unwrap();

        let tasks = store
            .list_sorted(
                &TaskFilter::default().category("x"),
                TaskSort::new(SortKey::Title, SortOrder::Asc),
            )
            .unwrap();
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn info_counts_statuses() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        let first = store.create(NewTask::new("one")).unwrap();
        store.create(NewTask::new("two")).unwrap();
        store.toggle(&first.id).unwrap();

        let info = store.info().unwrap();
        assert_eq!(info.status, "ok");
        assert_eq!(info.total, 2);
        assert_eq!(info.open, 1);
        assert_eq!(info.completed, 1);
    }

    #[test]
    fn failed_write_keeps_previous_document() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        let kept = store.create(NewTask::new("kept")).unwrap();
        let before = fs::read(store.path()).unwrap();

        let data_dir = temp.path().join("data");
        let moved_dir = temp.path().join("data.moved");
        let err = store
            .mutate(|document| {
                document.tasks.clear();
                // Swap the directory for a plain file so the write cannot land.
                fs::rename(&data_dir, &moved_dir).unwrap();
                fs::write(&data_dir, "not a directory").unwrap();
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, Error::PersistenceFailure { .. }));

        fs::remove_file(&data_dir).unwrap();
        fs::rename(&moved_dir, &data_dir).unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), before);
        assert_eq!(store.require(&kept.id).unwrap(), kept);
    }

    #[test]
    fn mutation_fails_while_lock_is_held() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db.json");
        let store = TaskStore::open_with(&path, StoreOptions { lock_timeout_ms: 50 }).unwrap();

        let _held = FileLock::acquire(crate::lock::lock_path_for(&path), 1000).unwrap();
        let err = store.create(NewTask::new("blocked")).unwrap_err();
        assert!(matches!(err, Error::LockFailed(_)));

        // Reads do not wait for the lock
        assert!(store.list(&TaskFilter::default()).unwrap().is_empty());
    }
}
