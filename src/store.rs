use crate::task::{now_string, Filter, Stats, Task};
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// Ordered task list persisted to a JSON backing file.
///
/// The whole list lives in memory; every mutation rewrites the file. Single
/// process, single thread, so there is no locking. One instance is built at
/// startup and handed to the UI loop.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Loads the store from `path`. A missing or malformed file yields an
    /// empty store rather than an error; the file is rewritten on the next
    /// mutation.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tasks = if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(data) => serde_json::from_str(&data).unwrap_or_else(|err| {
                    warn!("backing file is malformed, starting empty: {err}");
                    Vec::new()
                }),
                Err(err) => {
                    warn!("failed to read backing file, starting empty: {err}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        Self { path, tasks }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the backing file with the full task list. Failures are
    /// logged and reported as `false`; the in-memory state is unaffected.
    fn save(&self) -> bool {
        let json = match serde_json::to_string_pretty(&self.tasks) {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to serialize tasks: {err}");
                return false;
            }
        };
        if let Err(err) = std::fs::write(&self.path, json) {
            warn!("failed to save tasks: {err}");
            return false;
        }
        true
    }

    /// Appends a new active task. Rejects empty or whitespace-only
    /// descriptions; otherwise returns whether the persist succeeded.
    pub fn add(&mut self, description: &str) -> bool {
        let description = description.trim();
        if description.is_empty() {
            return false;
        }
        self.tasks.push(Task::new(description.to_string()));
        self.save()
    }

    /// Removes the task with the given id. Persists only if something was
    /// removed; returns false for unknown ids.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() < before {
            self.save()
        } else {
            false
        }
    }

    /// Flips a task's completion state, stamping or clearing `completed_at`
    /// to match. Returns false for unknown ids.
    pub fn toggle_completion(&mut self, id: Uuid) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                task.completed_at = task.completed.then(now_string);
                self.save()
            }
            None => false,
        }
    }

    /// Replaces a task's description. Rejects empty or whitespace-only text
    /// and unknown ids.
    pub fn update_description(&mut self, id: Uuid, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.description = text.to_string();
                self.save()
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.iter().find(|t| t.id == id).cloned()
    }

    /// All tasks in insertion order, as a defensive copy.
    pub fn all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Tasks matching the filter, insertion order preserved.
    pub fn filtered(&self, filter: Filter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> Stats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        Stats {
            total,
            active: total - completed,
            completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, TaskStore) {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::load(dir.path().join("tasks.json"));
        (dir, store)
    }

    #[test]
    fn test_add_appends_active_task() {
        let (_dir, mut store) = create_test_store();

        assert!(store.add("Buy milk"));

        let tasks = store.all();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "Buy milk");
        assert!(!tasks[0].completed);
        assert!(tasks[0].completed_at.is_none());
    }

    #[test]
    fn test_add_trims_description() {
        let (_dir, mut store) = create_test_store();

        assert!(store.add("  Buy milk  "));
        assert_eq!(store.all()[0].description, "Buy milk");
    }

    #[test]
    fn test_add_rejects_empty_description() {
        let (_dir, mut store) = create_test_store();

        assert!(!store.add(""));
        assert!(!store.add("   \t "));
        assert!(store.all().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_toggle_sets_and_clears_completed_at() {
        let (_dir, mut store) = create_test_store();
        store.add("Buy milk");
        let id = store.all()[0].id;

        assert!(store.toggle_completion(id));
        let task = store.get(id).expect("task");
        assert!(task.completed);
        assert!(task.completed_at.is_some());

        assert!(store.toggle_completion(id));
        let task = store.get(id).expect("task");
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_toggle_unknown_id_fails() {
        let (_dir, mut store) = create_test_store();
        store.add("Buy milk");

        assert!(!store.toggle_completion(Uuid::new_v4()));
        assert!(!store.all()[0].completed);
    }

    #[test]
    fn test_delete_removes_task() {
        let (_dir, mut store) = create_test_store();
        store.add("Buy milk");
        store.add("Walk dog");
        let id = store.all()[0].id;

        assert!(store.delete(id));
        let tasks = store.all();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "Walk dog");
    }

    #[test]
    fn test_delete_unknown_id_leaves_store_unchanged() {
        let (_dir, mut store) = create_test_store();
        store.add("Buy milk");

        assert!(!store.delete(Uuid::new_v4()));
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn test_update_description() {
        let (_dir, mut store) = create_test_store();
        store.add("Buy milk");
        let id = store.all()[0].id;

        assert!(store.update_description(id, "  Buy oat milk "));
        assert_eq!(store.get(id).expect("task").description, "Buy oat milk");
    }

    #[test]
    fn test_update_description_rejects_empty_and_unknown() {
        let (_dir, mut store) = create_test_store();
        store.add("Buy milk");
        let id = store.all()[0].id;

        assert!(!store.update_description(id, "   "));
        assert!(!store.update_description(Uuid::new_v4(), "text"));
        assert_eq!(store.get(id).expect("task").description, "Buy milk");
    }

    #[test]
    fn test_filtered_preserves_insertion_order() {
        let (_dir, mut store) = create_test_store();
        store.add("one");
        store.add("two");
        store.add("three");
        let second = store.all()[1].id;
        store.toggle_completion(second);

        let active: Vec<String> = store
            .filtered(Filter::Active)
            .into_iter()
            .map(|t| t.description)
            .collect();
        assert_eq!(active, vec!["one", "three"]);

        let completed = store.filtered(Filter::Completed);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].description, "two");
    }

    #[test]
    fn test_active_and_completed_partition_all() {
        let (_dir, mut store) = create_test_store();
        store.add("one");
        store.add("two");
        store.add("three");
        store.toggle_completion(store.all()[0].id);

        let mut union: Vec<Uuid> = store
            .filtered(Filter::Active)
            .iter()
            .chain(store.filtered(Filter::Completed).iter())
            .map(|t| t.id)
            .collect();
        let mut all: Vec<Uuid> = store.all().iter().map(|t| t.id).collect();
        union.sort();
        all.sort();
        assert_eq!(union, all);
    }

    #[test]
    fn test_stats_track_completion() {
        let (_dir, mut store) = create_test_store();
        store.add("Buy milk");
        assert_eq!(
            store.stats(),
            Stats {
                total: 1,
                active: 1,
                completed: 0
            }
        );

        store.toggle_completion(store.all()[0].id);
        assert_eq!(
            store.stats(),
            Stats {
                total: 1,
                active: 0,
                completed: 1
            }
        );
    }

    #[test]
    fn test_persistence_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");

        let mut store = TaskStore::load(&path);
        store.add("one");
        store.add("two");
        store.toggle_completion(store.all()[1].id);
        let original = store.all();

        let reloaded = TaskStore::load(&path);
        assert_eq!(reloaded.all(), original);
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let (_dir, store) = create_test_store();
        assert!(store.all().is_empty());
        assert_eq!(store.stats().total, 0);
    }

    #[test]
    fn test_load_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut store = TaskStore::load(&path);
        assert!(store.all().is_empty());

        // The store keeps working and rewrites the file on mutation.
        assert!(store.add("recovered"));
        assert_eq!(TaskStore::load(&path).all().len(), 1);
    }

    #[test]
    fn test_get_returns_copy() {
        let (_dir, mut store) = create_test_store();
        store.add("Buy milk");
        let id = store.all()[0].id;

        let mut copy = store.get(id).expect("task");
        copy.description = "mutated".to_string();
        assert_eq!(store.get(id).expect("task").description, "Buy milk");
    }
}
