use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::model::{StorageError, TaskMap};
use super::persistence::TaskPersistence;

/// Keeps the "durable" state in memory and counts saves.
#[derive(Default)]
pub struct InMemoryTaskPersistence {
    tasks: Mutex<TaskMap>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl InMemoryTaskPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: TaskMap) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    pub fn saved(&self) -> TaskMap {
        self.tasks.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::Relaxed);
    }
}

#[async_trait]
impl TaskPersistence for InMemoryTaskPersistence {
    async fn load(&self) -> TaskMap {
        self.saved()
    }

    async fn save(&self, tasks: &TaskMap) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(StorageError::Io {
                path: PathBuf::from("memory"),
                source: io::Error::other("saving is switched off"),
            });
        }

        *self.tasks.lock().unwrap() = tasks.clone();
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::OwnerId;

    #[tokio::test]
    async fn counts_saves_and_can_fail() {
        let persistence = InMemoryTaskPersistence::new();
        let tasks = TaskMap::from([(OwnerId(1), vec![])]);

        persistence.save(&tasks).await.unwrap();
        persistence.set_failing(true);
        let result = persistence.save(&TaskMap::new()).await;

        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert_eq!(persistence.save_count(), 1);
        assert_eq!(persistence.load().await, tasks);
    }
}
