use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::model::{StorageError, TaskMap};

/// Whole-state load/save of the task mapping.
#[async_trait]
pub trait TaskPersistence: Send + Sync + 'static {
    /// Never fails: missing, empty or unreadable state yields an empty map.
    async fn load(&self) -> TaskMap;

    /// Overwrites the durable state with `tasks`.
    async fn save(&self, tasks: &TaskMap) -> Result<(), StorageError>;
}

pub struct JsonFileTaskPersistence {
    path: PathBuf,
}

impl JsonFileTaskPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, path: &Path, source: io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    async fn keep_corrupt_copy(&self) {
        let backup = self.path.with_extension("json.corrupt");
        match fs::copy(&self.path, &backup).await {
            Ok(_) => log::warn!("Kept a copy of the unreadable task file at {}", backup.display()),
            Err(error) => log::warn!(
                "Could not keep a copy of the unreadable task file {}: {}",
                self.path.display(),
                error
            ),
        }
    }
}

#[async_trait]
impl TaskPersistence for JsonFileTaskPersistence {
    async fn load(&self) -> TaskMap {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "Task file {} does not exist yet, starting without reminders",
                    self.path.display()
                );
                return TaskMap::new();
            }
            Err(error) => {
                log::error!(
                    "Error reading task file {}, starting without reminders: {}",
                    self.path.display(),
                    error
                );
                return TaskMap::new();
            }
        };

        if content.trim().is_empty() {
            return TaskMap::new();
        }

        match serde_json::from_str::<TaskMap>(&content) {
            Ok(tasks) => {
                log::info!(
                    "Loaded {} reminder(s) of {} owner(s) from {}",
                    tasks.values().map(Vec::len).sum::<usize>(),
                    tasks.len(),
                    self.path.display()
                );
                tasks
            }
            Err(error) => {
                log::error!(
                    "Error decoding task file {}, starting without reminders: {}",
                    self.path.display(),
                    error
                );
                self.keep_corrupt_copy().await;
                TaskMap::new()
            }
        }
    }

    async fn save(&self, tasks: &TaskMap) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(tasks)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(parent, e))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .await
            .map_err(|e| self.io_error(&temp_path, e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(&self.path, e))?;

        log::debug!("Saved tasks to {}", self.path.display());
        Ok(())
    }
}
