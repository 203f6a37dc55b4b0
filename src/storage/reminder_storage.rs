use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::reminder::{OwnerId, Reminder};

use super::model::{StorageError, TaskMap};
use super::persistence::TaskPersistence;

#[async_trait]
pub trait ReminderStorage: Send + Sync {
    /// Appends a reminder to the owner's list and returns the new list length.
    async fn insert(&self, owner: OwnerId, reminder: Reminder) -> Result<usize, StorageError>;

    async fn get_all_owner_reminders(&self, owner: OwnerId) -> Vec<Reminder>;

    /// Removes the reminder at `index`, shifting later entries down.
    async fn delete(&self, owner: OwnerId, index: usize) -> Result<Reminder, StorageError>;

    async fn snapshot(&self) -> TaskMap;

    /// Removes the first entry equal to `reminder`. Returns `Ok(false)` when the
    /// owner no longer has it. An error means the entry is gone from memory but
    /// the change was not persisted.
    async fn remove_fired(&self, owner: OwnerId, reminder: &Reminder)
    -> Result<bool, StorageError>;
}

/// In-memory task mapping guarded by a single mutex, persisted in full after
/// every mutation while the lock is still held.
pub struct TaskStore<P: TaskPersistence> {
    tasks: Mutex<TaskMap>,
    persistence: P,
}

impl<P: TaskPersistence> TaskStore<P> {
    pub async fn open(persistence: P) -> Self {
        let tasks = persistence.load().await;

        Self {
            tasks: Mutex::new(tasks),
            persistence,
        }
    }

    #[cfg(test)]
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    async fn persist(&self, tasks: &TaskMap) -> Result<(), StorageError> {
        self.persistence.save(tasks).await.inspect_err(|error| {
            log::error!("Could not persist tasks, keeping changes in memory only: {error}")
        })
    }
}

fn drop_if_empty(tasks: &mut TaskMap, owner: OwnerId) {
    if tasks.get(&owner).is_some_and(Vec::is_empty) {
        tasks.remove(&owner);
    }
}

#[async_trait]
impl<P: TaskPersistence> ReminderStorage for TaskStore<P> {
    async fn insert(&self, owner: OwnerId, reminder: Reminder) -> Result<usize, StorageError> {
        let mut tasks = self.tasks.lock().await;
        let reminders = tasks.entry(owner).or_default();
        reminders.push(reminder);
        let count = reminders.len();

        self.persist(&tasks).await?;
        Ok(count)
    }

    async fn get_all_owner_reminders(&self, owner: OwnerId) -> Vec<Reminder> {
        let tasks = self.tasks.lock().await;
        tasks.get(&owner).cloned().unwrap_or_default()
    }

    async fn delete(&self, owner: OwnerId, index: usize) -> Result<Reminder, StorageError> {
        let mut tasks = self.tasks.lock().await;
        let removed = match tasks.get_mut(&owner) {
            Some(reminders) if index < reminders.len() => reminders.remove(index),
            reminders => {
                return Err(StorageError::IndexOutOfRange {
                    owner,
                    index,
                    len: reminders.map_or(0, |r| r.len()),
                });
            }
        };
        drop_if_empty(&mut tasks, owner);

        log::info!("Deleted reminder {index} of {owner}");
        self.persist(&tasks).await?;
        Ok(removed)
    }

    async fn snapshot(&self) -> TaskMap {
        self.tasks.lock().await.clone()
    }

    async fn remove_fired(
        &self,
        owner: OwnerId,
        reminder: &Reminder,
    ) -> Result<bool, StorageError> {
        let mut tasks = self.tasks.lock().await;
        let Some(reminders) = tasks.get_mut(&owner) else {
            return Ok(false);
        };
        let Some(position) = reminders.iter().position(|r| r == reminder) else {
            return Ok(false);
        };
        reminders.remove(position);
        drop_if_empty(&mut tasks, owner);

        self.persist(&tasks).await?;
        Ok(true)
    }
}
