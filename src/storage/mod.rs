mod model;
mod persistence;
mod reminder_storage;

#[cfg(test)]
mod in_memory;

#[cfg(test)]
pub use in_memory::InMemoryTaskPersistence;
pub use model::{StorageError, TaskMap};
pub use persistence::{JsonFileTaskPersistence, TaskPersistence};
pub use reminder_storage::{ReminderStorage, TaskStore};
