use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::reminder::{OwnerId, Reminder};

/// Every owner's reminders in creation order.
pub type TaskMap = BTreeMap<OwnerId, Vec<Reminder>>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not access task file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not serialize tasks: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Reminder at index {index} does not exist, owner {owner} has {len} reminder(s)")]
    IndexOutOfRange {
        owner: OwnerId,
        index: usize,
        len: usize,
    },
}
