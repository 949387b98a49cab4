//! Save data types
//!
//! The save slot holds one [`SaveFile`]: a timestamp and the whole progress
//! record, as pretty-printed JSON.

use crate::progress::ProgressRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the single save slot inside the save directory.
pub const SAVE_FILE_NAME: &str = "save.json";

/// The root save file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFile {
    /// Local time of the save, RFC 3339
    pub timestamp: String,
    pub progress: ProgressRecord,
}

impl SaveFile {
    pub fn new(progress: ProgressRecord) -> Self {
        SaveFile {
            timestamp: chrono::Local::now().to_rfc3339(),
            progress,
        }
    }
}

/// Error types for save/load operations
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted save data: {0}")]
    CorruptedData(String),
}
