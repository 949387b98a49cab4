//! Save/Load system
//!
//! This module provides the single-slot checkpoint system:
//! - JSON-based save file (human-readable, debuggable)
//! - Atomic overwrite on every checkpoint (inn room, death scene)
//! - A `ProgressStore` trait so modes never touch the filesystem directly
//!
//! # Architecture
//!
//! - `types`: Save data structures and error types
//! - `manager`: SaveManager for file operations
//! - `MemoryStore`: in-memory store for tests and headless runs
//!
//! # Example Usage
//!
//! ```ignore
//! let mut store = SaveManager::new(config.save_dir())?;
//! store.save(&ctx.progress)?;
//! if let Some(progress) = store.load()? {
//!     ctx.progress = progress;
//! }
//! ```

pub mod manager;
pub mod types;

use crate::progress::ProgressRecord;

// Re-export commonly used types
pub use manager::SaveManager;
pub use types::*;

/// Where progress records are checkpointed.
pub trait ProgressStore {
    /// Whether a save exists to continue from
    fn exists(&self) -> bool;

    fn save(&mut self, progress: &ProgressRecord) -> Result<(), SaveError>;

    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<ProgressRecord>, SaveError>;
}

/// Keeps the slot in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slot: Option<ProgressRecord>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_save(progress: ProgressRecord) -> Self {
        MemoryStore {
            slot: Some(progress),
            saves: 0,
        }
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ProgressStore for MemoryStore {
    fn exists(&self) -> bool {
        self.slot.is_some()
    }

    fn save(&mut self, progress: &ProgressRecord) -> Result<(), SaveError> {
        self.slot = Some(progress.clone());
        self.saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<ProgressRecord>, SaveError> {
        Ok(self.slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(!store.exists());
        assert!(store.load().unwrap().is_none());

        store.save(&ProgressRecord::default()).unwrap();
        assert!(store.exists());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().unwrap(), Some(ProgressRecord::default()));
    }
}
