//! Save manager for handling save/load operations
//!
//! One slot, overwritten on every checkpoint. Writes go to a temporary file
//! first and are renamed over the slot, so a crash mid-write leaves the
//! previous save intact.

use super::ProgressStore;
use super::types::*;
use crate::progress::ProgressRecord;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub struct SaveManager {
    save_directory: PathBuf,
}

impl SaveManager {
    /// Creates a new SaveManager with the given save directory
    ///
    /// The save directory will be created if it doesn't exist.
    pub fn new(save_directory: impl AsRef<Path>) -> Result<Self, SaveError> {
        let save_dir = save_directory.as_ref().to_path_buf();

        if !save_dir.exists() {
            fs::create_dir_all(&save_dir)?;
        }

        Ok(SaveManager {
            save_directory: save_dir,
        })
    }

    pub fn save_path(&self) -> PathBuf {
        self.save_directory.join(SAVE_FILE_NAME)
    }

    /// Save the progress record, replacing the slot atomically
    pub fn save_game(&self, progress: &ProgressRecord) -> Result<PathBuf, SaveError> {
        let filepath = self.save_path();
        let temp_path = self.save_directory.join(format!("{}.tmp", SAVE_FILE_NAME));

        let json = serde_json::to_string_pretty(&SaveFile::new(progress.clone()))?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &filepath)?;

        info!("Game saved to: {}", filepath.display());
        Ok(filepath)
    }

    /// Load the slot. A missing file is not an error: it means a first run.
    pub fn load_game(&self) -> Result<Option<SaveFile>, SaveError> {
        let filepath = self.save_path();

        if !filepath.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&filepath)?;
        if json.trim().is_empty() {
            warn!("save file {} is empty", filepath.display());
            return Err(SaveError::CorruptedData("empty save file".to_string()));
        }

        // Well-formed JSON holding impossible values is a corrupted save
        let save_file: SaveFile = serde_json::from_str(&json).map_err(|e| {
            if e.is_data() {
                warn!("save file {} is corrupted: {}", filepath.display(), e);
                SaveError::CorruptedData(e.to_string())
            } else {
                SaveError::Serialization(e)
            }
        })?;
        info!("Loaded save from {} ({})", filepath.display(), save_file.timestamp);
        Ok(Some(save_file))
    }

    pub fn save_exists(&self) -> bool {
        self.save_path().exists()
    }
}

impl ProgressStore for SaveManager {
    fn exists(&self) -> bool {
        self.save_exists()
    }

    fn save(&mut self, progress: &ProgressRecord) -> Result<(), SaveError> {
        self.save_game(progress).map(|_| ())
    }

    fn load(&self) -> Result<Option<ProgressRecord>, SaveError> {
        Ok(self.load_game()?.map(|file| file.progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_save_is_first_run() {
        let dir = TempDir::new().unwrap();
        let manager = SaveManager::new(dir.path()).unwrap();

        assert!(!manager.save_exists());
        assert!(manager.load_game().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut manager = SaveManager::new(dir.path().join("nested")).unwrap();

        let mut progress = ProgressRecord::default();
        progress.inventory.add_gold(250);
        progress.quest.talked_to_king = true;
        manager.save(&progress).unwrap();

        assert!(manager.exists());
        assert!(!dir.path().join("nested").join("save.json.tmp").exists());
        assert_eq!(manager.load().unwrap(), Some(progress));
    }

    #[test]
    fn test_save_overwrites_single_slot() {
        let dir = TempDir::new().unwrap();
        let mut manager = SaveManager::new(dir.path()).unwrap();

        let mut progress = ProgressRecord::default();
        manager.save(&progress).unwrap();
        progress.stats.level = 4;
        manager.save(&progress).unwrap();

        let loaded = manager.load().unwrap().unwrap();
        assert_eq!(loaded.stats.level, 4);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_corrupted_save() {
        let dir = TempDir::new().unwrap();
        let manager = SaveManager::new(dir.path()).unwrap();
        fs::write(manager.save_path(), "{ not json").unwrap();

        assert!(matches!(manager.load_game(), Err(SaveError::Serialization(_))));

        fs::write(manager.save_path(), "   ").unwrap();
        assert!(matches!(manager.load_game(), Err(SaveError::CorruptedData(_))));
    }

    #[test]
    fn test_health_above_maximum_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let mut manager = SaveManager::new(dir.path()).unwrap();
        manager.save(&ProgressRecord::default()).unwrap();

        let json = fs::read_to_string(manager.save_path()).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["progress"]["stats"]["health"]["current"] = serde_json::json!(200);
        fs::write(manager.save_path(), value.to_string()).unwrap();

        assert!(matches!(manager.load_game(), Err(SaveError::CorruptedData(_))));
        assert!(manager.load().is_err());
    }
}
