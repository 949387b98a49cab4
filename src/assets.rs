//! Asset lookup by name
//!
//! Modes never open files. They ask the [`AssetProvider`] for a tile map's
//! text, and the front-end resolves image, sound and font keys to paths.
//! [`MemoryAssets`] lets tests hand in map JSON directly.

use crate::error::GameError;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait AssetProvider {
    /// Raw JSON of the map named `name`.
    fn tilemap(&self, name: &str) -> Result<String, GameError>;

    fn image(&self, _key: &str) -> Option<PathBuf> {
        None
    }

    fn sound(&self, _key: &str) -> Option<PathBuf> {
        None
    }

    fn font(&self, _key: &str) -> Option<PathBuf> {
        None
    }
}

/// Reads from an `assets/` directory laid out as `maps/`, `images/`,
/// `sound/`, `music/` and `fonts/`.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl AsRef<Path>) -> Self {
        DirectoryAssets {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn existing(&self, dir: &str, key: &str, extensions: &[&str]) -> Option<PathBuf> {
        extensions
            .iter()
            .map(|ext| self.root.join(dir).join(format!("{}.{}", key, ext)))
            .find(|path| path.exists())
    }
}

impl AssetProvider for DirectoryAssets {
    fn tilemap(&self, name: &str) -> Result<String, GameError> {
        let path = self.root.join("maps").join(format!("{}.json", name));
        debug!("loading map {}", path.display());
        fs::read_to_string(&path).map_err(|_| GameError::MissingAsset(path.display().to_string()))
    }

    fn image(&self, key: &str) -> Option<PathBuf> {
        self.existing("images", key, &["png"])
    }

    fn sound(&self, key: &str) -> Option<PathBuf> {
        self.existing("sound", key, &["ogg", "wav"])
    }

    fn font(&self, key: &str) -> Option<PathBuf> {
        self.existing("fonts", key, &["ttf"])
    }
}

/// In-memory maps, for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    maps: HashMap<String, String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(mut self, name: &str, json: &str) -> Self {
        self.maps.insert(name.to_string(), json.to_string());
        self
    }
}

impl AssetProvider for MemoryAssets {
    fn tilemap(&self, name: &str) -> Result<String, GameError> {
        self.maps
            .get(name)
            .cloned()
            .ok_or_else(|| GameError::MissingAsset(format!("maps/{}.json", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_assets() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("maps")).unwrap();
        fs::write(dir.path().join("maps").join("town.json"), "{}").unwrap();

        let assets = DirectoryAssets::new(dir.path());
        assert_eq!(assets.tilemap("town").unwrap(), "{}");
        assert!(matches!(assets.tilemap("castle"), Err(GameError::MissingAsset(_))));
        assert!(assets.image("player").is_none());
    }

    #[test]
    fn test_memory_assets() {
        let assets = MemoryAssets::new().with_map("house", "{\"width\": 5}");
        assert!(assets.tilemap("house").is_ok());
        assert!(assets.tilemap("overworld").is_err());
    }
}
