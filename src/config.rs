/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
use crate::error::GameError;
use crate::progress::NewGameSettings;
use log::LevelFilter;
use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub assets_dir: PathBuf,
    pub save_dir: PathBuf,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    pub new_game: NewGameSettings,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub title: String,
}

impl WindowConfig {
    pub fn frame_ms(&self) -> u64 {
        1000 / u64::from(self.fps.max(1))
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    window: TomlWindow,
    #[serde(default)]
    paths: TomlPaths,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    new_game: TomlNewGame,
    #[serde(default)]
    rng: TomlRng,
}

#[derive(Deserialize, Debug)]
struct TomlWindow {
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
    #[serde(default = "default_fps")]
    fps: u32,
    #[serde(default = "default_title")]
    title: String,
}

#[derive(Deserialize, Debug)]
struct TomlPaths {
    #[serde(default = "default_assets_dir")]
    assets_dir: String,
    #[serde(default)]
    save_dir: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default)]
    file: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlNewGame {
    #[serde(default = "default_gold")]
    starting_gold: u32,
    #[serde(default = "default_health")]
    starting_health: u32,
    #[serde(default = "default_magic")]
    starting_magic: u32,
}

#[derive(Deserialize, Debug, Default)]
struct TomlRng {
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 608 }
fn default_fps() -> u32 { 60 }
fn default_title() -> String { "The Stolen Crown".into() }
fn default_assets_dir() -> String { "assets".into() }
fn default_log_level() -> String { "info".into() }
fn default_gold() -> u32 { 100 }
fn default_health() -> u32 { 70 }
fn default_magic() -> u32 { 70 }

impl Default for TomlWindow {
    fn default() -> Self {
        TomlWindow {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            title: default_title(),
        }
    }
}

impl Default for TomlPaths {
    fn default() -> Self {
        TomlPaths {
            assets_dir: default_assets_dir(),
            save_dir: None,
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlNewGame {
    fn default() -> Self {
        TomlNewGame {
            starting_gold: default_gold(),
            starting_health: default_health(),
            starting_magic: default_magic(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Parse a config document. Unlike [`GameConfig::load`], errors are
    /// reported instead of replaced by defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, GameError> {
        let toml_cfg: TomlConfig =
            toml::from_str(text).map_err(|e| GameError::Config(e.to_string()))?;
        Ok(Self::resolve(toml_cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve assets directory
        let assets_dir_str = &toml_cfg.paths.assets_dir;
        let assets_dir = if PathBuf::from(assets_dir_str).is_absolute() {
            PathBuf::from(assets_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(assets_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(assets_dir_str))
        };

        let save_dir = toml_cfg
            .paths
            .save_dir
            .map(PathBuf::from)
            .unwrap_or_else(default_save_dir);

        let log_level = toml_cfg.log.level.parse().unwrap_or_else(|_| {
            eprintln!("Warning: unknown log level '{}', using info", toml_cfg.log.level);
            LevelFilter::Info
        });

        GameConfig {
            window: WindowConfig {
                width: toml_cfg.window.width,
                height: toml_cfg.window.height,
                fps: toml_cfg.window.fps,
                title: toml_cfg.window.title,
            },
            assets_dir,
            save_dir,
            log_level,
            log_file: toml_cfg.log.file.map(PathBuf::from),
            new_game: NewGameSettings {
                starting_gold: toml_cfg.new_game.starting_gold,
                starting_health: toml_cfg.new_game.starting_health,
                starting_magic: toml_cfg.new_game.starting_magic,
            },
            seed: toml_cfg.rng.seed,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::resolve(TomlConfig::default(), &[])
    }
}

/// `<platform data dir>/stolen-crown`, or `./saves` when there is none.
fn default_save_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("stolen-crown"))
        .unwrap_or_else(|| PathBuf::from("./saves"))
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
///
/// Runs before logging is set up, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
