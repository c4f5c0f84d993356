//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`CRS_ROOT_FOLDER`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! Every other path in the TOML file is optional; relative paths are resolved
//! against the root folder.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the project root folder
pub const ROOT_FOLDER_ENV: &str = "CRS_ROOT_FOLDER";

/// Default keyword group file, relative to the root folder
pub const DEFAULT_KEYWORD_GROUPS: &str = "data/word_groups/current_keyword_groups.json";
/// Default equivalency file, relative to the root folder
pub const DEFAULT_EQUIVALENCIES: &str = "data/word_groups/unique_word_groups.json";
/// Default phrase sheet consumed by `compile-keywords`
pub const DEFAULT_PHRASE_SHEET: &str = "data/word_groups/phrases_spreadsheet.csv";
/// Default relational output directory
pub const DEFAULT_RELATIONAL_OUTPUT: &str = "data/relational_output";

/// Configuration file contents
///
/// All fields are optional so a partial file (or none at all) still works.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Project root containing `schools/` and `data/`
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Keyword group JSON file
    #[serde(default)]
    pub keyword_groups: Option<PathBuf>,

    /// Equivalency JSON file
    #[serde(default)]
    pub equivalencies: Option<PathBuf>,

    /// Output directory for relational tables
    #[serde(default)]
    pub relational_output: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parse a TOML config file
///
/// A file that exists but cannot be read or parsed is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Where the configuration came from
///
/// Config is read before the tracing subscriber exists (the log level lives
/// in the file), so loading stays silent and binaries call [`ConfigSource::log`]
/// once tracing is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` or `CRS_CONFIG`
    Explicit(PathBuf),
    /// User or system config file
    Platform(PathBuf),
    /// No file found
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Platform(path) => Some(path),
            ConfigSource::Defaults => None,
        }
    }

    pub fn log(&self) {
        match self.path() {
            Some(path) => info!("Loaded config from {}", path.display()),
            None => warn!("No config file found, using defaults"),
        }
    }
}

/// Pick the config file: explicit path first, then the platform locations
pub fn locate_config(explicit: Option<&Path>) -> ConfigSource {
    match explicit {
        Some(path) => ConfigSource::Explicit(path.to_path_buf()),
        None => find_config_file().map_or(ConfigSource::Defaults, ConfigSource::Platform),
    }
}

/// Load the config file from an explicit path or the platform location
///
/// A missing platform file is not an error: defaults are used. A missing
/// explicit file is.
pub fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    load_config_from(&locate_config(explicit))
}

pub fn load_config_from(source: &ConfigSource) -> Result<TomlConfig> {
    match source.path() {
        Some(path) => load_toml_config(path),
        None => Ok(TomlConfig::default()),
    }
}

/// Resolve the project root folder following the 4-tier priority order
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Locate the platform config file, if one exists
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("crs").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/crs/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("crs"))
        .unwrap_or_else(|| PathBuf::from("./crs_data"))
}

/// Fully resolved paths for one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root_folder: PathBuf,
    pub keyword_groups: PathBuf,
    pub equivalencies: PathBuf,
    pub relational_output: PathBuf,
    pub log_level: String,
    pub config_source: ConfigSource,
}

impl Settings {
    /// Build settings from a root folder override and a loaded config
    pub fn from_config(cli_root: Option<&Path>, config: &TomlConfig) -> Self {
        let root_folder = resolve_root_folder(cli_root, config);

        Self {
            keyword_groups: under_root(&root_folder, config.keyword_groups.as_deref(), DEFAULT_KEYWORD_GROUPS),
            equivalencies: under_root(&root_folder, config.equivalencies.as_deref(), DEFAULT_EQUIVALENCIES),
            relational_output: under_root(
                &root_folder,
                config.relational_output.as_deref(),
                DEFAULT_RELATIONAL_OUTPUT,
            ),
            log_level: config.logging.level.clone(),
            config_source: ConfigSource::Defaults,
            root_folder,
        }
    }

    /// Load the config file (explicit or platform default) and resolve paths
    pub fn load(cli_root: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let source = locate_config(config_path);
        let config = load_config_from(&source)?;
        Ok(Self {
            config_source: source,
            ..Self::from_config(cli_root, &config)
        })
    }

    /// Directory holding the `priority`/`non_priority` school categories
    pub fn schools_dir(&self) -> PathBuf {
        self.root_folder.join("schools")
    }

    /// Phrase sheet consumed by `compile-keywords`
    pub fn phrase_sheet(&self) -> PathBuf {
        self.root_folder.join(DEFAULT_PHRASE_SHEET)
    }

    /// School status metrics file written by `update-metrics`
    pub fn metrics_file(&self) -> PathBuf {
        self.root_folder.join("metrics.csv")
    }
}

fn under_root(root: &Path, configured: Option<&Path>, default_rel: &str) -> PathBuf {
    match configured {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => root.join(path),
        None => root.join(default_rel),
    }
}
