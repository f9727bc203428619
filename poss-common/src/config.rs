//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "POSS_ROOT_FOLDER";

/// Environment variable carrying the Remove.bg API key
pub const REMOVEBG_API_KEY_ENV: &str = "POSS_REMOVEBG_API_KEY";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Overlay asset directory (default: `<root>/overlays`)
    pub overlays_dir: Option<PathBuf>,
    /// Composited output directory (default: `<root>/output`)
    pub output_dir: Option<PathBuf>,
    pub removebg_api_key: Option<String>,
    pub removebg_endpoint: Option<String>,
}

impl TomlConfig {
    /// Load the platform config file, falling back to defaults.
    ///
    /// A missing or malformed file is never fatal.
    pub fn load() -> Self {
        match load_config_file() {
            Ok(path) => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Resolve the Remove.bg API key: environment first, then TOML.
///
/// Blank values are treated as absent.
pub fn resolve_removebg_api_key(toml: &TomlConfig) -> Option<String> {
    std::env::var(REMOVEBG_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k))
        .or_else(|| toml.removebg_api_key.clone().filter(|k| is_valid_key(k)))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Get configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/possessao/config.toml first, then /etc/possessao/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("possessao").join("config.toml"));
        let system_config = PathBuf::from("/etc/possessao/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let path = dirs::config_dir()
        .map(|d| d.join("possessao").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("possessao"))
        .unwrap_or_else(|| PathBuf::from("./possessao_data"))
}

/// Paths derived from the resolved root folder
#[derive(Debug, Clone)]
pub struct RootFolder {
    root: PathBuf,
    overlays_dir: PathBuf,
    output_dir: PathBuf,
}

impl RootFolder {
    pub fn new(root: PathBuf, toml: &TomlConfig) -> Self {
        let overlays_dir = toml
            .overlays_dir
            .clone()
            .unwrap_or_else(|| root.join("overlays"));
        let output_dir = toml
            .output_dir
            .clone()
            .unwrap_or_else(|| root.join("output"));
        Self {
            root,
            overlays_dir,
            output_dir,
        }
    }

    /// Create the root, overlay and output directories if missing
    pub fn ensure_directories_exist(&self) -> Result<()> {
        for dir in [&self.root, &self.overlays_dir, &self.output_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join("possessao.db")
    }

    pub fn overlays_dir(&self) -> &Path {
        &self.overlays_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
