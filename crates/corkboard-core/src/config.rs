//! Project and user configuration, both TOML and both optional.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::storage::BOARD_DIR;

const CONFIG_FILE: &str = "config.toml";

/// `.corkboard/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret that unlocks the maintainer role. This is a
    /// convenience lock for a local board, not access control.
    #[serde(default = "default_maintainer_secret")]
    pub maintainer_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            maintainer_secret: default_maintainer_secret(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Baseline dataset to seed and re-sync from. Relative paths resolve
    /// against the project root. Unset means the bundled dataset.
    #[serde(default)]
    pub baseline: Option<PathBuf>,
    /// Extra columns, inserted before the terminal status.
    #[serde(default)]
    pub extra_statuses: Vec<String>,
}

/// `<config_dir>/corkboard/config.toml`: per-user preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Default output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

impl ProjectConfig {
    /// Absolute path of the configured baseline, if one is set.
    #[must_use]
    pub fn baseline_path(&self, project_root: &Path) -> Option<PathBuf> {
        self.board
            .baseline
            .as_ref()
            .map(|path| project_root.join(path))
    }
}

/// Where the project config of `project_root` lives.
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(BOARD_DIR).join(CONFIG_FILE)
}

/// Where the user config lives, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("corkboard").join(CONFIG_FILE))
}

/// Load `.corkboard/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    read_toml(&project_config_path(project_root))
}

/// Load the user config, falling back to defaults when absent.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    user_config_path().map_or_else(|| Ok(UserConfig::default()), |path| read_toml(&path))
}

fn read_toml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    debug!(path = %path.display(), "loading config");
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn output_mode_name(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "plain" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

/// Output mode name for this run.
///
/// `--json` beats `FORMAT`, which beats the user config, which beats TTY
/// detection. Unrecognized names are skipped.
#[must_use]
pub fn resolve_output(cli_json: bool, user_output: Option<&str>, env_format: Option<&str>) -> &'static str {
    if cli_json {
        return "json";
    }
    env_format
        .and_then(output_mode_name)
        .or_else(|| user_output.and_then(output_mode_name))
        .unwrap_or(if std::io::stdout().is_terminal() { "pretty" } else { "text" })
}

fn default_maintainer_secret() -> String {
    "letmein".to_string()
}
