//! Workspace configuration.
//!
//! Loaded from `.annotag/config.toml` under the workspace root; an absent
//! file yields defaults. A user-level file under the platform config
//! directory supplies the fallback owner identity.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analytics::DEFAULT_SEGMENT_SIZE;

/// Directory holding the store and config under a workspace root.
pub const WORKSPACE_DIR: &str = ".annotag";

/// Store file name inside [`WORKSPACE_DIR`].
pub const STORE_FILE: &str = "annotag.sqlite3";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// Default owner identity, overridable by `--user` / `ANNOTAG_USER`.
    #[serde(default)]
    pub default_user: Option<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            analytics: AnalyticsConfig::default(),
            default_user: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Character width of a density segment.
    #[serde(default = "default_segment_size")]
    pub segment_size: usize,
    /// Default number of segments returned by density reports.
    #[serde(default = "default_top_n")]
    pub top_segments: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            segment_size: default_segment_size(),
            top_segments: default_top_n(),
        }
    }
}

const fn default_segment_size() -> usize {
    DEFAULT_SEGMENT_SIZE
}

const fn default_top_n() -> usize {
    10
}

/// Path of the SQLite store under `workspace_root`.
#[must_use]
pub fn store_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_DIR).join(STORE_FILE)
}

/// Load the workspace config, falling back to defaults when the file is
/// absent.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_workspace_config(workspace_root: &Path) -> Result<WorkspaceConfig> {
    let path = workspace_root.join(WORKSPACE_DIR).join("config.toml");
    if !path.exists() {
        return Ok(WorkspaceConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<WorkspaceConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Fallback owner identity from the user-level config file, if any.
#[must_use]
pub fn user_level_default_owner() -> Option<String> {
    let path = dirs::config_dir()?.join("annotag/config.toml");
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str::<WorkspaceConfig>(&content)
        .ok()
        .and_then(|config| config.default_user)
}
