//! `ann init` — create the workspace store and default config.

use std::path::Path;

use annotag_core::{config, db};
use clap::Args;

use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Owner identity written to the workspace config as default_user.
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run_init(
    args: &InitArgs,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let store = config::store_path(workspace_root);
    let _conn = db::open_store(&store)?;

    let config_path = workspace_root
        .join(config::WORKSPACE_DIR)
        .join("config.toml");
    if !config_path.exists() {
        let defaults = config::WorkspaceConfig {
            default_user: args.user.clone(),
            ..Default::default()
        };
        std::fs::write(&config_path, toml::to_string_pretty(&defaults)?)?;
    }

    tracing::info!(store = %store.display(), "workspace initialized");
    render_success(
        output,
        &format!("Initialized annotag workspace at {}", store.display()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_store_and_config() {
        let dir = TempDir::new().expect("temp dir");
        let args = InitArgs {
            user: Some("ada".to_string()),
        };
        run_init(&args, OutputMode::Human, dir.path()).expect("init");

        assert!(config::store_path(dir.path()).exists());
        let config = config::load_workspace_config(dir.path()).expect("load config");
        assert_eq!(config.default_user.as_deref(), Some("ada"));
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().expect("temp dir");
        let args = InitArgs { user: None };
        run_init(&args, OutputMode::Human, dir.path()).expect("first init");
        run_init(&args, OutputMode::Human, dir.path()).expect("second init");
    }
}
