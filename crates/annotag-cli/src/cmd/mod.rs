//! Command handlers, one module per command group.

pub mod annotate;
pub mod doc;
pub mod init;
pub mod label;
pub mod link;
pub mod stats;
pub mod tree;

use std::path::Path;

use annotag_core::{ErrorCode, config, db};
use rusqlite::Connection;

use crate::output::{CliError, OutputMode, render_error};
use crate::owner;

/// Open the workspace store, failing with a coded error when the
/// workspace was never initialized.
pub(crate) fn require_store(
    workspace_root: &Path,
    output: OutputMode,
) -> anyhow::Result<Connection> {
    let path = config::store_path(workspace_root);
    if !path.exists() {
        return Err(domain_failure(
            output,
            &format!("no annotag store at {}", path.display()),
            ErrorCode::NotInitialized,
        ));
    }
    db::open_store(&path)
}

/// Resolve the owner identity from flag, env, and config.
pub(crate) fn require_owner(
    workspace_root: &Path,
    user_flag: Option<&str>,
    output: OutputMode,
) -> anyhow::Result<String> {
    let config_default = config::load_workspace_config(workspace_root)
        .map(|config| config.default_user)
        .unwrap_or_default()
        .or_else(config::user_level_default_owner);

    owner::require_owner(user_flag, config_default.as_deref())
        .map_err(|error| domain_failure(output, &error.message, error.code))
}

/// Render a domain failure to the user and produce the matching error for
/// the command's result.
pub(crate) fn domain_failure(
    output: OutputMode,
    message: &str,
    code: ErrorCode,
) -> anyhow::Error {
    let _ = render_error(output, &CliError::new(message, code));
    anyhow::anyhow!("{message}")
}
