//! Owner identity resolution for CLI commands.
//!
//! The resolution chain: `--user` flag > `ANNOTAG_USER` env > workspace
//! config `default_user` > user-level config > `USER` env (TTY only).
//! Every command is owner-scoped, so all of them require an identity.

use std::env;

use annotag_core::ErrorCode;

/// Errors from owner resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerResolutionError {
    /// Human-readable description.
    pub message: String,
    /// Machine error code.
    pub code: ErrorCode,
}

impl std::fmt::Display for OwnerResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for OwnerResolutionError {}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
    fn is_tty(&self) -> bool;
}

/// Real environment reader.
struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn is_tty(&self) -> bool {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal()
    }
}

/// Core resolution logic, parameterized by environment reader.
fn resolve_owner_with(
    cli_flag: Option<&str>,
    config_default: Option<&str>,
    env: &dyn EnvReader,
) -> Option<String> {
    // Step 1: explicit --user flag
    if let Some(user) = cli_flag {
        if !user.is_empty() {
            return Some(user.to_string());
        }
    }

    // Step 2: ANNOTAG_USER env
    if let Some(val) = env.get("ANNOTAG_USER") {
        return Some(val);
    }

    // Step 3: config default (workspace first, then user-level)
    if let Some(user) = config_default {
        if !user.is_empty() {
            return Some(user.to_string());
        }
    }

    // Step 4: USER env, but only if stdin is a TTY
    if env.is_tty() {
        if let Some(val) = env.get("USER") {
            return Some(val);
        }
    }

    None
}

/// Resolve the owner identity or fail with a coded error.
///
/// # Errors
///
/// Returns an error when no identity can be resolved.
pub fn require_owner(
    cli_flag: Option<&str>,
    config_default: Option<&str>,
) -> Result<String, OwnerResolutionError> {
    resolve_owner_with(cli_flag, config_default, &RealEnv).ok_or_else(|| OwnerResolutionError {
        message: "no owner identity: set --user, ANNOTAG_USER, or default_user in config"
            .to_string(),
        code: ErrorCode::NotInitialized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeEnv {
        vars: HashMap<&'static str, &'static str>,
        tty: bool,
    }

    impl EnvReader for FakeEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.vars.get(key).map(ToString::to_string)
        }

        fn is_tty(&self) -> bool {
            self.tty
        }
    }

    fn env(vars: &[(&'static str, &'static str)], tty: bool) -> FakeEnv {
        FakeEnv {
            vars: vars.iter().copied().collect(),
            tty,
        }
    }

    #[test]
    fn flag_wins_over_everything() {
        let fake = env(&[("ANNOTAG_USER", "env-user"), ("USER", "shell")], true);
        let owner = resolve_owner_with(Some("flag-user"), Some("config-user"), &fake);
        assert_eq!(owner.as_deref(), Some("flag-user"));
    }

    #[test]
    fn env_beats_config_default() {
        let fake = env(&[("ANNOTAG_USER", "env-user")], false);
        let owner = resolve_owner_with(None, Some("config-user"), &fake);
        assert_eq!(owner.as_deref(), Some("env-user"));
    }

    #[test]
    fn config_default_beats_shell_user() {
        let fake = env(&[("USER", "shell")], true);
        let owner = resolve_owner_with(None, Some("config-user"), &fake);
        assert_eq!(owner.as_deref(), Some("config-user"));
    }

    #[test]
    fn shell_user_requires_tty() {
        let fake = env(&[("USER", "shell")], false);
        assert_eq!(resolve_owner_with(None, None, &fake), None);

        let fake = env(&[("USER", "shell")], true);
        assert_eq!(
            resolve_owner_with(None, None, &fake).as_deref(),
            Some("shell")
        );
    }

    #[test]
    fn empty_flag_is_ignored() {
        let fake = env(&[], false);
        assert_eq!(resolve_owner_with(Some(""), None, &fake), None);
    }
}
