pub mod generate;
pub mod parse;
pub mod types;

use regex::Regex;
use std::path::{Path, PathBuf};

pub use parse::{load_config, parse_config, validate_config, ConfigError};
pub use types::{Config, RemoteConfig, StorageConfig};

/// Expands environment variables in a string.
/// Supports $env{VAR_NAME} syntax.
/// If an environment variable is not set, it's left unchanged.
pub fn expand_env_vars(text: &str) -> String {
    let re = Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();

    re.replace_all(text, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

/// Expands a leading `~` to the user's home directory.
/// Paths without a tilde, or with no resolvable home directory, are returned as-is.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home_dir) if rest.as_os_str().is_empty() => home_dir,
        Some(home_dir) => home_dir.join(rest),
        None => path.to_path_buf(),
    }
}

/// Default config locations, user-level first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home_dir) = dirs::home_dir() {
        candidates.push(home_dir.join(".config/daylog/config.yml"));
    }
    candidates.push(PathBuf::from("/etc/daylog/config.yml"));
    candidates
}

/// Resolves the config file path: the explicit path (tilde-expanded) when given,
/// otherwise the first existing entry of [`default_config_paths`].
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_tilde(path));
    }

    default_config_paths().into_iter().find(|p| p.exists())
}
