pub mod config;
pub mod logs;
pub mod upload;

use crate::config::load_config;
use crate::logger::Logger;
use std::path::Path;

/// Loads the config at `config_path` and builds a logger from it.
pub fn open_logger(config_path: Option<&Path>) -> Result<Logger, Box<dyn std::error::Error>> {
    let Some(path) = config_path else {
        return Err(concat!(
            "config not found. Searched ~/.config/daylog/config.yml and /etc/daylog/config.yml.\n",
            "Use --config <path> to specify a config file, ",
            "or run 'daylog config init' to generate one."
        )
        .into());
    };

    tracing::debug!(config_path = %path.display(), "Loading configuration");
    let config = load_config(path)?;
    Ok(Logger::new(config)?)
}
