use super::types::*;
use crate::config::{expand_env_vars, expand_tilde};
use crate::files::FilenameCodec;
use regex::Regex;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    use std::io::Read;

    let mut file = File::open(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        ))
    })?;

    let mut yaml_string = String::new();
    file.read_to_string(&mut yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })
}

/// Parse and validate a YAML config document.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    // Expand environment variables before parsing so credentials can stay out of the file
    let yaml_string = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml_string)?;

    let mut config: Config = serde_yaml::from_str(&yaml_string)?;
    config.storage.folder = expand_tilde(&config.storage.folder);

    validate_config(&config)?;
    Ok(config)
}

/// Checks for unexpanded environment variables and returns a helpful error.
/// References inside YAML comments are ignored.
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    let mut unexpanded_vars: Vec<String> = yaml_string
        .lines()
        .map(strip_comment)
        .flat_map(|line| re.captures_iter(line).map(|cap| cap[1].to_string()))
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    let error_msg = if unexpanded_vars.len() == 1 {
        format!(
            "Environment variable $env{{{0}}} is not set.\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variable: export {0}=...\n\
             2. Replace $env{{{0}}} in the config file with the actual value",
            unexpanded_vars[0]
        )
    } else {
        format!(
            "Environment variables are not set: {}\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variables\n\
             2. Replace the variables in the config file with actual values",
            unexpanded_vars.join(", ")
        )
    };

    Err(ConfigError::Validation(error_msg))
}

/// Returns the part of a YAML line before its comment, if any.
/// A `#` starts a comment at the beginning of a line or after whitespace,
/// outside quoted scalars.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev_is_space = true;

    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '#' && prev_is_space => return &line[..i],
            None => {}
        }
        prev_is_space = c.is_whitespace();
    }
    line
}

/// Validate a configuration built in code or parsed from YAML.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.retention_days < 0 {
        errors.push(format!(
            "retention_days must be zero or greater, got {}",
            config.retention_days
        ));
    }

    validate_storage(&config.storage, &mut errors);

    if let Some(remote) = &config.remote {
        validate_remote(remote, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_storage(storage: &StorageConfig, errors: &mut Vec<String>) {
    if storage.folder.as_os_str().is_empty() {
        errors.push("storage.folder cannot be empty".to_string());
    }

    if storage.extension.contains('/') || storage.extension.contains('\\') {
        errors.push(format!(
            "storage.extension '{}' cannot contain a path separator",
            storage.extension
        ));
    }

    if storage.line_format.trim().is_empty() {
        errors.push("storage.line_format cannot be empty".to_string());
    }

    let codec = FilenameCodec::new(&storage.filename_format, &storage.extension);
    if let Err(reason) = codec.check_round_trip() {
        errors.push(format!(
            "storage.filename_format '{}' {}",
            storage.filename_format, reason
        ));
    }
}

fn validate_remote(remote: &RemoteConfig, errors: &mut Vec<String>) {
    if remote.bucket.trim().is_empty() {
        errors.push("remote.bucket cannot be empty".to_string());
    }
    if remote.access_key.is_empty() {
        errors.push("remote.access_key cannot be empty".to_string());
    }
    if remote.secret_key.is_empty() {
        errors.push("remote.secret_key cannot be empty".to_string());
    }
    if let Err(e) = reqwest::Url::parse(&remote.endpoint) {
        errors.push(format!("remote.endpoint '{}' is not a valid URL: {}", remote.endpoint, e));
    }
    if remote.max_concurrent == 0 {
        errors.push("remote.max_concurrent must be at least 1".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(err: ConfigError) -> Vec<String> {
        match err {
            ConfigError::ValidationList(list) => list,
            other => panic!("expected validation list, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_retention_rejected() {
        let config = Config::new("/tmp/logs").with_retention_days(-1);
        let errors = messages(validate_config(&config).unwrap_err());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("retention_days"));
    }

    #[test]
    fn test_zero_retention_accepted() {
        let config = Config::new("/tmp/logs").with_retention_days(0);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_lossy_filename_format_rejected() {
        let mut config = Config::new("/tmp/logs");
        config.storage.filename_format = "%Y-%m".to_string();
        let errors = messages(validate_config(&config).unwrap_err());
        assert!(errors[0].contains("storage.filename_format"));
    }

    #[test]
    fn test_incomplete_remote_reports_every_field() {
        let config = Config::new("/tmp/logs").with_remote(RemoteConfig::new("nope", "", "", ""));
        let errors = messages(validate_config(&config).unwrap_err());
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_unexpanded_env_var() {
        let yaml = "storage:\n  folder: $env{DAYLOG_TEST_SURELY_UNSET}/logs\n";
        match parse_config(yaml) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("DAYLOG_TEST_SURELY_UNSET")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_commented_env_var_ignored() {
        let yaml = "# folder: $env{DAYLOG_TEST_SURELY_UNSET}\n\
                    storage:\n  folder: /tmp/logs # or $env{DAYLOG_TEST_SURELY_UNSET}\n";
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.storage.folder, std::path::PathBuf::from("/tmp/logs"));
    }

    #[test]
    fn test_hash_inside_value_is_not_a_comment() {
        assert_eq!(strip_comment("  folder: /tmp/a#b"), "  folder: /tmp/a#b");
        assert_eq!(strip_comment("  key: '# $env{X}'"), "  key: '# $env{X}'");
        assert_eq!(strip_comment("  key: value # note"), "  key: value ");
        assert_eq!(strip_comment("# whole line"), "");
    }
}
