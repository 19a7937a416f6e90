/// Hostname used as the default remote prefix so several machines can share a bucket.
pub fn default_remote_prefix() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "daylog".to_string())
}

pub fn generate_starter_config() -> String {
    format!(
        r#"# =============================================================================
# DAYLOG CONFIGURATION
# =============================================================================
# Events are appended to one file per day inside storage.folder. Files older
# than the retention window are deleted whenever the day rolls over, and every
# retained file can be shipped to a remote bucket on demand.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/daylog/config.yml
#   3. /etc/daylog/config.yml
#
# Values written as $env{{...}} are read from the environment variable named
# between the braces.

# Days of history kept besides today. 0 keeps only today's file.
retention_days: 7

storage:
  folder: ~/.local/share/daylog/logs
  # Appended to the date part of every filename
  extension: .log
  # strftime pattern for the date part of the filename. It must encode the
  # full year, month and day.
  filename_format: '%Y-%m-%d'
  # strftime pattern for the timestamp at the start of every line
  line_format: '%Y-%m-%d %H:%M:%S%.3f'

# Remove this section to disable uploads.
remote:
  endpoint: https://objects.example.com
  region: us-east-1
  bucket: my-log-bucket
  access_key: $env{{DAYLOG_ACCESS_KEY}}
  secret_key: $env{{DAYLOG_SECRET_KEY}}
  # Folder inside the bucket
  prefix: {prefix}
  # Per-file upload timeout (optional)
  timeout: 60s
  max_concurrent: 4
"#,
        prefix = default_remote_prefix()
    )
}
