use crate::config::generate::generate_starter_config;
use crate::config::default_config_paths;
use std::fs;
use std::path::PathBuf;

pub fn init(stdout: bool, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    let config_path = match output {
        Some(path) => path,
        None => first_writable_location()?,
    };

    if config_path.exists() {
        return Err(format!(
            "Config file already exists at {}. Remove it first or use --stdout to print the config",
            config_path.display()
        )
        .into());
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config_path, config_content)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

/// Picks the first default location whose directory can be created.
fn first_writable_location() -> Result<PathBuf, Box<dyn std::error::Error>> {
    for candidate in default_config_paths() {
        let Some(parent) = candidate.parent() else {
            continue;
        };
        match fs::create_dir_all(parent) {
            Ok(()) => return Ok(candidate),
            Err(e) => {
                tracing::warn!(
                    dir = %parent.display(),
                    error = %e,
                    "Cannot create config directory"
                );
            }
        }
    }
    Err("no writable config location found, use --output or --stdout".into())
}

pub fn validate(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path.ok_or("No config file found. Use --config to specify a path.")?;

    println!("Validating config file: {}", path.display());

    match crate::config::load_config(&path) {
        Ok(config) => {
            println!("✓ Config is valid");
            println!("  folder:    {}", config.storage.folder.display());
            println!("  retention: {} day(s)", config.retention_days);
            match &config.remote {
                Some(remote) => println!("  remote:    {}/{}", remote.endpoint, remote.bucket),
                None => println!("  remote:    not configured"),
            }
            Ok(())
        }
        Err(e) => Err(format!("✗ Config validation failed:\n{}", e).into()),
    }
}
