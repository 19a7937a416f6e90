use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "daylog")]
#[command(about = "Daily event log files with retention and remote upload", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append an event to today's log file
    Log {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print the log file for a day (default: today)
    Cat {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List current log files
    List,
    /// Delete log files older than the retention window
    Purge,
    /// Delete every log file
    Clear,
    /// Upload every current log file to the remote bucket
    Upload {
        #[arg(long)]
        json: bool,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daylog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = daylog::config::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Init { stdout, output } => daylog::cli::config::init(stdout, output)?,
            ConfigAction::Validate => daylog::cli::config::validate(config_path)?,
        },
        command => {
            let logger = daylog::cli::open_logger(config_path.as_deref())?;
            match command {
                Commands::Log { text } => daylog::cli::logs::log(&logger, &text.join(" "))?,
                Commands::Cat { date } => daylog::cli::logs::cat(&logger, date)?,
                Commands::List => daylog::cli::logs::list(&logger)?,
                Commands::Purge => daylog::cli::logs::purge(&logger)?,
                Commands::Clear => daylog::cli::logs::clear(&logger)?,
                Commands::Upload { json } => daylog::cli::upload::upload(&logger, json).await?,
                Commands::Config { .. } => unreachable!("handled above"),
            }
        }
    }

    Ok(())
}
