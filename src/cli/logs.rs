use crate::logger::Logger;
use crate::retention::PurgeReport;
use chrono::{Local, NaiveDate};

pub fn log(logger: &Logger, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    logger.log_event(text)?;
    Ok(())
}

pub fn cat(logger: &Logger, date: Option<NaiveDate>) -> Result<(), Box<dyn std::error::Error>> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    match logger.read_log_file(date)? {
        Some(contents) => {
            print!("{}", contents);
            Ok(())
        }
        None => Err(format!("no log file for {}", date).into()),
    }
}

pub fn list(logger: &Logger) -> Result<(), Box<dyn std::error::Error>> {
    for file in logger.log_files()? {
        let size = std::fs::metadata(&file.path).map(|m| m.len()).unwrap_or(0);
        println!("{}  {:>10}  {}", file.date, size, file.path.display());
    }
    Ok(())
}

pub fn purge(logger: &Logger) -> Result<(), Box<dyn std::error::Error>> {
    let report = logger.enforce_retention()?;
    summarize("Purged", &report)
}

pub fn clear(logger: &Logger) -> Result<(), Box<dyn std::error::Error>> {
    let report = logger.remove_all_log_files()?;
    summarize("Removed", &report)
}

fn summarize(verb: &str, report: &PurgeReport) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} {} log file(s)", verb, report.removed.len());
    for failure in &report.failed {
        eprintln!("  failed: {}: {}", failure.path.display(), failure.source);
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("{} file(s) could not be deleted", report.failed.len()).into())
    }
}
