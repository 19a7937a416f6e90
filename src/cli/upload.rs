use crate::logger::Logger;
use crate::upload::BatchOutcome;

pub async fn upload(logger: &Logger, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = logger.upload_all().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
    } else {
        println!(
            "Uploaded {}/{} file(s)",
            outcome.completed - outcome.failed,
            outcome.total
        );
        if let Some(error) = &outcome.error {
            eprintln!("Last error: {}", error);
        }
    }

    if outcome.success {
        Ok(())
    } else {
        Err(format!("{} of {} upload(s) failed", outcome.failed, outcome.total).into())
    }
}

fn outcome_json(outcome: &BatchOutcome) -> serde_json::Value {
    serde_json::json!({
        "success": outcome.success,
        "total": outcome.total,
        "completed": outcome.completed,
        "failed": outcome.failed,
        "error": outcome.error.as_ref().map(|e| e.to_string()),
    })
}
