//! Intake command - Record the eligibility intake answers

use std::path::Path;

use serde_json::json;

use crate::errors::{ParcoursError, Result};

use super::{print_json, Workspace};

/// Store the intake snapshot read from `file`; an existing snapshot is kept.
pub async fn run(cwd: Option<&Path>, owner: &str, file: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| ParcoursError::wrap(e, format!("Failed to read {}", file.display())))?;
    let snapshot: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| ParcoursError::InvalidJson(format!("{}: {}", file.display(), e)))?;

    let workspace = Workspace::open(cwd)?;
    let progression = workspace.progression();
    let journey = progression.find_or_create_journey(owner).await?;
    let recorded = progression.record_intake_snapshot(journey.id, snapshot).await?;

    if json {
        return print_json(&json!({ "journey_id": journey.id, "recorded": recorded }));
    }
    if recorded {
        println!("Intake recorded for journey {}", journey.id);
    } else {
        println!("Journey {} already has an intake, kept as is", journey.id);
    }
    Ok(())
}
