//! File command - Record the dossier filed for the current step

use std::path::Path;

use chrono::Utc;
use serde_json::json;

use crate::errors::Result;
use crate::services::DossierFiling;

use super::{print_json, Workspace};

/// Record a dossier for the owner's current step and move it to pending
pub async fn run(
    cwd: Option<&Path>,
    owner: &str,
    case_number: Option<&str>,
    json: bool,
) -> Result<()> {
    let workspace = Workspace::open(cwd)?;
    let progression = workspace.progression();
    let journey = progression.find_or_create_journey(owner).await?;

    let filing = DossierFiling {
        external_case_number: case_number.map(str::to_string),
        submitted_at: case_number.map(|_| Utc::now()),
    };
    let state = progression
        .create_dossier_for_current_step(journey.id, filing)
        .await?;

    if json {
        return print_json(&json!({ "journey_id": journey.id, "state": state }));
    }
    println!("Dossier filed for {}, journey now {}", state.step.title(), state);
    Ok(())
}
