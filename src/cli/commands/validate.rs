//! Validate command - Mark the current step as validated

use std::path::Path;

use crate::errors::Result;

use super::{print_json, Workspace};

pub async fn run(cwd: Option<&Path>, owner: &str, json: bool) -> Result<()> {
    let workspace = Workspace::open(cwd)?;
    let journey = workspace.existing_journey(owner).await?;
    let state = workspace.progression().validate_current_step(journey.id).await?;

    if json {
        return print_json(&state);
    }
    println!("{} validated", state.step.title());
    Ok(())
}
