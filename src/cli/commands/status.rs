//! Status command - Show the journey of an owner

use std::path::Path;

use crate::errors::Result;
use crate::services::JourneyOverview;

use super::{print_json, Workspace};

/// Show the owner's journey, creating it on first access
pub async fn run(cwd: Option<&Path>, owner: &str, json: bool) -> Result<()> {
    let workspace = Workspace::open(cwd)?;
    let progression = workspace.progression();

    let journey = progression.find_or_create_journey(owner).await?;
    let overview = progression.journey_overview(journey.id).await?;

    if json {
        return print_json(&overview);
    }
    print_overview(&overview, &workspace.config.case_status.dossier_url_template);
    Ok(())
}

fn print_overview(overview: &JourneyOverview, url_template: &str) {
    let journey = &overview.journey;
    println!("Journey {} (owner {})", journey.id, journey.owner_id);
    println!(
        "  Step:     {} ({})",
        journey.current_step.title(),
        journey.current_step
    );
    println!("  Status:   {}", journey.current_status);
    if let Some(completed_at) = journey.completed_at {
        println!("  Completed {}", completed_at.format("%Y-%m-%d %H:%M"));
    }
    println!("  Next:     {}", overview.next_action);

    if overview.dossiers.is_empty() {
        return;
    }
    println!();
    println!("Dossiers:");
    for dossier in &overview.dossiers {
        let number = dossier.external_case_number.as_deref().unwrap_or("-");
        println!(
            "  {:<12} {:<8} {:<16} {}",
            dossier.step.to_string(),
            number,
            dossier.external_status.to_string(),
            dossier.public_url(url_template).unwrap_or_default()
        );
    }
}
