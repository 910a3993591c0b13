//! Sync command - Pull dossier statuses from the case-management service

use std::path::Path;

use serde_json::json;

use crate::errors::{ParcoursError, Result};
use crate::schemas::Step;
use crate::services::{SyncOutcome, SyncReport};

use super::{print_json, Workspace};

/// Sync one step of the owner's journey, or every stored dossier
pub async fn run(cwd: Option<&Path>, owner: &str, step: Option<Step>, json: bool) -> Result<()> {
    let workspace = Workspace::open(cwd)?;
    let journey = workspace.existing_journey(owner).await?;
    let sync = workspace.sync_service()?;

    match step {
        Some(step) => {
            let outcome = sync.sync_one(journey.id, step).await?;
            if json {
                return print_json(&outcome);
            }
            print_outcome(&outcome);
            Ok(())
        }
        None => {
            let report = sync.sync_journey(journey.id).await?;
            if json {
                print_json(&report_json(&report))?;
            } else {
                print_report(&report);
            }
            if report.is_clean() {
                Ok(())
            } else {
                Err(ParcoursError::wrap(
                    format!("{} dossier(s) could not be synced", report.failures.len()),
                    "Sync incomplete",
                ))
            }
        }
    }
}

pub(crate) fn report_json(report: &SyncReport) -> serde_json::Value {
    let failures: Vec<serde_json::Value> = report
        .failures
        .iter()
        .map(|f| {
            json!({
                "step": f.step,
                "case_number": f.case_number,
                "code": f.error.code(),
                "error": f.error.to_string(),
            })
        })
        .collect();
    json!({
        "total_updated": report.total_updated,
        "outcomes": report.outcomes,
        "failures": failures,
    })
}

pub(crate) fn print_outcome(outcome: &SyncOutcome) {
    match (outcome.old_status, outcome.new_status) {
        (_, None) => println!("{}: not accessible yet", outcome.step),
        (Some(old), Some(new)) if outcome.updated => {
            println!("{}: {} -> {}", outcome.step, old, new)
        }
        (_, Some(new)) => println!("{}: unchanged ({})", outcome.step, new),
    }
    if let Some(status) = outcome.journey_status {
        println!("  journey status now {}", status);
    }
}

pub(crate) fn print_report(report: &SyncReport) {
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }
    for failure in &report.failures {
        println!("{}: failed ({})", failure.step, failure.error);
    }
    println!(
        "{} updated, {} failed",
        report.total_updated,
        report.failures.len()
    );
}
