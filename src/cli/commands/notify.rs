//! Notify command - Apply a status pushed by the case-management service

use std::path::Path;

use crate::errors::Result;
use crate::schemas::CaseStatus;

use super::sync::print_outcome;
use super::{print_json, Workspace};

/// Fold `status` into the dossier holding `case_number`
pub async fn run(cwd: Option<&Path>, case_number: &str, status: CaseStatus, json: bool) -> Result<()> {
    let workspace = Workspace::open(cwd)?;
    let outcome = workspace
        .sync_service()?
        .apply_case_status(case_number, status)
        .await?;

    if json {
        return print_json(&outcome);
    }
    print_outcome(&outcome);
    Ok(())
}
