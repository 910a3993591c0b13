//! External-to-internal status policy

use crate::schemas::{CaseStatus, Status};

/// Map the status reported by the case-management service onto the
/// internal vocabulary. `None` stands for "no case" or "case not found".
///
/// Rejected and dismissed cases stay `Pending`; only the dossier keeps the
/// distinction.
pub fn internal_status_for(external: Option<CaseStatus>) -> Status {
    match external {
        None => Status::Todo,
        Some(CaseStatus::Filing) => Status::Todo,
        Some(CaseStatus::UnderReview) => Status::Pending,
        Some(CaseStatus::Accepted) => Status::Validated,
        Some(CaseStatus::Rejected) => Status::Pending,
        Some(CaseStatus::Dismissed) => Status::Pending,
    }
}
