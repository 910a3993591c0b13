//! Dossier schema - The case filed externally for one step of one journey

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::step::{CaseStatus, Step};

/// Case record bound to a `(journey, step)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dossier {
    /// Schema version for forward compatibility
    pub schema_version: u32,

    pub id: Uuid,

    pub journey_id: Uuid,

    pub step: Step,

    /// Case number in the case-management service (null until filed there)
    #[serde(default)]
    pub external_case_number: Option<String>,

    /// Last status observed from the case-management service
    #[serde(default)]
    pub external_status: CaseStatus,

    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,

    /// Last time a sync changed the stored status
    #[serde(default)]
    pub last_sync_at: Option<DateTime<Utc>>,

    /// Set when the status becomes `Accepted`
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Dossier {
    /// Create a new dossier in the `Filing` status
    pub fn new(journey_id: Uuid, step: Step) -> Self {
        Dossier {
            schema_version: 1,
            id: Uuid::new_v4(),
            journey_id,
            step,
            external_case_number: None,
            external_status: CaseStatus::Filing,
            submitted_at: None,
            last_sync_at: None,
            decided_at: None,
            created_at: Utc::now(),
        }
    }

    // ===== IMMUTABLE BUILDER METHODS =====

    /// Return a new Dossier bound to the given case number
    pub fn with_case_number(mut self, case_number: Option<String>) -> Self {
        self.external_case_number = case_number;
        self
    }

    /// Return a new Dossier with the given submission time
    pub fn with_submitted_at(mut self, submitted_at: Option<DateTime<Utc>>) -> Self {
        self.submitted_at = submitted_at;
        self
    }

    /// Return a new Dossier carrying a status read at `synced_at`.
    ///
    /// A `decided_at` of `None` keeps the recorded decision time.
    pub fn with_external_status(
        mut self,
        status: CaseStatus,
        synced_at: DateTime<Utc>,
        decided_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.external_status = status;
        self.last_sync_at = Some(synced_at);
        if decided_at.is_some() {
            self.decided_at = decided_at;
        }
        self
    }

    /// Whether the case has been filed in the case-management service.
    ///
    /// A blank case number counts as not filed.
    pub fn is_accessible(&self) -> bool {
        self.external_case_number
            .as_deref()
            .is_some_and(|number| !number.trim().is_empty())
    }

    /// Link to the case in the case-management service.
    ///
    /// `template` contains a `{number}` placeholder.
    pub fn public_url(&self, template: &str) -> Option<String> {
        self.external_case_number
            .as_deref()
            .map(|number| template.replace("{number}", number))
    }
}
