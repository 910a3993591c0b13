//! Step and status vocabularies
//!
//! `Step` and `Status` are owned by this system. `CaseStatus` is the finite set
//! of decisions the external case-management service may report for a dossier,
//! serialized with that service's wire names.

use serde::{Deserialize, Serialize};

/// One of the five ordered stages of a journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Choice of the partner organization (AMO)
    ChoixAmo,
    /// Eligibility check
    Eligibilite,
    /// Energy diagnostic
    Diagnostic,
    /// Cost estimate
    Devis,
    /// Invoicing
    Factures,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::ChoixAmo => write!(f, "choix_amo"),
            Step::Eligibilite => write!(f, "eligibilite"),
            Step::Diagnostic => write!(f, "diagnostic"),
            Step::Devis => write!(f, "devis"),
            Step::Factures => write!(f, "factures"),
        }
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "choix_amo" => Ok(Step::ChoixAmo),
            "eligibilite" => Ok(Step::Eligibilite),
            "diagnostic" => Ok(Step::Diagnostic),
            "devis" => Ok(Step::Devis),
            "factures" => Ok(Step::Factures),
            _ => Err(format!("Unknown step: {}", s)),
        }
    }
}

impl Step {
    /// Title shown to citizens
    pub fn title(&self) -> &'static str {
        match self {
            Step::ChoixAmo => "Choix de l'accompagnateur",
            Step::Eligibilite => "Éligibilité",
            Step::Diagnostic => "Diagnostic",
            Step::Devis => "Devis",
            Step::Factures => "Factures",
        }
    }
}

/// Internal progress of the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Nothing filed yet
    #[default]
    Todo,
    /// Dossier filed, awaiting a decision
    Pending,
    /// Step done
    Validated,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Todo => write!(f, "todo"),
            Status::Pending => write!(f, "pending"),
            Status::Validated => write!(f, "validated"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Status::Todo),
            "pending" => Ok(Status::Pending),
            "validated" => Ok(Status::Validated),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Decision state reported by the case-management service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CaseStatus {
    /// Citizen is still filling the case in
    #[default]
    #[serde(rename = "en_construction")]
    Filing,
    /// Case submitted and being examined
    #[serde(rename = "en_instruction")]
    UnderReview,
    #[serde(rename = "accepte")]
    Accepted,
    #[serde(rename = "refuse")]
    Rejected,
    /// Closed without a decision
    #[serde(rename = "sans_suite")]
    Dismissed,
}

impl CaseStatus {
    /// Wire name used by the case-management API
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Filing => "en_construction",
            CaseStatus::UnderReview => "en_instruction",
            CaseStatus::Accepted => "accepte",
            CaseStatus::Rejected => "refuse",
            CaseStatus::Dismissed => "sans_suite",
        }
    }

    /// Whether the service has reached a final decision for the case
    pub fn is_decided(&self) -> bool {
        matches!(
            self,
            CaseStatus::Accepted | CaseStatus::Rejected | CaseStatus::Dismissed
        )
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en_construction" => Ok(CaseStatus::Filing),
            "en_instruction" => Ok(CaseStatus::UnderReview),
            "accepte" => Ok(CaseStatus::Accepted),
            "refuse" => Ok(CaseStatus::Rejected),
            "sans_suite" => Ok(CaseStatus::Dismissed),
            _ => Err(format!("Unknown case status: {}", s)),
        }
    }
}

/// The `(step, status)` pair every guard decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JourneyState {
    pub step: Step,
    pub status: Status,
}

impl JourneyState {
    pub fn new(step: Step, status: Status) -> Self {
        JourneyState { step, status }
    }
}

impl Default for JourneyState {
    fn default() -> Self {
        JourneyState::new(Step::ChoixAmo, Status::Todo)
    }
}

impl std::fmt::Display for JourneyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.step, self.status)
    }
}
