//! Persistence ports for journeys and dossiers
//!
//! Implementations must make each call atomic for the row it touches and
//! must reject a second journey for an owner or a second dossier for a
//! `(journey, step)` pair with [`ParcoursError::Conflict`].
//!
//! [`ParcoursError::Conflict`]: crate::errors::ParcoursError::Conflict

#[cfg(test)]
mod failing;
mod file;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::Result;
use crate::schemas::{CaseStatus, Dossier, Journey, JourneyState, Step};

#[cfg(test)]
pub(crate) use failing::FailingStore;
pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait JourneyStore: Send + Sync {
    async fn find_journey(&self, id: Uuid) -> Result<Option<Journey>>;

    async fn find_journey_by_owner(&self, owner_id: &str) -> Result<Option<Journey>>;

    /// Insert a new journey; `Conflict` if the owner already has one
    async fn insert_journey(&self, journey: &Journey) -> Result<()>;

    /// Write the step and status of a journey
    async fn update_progress(&self, id: Uuid, state: JourneyState) -> Result<Journey>;

    /// Record the intake snapshot unless one is already present.
    ///
    /// Returns whether the snapshot was written.
    async fn set_intake_snapshot(&self, id: Uuid, snapshot: serde_json::Value) -> Result<bool>;

    /// Stamp `completed_at` unless already set
    async fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<Journey>;
}

#[async_trait]
pub trait DossierStore: Send + Sync {
    async fn find_dossier(&self, journey_id: Uuid, step: Step) -> Result<Option<Dossier>>;

    async fn find_dossier_by_case_number(&self, case_number: &str) -> Result<Option<Dossier>>;

    /// Dossiers of a journey, in step order
    async fn list_dossiers(&self, journey_id: Uuid) -> Result<Vec<Dossier>>;

    /// Insert a new dossier; `Conflict` if its step already has one
    async fn insert_dossier(&self, dossier: &Dossier) -> Result<()>;

    /// Write the observed external status together with its sync timestamps.
    ///
    /// A `None` decision time keeps the stored one.
    async fn update_external_status(
        &self,
        id: Uuid,
        status: CaseStatus,
        last_sync_at: DateTime<Utc>,
        decided_at: Option<DateTime<Utc>>,
    ) -> Result<Dossier>;
}

/// Both stores behind one handle; every concrete store implements both.
pub trait Store: JourneyStore + DossierStore {}

impl<T: JourneyStore + DossierStore> Store for T {}
