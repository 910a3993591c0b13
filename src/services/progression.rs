//! Guarded journey transitions
//!
//! Each operation reads the journey, decides with the guards, then writes.
//! Stores give per-row atomicity only, so the dossier insert and the journey
//! write are two steps; the store's `(journey, step)` uniqueness constraint
//! is what actually prevents a double filing. A retry after a failed second
//! write picks the stored dossier up again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    apply_advance, apply_dossier_filed, apply_validation, next_action_label, permissions,
    Permissions,
};
use crate::errors::{ParcoursError, Result};
use crate::schemas::{CaseStatus, Dossier, Journey, JourneyState};
use crate::store::{DossierStore, JourneyStore, Store};

/// An external filing that already happened and now has to be recorded
#[derive(Debug, Clone, Default)]
pub struct DossierFiling {
    pub external_case_number: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Result of `move_to_next_step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Advance {
    pub state: JourneyState,
    pub complete: bool,
}

/// Everything a caller needs to render a journey
#[derive(Debug, Clone, Serialize)]
pub struct JourneyOverview {
    pub journey: Journey,
    pub permissions: Permissions,
    pub next_action: String,
    pub dossiers: Vec<Dossier>,
}

pub struct ProgressionService<S> {
    store: Arc<S>,
}

impl<S> Clone for ProgressionService<S> {
    fn clone(&self) -> Self {
        ProgressionService {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> ProgressionService<S> {
    pub fn new(store: Arc<S>) -> Self {
        ProgressionService { store }
    }

    /// Load a journey or fail with `NotFound`
    pub async fn get_journey(&self, journey_id: Uuid) -> Result<Journey> {
        self.store
            .find_journey(journey_id)
            .await?
            .ok_or_else(|| ParcoursError::NotFound(format!("journey {}", journey_id)))
    }

    /// Return the owner's journey, creating it on first access.
    pub async fn find_or_create_journey(&self, owner_id: &str) -> Result<Journey> {
        if let Some(journey) = self.store.find_journey_by_owner(owner_id).await? {
            return Ok(journey);
        }

        let journey = Journey::new(owner_id);
        match self.store.insert_journey(&journey).await {
            Ok(()) => {
                tracing::info!("Created journey {} for owner {}", journey.id, owner_id);
                Ok(journey)
            }
            // Lost a creation race, the winner's journey is the one
            Err(ParcoursError::Conflict(_)) => self
                .store
                .find_journey_by_owner(owner_id)
                .await?
                .ok_or_else(|| ParcoursError::NotFound(format!("journey of owner {}", owner_id))),
            Err(e) => Err(e),
        }
    }

    /// Record the intake snapshot; returns false if one was already stored.
    pub async fn record_intake_snapshot(
        &self,
        journey_id: Uuid,
        snapshot: serde_json::Value,
    ) -> Result<bool> {
        let written = self.store.set_intake_snapshot(journey_id, snapshot).await?;
        if !written {
            tracing::debug!("Journey {} already has an intake snapshot", journey_id);
        }
        Ok(written)
    }

    pub async fn journey_overview(&self, journey_id: Uuid) -> Result<JourneyOverview> {
        let journey = self.get_journey(journey_id).await?;
        let dossiers = self.store.list_dossiers(journey_id).await?;
        let state = journey.state();
        Ok(JourneyOverview {
            permissions: permissions(state),
            next_action: next_action_label(state),
            journey,
            dossiers,
        })
    }

    /// Record the dossier filed for the current step and move it to `Pending`.
    ///
    /// A `Filing` dossier already stored for the step with the same case
    /// number is taken over, so a call that failed after the insert can be
    /// retried.
    ///
    /// # Errors
    /// * `NotFound` - If the journey does not exist
    /// * `InvalidTransition` - If the step is not `Todo` or already has a dossier
    /// * `Conflict` - If a concurrent call inserted the step's dossier first
    pub async fn create_dossier_for_current_step(
        &self,
        journey_id: Uuid,
        filing: DossierFiling,
    ) -> Result<JourneyState> {
        let journey = self.get_journey(journey_id).await?;
        let state = journey.state();
        apply_dossier_filed(&journey).into_result()?;

        let dossier = match self.store.find_dossier(journey_id, state.step).await? {
            // Left by an attempt whose status write failed: finish that filing
            Some(existing)
                if existing.external_status == CaseStatus::Filing
                    && existing.external_case_number == filing.external_case_number =>
            {
                tracing::debug!(
                    "Journey {}: resuming filing of dossier {}",
                    journey_id,
                    existing.id
                );
                existing
            }
            Some(_) => {
                return Err(ParcoursError::InvalidTransition {
                    step: state.step,
                    status: state.status,
                    action: "create dossier",
                });
            }
            None => {
                let dossier = Dossier::new(journey_id, state.step)
                    .with_case_number(filing.external_case_number)
                    .with_submitted_at(filing.submitted_at);
                self.store.insert_dossier(&dossier).await?;
                dossier
            }
        };

        // Re-check against a fresh read right before the status write
        let fresh = self.get_journey(journey_id).await?;
        let (next, _) = apply_dossier_filed(&fresh).into_result()?;
        let updated = self.store.update_progress(journey_id, next.state()).await?;

        tracing::info!(
            "Journey {}: dossier {} filed for {} ({})",
            journey_id,
            dossier.id,
            state.step,
            dossier.external_case_number.as_deref().unwrap_or("no case number")
        );
        Ok(updated.state())
    }

    /// Move the current step from `Pending` to `Validated`.
    pub async fn validate_current_step(&self, journey_id: Uuid) -> Result<JourneyState> {
        let journey = self.get_journey(journey_id).await?;
        let (next, _) = apply_validation(&journey).into_result()?;
        let updated = self.store.update_progress(journey_id, next.state()).await?;

        tracing::info!("Journey {}: step {} validated", journey_id, updated.current_step);
        Ok(updated.state())
    }

    /// Leave a validated step, or close the journey on the last one.
    ///
    /// Calling it again on a completed journey is a no-op returning
    /// `complete = true`.
    pub async fn move_to_next_step(&self, journey_id: Uuid) -> Result<Advance> {
        let journey = self.get_journey(journey_id).await?;
        let now = Utc::now();
        let (next, complete) = apply_advance(&journey, now).into_result()?;

        if complete {
            let updated = if journey.is_completed() {
                journey
            } else {
                let updated = self.store.mark_completed(journey_id, now).await?;
                tracing::info!("Journey {} completed", journey_id);
                updated
            };
            return Ok(Advance {
                state: updated.state(),
                complete: true,
            });
        }

        let updated = self.store.update_progress(journey_id, next.state()).await?;
        tracing::info!(
            "Journey {}: advanced from {} to {}",
            journey_id,
            journey.current_step,
            updated.current_step
        );
        Ok(Advance {
            state: updated.state(),
            complete: false,
        })
    }
}
