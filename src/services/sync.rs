//! Reconciliation with the case-management service
//!
//! Pulls the authoritative status of a dossier and folds any change into the
//! journey and dossier records, journey first. The guards are not consulted here: the
//! external service decides whether a step's outcome changed.
//!
//! A failed read never writes anything. A read that reports the stored status
//! writes nothing either, so `last_sync_at` only moves when the status does.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::internal_status_for;
use crate::errors::{ParcoursError, Result};
use crate::external::CaseStatusReader;
use crate::schemas::{CaseStatus, Dossier, JourneyState, Status, Step};
use crate::store::{DossierStore, JourneyStore, Store};

/// Outcome of syncing one dossier.
///
/// A status of `None` means the case is not accessible yet: no dossier, no
/// case number, or unknown to the external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub step: Step,
    pub updated: bool,
    pub old_status: Option<CaseStatus>,
    pub new_status: Option<CaseStatus>,
    /// Journey status after the sync, when the journey was written
    pub journey_status: Option<Status>,
}

impl SyncOutcome {
    fn unchanged(step: Step, status: Option<CaseStatus>, new_status: Option<CaseStatus>) -> Self {
        SyncOutcome {
            step,
            updated: false,
            old_status: status,
            new_status,
            journey_status: None,
        }
    }
}

/// A dossier to include in a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DossierRef {
    pub step: Step,
    pub external_case_number: Option<String>,
}

impl From<&Dossier> for DossierRef {
    fn from(dossier: &Dossier) -> Self {
        DossierRef {
            step: dossier.step,
            external_case_number: dossier.external_case_number.clone(),
        }
    }
}

/// A dossier a sweep could not sync
#[derive(Debug)]
pub struct SyncFailure {
    pub step: Step,
    pub case_number: Option<String>,
    pub error: ParcoursError,
}

/// Aggregate of a sweep over several dossiers
#[derive(Debug, Default)]
pub struct SyncReport {
    pub total_updated: usize,
    pub outcomes: Vec<SyncOutcome>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct SyncService<S, R> {
    store: Arc<S>,
    reader: Arc<R>,
}

impl<S, R> Clone for SyncService<S, R> {
    fn clone(&self) -> Self {
        SyncService {
            store: Arc::clone(&self.store),
            reader: Arc::clone(&self.reader),
        }
    }
}

impl<S: Store, R: CaseStatusReader> SyncService<S, R> {
    pub fn new(store: Arc<S>, reader: Arc<R>) -> Self {
        SyncService { store, reader }
    }

    /// Sync the dossier of one step of a journey.
    ///
    /// # Errors
    /// * `SyncFailed` - If the external read failed; nothing was written
    /// * `Storage` / `NotFound` - If a write or the journey lookup failed
    pub async fn sync_one(&self, journey_id: Uuid, step: Step) -> Result<SyncOutcome> {
        let dossier = self.store.find_dossier(journey_id, step).await?;
        self.sync_dossier(journey_id, step, dossier).await
    }

    /// Sync several dossiers of a journey, one after the other.
    ///
    /// A failing dossier is recorded in the report and the sweep goes on. A
    /// ref whose case number no longer matches the stored dossier fails with
    /// `Conflict` without reading the external service.
    pub async fn sync_all(&self, journey_id: Uuid, dossiers: &[DossierRef]) -> SyncReport {
        let mut report = SyncReport::default();
        for dossier in dossiers {
            match self.sync_ref(journey_id, dossier).await {
                Ok(outcome) => {
                    if outcome.updated {
                        report.total_updated += 1;
                    }
                    report.outcomes.push(outcome);
                }
                Err(error) => {
                    tracing::warn!(
                        "Journey {}: sync of {} failed: {}",
                        journey_id,
                        dossier.step,
                        error
                    );
                    report.failures.push(SyncFailure {
                        step: dossier.step,
                        case_number: dossier.external_case_number.clone(),
                        error,
                    });
                }
            }
        }
        tracing::info!(
            "Journey {}: {} dossier(s) synced, {} updated, {} failed",
            journey_id,
            report.outcomes.len(),
            report.total_updated,
            report.failures.len()
        );
        report
    }

    async fn sync_ref(&self, journey_id: Uuid, dossier_ref: &DossierRef) -> Result<SyncOutcome> {
        let dossier = self.store.find_dossier(journey_id, dossier_ref.step).await?;
        if let Some(stored) = &dossier {
            if stored.external_case_number != dossier_ref.external_case_number {
                return Err(ParcoursError::Conflict(format!(
                    "dossier for {} is bound to case {}, not {}",
                    dossier_ref.step,
                    stored.external_case_number.as_deref().unwrap_or("none"),
                    dossier_ref.external_case_number.as_deref().unwrap_or("none")
                )));
            }
        }
        self.sync_dossier(journey_id, dossier_ref.step, dossier).await
    }

    async fn sync_dossier(
        &self,
        journey_id: Uuid,
        step: Step,
        dossier: Option<Dossier>,
    ) -> Result<SyncOutcome> {
        let Some(dossier) = dossier else {
            tracing::debug!("Journey {}: no dossier for {}", journey_id, step);
            return Ok(SyncOutcome::unchanged(step, None, None));
        };
        let case_number = match dossier.external_case_number.clone() {
            Some(number) if dossier.is_accessible() => number,
            _ => {
                tracing::debug!("Journey {}: dossier for {} not filed yet", journey_id, step);
                return Ok(SyncOutcome::unchanged(step, None, None));
            }
        };

        let fetched = self
            .reader
            .case_status(&case_number)
            .await
            .map_err(|e| ParcoursError::SyncFailed {
                case_number: case_number.clone(),
                reason: e.to_string(),
            })?;

        match fetched {
            Some(status) => self.fold_status(&dossier, status).await,
            None => {
                tracing::debug!("Case {} not found in the case-management service", case_number);
                Ok(SyncOutcome::unchanged(
                    step,
                    Some(dossier.external_status),
                    None,
                ))
            }
        }
    }

    /// Sweep every stored dossier of a journey
    pub async fn sync_journey(&self, journey_id: Uuid) -> Result<SyncReport> {
        if self.store.find_journey(journey_id).await?.is_none() {
            return Err(ParcoursError::NotFound(format!("journey {}", journey_id)));
        }
        let refs: Vec<DossierRef> = self
            .store
            .list_dossiers(journey_id)
            .await?
            .iter()
            .map(DossierRef::from)
            .collect();
        Ok(self.sync_all(journey_id, &refs).await)
    }

    /// Fold a status pushed by the case-management service (webhook).
    pub async fn apply_case_status(
        &self,
        case_number: &str,
        status: CaseStatus,
    ) -> Result<SyncOutcome> {
        let dossier = self
            .store
            .find_dossier_by_case_number(case_number)
            .await?
            .ok_or_else(|| ParcoursError::NotFound(format!("dossier for case {}", case_number)))?;
        self.fold_status(&dossier, status).await
    }

    async fn fold_status(&self, dossier: &Dossier, fetched: CaseStatus) -> Result<SyncOutcome> {
        let old = dossier.external_status;
        if old == fetched {
            tracing::debug!("Dossier {} still {}", dossier.id, old);
            return Ok(SyncOutcome::unchanged(dossier.step, Some(old), Some(fetched)));
        }

        let journey = self
            .store
            .find_journey(dossier.journey_id)
            .await?
            .ok_or_else(|| ParcoursError::NotFound(format!("journey {}", dossier.journey_id)))?;

        let mut journey_status = None;
        let target = internal_status_for(Some(fetched));
        // Only the current step's dossier drives the journey status, and a
        // closed journey stays closed. The journey is written before the
        // dossier: until the dossier holds the new status, the next sync
        // sees a change and replays the whole fold.
        if journey.current_step == dossier.step
            && !journey.is_completed()
            && journey.current_status != target
        {
            let updated = self
                .store
                .update_progress(journey.id, JourneyState::new(journey.current_step, target))
                .await?;
            tracing::info!(
                "Journey {}: {} -> {} from case decision",
                journey.id,
                journey.current_status,
                updated.current_status
            );
            journey_status = Some(updated.current_status);
        }

        let now = Utc::now();
        let decided_at = (fetched == CaseStatus::Accepted).then_some(now);
        self.store
            .update_external_status(dossier.id, fetched, now, decided_at)
            .await?;
        tracing::info!(
            "Dossier {} ({}): {} -> {}",
            dossier.id,
            dossier.step,
            old,
            fetched
        );

        Ok(SyncOutcome {
            step: dossier.step,
            updated: true,
            old_status: Some(old),
            new_status: Some(fetched),
            journey_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::can_advance;
    use crate::external::{CaseStatusError, InMemoryCaseStatusReader};
    use crate::schemas::Journey;
    use crate::store::{FailingStore, MemoryStore};

    struct Fixture {
        store: Arc<MemoryStore>,
        reader: Arc<InMemoryCaseStatusReader>,
        sync: SyncService<MemoryStore, InMemoryCaseStatusReader>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let reader = Arc::new(InMemoryCaseStatusReader::new());
        let sync = SyncService::new(Arc::clone(&store), Arc::clone(&reader));
        Fixture {
            store,
            reader,
            sync,
        }
    }

    /// Journey at `(step, status)` with a `Filing` dossier for `step`
    async fn seed(fx: &Fixture, step: Step, status: Status, case_number: Option<&str>) -> Journey {
        let journey = Journey::new("citizen-1").with_state(JourneyState::new(step, status));
        fx.store.insert_journey(&journey).await.unwrap();
        let dossier =
            Dossier::new(journey.id, step).with_case_number(case_number.map(str::to_string));
        fx.store.insert_dossier(&dossier).await.unwrap();
        journey
    }

    async fn reload_dossier(fx: &Fixture, journey: &Journey, step: Step) -> Dossier {
        fx.store.find_dossier(journey.id, step).await.unwrap().unwrap()
    }

    async fn reload_journey(fx: &Fixture, journey: &Journey) -> Journey {
        fx.store.find_journey(journey.id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_no_dossier_is_not_accessible() {
        let fx = fixture();
        let journey = Journey::new("citizen-1");
        fx.store.insert_journey(&journey).await.unwrap();

        let outcome = fx.sync.sync_one(journey.id, Step::ChoixAmo).await.unwrap();
        assert!(!outcome.updated);
        assert_eq!(outcome.new_status, None);
        assert_eq!(fx.reader.calls(), 0);
    }

    #[tokio::test]
    async fn test_dossier_without_case_number_is_not_accessible() {
        let fx = fixture();
        let journey = seed(&fx, Step::ChoixAmo, Status::Pending, None).await;

        let outcome = fx.sync.sync_one(journey.id, Step::ChoixAmo).await.unwrap();
        assert!(!outcome.updated);
        assert_eq!(outcome.old_status, None);
        assert_eq!(fx.reader.calls(), 0);
    }

    #[tokio::test]
    async fn test_under_review_updates_dossier_only() {
        let fx = fixture();
        let journey = seed(&fx, Step::Eligibilite, Status::Pending, Some("500")).await;
        fx.reader.set_status("500", CaseStatus::UnderReview).await;

        let outcome = fx.sync.sync_one(journey.id, Step::Eligibilite).await.unwrap();

        assert!(outcome.updated);
        assert_eq!(outcome.old_status, Some(CaseStatus::Filing));
        assert_eq!(outcome.new_status, Some(CaseStatus::UnderReview));
        assert_eq!(outcome.journey_status, None);
        assert_eq!(
            reload_dossier(&fx, &journey, Step::Eligibilite).await.external_status,
            CaseStatus::UnderReview
        );
        assert_eq!(
            reload_journey(&fx, &journey).await.current_status,
            Status::Pending
        );
    }

    #[tokio::test]
    async fn test_accepted_validates_the_step() {
        let fx = fixture();
        let journey = seed(&fx, Step::Eligibilite, Status::Pending, Some("500")).await;
        fx.reader.set_status("500", CaseStatus::Accepted).await;

        let outcome = fx.sync.sync_one(journey.id, Step::Eligibilite).await.unwrap();

        assert!(outcome.updated);
        assert_eq!(outcome.journey_status, Some(Status::Validated));
        let stored = reload_dossier(&fx, &journey, Step::Eligibilite).await;
        assert!(stored.decided_at.is_some());
        assert!(stored.last_sync_at.is_some());
        let after = reload_journey(&fx, &journey).await;
        assert_eq!(after.current_step, Step::Eligibilite);
        assert_eq!(after.current_status, Status::Validated);
        assert!(can_advance(after.state()));
    }

    #[tokio::test]
    async fn test_rejected_stays_pending() {
        let fx = fixture();
        let journey = seed(&fx, Step::Devis, Status::Pending, Some("77")).await;
        fx.reader.set_status("77", CaseStatus::Rejected).await;

        let outcome = fx.sync.sync_one(journey.id, Step::Devis).await.unwrap();

        assert!(outcome.updated);
        let stored = reload_dossier(&fx, &journey, Step::Devis).await;
        assert_eq!(stored.external_status, CaseStatus::Rejected);
        assert!(stored.decided_at.is_none());
        assert_eq!(reload_journey(&fx, &journey).await.current_status, Status::Pending);
    }

    #[tokio::test]
    async fn test_second_sync_is_a_no_op() {
        let fx = fixture();
        let journey = seed(&fx, Step::Diagnostic, Status::Pending, Some("9")).await;
        fx.reader.set_status("9", CaseStatus::UnderReview).await;

        let first = fx.sync.sync_one(journey.id, Step::Diagnostic).await.unwrap();
        let synced_at = reload_dossier(&fx, &journey, Step::Diagnostic).await.last_sync_at;
        let second = fx.sync.sync_one(journey.id, Step::Diagnostic).await.unwrap();

        assert!(first.updated);
        assert!(!second.updated);
        assert_eq!(second.old_status, second.new_status);
        assert_eq!(
            reload_dossier(&fx, &journey, Step::Diagnostic).await.last_sync_at,
            synced_at
        );
    }

    #[tokio::test]
    async fn test_unchanged_status_never_timestamps() {
        let fx = fixture();
        let journey = seed(&fx, Step::Diagnostic, Status::Pending, Some("9")).await;
        fx.reader.set_status("9", CaseStatus::Filing).await;

        for _ in 0..2 {
            let outcome = fx.sync.sync_one(journey.id, Step::Diagnostic).await.unwrap();
            assert!(!outcome.updated);
        }
        assert!(reload_dossier(&fx, &journey, Step::Diagnostic)
            .await
            .last_sync_at
            .is_none());
    }

    #[tokio::test]
    async fn test_failed_read_mutates_nothing() {
        let fx = fixture();
        let journey = seed(&fx, Step::Devis, Status::Pending, Some("13")).await;
        fx.reader
            .set_failure("13", CaseStatusError::Http { status: 503 })
            .await;
        let before_dossier = reload_dossier(&fx, &journey, Step::Devis).await;
        let before_journey = reload_journey(&fx, &journey).await;

        let err = fx.sync.sync_one(journey.id, Step::Devis).await.unwrap_err();

        assert!(matches!(err, ParcoursError::SyncFailed { .. }));
        assert!(err.is_retryable());
        assert_eq!(reload_dossier(&fx, &journey, Step::Devis).await, before_dossier);
        assert_eq!(reload_journey(&fx, &journey).await, before_journey);
    }

    #[tokio::test]
    async fn test_timeout_is_a_sync_failure() {
        let fx = fixture();
        let journey = seed(&fx, Step::Devis, Status::Pending, Some("13")).await;
        fx.reader.set_failure("13", CaseStatusError::Timeout).await;

        let err = fx.sync.sync_one(journey.id, Step::Devis).await.unwrap_err();
        assert_eq!(err.code(), "SYNC_FAILED");
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_not_found_externally_keeps_state() {
        let fx = fixture();
        let journey = seed(&fx, Step::Devis, Status::Pending, Some("404")).await;

        let outcome = fx.sync.sync_one(journey.id, Step::Devis).await.unwrap();

        assert!(!outcome.updated);
        assert_eq!(outcome.old_status, Some(CaseStatus::Filing));
        assert_eq!(outcome.new_status, None);
        assert_eq!(reload_journey(&fx, &journey).await.current_status, Status::Pending);
    }

    #[tokio::test]
    async fn test_past_step_dossier_does_not_touch_journey_status() {
        let fx = fixture();
        let journey = seed(&fx, Step::ChoixAmo, Status::Validated, Some("1")).await;
        fx.store
            .update_progress(journey.id, JourneyState::new(Step::Eligibilite, Status::Todo))
            .await
            .unwrap();
        fx.reader.set_status("1", CaseStatus::UnderReview).await;

        let outcome = fx.sync.sync_one(journey.id, Step::ChoixAmo).await.unwrap();

        assert!(outcome.updated);
        assert_eq!(outcome.journey_status, None);
        let after = reload_journey(&fx, &journey).await;
        assert_eq!(after.state(), JourneyState::new(Step::Eligibilite, Status::Todo));
    }

    #[tokio::test]
    async fn test_sync_all_tolerates_partial_failure() {
        let fx = fixture();
        let journey = seed(&fx, Step::ChoixAmo, Status::Validated, Some("1")).await;
        fx.store
            .update_progress(journey.id, JourneyState::new(Step::Eligibilite, Status::Pending))
            .await
            .unwrap();
        fx.store
            .insert_dossier(
                &Dossier::new(journey.id, Step::Eligibilite)
                    .with_case_number(Some("2".to_string())),
            )
            .await
            .unwrap();
        fx.reader.set_failure("1", CaseStatusError::Timeout).await;
        fx.reader.set_status("2", CaseStatus::Accepted).await;

        let refs = vec![
            DossierRef {
                step: Step::ChoixAmo,
                external_case_number: Some("1".to_string()),
            },
            DossierRef {
                step: Step::Eligibilite,
                external_case_number: Some("2".to_string()),
            },
        ];
        let report = fx.sync.sync_all(journey.id, &refs).await;

        assert_eq!(report.total_updated, 1);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.failures[0].step, Step::ChoixAmo);
        assert_eq!(report.failures[0].case_number.as_deref(), Some("1"));
        assert_eq!(
            reload_journey(&fx, &journey).await.current_status,
            Status::Validated
        );
    }

    #[tokio::test]
    async fn test_sync_journey_uses_stored_dossiers() {
        let fx = fixture();
        let journey = seed(&fx, Step::ChoixAmo, Status::Pending, Some("31")).await;
        fx.reader.set_status("31", CaseStatus::Accepted).await;

        let report = fx.sync.sync_journey(journey.id).await.unwrap();
        assert_eq!(report.total_updated, 1);
        assert!(report.is_clean());

        let missing = fx.sync.sync_journey(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(missing, ParcoursError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_apply_case_status_from_webhook() {
        let fx = fixture();
        let journey = seed(&fx, Step::Factures, Status::Pending, Some("808")).await;

        let outcome = fx
            .sync
            .apply_case_status("808", CaseStatus::Accepted)
            .await
            .unwrap();
        assert!(outcome.updated);
        assert_eq!(outcome.journey_status, Some(Status::Validated));
        assert_eq!(fx.reader.calls(), 0);

        let again = fx
            .sync
            .apply_case_status("808", CaseStatus::Accepted)
            .await
            .unwrap();
        assert!(!again.updated);

        let unknown = fx
            .sync
            .apply_case_status("999", CaseStatus::Accepted)
            .await
            .unwrap_err();
        assert_eq!(unknown.code(), "NOT_FOUND");
        assert_eq!(
            reload_dossier(&fx, &journey, Step::Factures).await.external_status,
            CaseStatus::Accepted
        );
    }

    #[tokio::test]
    async fn test_blank_case_number_is_not_accessible() {
        let fx = fixture();
        let journey = seed(&fx, Step::Devis, Status::Pending, Some(" ")).await;

        let outcome = fx.sync.sync_one(journey.id, Step::Devis).await.unwrap();
        assert!(!outcome.updated);
        assert_eq!(outcome.old_status, None);
        assert_eq!(fx.reader.calls(), 0);
    }

    #[tokio::test]
    async fn test_sync_all_reports_stale_case_number() {
        let fx = fixture();
        let journey = seed(&fx, Step::ChoixAmo, Status::Pending, Some("1")).await;
        fx.reader.set_status("1", CaseStatus::Accepted).await;

        let refs = vec![DossierRef {
            step: Step::ChoixAmo,
            external_case_number: Some("2".to_string()),
        }];
        let report = fx.sync.sync_all(journey.id, &refs).await;

        assert_eq!(report.total_updated, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error.code(), "CONFLICT");
        assert_eq!(fx.reader.calls(), 0);
        assert_eq!(
            reload_dossier(&fx, &journey, Step::ChoixAmo).await.external_status,
            CaseStatus::Filing
        );
    }

    async fn seed_failing(store: &FailingStore, step: Step, case_number: &str) -> Journey {
        let journey = Journey::new("citizen-1").with_state(JourneyState::new(step, Status::Pending));
        store.insert_journey(&journey).await.unwrap();
        let dossier =
            Dossier::new(journey.id, step).with_case_number(Some(case_number.to_string()));
        store.insert_dossier(&dossier).await.unwrap();
        journey
    }

    #[tokio::test]
    async fn test_failed_journey_write_is_replayed_on_retry() {
        let store = Arc::new(FailingStore::new());
        let reader = Arc::new(InMemoryCaseStatusReader::new());
        let sync = SyncService::new(Arc::clone(&store), Arc::clone(&reader));
        let journey = seed_failing(&store, Step::Eligibilite, "500").await;
        reader.set_status("500", CaseStatus::Accepted).await;

        store.fail_next_progress();
        let err = sync.sync_one(journey.id, Step::Eligibilite).await.unwrap_err();
        assert_eq!(err.code(), "STORAGE_ERROR");
        let dossier = store.find_dossier(journey.id, Step::Eligibilite).await.unwrap().unwrap();
        assert_eq!(dossier.external_status, CaseStatus::Filing);
        assert!(dossier.decided_at.is_none());

        let retry = sync.sync_one(journey.id, Step::Eligibilite).await.unwrap();
        assert!(retry.updated);
        assert_eq!(retry.journey_status, Some(Status::Validated));
        let after = store.find_journey(journey.id).await.unwrap().unwrap();
        assert_eq!(after.current_status, Status::Validated);
    }

    #[tokio::test]
    async fn test_failed_dossier_write_is_replayed_on_retry() {
        let store = Arc::new(FailingStore::new());
        let reader = Arc::new(InMemoryCaseStatusReader::new());
        let sync = SyncService::new(Arc::clone(&store), Arc::clone(&reader));
        let journey = seed_failing(&store, Step::Devis, "77").await;
        reader.set_status("77", CaseStatus::Accepted).await;

        store.fail_next_external_status();
        assert!(sync.sync_one(journey.id, Step::Devis).await.is_err());

        let retry = sync.sync_one(journey.id, Step::Devis).await.unwrap();
        assert!(retry.updated);
        // The journey was already written by the failed attempt
        assert_eq!(retry.journey_status, None);
        let dossier = store.find_dossier(journey.id, Step::Devis).await.unwrap().unwrap();
        assert_eq!(dossier.external_status, CaseStatus::Accepted);
        assert!(dossier.decided_at.is_some());
        let after = store.find_journey(journey.id).await.unwrap().unwrap();
        assert_eq!(after.current_status, Status::Validated);
    }
}
