//! Store wrapper whose writes can be made to fail once

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{ParcoursError, Result};
use crate::schemas::{CaseStatus, Dossier, Journey, JourneyState, Step};

use super::{DossierStore, JourneyStore, MemoryStore};

#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    inner: MemoryStore,
    fail_progress: AtomicBool,
    fail_external_status: AtomicBool,
}

impl FailingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The next `update_progress` fails without writing
    pub(crate) fn fail_next_progress(&self) {
        self.fail_progress.store(true, Ordering::SeqCst);
    }

    /// The next `update_external_status` fails without writing
    pub(crate) fn fail_next_external_status(&self) {
        self.fail_external_status.store(true, Ordering::SeqCst);
    }
}

fn disk_full() -> ParcoursError {
    ParcoursError::Storage("disk full".to_string())
}

#[async_trait]
impl JourneyStore for FailingStore {
    async fn find_journey(&self, id: Uuid) -> Result<Option<Journey>> {
        self.inner.find_journey(id).await
    }

    async fn find_journey_by_owner(&self, owner_id: &str) -> Result<Option<Journey>> {
        self.inner.find_journey_by_owner(owner_id).await
    }

    async fn insert_journey(&self, journey: &Journey) -> Result<()> {
        self.inner.insert_journey(journey).await
    }

    async fn update_progress(&self, id: Uuid, state: JourneyState) -> Result<Journey> {
        if self.fail_progress.swap(false, Ordering::SeqCst) {
            return Err(disk_full());
        }
        self.inner.update_progress(id, state).await
    }

    async fn set_intake_snapshot(&self, id: Uuid, snapshot: serde_json::Value) -> Result<bool> {
        self.inner.set_intake_snapshot(id, snapshot).await
    }

    async fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<Journey> {
        self.inner.mark_completed(id, at).await
    }
}

#[async_trait]
impl DossierStore for FailingStore {
    async fn find_dossier(&self, journey_id: Uuid, step: Step) -> Result<Option<Dossier>> {
        self.inner.find_dossier(journey_id, step).await
    }

    async fn find_dossier_by_case_number(&self, case_number: &str) -> Result<Option<Dossier>> {
        self.inner.find_dossier_by_case_number(case_number).await
    }

    async fn list_dossiers(&self, journey_id: Uuid) -> Result<Vec<Dossier>> {
        self.inner.list_dossiers(journey_id).await
    }

    async fn insert_dossier(&self, dossier: &Dossier) -> Result<()> {
        self.inner.insert_dossier(dossier).await
    }

    async fn update_external_status(
        &self,
        id: Uuid,
        status: CaseStatus,
        last_sync_at: DateTime<Utc>,
        decided_at: Option<DateTime<Utc>>,
    ) -> Result<Dossier> {
        if self.fail_external_status.swap(false, Ordering::SeqCst) {
            return Err(disk_full());
        }
        self.inner
            .update_external_status(id, status, last_sync_at, decided_at)
            .await
    }
}
