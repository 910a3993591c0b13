//! In-process store
//!
//! Both tables sit behind one `RwLock`, so each call is atomic and the
//! uniqueness checks on insert cannot race.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{ParcoursError, Result};
use crate::schemas::{CaseStatus, Dossier, Journey, JourneyState, Step};

use super::{DossierStore, JourneyStore};

#[derive(Debug, Default)]
struct Tables {
    journeys: HashMap<Uuid, Journey>,
    dossiers: HashMap<Uuid, Dossier>,
}

/// Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn journey_not_found(id: Uuid) -> ParcoursError {
    ParcoursError::NotFound(format!("journey {}", id))
}

#[async_trait]
impl JourneyStore for MemoryStore {
    async fn find_journey(&self, id: Uuid) -> Result<Option<Journey>> {
        Ok(self.tables.read().await.journeys.get(&id).cloned())
    }

    async fn find_journey_by_owner(&self, owner_id: &str) -> Result<Option<Journey>> {
        let tables = self.tables.read().await;
        Ok(tables
            .journeys
            .values()
            .find(|j| j.owner_id == owner_id)
            .cloned())
    }

    async fn insert_journey(&self, journey: &Journey) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.journeys.values().any(|j| j.owner_id == journey.owner_id) {
            return Err(ParcoursError::Conflict(format!(
                "owner {} already has a journey",
                journey.owner_id
            )));
        }
        if tables.journeys.contains_key(&journey.id) {
            return Err(ParcoursError::Conflict(format!("journey {} exists", journey.id)));
        }
        tables.journeys.insert(journey.id, journey.clone());
        Ok(())
    }

    async fn update_progress(&self, id: Uuid, state: JourneyState) -> Result<Journey> {
        let mut tables = self.tables.write().await;
        let journey = tables.journeys.get_mut(&id).ok_or_else(|| journey_not_found(id))?;
        *journey = journey.clone().with_state(state);
        Ok(journey.clone())
    }

    async fn set_intake_snapshot(&self, id: Uuid, snapshot: serde_json::Value) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let journey = tables.journeys.get_mut(&id).ok_or_else(|| journey_not_found(id))?;
        if journey.intake_snapshot.is_some() {
            return Ok(false);
        }
        *journey = journey.clone().with_intake_snapshot(snapshot);
        Ok(true)
    }

    async fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<Journey> {
        let mut tables = self.tables.write().await;
        let journey = tables.journeys.get_mut(&id).ok_or_else(|| journey_not_found(id))?;
        *journey = journey.clone().with_completed_at(at);
        Ok(journey.clone())
    }
}

#[async_trait]
impl DossierStore for MemoryStore {
    async fn find_dossier(&self, journey_id: Uuid, step: Step) -> Result<Option<Dossier>> {
        let tables = self.tables.read().await;
        Ok(tables
            .dossiers
            .values()
            .find(|d| d.journey_id == journey_id && d.step == step)
            .cloned())
    }

    async fn find_dossier_by_case_number(&self, case_number: &str) -> Result<Option<Dossier>> {
        let tables = self.tables.read().await;
        Ok(tables
            .dossiers
            .values()
            .find(|d| d.external_case_number.as_deref() == Some(case_number))
            .cloned())
    }

    async fn list_dossiers(&self, journey_id: Uuid) -> Result<Vec<Dossier>> {
        let tables = self.tables.read().await;
        let mut dossiers: Vec<Dossier> = tables
            .dossiers
            .values()
            .filter(|d| d.journey_id == journey_id)
            .cloned()
            .collect();
        dossiers.sort_by_key(|d| d.step);
        Ok(dossiers)
    }

    async fn insert_dossier(&self, dossier: &Dossier) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .dossiers
            .values()
            .any(|d| d.journey_id == dossier.journey_id && d.step == dossier.step)
        {
            return Err(ParcoursError::Conflict(format!(
                "journey {} already has a dossier for step {}",
                dossier.journey_id, dossier.step
            )));
        }
        tables.dossiers.insert(dossier.id, dossier.clone());
        Ok(())
    }

    async fn update_external_status(
        &self,
        id: Uuid,
        status: CaseStatus,
        last_sync_at: DateTime<Utc>,
        decided_at: Option<DateTime<Utc>>,
    ) -> Result<Dossier> {
        let mut tables = self.tables.write().await;
        let dossier = tables
            .dossiers
            .get_mut(&id)
            .ok_or_else(|| ParcoursError::NotFound(format!("dossier {}", id)))?;
        *dossier = dossier
            .clone()
            .with_external_status(status, last_sync_at, decided_at);
        Ok(dossier.clone())
    }
}
