//! JSON-file store under `<root>/.parcours/journeys`
//!
//! Layout:
//! - `journeys/<journey_id>/journey.json`
//! - `journeys/<journey_id>/dossiers/<step>.json`
//!
//! Updates use atomic replace. Dossier inserts use create-new semantics, so
//! the file system itself rejects a second dossier for a step.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::STEPS;
use crate::errors::{ParcoursError, Result};
use crate::fs::{
    create_json, get_dossier_path, get_dossiers_dir, get_journey_json_path, get_journeys_dir,
    read_json_opt, write_json,
};
use crate::schemas::{CaseStatus, Dossier, Journey, JourneyState, Step};

use super::{DossierStore, JourneyStore};

#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    // Serializes read-modify-write sequences within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn journey_ids(&self) -> Result<Vec<Uuid>> {
        let dir = get_journeys_dir(&self.root);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(io_storage)? {
            let entry = entry.map_err(io_storage)?;
            if !entry.file_type().map_err(io_storage)?.is_dir() {
                continue;
            }
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| Uuid::parse_str(name).ok())
            {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn load_journey(&self, id: Uuid) -> Result<Option<Journey>> {
        read_json_opt(&get_journey_json_path(&self.root, id)).map_err(storage)
    }

    fn load_existing_journey(&self, id: Uuid) -> Result<Journey> {
        self.load_journey(id)?
            .ok_or_else(|| ParcoursError::NotFound(format!("journey {}", id)))
    }

    fn load_dossier(&self, journey_id: Uuid, step: Step) -> Result<Option<Dossier>> {
        read_json_opt(&get_dossier_path(&self.root, journey_id, step)).map_err(storage)
    }

    fn load_dossiers(&self, journey_id: Uuid) -> Result<Vec<Dossier>> {
        if !get_dossiers_dir(&self.root, journey_id).is_dir() {
            return Ok(Vec::new());
        }
        let mut dossiers = Vec::new();
        for step in STEPS {
            if let Some(dossier) = self.load_dossier(journey_id, *step)? {
                dossiers.push(dossier);
            }
        }
        Ok(dossiers)
    }

    fn save_journey(&self, journey: &Journey) -> Result<()> {
        write_json(&get_journey_json_path(&self.root, journey.id), journey).map_err(storage)
    }
}

/// Report a file-system or decoding failure as a store failure.
///
/// `NotFound` and `Conflict` keep their meaning.
fn storage(error: ParcoursError) -> ParcoursError {
    match error {
        ParcoursError::Io(_) | ParcoursError::InvalidJson(_) => {
            ParcoursError::Storage(error.to_string())
        }
        other => other,
    }
}

fn io_storage(error: std::io::Error) -> ParcoursError {
    storage(ParcoursError::Io(error))
}

#[async_trait]
impl JourneyStore for FileStore {
    async fn find_journey(&self, id: Uuid) -> Result<Option<Journey>> {
        self.load_journey(id)
    }

    async fn find_journey_by_owner(&self, owner_id: &str) -> Result<Option<Journey>> {
        for id in self.journey_ids()? {
            if let Some(journey) = self.load_journey(id)? {
                if journey.owner_id == owner_id {
                    return Ok(Some(journey));
                }
            }
        }
        Ok(None)
    }

    async fn insert_journey(&self, journey: &Journey) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.find_journey_by_owner(&journey.owner_id).await?.is_some() {
            return Err(ParcoursError::Conflict(format!(
                "owner {} already has a journey",
                journey.owner_id
            )));
        }
        create_json(&get_journey_json_path(&self.root, journey.id), journey).map_err(storage)
    }

    async fn update_progress(&self, id: Uuid, state: JourneyState) -> Result<Journey> {
        let _guard = self.write_lock.lock().await;
        let journey = self.load_existing_journey(id)?.with_state(state);
        self.save_journey(&journey)?;
        Ok(journey)
    }

    async fn set_intake_snapshot(&self, id: Uuid, snapshot: serde_json::Value) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let journey = self.load_existing_journey(id)?;
        if journey.intake_snapshot.is_some() {
            return Ok(false);
        }
        self.save_journey(&journey.with_intake_snapshot(snapshot))?;
        Ok(true)
    }

    async fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<Journey> {
        let _guard = self.write_lock.lock().await;
        let journey = self.load_existing_journey(id)?;
        if journey.completed_at.is_some() {
            return Ok(journey);
        }
        let journey = journey.with_completed_at(at);
        self.save_journey(&journey)?;
        Ok(journey)
    }
}

#[async_trait]
impl DossierStore for FileStore {
    async fn find_dossier(&self, journey_id: Uuid, step: Step) -> Result<Option<Dossier>> {
        self.load_dossier(journey_id, step)
    }

    async fn find_dossier_by_case_number(&self, case_number: &str) -> Result<Option<Dossier>> {
        for id in self.journey_ids()? {
            if let Some(dossier) = self
                .load_dossiers(id)?
                .into_iter()
                .find(|d| d.external_case_number.as_deref() == Some(case_number))
            {
                return Ok(Some(dossier));
            }
        }
        Ok(None)
    }

    async fn list_dossiers(&self, journey_id: Uuid) -> Result<Vec<Dossier>> {
        self.load_dossiers(journey_id)
    }

    async fn insert_dossier(&self, dossier: &Dossier) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = get_dossier_path(&self.root, dossier.journey_id, dossier.step);
        create_json(&path, dossier).map_err(|e| match e {
            ParcoursError::Conflict(_) => ParcoursError::Conflict(format!(
                "journey {} already has a dossier for step {}",
                dossier.journey_id, dossier.step
            )),
            other => storage(other),
        })
    }

    async fn update_external_status(
        &self,
        id: Uuid,
        status: CaseStatus,
        last_sync_at: DateTime<Utc>,
        decided_at: Option<DateTime<Utc>>,
    ) -> Result<Dossier> {
        let _guard = self.write_lock.lock().await;
        for journey_id in self.journey_ids()? {
            for step in STEPS {
                let Some(dossier) = self.load_dossier(journey_id, *step)? else {
                    continue;
                };
                if dossier.id != id {
                    continue;
                }
                let dossier = dossier.with_external_status(status, last_sync_at, decided_at);
                write_json(&get_dossier_path(&self.root, journey_id, *step), &dossier)
                    .map_err(storage)?;
                return Ok(dossier);
            }
        }
        Err(ParcoursError::NotFound(format!("dossier {}", id)))
    }
}
