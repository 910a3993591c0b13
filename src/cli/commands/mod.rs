//! CLI command implementations

pub mod advance;
pub mod file;
pub mod init;
pub mod intake;
pub mod notify;
pub mod status;
pub mod sync;
pub mod validate;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::config::load_config;
use crate::errors::{ParcoursError, Result};
use crate::external::GraphqlCaseStatusReader;
use crate::fs::{find_data_root, resolve_cwd};
use crate::schemas::{Config, Journey};
use crate::services::{ProgressionService, SyncService};
use crate::store::{FileStore, JourneyStore};

/// Data root, config and store shared by the commands
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
    pub store: Arc<FileStore>,
}

impl Workspace {
    /// Locate the data root from `cwd` and load its config.
    pub fn open(cwd: Option<&Path>) -> Result<Self> {
        let root = find_data_root(&resolve_cwd(cwd))?;
        let config = load_config(&root)?;
        let store = Arc::new(FileStore::new(&root));
        tracing::debug!("Using data root {}", root.display());
        Ok(Workspace {
            root,
            config,
            store,
        })
    }

    pub fn progression(&self) -> ProgressionService<FileStore> {
        ProgressionService::new(Arc::clone(&self.store))
    }

    pub fn sync_service(&self) -> Result<SyncService<FileStore, GraphqlCaseStatusReader>> {
        let reader = GraphqlCaseStatusReader::from_config(&self.config.case_status)?;
        Ok(SyncService::new(Arc::clone(&self.store), Arc::new(reader)))
    }

    /// The owner's journey, without creating one.
    pub async fn existing_journey(&self, owner_id: &str) -> Result<Journey> {
        self.store
            .find_journey_by_owner(owner_id)
            .await?
            .ok_or_else(|| ParcoursError::NotFound(format!("no journey for owner {}", owner_id)))
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|e| ParcoursError::wrap(e, "Failed to serialize output"))?;
    println!("{}", output);
    Ok(())
}
