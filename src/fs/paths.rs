//! Path resolution utilities for parcours
//!
//! Provides functions to locate the data root and construct paths
//! to the journey and dossier files beneath it.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::{ParcoursError, Result};
use crate::schemas::Step;

/// Name of the data directory kept at the data root
pub const DATA_DIR_NAME: &str = ".parcours";

/// Find the data root containing a .parcours directory.
///
/// Walks up the directory tree from the starting directory.
///
/// # Errors
/// * `DataDirNotFound` - If no ancestor holds a .parcours directory
pub fn find_data_root(start_cwd: &Path) -> Result<PathBuf> {
    let mut current = start_cwd
        .canonicalize()
        .map_err(|e| ParcoursError::DataDirNotFound(format!("Cannot resolve path: {}", e)))?;

    loop {
        if current.join(DATA_DIR_NAME).is_dir() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) if parent != current => {
                current = parent.to_path_buf();
            }
            _ => {
                return Err(ParcoursError::DataDirNotFound(
                    "Could not find a .parcours directory (run `parcours init`)".to_string(),
                ));
            }
        }
    }
}

/// Resolve the current working directory, optionally using an override.
pub fn resolve_cwd(cwd_option: Option<&Path>) -> PathBuf {
    match cwd_option {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Get the path to the .parcours directory.
pub fn get_data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR_NAME)
}

/// Get the path to the config.json file.
pub fn get_config_path(root: &Path) -> PathBuf {
    get_data_dir(root).join("config.json")
}

pub fn get_journeys_dir(root: &Path) -> PathBuf {
    get_data_dir(root).join("journeys")
}

pub fn get_journey_dir(root: &Path, id: Uuid) -> PathBuf {
    get_journeys_dir(root).join(id.to_string())
}

pub fn get_journey_json_path(root: &Path, id: Uuid) -> PathBuf {
    get_journey_dir(root, id).join("journey.json")
}

pub fn get_dossiers_dir(root: &Path, journey_id: Uuid) -> PathBuf {
    get_journey_dir(root, journey_id).join("dossiers")
}

/// One file per step, so the path itself is the `(journey, step)` key.
pub fn get_dossier_path(root: &Path, journey_id: Uuid, step: Step) -> PathBuf {
    get_dossiers_dir(root, journey_id).join(format!("{}.json", step))
}
