//! JSON file operations
//!
//! Provides functions to read and write JSON files with serde validation.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{ParcoursError, Result};
use crate::schemas::Config;

use super::paths::get_config_path;

/// Read and deserialize a JSON file.
///
/// # Errors
/// * `NotFound` - If the file does not exist
/// * `InvalidJson` - If the file contains invalid JSON or does not match the schema
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ParcoursError::NotFound(format!("File not found: {}", path.display()))
        } else {
            ParcoursError::Io(e)
        }
    })?;

    serde_json::from_str(&content).map_err(|e| {
        ParcoursError::InvalidJson(format!("Invalid JSON in file {}: {}", path.display(), e))
    })
}

/// Read a JSON file, returning None when it does not exist.
pub fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match read_json(path) {
        Ok(value) => Ok(Some(value)),
        Err(ParcoursError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn to_pretty<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).map_err(|e| ParcoursError::InvalidJson(e.to_string()))
}

/// Write a value to a JSON file with pretty formatting.
///
/// Uses atomic write (write to temp file, then rename) to avoid partial writes.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content = to_pretty(data)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Write a value to a JSON file that must not exist yet.
///
/// The value is staged in a temp file and hard-linked into place, so the
/// target appears complete or not at all and an existing file is never
/// replaced.
///
/// # Errors
/// * `Conflict` - If the file already exists
pub fn create_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content = to_pretty(data)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension(format!("json.{}.new", uuid::Uuid::new_v4()));
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    let linked = fs::hard_link(&temp_path, path);
    fs::remove_file(&temp_path)?;
    match linked {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(ParcoursError::Conflict(
            format!("{} already exists", path.display()),
        )),
        Err(e) => Err(ParcoursError::Io(e)),
    }
}

/// Read the config.json file for a data root.
///
/// Returns the default configuration if the file doesn't exist.
pub fn read_config(root: &Path) -> Result<Config> {
    let path = get_config_path(root);
    if !path.exists() {
        return Ok(Config::default());
    }
    read_json(&path)
}
