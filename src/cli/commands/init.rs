//! Init command - Create the .parcours data directory

use std::path::Path;

use crate::errors::{ParcoursError, Result};
use crate::fs::{get_config_path, get_data_dir, get_journeys_dir, resolve_cwd, write_json};
use crate::schemas::Config;

/// Initialize a data root in the specified directory
pub async fn run(cwd: Option<&Path>, force: bool) -> Result<()> {
    let root = resolve_cwd(cwd);
    let data_dir = get_data_dir(&root);

    if data_dir.exists() && !force {
        return Err(ParcoursError::Conflict(format!(
            "{} already exists (use --force to reset config.json)",
            data_dir.display()
        )));
    }

    std::fs::create_dir_all(get_journeys_dir(&root))?;
    write_json(&get_config_path(&root), &Config::default())?;

    tracing::info!("Initialized {}", data_dir.display());
    println!("Initialized {}", data_dir.display());
    Ok(())
}
