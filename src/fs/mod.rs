//! File system utilities for parcours
//!
//! Provides path resolution and JSON file operations.

mod json;
mod paths;

pub use json::{create_json, read_config, read_json, read_json_opt, write_json};
pub use paths::{
    find_data_root, get_config_path, get_data_dir, get_dossier_path, get_dossiers_dir,
    get_journey_dir, get_journey_json_path, get_journeys_dir, resolve_cwd, DATA_DIR_NAME,
};
