//! Configuration for parcours

mod loader;

pub use loader::{load_config, validate_config};
