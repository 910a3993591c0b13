//! Schema types for parcours
//!
//! Every persisted record carries a `schema_version` and serializes to JSON.

mod config;
mod dossier;
mod journey;
mod step;

pub use config::{CaseStatusConfig, Config, SyncConfig};
pub use dossier::Dossier;
pub use journey::Journey;
pub use step::{CaseStatus, JourneyState, Status, Step};
