//! Journey services
//!
//! `progression` applies the citizen's own actions through the guards.
//! `sync` folds decisions made by the case-management service.

mod progression;
mod sync;

pub use progression::{Advance, DossierFiling, JourneyOverview, ProgressionService};
pub use sync::{DossierRef, SyncFailure, SyncOutcome, SyncReport, SyncService};
