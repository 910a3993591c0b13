//! Parcours - Step-by-step progression of an assistance journey
//!
//! This library provides the core functionality for the parcours CLI, including:
//! - Schema definitions for journeys, dossiers and configuration
//! - Domain logic for the step order, guards and transitions
//! - Stores for journeys and dossiers (in memory and on disk)
//! - A client for the case-management service
//! - Services for progression and case-status reconciliation

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod external;
pub mod fs;
pub mod schemas;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use errors::{ParcoursError, Result};
pub use schemas::{CaseStatus, Config, Dossier, Journey, JourneyState, Status, Step};
pub use services::{ProgressionService, SyncService};
