//! CLI module for parcours
//!
//! Provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::schemas::{CaseStatus, Step};

/// Parcours - Follow an assistance journey step by step
#[derive(Parser, Debug)]
#[command(name = "parcours")]
#[command(version)]
#[command(about = "Follow an assistance journey step by step and reconcile it with the case-management service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override the working directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the .parcours data directory with a default config
    Init {
        /// Overwrite config.json if .parcours already exists
        #[arg(long)]
        force: bool,
    },

    /// Show the journey of an owner (created on first access)
    Status {
        /// Owner ID
        owner: String,
    },

    /// Record the eligibility intake answers of an owner
    Intake {
        /// Owner ID
        owner: String,

        /// JSON file with the intake answers
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Record the dossier filed for the current step
    File {
        /// Owner ID
        owner: String,

        /// Case number assigned by the case-management service
        #[arg(long)]
        case_number: Option<String>,
    },

    /// Mark the current step as validated
    Validate {
        /// Owner ID
        owner: String,
    },

    /// Move to the next step, or close the journey on the last one
    Advance {
        /// Owner ID
        owner: String,
    },

    /// Pull dossier statuses from the case-management service
    Sync {
        /// Owner ID
        owner: String,

        /// Only sync this step (choix_amo, eligibilite, diagnostic, devis, factures)
        #[arg(long)]
        step: Option<Step>,
    },

    /// Apply a status pushed by the case-management service
    Notify {
        /// Case number
        case_number: String,

        /// New status (en_construction, en_instruction, accepte, refuse, sans_suite)
        status: CaseStatus,
    },

    /// Sync an owner's journey periodically until interrupted
    Watch {
        /// Owner ID
        owner: String,

        /// Seconds between sweeps (defaults to sync.interval_seconds)
        #[arg(long)]
        interval: Option<u64>,
    },
}
