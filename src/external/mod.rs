//! Case-management service client
//!
//! The service is the authority on a dossier's decision. This module only
//! reads from it.

mod graphql;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::schemas::CaseStatus;

pub use graphql::{parse_case_status_response, GraphqlCaseStatusReader};
pub use memory::InMemoryCaseStatusReader;

/// Why a case status could not be read. "Not found" is not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaseStatusError {
    #[error("invalid case number: {0}")]
    InvalidCaseNumber(String),

    #[error("network error: {0}")]
    Transport(String),

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("API error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Read-only access to case statuses; safe to call repeatedly.
#[async_trait]
pub trait CaseStatusReader: Send + Sync {
    /// Current status of a case, `Ok(None)` when the service does not know it
    async fn case_status(&self, case_number: &str)
        -> Result<Option<CaseStatus>, CaseStatusError>;
}
