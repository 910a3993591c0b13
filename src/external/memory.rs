//! Map-backed reader with injectable failures

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::schemas::CaseStatus;

use super::{CaseStatusError, CaseStatusReader};

#[derive(Debug, Clone)]
enum Entry {
    Status(CaseStatus),
    Failure(CaseStatusError),
}

/// Cloning shares the same cases and call counter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseStatusReader {
    cases: Arc<RwLock<HashMap<String, Entry>>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryCaseStatusReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `status` for the case from now on
    pub async fn set_status(&self, case_number: impl Into<String>, status: CaseStatus) {
        self.cases
            .write()
            .await
            .insert(case_number.into(), Entry::Status(status));
    }

    /// Fail every read of the case with `error` until replaced
    pub async fn set_failure(&self, case_number: impl Into<String>, error: CaseStatusError) {
        self.cases
            .write()
            .await
            .insert(case_number.into(), Entry::Failure(error));
    }

    /// Forget the case; reads report it as not found
    pub async fn remove(&self, case_number: &str) {
        self.cases.write().await.remove(case_number);
    }

    /// Number of reads served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaseStatusReader for InMemoryCaseStatusReader {
    async fn case_status(
        &self,
        case_number: &str,
    ) -> Result<Option<CaseStatus>, CaseStatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.cases.read().await.get(case_number) {
            None => Ok(None),
            Some(Entry::Status(status)) => Ok(Some(*status)),
            Some(Entry::Failure(error)) => Err(error.clone()),
        }
    }
}
