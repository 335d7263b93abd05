use serde_json::Value;
use tracing::{info, warn};

use super::{LeaveError, LeaveService};
use crate::model::{LeaveRecord, LeaveRequest};

/// One refused batch item, paired with exactly what the caller sent.
#[derive(Debug)]
pub struct BatchFailure<T> {
    pub request: T,
    pub reason: LeaveError,
}

#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub successes: Vec<LeaveRecord>,
    pub failures: Vec<BatchFailure<T>>,
}

impl<T> BatchOutcome<T> {
    fn with_capacity(n: usize) -> Self {
        Self {
            successes: Vec::with_capacity(n),
            failures: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Submits leave requests one at a time, in input order.
///
/// Each item is persisted before the next is checked, so later items see
/// earlier successes. A failing item is recorded and never stops the batch.
pub struct BatchIngestor<'a> {
    service: &'a LeaveService,
}

impl<'a> BatchIngestor<'a> {
    pub fn new(service: &'a LeaveService) -> Self {
        Self { service }
    }

    pub async fn ingest_batch(&self, requests: Vec<LeaveRequest>) -> BatchOutcome<LeaveRequest> {
        let items = requests.into_iter().map(|request| (request.clone(), Ok(request)));
        self.fold(items).await
    }

    /// Like [`ingest_batch`](Self::ingest_batch), for raw JSON items. An item
    /// that does not decode is refused with `InvalidRequest`.
    pub async fn ingest_json(&self, items: Vec<Value>) -> BatchOutcome<Value> {
        let items = items.into_iter().map(|raw| {
            let decoded = serde_json::from_value::<LeaveRequest>(raw.clone())
                .map_err(|e| LeaveError::InvalidRequest(format!("malformed leave request: {e}")));
            (raw, decoded)
        });
        self.fold(items).await
    }

    async fn fold<T, I>(&self, items: I) -> BatchOutcome<T>
    where
        I: ExactSizeIterator<Item = (T, Result<LeaveRequest, LeaveError>)>,
    {
        let mut outcome = BatchOutcome::with_capacity(items.len());

        for (index, (original, decoded)) in items.enumerate() {
            let result = match decoded {
                Ok(request) => self.service.submit(request).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(record) => outcome.successes.push(record),
                Err(reason) => {
                    warn!(index, error = %reason, "Batch item refused");
                    outcome.failures.push(BatchFailure {
                        request: original,
                        reason,
                    });
                }
            }
        }

        info!(
            success_count = outcome.successes.len(),
            failure_count = outcome.failures.len(),
            "Batch processing completed"
        );
        outcome
    }
}
