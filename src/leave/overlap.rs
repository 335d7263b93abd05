use crate::model::{DateRange, LeaveId, LeaveRecord, LeaveStatus};

use super::LeaveError;

/// A candidate is admissible iff it overlaps none of `existing`.
pub fn is_admissible<'a>(candidate: &DateRange, existing: impl IntoIterator<Item = &'a DateRange>) -> bool {
    existing.into_iter().all(|range| !candidate.overlaps(range))
}

/// Decides which of an employee's records block a candidate range.
///
/// Rejected records are inactive unless `rejected_blocks` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapPolicy {
    rejected_blocks: bool,
}

impl OverlapPolicy {
    pub fn new(rejected_blocks: bool) -> Self {
        Self { rejected_blocks }
    }

    pub fn is_active(&self, status: LeaveStatus) -> bool {
        self.rejected_blocks || status != LeaveStatus::Rejected
    }

    /// Every active record in `existing` that overlaps `candidate`, skipping `exclude`.
    pub fn conflicts<'a>(
        &self,
        candidate: &DateRange,
        existing: &'a [LeaveRecord],
        exclude: Option<&LeaveId>,
    ) -> Vec<&'a LeaveRecord> {
        existing
            .iter()
            .filter(|record| exclude != Some(&record.id))
            .filter(|record| self.is_active(record.status))
            .filter(|record| !is_admissible(candidate, [&record.range]))
            .collect()
    }

    pub fn check(
        &self,
        candidate: &DateRange,
        existing: &[LeaveRecord],
        exclude: Option<&LeaveId>,
    ) -> Result<(), LeaveError> {
        let conflicting: Vec<LeaveId> = self
            .conflicts(candidate, existing, exclude)
            .into_iter()
            .map(|record| record.id.clone())
            .collect();

        if conflicting.is_empty() {
            Ok(())
        } else {
            Err(LeaveError::Overlap { conflicting })
        }
    }
}
