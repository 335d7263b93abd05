//! In-memory leave store, used for tests and when no database is configured.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{LeaveFilter, LeaveSearch, LeaveStore, StoreError, StoreResult, sort_newest_first};
use crate::model::{LeaveId, LeaveRecord};

#[derive(Debug, Default)]
pub struct MemoryLeaveStore {
    leaves: DashMap<LeaveId, LeaveRecord>,
}

impl MemoryLeaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn collect_where(&self, keep: impl Fn(&LeaveRecord) -> bool) -> Vec<LeaveRecord> {
        let mut records: Vec<LeaveRecord> = self
            .leaves
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut records);
        records
    }
}

#[async_trait]
impl LeaveStore for MemoryLeaveStore {
    async fn find_all(&self) -> StoreResult<Vec<LeaveRecord>> {
        Ok(self.collect_where(|_| true))
    }

    async fn find_by_id(&self, id: &LeaveId) -> StoreResult<Option<LeaveRecord>> {
        Ok(self.leaves.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_employee(&self, employee_id: &str) -> StoreResult<Vec<LeaveRecord>> {
        Ok(self.collect_where(|r| r.employee_id == employee_id))
    }

    async fn search(&self, query: &LeaveSearch) -> StoreResult<Vec<LeaveRecord>> {
        Ok(self.collect_where(|r| query.matches(r)))
    }

    async fn insert(&self, record: &LeaveRecord) -> StoreResult<LeaveId> {
        match self.leaves.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId(record.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record.id.clone())
            }
        }
    }

    async fn update_by_id(&self, id: &LeaveId, record: &LeaveRecord) -> StoreResult<Option<LeaveRecord>> {
        let Some(mut existing) = self.leaves.get_mut(id) else {
            return Ok(None);
        };
        let updated = LeaveRecord {
            id: existing.id.clone(),
            created_at: existing.created_at,
            ..record.clone()
        };
        *existing = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: &LeaveId) -> StoreResult<bool> {
        Ok(self.leaves.remove(id).is_some())
    }

    async fn count_where(&self, filter: &LeaveFilter) -> StoreResult<u64> {
        Ok(self.leaves.iter().filter(|entry| filter.matches(entry.value())).count() as u64)
    }
}
