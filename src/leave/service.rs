use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::lock::OwnedMutexGuard;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

use super::{BatchIngestor, BatchOutcome, EmployeeLocks, LeaveError, LeaveLifecycle, OverlapPolicy};
use crate::model::{LeaveId, LeavePatch, LeaveRecord, LeaveRequest, LeaveStatus, LeaveType};
use crate::store::{LeaveFilter, LeaveSearch, LeaveStore};

const RECENT_LEAVES: usize = 5;

/// Global counts across all leave records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveStats {
    pub total: u64,
    pub by_status: BTreeMap<LeaveStatus, u64>,
    pub by_type: BTreeMap<LeaveType, u64>,
}

#[derive(Debug, Clone)]
pub struct EmployeeSummary {
    pub employee_id: String,
    pub employee_name: String,
    pub total_leaves: usize,
    pub total_days: i64,
    pub days_by_type: BTreeMap<LeaveType, i64>,
    pub recent_leaves: Vec<LeaveRecord>,
}

/// Application service behind the HTTP layer.
///
/// Every mutation holds the employee's lock across the overlap check and
/// the write, so two concurrent requests for one employee cannot both pass.
pub struct LeaveService {
    store: Arc<dyn LeaveStore>,
    lifecycle: LeaveLifecycle,
    locks: EmployeeLocks,
}

impl LeaveService {
    pub fn new(store: Arc<dyn LeaveStore>, policy: OverlapPolicy, lock_idle: Duration) -> Self {
        Self {
            lifecycle: LeaveLifecycle::new(store.clone(), policy),
            store,
            locks: EmployeeLocks::new(lock_idle),
        }
    }

    pub async fn list(&self) -> Result<Vec<LeaveRecord>, LeaveError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get(&self, id: &LeaveId) -> Result<LeaveRecord, LeaveError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound(id.clone()))
    }

    pub async fn list_for_employee(&self, employee_id: &str) -> Result<Vec<LeaveRecord>, LeaveError> {
        Ok(self.store.find_by_employee(employee_id).await?)
    }

    pub async fn search(&self, query: &LeaveSearch) -> Result<Vec<LeaveRecord>, LeaveError> {
        Ok(self.store.search(query).await?)
    }

    /// Validates and persists a new leave application.
    #[instrument(skip(self, request), fields(employee_id = %request.employee_id))]
    pub async fn submit(&self, request: LeaveRequest) -> Result<LeaveRecord, LeaveError> {
        let _guard = self.locks.acquire(request.employee_id.trim()).await;

        let record = self.lifecycle.create(request).await.inspect_err(|e| {
            warn!(error = %e, "Leave application refused");
        })?;
        let id = self.store.insert(&record).await?;

        info!(leave_id = %id, days = record.days(), "Leave application submitted");
        Ok(record)
    }

    #[instrument(skip(self, patch), fields(leave_id = %id))]
    pub async fn update(&self, id: &LeaveId, patch: LeavePatch) -> Result<LeaveRecord, LeaveError> {
        let new_owner = patch.employee_id.as_deref().map(str::trim);
        let (current, _guards) = self.lock_record(id, new_owner).await?;

        let next = self.lifecycle.update(&current, patch).await.inspect_err(|e| {
            warn!(error = %e, "Leave update refused");
        })?;
        self.persist(id, next).await
    }

    pub async fn approve(&self, id: &LeaveId) -> Result<LeaveRecord, LeaveError> {
        let (current, _guards) = self.lock_record(id, None).await?;
        let next = self.lifecycle.approve(&current)?;
        info!(leave_id = %id, "Leave approved");
        self.persist(id, next).await
    }

    pub async fn reject(&self, id: &LeaveId) -> Result<LeaveRecord, LeaveError> {
        let (current, _guards) = self.lock_record(id, None).await?;
        let next = self.lifecycle.reject(&current)?;
        info!(leave_id = %id, "Leave rejected");
        self.persist(id, next).await
    }

    pub async fn delete(&self, id: &LeaveId) -> Result<(), LeaveError> {
        if self.store.delete_by_id(id).await? {
            info!(leave_id = %id, "Leave deleted");
            Ok(())
        } else {
            Err(LeaveError::NotFound(id.clone()))
        }
    }

    pub async fn stats(&self) -> Result<LeaveStats, LeaveError> {
        let total = self.store.count_where(&LeaveFilter::default()).await?;

        let mut by_status = BTreeMap::new();
        for status in LeaveStatus::iter() {
            by_status.insert(status, self.store.count_where(&LeaveFilter::status(status)).await?);
        }

        let mut by_type = BTreeMap::new();
        for leave_type in LeaveType::iter() {
            by_type.insert(leave_type, self.store.count_where(&LeaveFilter::leave_type(leave_type)).await?);
        }

        Ok(LeaveStats { total, by_status, by_type })
    }

    /// `None` when the employee has no leave records.
    pub async fn employee_summary(&self, employee_id: &str) -> Result<Option<EmployeeSummary>, LeaveError> {
        let leaves = self.store.find_by_employee(employee_id).await?;
        let Some(latest) = leaves.first() else {
            return Ok(None);
        };

        let mut days_by_type: BTreeMap<LeaveType, i64> = LeaveType::iter().map(|t| (t, 0)).collect();
        for leave in &leaves {
            *days_by_type.entry(leave.leave_type).or_default() += leave.days();
        }

        Ok(Some(EmployeeSummary {
            employee_id: employee_id.to_string(),
            employee_name: latest.employee_name.clone(),
            total_leaves: leaves.len(),
            total_days: leaves.iter().map(LeaveRecord::days).sum(),
            days_by_type,
            recent_leaves: leaves.iter().take(RECENT_LEAVES).cloned().collect(),
        }))
    }

    pub async fn ingest_batch(&self, requests: Vec<LeaveRequest>) -> BatchOutcome<LeaveRequest> {
        BatchIngestor::new(self).ingest_batch(requests).await
    }

    pub async fn ingest_json(&self, items: Vec<serde_json::Value>) -> BatchOutcome<serde_json::Value> {
        BatchIngestor::new(self).ingest_json(items).await
    }

    /// Locks the record's owner (and `new_owner`, if any) and loads the
    /// record under those locks. Retries when the record changed owner
    /// between the unlocked read and acquiring the lock.
    async fn lock_record(
        &self,
        id: &LeaveId,
        new_owner: Option<&str>,
    ) -> Result<(LeaveRecord, Vec<OwnedMutexGuard<()>>), LeaveError> {
        let mut owner = self.get(id).await?.employee_id;
        loop {
            let guards = self.locks.acquire_all([owner.as_str()].into_iter().chain(new_owner)).await;
            let current = self.get(id).await?;
            if current.employee_id == owner {
                return Ok((current, guards));
            }
            debug!(leave_id = %id, from = %owner, to = %current.employee_id, "Leave changed owner, relocking");
            owner = current.employee_id;
        }
    }

    async fn persist(&self, id: &LeaveId, next: LeaveRecord) -> Result<LeaveRecord, LeaveError> {
        self.store
            .update_by_id(id, &next)
            .await?
            .ok_or_else(|| LeaveError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryLeaveStore, StoreResult};
    use actix_web::rt::time::sleep;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    fn service() -> LeaveService {
        LeaveService::new(MemoryLeaveStore::new_shared(), OverlapPolicy::default(), Duration::from_secs(60))
    }

    /// Memory store that pauses after reading an employee's records, so a
    /// concurrent task gets to run between the overlap check and the write.
    struct SlowStore {
        inner: MemoryLeaveStore,
        delay: Duration,
    }

    #[async_trait]
    impl LeaveStore for SlowStore {
        async fn find_all(&self) -> StoreResult<Vec<LeaveRecord>> {
            self.inner.find_all().await
        }

        async fn find_by_id(&self, id: &LeaveId) -> StoreResult<Option<LeaveRecord>> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_employee(&self, employee_id: &str) -> StoreResult<Vec<LeaveRecord>> {
            let snapshot = self.inner.find_by_employee(employee_id).await?;
            sleep(self.delay).await;
            Ok(snapshot)
        }

        async fn search(&self, query: &LeaveSearch) -> StoreResult<Vec<LeaveRecord>> {
            self.inner.search(query).await
        }

        async fn insert(&self, record: &LeaveRecord) -> StoreResult<LeaveId> {
            self.inner.insert(record).await
        }

        async fn update_by_id(&self, id: &LeaveId, record: &LeaveRecord) -> StoreResult<Option<LeaveRecord>> {
            self.inner.update_by_id(id, record).await
        }

        async fn delete_by_id(&self, id: &LeaveId) -> StoreResult<bool> {
            self.inner.delete_by_id(id).await
        }

        async fn count_where(&self, filter: &LeaveFilter) -> StoreResult<u64> {
            self.inner.count_where(filter).await
        }
    }

    fn slow_service() -> LeaveService {
        let store = SlowStore {
            inner: MemoryLeaveStore::new(),
            delay: Duration::from_millis(30),
        };
        LeaveService::new(Arc::new(store), OverlapPolicy::default(), Duration::from_secs(60))
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn assert_no_active_overlaps(records: &[LeaveRecord]) {
        let policy = OverlapPolicy::default();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                let both_active = policy.is_active(a.status) && policy.is_active(b.status);
                assert!(
                    !(both_active && a.range.overlaps(&b.range)),
                    "{} and {} overlap",
                    a.id,
                    b.id
                );
            }
        }
    }

    fn request(employee: &str, leave_type: LeaveType, start: u32, end: u32) -> LeaveRequest {
        LeaveRequest {
            employee_id: employee.to_string(),
            employee_name: format!("{employee} name"),
            leave_type,
            start_date: NaiveDate::from_ymd_opt(2024, 1, start).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, end).unwrap(),
        }
    }

    #[actix_web::test]
    async fn submit_persists_and_blocks_overlaps() {
        let service = service();
        let first = service.submit(request("E1", LeaveType::Annual, 10, 12)).await.unwrap();
        assert_eq!(service.get(&first.id).await.unwrap(), first);

        let err = service.submit(request("E1", LeaveType::Sick, 12, 15)).await.unwrap_err();
        assert!(matches!(err, LeaveError::Overlap { .. }));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn concurrent_overlapping_submits_admit_one() {
        let service = slow_service();
        let (a, b) = futures::join!(
            service.submit(request("E1", LeaveType::Annual, 10, 12)),
            service.submit(request("E1", LeaveType::Annual, 11, 14)),
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(service.list_for_employee("E1").await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn reassignment_racing_with_edits_and_submits_keeps_owner_consistent() {
        let service = slow_service();
        let moved = service.submit(request("E1", LeaveType::Annual, 1, 2)).await.unwrap();

        let reassign = LeavePatch {
            employee_id: Some("E2".into()),
            start_date: Some(day(10)),
            end_date: Some(day(12)),
            ..LeavePatch::default()
        };
        let reschedule = LeavePatch {
            start_date: Some(day(20)),
            end_date: Some(day(22)),
            ..LeavePatch::default()
        };

        // the reschedule reads the record while it still belongs to E1,
        // the submit targets E2 while the reassignment is in flight
        let (a, b, c) = futures::join!(
            service.update(&moved.id, reassign),
            async {
                sleep(Duration::from_millis(5)).await;
                service.update(&moved.id, reschedule).await
            },
            async {
                sleep(Duration::from_millis(10)).await;
                service.submit(request("E2", LeaveType::Annual, 20, 22)).await
            },
        );

        assert_eq!(a.unwrap().employee_id, "E2");
        assert_ne!(b.is_ok(), c.is_ok(), "exactly one of the 20..22 leaves may land");
        if let Ok(rescheduled) = b {
            assert_eq!(rescheduled.employee_id, "E2");
        }

        assert!(service.list_for_employee("E1").await.unwrap().is_empty());
        assert_no_active_overlaps(&service.list_for_employee("E2").await.unwrap());
    }

    #[actix_web::test]
    async fn mutations_on_unknown_record_are_not_found() {
        let service = service();
        let missing = LeaveId::from("missing");
        assert!(matches!(service.approve(&missing).await, Err(LeaveError::NotFound(_))));
        assert!(matches!(service.reject(&missing).await, Err(LeaveError::NotFound(_))));
        assert!(matches!(
            service.update(&missing, LeavePatch::default()).await,
            Err(LeaveError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn approve_then_reject_is_refused() {
        let service = service();
        let record = service.submit(request("E1", LeaveType::Annual, 10, 12)).await.unwrap();
        let approved = service.approve(&record.id).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(service.get(&record.id).await.unwrap().status, LeaveStatus::Approved);

        assert!(matches!(service.reject(&record.id).await, Err(LeaveError::IllegalTransition { .. })));
    }

    #[actix_web::test]
    async fn delete_unknown_record_is_not_found() {
        let service = service();
        let record = service.submit(request("E1", LeaveType::Annual, 10, 12)).await.unwrap();
        service.delete(&record.id).await.unwrap();
        assert!(matches!(service.delete(&record.id).await, Err(LeaveError::NotFound(_))));
    }

    #[actix_web::test]
    async fn stats_count_by_status_and_type() {
        let service = service();
        let a = service.submit(request("E1", LeaveType::Annual, 1, 2)).await.unwrap();
        service.submit(request("E1", LeaveType::Sick, 5, 5)).await.unwrap();
        service.submit(request("E2", LeaveType::Emergency, 1, 1)).await.unwrap();
        service.approve(&a.id).await.unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_status[&LeaveStatus::Pending], 2);
        assert_eq!(stats.by_status[&LeaveStatus::Approved], 1);
        assert_eq!(stats.by_status[&LeaveStatus::Rejected], 0);
        assert_eq!(stats.by_type[&LeaveType::Sick], 1);
    }

    #[actix_web::test]
    async fn summary_totals_days_per_type() {
        let service = service();
        assert!(service.employee_summary("E1").await.unwrap().is_none());

        for day in 1..=7 {
            service.submit(request("E1", LeaveType::Annual, day * 3, day * 3 + 1)).await.unwrap();
        }
        service.submit(request("E1", LeaveType::Sick, 25, 25)).await.unwrap();

        let summary = service.employee_summary("E1").await.unwrap().unwrap();
        assert_eq!(summary.total_leaves, 8);
        assert_eq!(summary.total_days, 15);
        assert_eq!(summary.days_by_type[&LeaveType::Annual], 14);
        assert_eq!(summary.days_by_type[&LeaveType::Emergency], 0);
        assert_eq!(summary.recent_leaves.len(), 5);
        assert_eq!(summary.employee_name, "E1 name");
    }
}
