//! Persistence collaborator for leave records.

use async_trait::async_trait;
use chrono::NaiveDate;
use derive_more::Display;

use crate::model::{LeaveId, LeaveRecord, LeaveStatus, LeaveType};

pub mod memory;
pub mod mysql;

pub use memory::MemoryLeaveStore;
pub use mysql::MySqlLeaveStore;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "leave record {} already exists", _0)]
    DuplicateId(LeaveId),

    #[display(fmt = "corrupt leave row {}: {}", id, reason)]
    Corrupt { id: String, reason: String },
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Equality filter used for counting.
#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
}

impl LeaveFilter {
    pub fn status(status: LeaveStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn leave_type(leave_type: LeaveType) -> Self {
        Self {
            leave_type: Some(leave_type),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &LeaveRecord) -> bool {
        self.status.is_none_or(|s| record.status == s)
            && self.leave_type.is_none_or(|t| record.leave_type == t)
    }
}

/// Search window. A record matches when it intersects `[start_date, end_date]`;
/// either bound may be open.
#[derive(Debug, Clone, Default)]
pub struct LeaveSearch {
    pub employee_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl LeaveSearch {
    pub fn matches(&self, record: &LeaveRecord) -> bool {
        self.employee_id.as_deref().is_none_or(|id| record.employee_id == id)
            && self.start_date.is_none_or(|from| record.range.end() >= from)
            && self.end_date.is_none_or(|to| record.range.start() <= to)
    }
}

/// Storage interface for leave records.
///
/// Listing methods return records newest `created_at` first.
/// Implementations must be thread-safe; every call is a single atomic
/// read or single-document write.
#[async_trait]
pub trait LeaveStore: Send + Sync + 'static {
    async fn find_all(&self) -> StoreResult<Vec<LeaveRecord>>;

    async fn find_by_id(&self, id: &LeaveId) -> StoreResult<Option<LeaveRecord>>;

    async fn find_by_employee(&self, employee_id: &str) -> StoreResult<Vec<LeaveRecord>>;

    async fn search(&self, query: &LeaveSearch) -> StoreResult<Vec<LeaveRecord>>;

    async fn insert(&self, record: &LeaveRecord) -> StoreResult<LeaveId>;

    /// Replaces the mutable fields of an existing record. `id` and
    /// `created_at` are never overwritten. Returns `None` if no record has `id`.
    async fn update_by_id(&self, id: &LeaveId, record: &LeaveRecord) -> StoreResult<Option<LeaveRecord>>;

    async fn delete_by_id(&self, id: &LeaveId) -> StoreResult<bool>;

    async fn count_where(&self, filter: &LeaveFilter) -> StoreResult<u64>;
}

pub(crate) fn sort_newest_first(records: &mut [LeaveRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.as_str().cmp(a.id.as_str()))
    });
}
