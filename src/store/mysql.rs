use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySqlPool, prelude::FromRow};
use tracing::debug;

use super::{LeaveFilter, LeaveSearch, LeaveStore, StoreError, StoreResult};
use crate::model::{DateRange, LeaveId, LeaveRecord, LeaveStatus, LeaveType};

const SELECT_COLUMNS: &str = r#"
    SELECT id, employee_id, employee_name, leave_type, start_date, end_date, status, created_at
    FROM leave_requests
"#;

const ORDER_NEWEST_FIRST: &str = " ORDER BY created_at DESC, id DESC";

/// Leave store backed by the `leave_requests` MySQL table.
#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: String,
    employee_id: String,
    employee_name: String,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveRecord {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: row.id.clone(),
            reason,
        };
        let leave_type = LeaveType::from_str(&row.leave_type)
            .map_err(|_| corrupt(format!("unknown leave type `{}`", row.leave_type)))?;
        let status = LeaveStatus::from_str(&row.status)
            .map_err(|_| corrupt(format!("unknown status `{}`", row.status)))?;
        let range = DateRange::new(row.start_date, row.end_date).map_err(|e| corrupt(e.to_string()))?;

        Ok(LeaveRecord {
            id: LeaveId::from(row.id),
            employee_id: row.employee_id,
            employee_name: row.employee_name,
            leave_type,
            range,
            status,
            created_at: row.created_at,
        })
    }
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Str(String),
    Date(NaiveDate),
}

struct WhereClause {
    sql: String,
    args: Vec<FilterValue>,
}

impl WhereClause {
    fn new() -> Self {
        Self {
            sql: String::from(" WHERE 1=1"),
            args: Vec::new(),
        }
    }

    fn push(&mut self, condition: &str, value: FilterValue) {
        self.sql.push_str(" AND ");
        self.sql.push_str(condition);
        self.args.push(value);
    }
}

impl From<&LeaveSearch> for WhereClause {
    fn from(query: &LeaveSearch) -> Self {
        let mut clause = WhereClause::new();
        if let Some(employee_id) = &query.employee_id {
            clause.push("employee_id = ?", FilterValue::Str(employee_id.clone()));
        }
        if let Some(from) = query.start_date {
            clause.push("end_date >= ?", FilterValue::Date(from));
        }
        if let Some(to) = query.end_date {
            clause.push("start_date <= ?", FilterValue::Date(to));
        }
        clause
    }
}

impl From<&LeaveFilter> for WhereClause {
    fn from(filter: &LeaveFilter) -> Self {
        let mut clause = WhereClause::new();
        if let Some(status) = filter.status {
            clause.push("status = ?", FilterValue::Str(status.to_string()));
        }
        if let Some(leave_type) = filter.leave_type {
            clause.push("leave_type = ?", FilterValue::Str(leave_type.to_string()));
        }
        clause
    }
}

impl MySqlLeaveStore {
    async fn fetch_records(&self, clause: WhereClause) -> StoreResult<Vec<LeaveRecord>> {
        let sql = format!("{SELECT_COLUMNS}{}{ORDER_NEWEST_FIRST}", clause.sql);
        debug!(sql = %sql, "Fetching leave requests");

        let mut query = sqlx::query_as::<_, LeaveRow>(&sql);
        for arg in clause.args {
            query = match arg {
                FilterValue::Str(s) => query.bind(s),
                FilterValue::Date(d) => query.bind(d),
            };
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(LeaveRecord::try_from)
            .collect()
    }
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn find_all(&self) -> StoreResult<Vec<LeaveRecord>> {
        self.fetch_records(WhereClause::new()).await
    }

    async fn find_by_id(&self, id: &LeaveId) -> StoreResult<Option<LeaveRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(LeaveRecord::try_from)
            .transpose()
    }

    async fn find_by_employee(&self, employee_id: &str) -> StoreResult<Vec<LeaveRecord>> {
        let mut clause = WhereClause::new();
        clause.push("employee_id = ?", FilterValue::Str(employee_id.to_string()));
        self.fetch_records(clause).await
    }

    async fn search(&self, query: &LeaveSearch) -> StoreResult<Vec<LeaveRecord>> {
        self.fetch_records(WhereClause::from(query)).await
    }

    async fn insert(&self, record: &LeaveRecord) -> StoreResult<LeaveId> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, employee_id, employee_name, leave_type, start_date, end_date, status, days, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.employee_id)
        .bind(&record.employee_name)
        .bind(record.leave_type.as_ref())
        .bind(record.range.start())
        .bind(record.range.end())
        .bind(record.status.as_ref())
        .bind(record.days())
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record.id.clone()),
            // Primary key collision
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23000") => {
                Err(StoreError::DuplicateId(record.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_by_id(&self, id: &LeaveId, record: &LeaveRecord) -> StoreResult<Option<LeaveRecord>> {
        sqlx::query(
            r#"
            UPDATE leave_requests
            SET employee_id = ?, employee_name = ?, leave_type = ?,
                start_date = ?, end_date = ?, status = ?, days = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.employee_id)
        .bind(&record.employee_name)
        .bind(record.leave_type.as_ref())
        .bind(record.range.start())
        .bind(record.range.end())
        .bind(record.status.as_ref())
        .bind(record.days())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        // rows_affected is 0 for an unchanged row, so re-read to tell "missing" apart
        self.find_by_id(id).await
    }

    async fn delete_by_id(&self, id: &LeaveId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_where(&self, filter: &LeaveFilter) -> StoreResult<u64> {
        let clause = WhereClause::from(filter);
        let sql = format!("SELECT COUNT(*) FROM leave_requests{}", clause.sql);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for arg in clause.args {
            query = match arg {
                FilterValue::Str(s) => query.bind(s),
                FilterValue::Date(d) => query.bind(d),
            };
        }
        let total = query.fetch_one(&self.pool).await?;
        Ok(total.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_builds_window_conditions() {
        let clause = WhereClause::from(&LeaveSearch {
            employee_id: Some("E1".into()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
        });
        assert_eq!(clause.sql, " WHERE 1=1 AND employee_id = ? AND end_date >= ?");
        assert_eq!(clause.args.len(), 2);
    }

    #[test]
    fn count_filter_binds_enum_names() {
        let clause = WhereClause::from(&LeaveFilter::status(LeaveStatus::Pending));
        assert_eq!(clause.sql, " WHERE 1=1 AND status = ?");
        assert!(matches!(&clause.args[0], FilterValue::Str(s) if s == "Pending"));
    }

    #[test]
    fn corrupt_rows_are_reported() {
        let row = LeaveRow {
            id: "abc".into(),
            employee_id: "E1".into(),
            employee_name: "Jane".into(),
            leave_type: "Unpaid".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            status: "Pending".into(),
            created_at: Utc::now(),
        };
        let err = LeaveRecord::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref id, .. } if id == "abc"));
    }
}
