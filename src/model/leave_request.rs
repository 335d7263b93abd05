use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use super::date_range::{DateRange, calendar_day};

/// System-assigned identity of a leave record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
pub struct LeaveId(String);

impl LeaveId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LeaveId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for LeaveId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
    strum_macros::Display, EnumString, AsRefStr, EnumIter,
)]
pub enum LeaveType {
    Annual,
    Sick,
    Emergency,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
    strum_macros::Display, EnumString, AsRefStr, EnumIter,
)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Approved and Rejected records never change status again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }

    /// Only a Pending record may move, and only to a terminal status.
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }
}

/// One employee's request for time off, as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveRecord {
    pub id: LeaveId,
    pub employee_id: String,
    pub employee_name: String,
    pub leave_type: LeaveType,
    pub range: DateRange,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

impl LeaveRecord {
    /// Always derived from the range; never taken from input.
    pub fn days(&self) -> i64 {
        self.range.inclusive_day_count()
    }
}

/// Payload for submitting a new leave application.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[serde(default)]
    #[schema(example = "E1")]
    pub employee_id: String,

    #[serde(default, rename = "name", alias = "employeeName")]
    #[schema(example = "Jane Doe")]
    pub employee_name: String,

    #[schema(example = "Annual")]
    pub leave_type: LeaveType,

    #[serde(deserialize_with = "calendar_day::deserialize")]
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,

    #[serde(deserialize_with = "calendar_day::deserialize")]
    #[schema(example = "2024-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

/// Partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeavePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,

    #[serde(default, rename = "name", alias = "employeeName", skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<LeaveType>,

    #[serde(
        default,
        deserialize_with = "calendar_day::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(example = "2024-01-10", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,

    #[serde(
        default,
        deserialize_with = "calendar_day::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(example = "2024-01-12", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeaveStatus>,
}

impl LeavePatch {
    pub fn status(status: LeaveStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn touches_range(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}
