use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::leave_request::{LeaveResponse, to_responses};
use crate::leave::{EmployeeSummary, LeaveService, LeaveStats};
use crate::model::{LeaveStatus, LeaveType};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TypeCounts {
    pub annual: u64,
    pub sick: u64,
    pub emergency: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[schema(example = 12)]
    pub total: u64,
    pub by_status: StatusCounts,
    pub by_type: TypeCounts,
}

impl From<LeaveStats> for StatsResponse {
    fn from(stats: LeaveStats) -> Self {
        let status = |s: LeaveStatus| stats.by_status.get(&s).copied().unwrap_or(0);
        let kind = |t: LeaveType| stats.by_type.get(&t).copied().unwrap_or(0);
        Self {
            total: stats.total,
            by_status: StatusCounts {
                pending: status(LeaveStatus::Pending),
                approved: status(LeaveStatus::Approved),
                rejected: status(LeaveStatus::Rejected),
            },
            by_type: TypeCounts {
                annual: kind(LeaveType::Annual),
                sick: kind(LeaveType::Sick),
                emergency: kind(LeaveType::Emergency),
            },
        }
    }
}

/// Days taken per leave type.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TypeDays {
    pub annual: i64,
    pub sick: i64,
    pub emergency: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummaryResponse {
    #[schema(example = "E1")]
    pub employee_id: String,
    #[schema(example = "Jane Doe")]
    pub name: String,
    pub total_leaves: usize,
    pub total_days: i64,
    pub by_type: TypeDays,
    /// the five most recent leave requests
    pub recent_leaves: Vec<LeaveResponse>,
}

impl From<EmployeeSummary> for EmployeeSummaryResponse {
    fn from(summary: EmployeeSummary) -> Self {
        let days = |t: LeaveType| summary.days_by_type.get(&t).copied().unwrap_or(0);
        Self {
            by_type: TypeDays {
                annual: days(LeaveType::Annual),
                sick: days(LeaveType::Sick),
                emergency: days(LeaveType::Emergency),
            },
            employee_id: summary.employee_id,
            name: summary.employee_name,
            total_leaves: summary.total_leaves,
            total_days: summary.total_days,
            recent_leaves: to_responses(summary.recent_leaves),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Leave counts by status and type", body = StatsResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Stats"
)]
pub async fn leave_stats(service: web::Data<LeaveService>) -> actix_web::Result<impl Responder> {
    let stats = service.stats().await?;
    Ok(HttpResponse::Ok().json(StatsResponse::from(stats)))
}

#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/summary",
    params(
        ("employee_id" = String, Path, description = "Employee to summarize")
    ),
    responses(
        (status = 200, description = "Leave totals for the employee", body = EmployeeSummaryResponse),
        (status = 404, description = "Employee has no leave records", body = Object, example = json!({
            "message": "No leave records found for this employee"
        }))
    ),
    tag = "Stats"
)]
pub async fn employee_summary(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    match service.employee_summary(&employee_id).await? {
        Some(summary) => Ok(HttpResponse::Ok().json(EmployeeSummaryResponse::from(summary))),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "No leave records found for this employee"
        }))),
    }
}
