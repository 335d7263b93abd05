use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::leave::{BatchOutcome, LeaveService};
use crate::model::date_range::calendar_day;
use crate::model::{LeaveId, LeavePatch, LeaveRecord, LeaveRequest, LeaveStatus, LeaveType};
use crate::store::LeaveSearch;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "0b8c4a9e-1f57-4a39-9b53-7c1f0b1f2d11",
    "employeeId": "E1",
    "name": "Jane Doe",
    "leaveType": "Annual",
    "startDate": "2024-01-10",
    "endDate": "2024-01-12",
    "status": "Pending",
    "days": 3,
    "createdAt": "2024-01-01T00:00:00Z"
}))]
pub struct LeaveResponse {
    /// leave application id
    pub id: String,
    /// employee who applied for the leave
    pub employee_id: String,
    #[serde(rename = "name")]
    pub employee_name: String,
    pub leave_type: LeaveType,
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    /// inclusive number of calendar days
    #[schema(example = 3)]
    pub days: i64,
    #[schema(example = "2024-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<LeaveRecord> for LeaveResponse {
    fn from(record: LeaveRecord) -> Self {
        Self {
            days: record.days(),
            id: record.id.as_str().to_string(),
            employee_id: record.employee_id,
            employee_name: record.employee_name,
            leave_type: record.leave_type,
            start_date: record.range.start(),
            end_date: record.range.end(),
            status: record.status,
            created_at: record.created_at,
        }
    }
}

pub(crate) fn to_responses(records: Vec<LeaveRecord>) -> Vec<LeaveResponse> {
    records.into_iter().map(LeaveResponse::from).collect()
}

#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Filter by employee ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// Keep leaves ending on or after this day
    #[serde(
        default,
        deserialize_with = "calendar_day::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[param(value_type = Option<String>, example = "2024-01-01")]
    pub start_date: Option<NaiveDate>,
    /// Keep leaves starting on or before this day
    #[serde(
        default,
        deserialize_with = "calendar_day::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    #[param(value_type = Option<String>, example = "2024-01-31")]
    pub end_date: Option<NaiveDate>,
}

impl From<SearchParams> for LeaveSearch {
    fn from(params: SearchParams) -> Self {
        Self {
            employee_id: params.employee_id.filter(|id| !id.trim().is_empty()),
            start_date: params.start_date,
            end_date: params.end_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchFailureResponse {
    /// the item exactly as submitted
    #[schema(value_type = Object)]
    pub data: Value,
    #[schema(example = "duplicate leave application")]
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchResults {
    pub success: Vec<LeaveResponse>,
    pub failures: Vec<BatchFailureResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    #[schema(example = "Batch processing completed")]
    pub message: String,
    pub success_count: usize,
    pub failure_count: usize,
    pub results: BatchResults,
}

impl From<BatchOutcome<Value>> for BatchResponse {
    fn from(outcome: BatchOutcome<Value>) -> Self {
        Self {
            message: "Batch processing completed".to_string(),
            success_count: outcome.successes.len(),
            failure_count: outcome.failures.len(),
            results: BatchResults {
                success: to_responses(outcome.successes),
                failures: outcome
                    .failures
                    .into_iter()
                    .map(|f| BatchFailureResponse {
                        error: f.reason.to_string(),
                        data: f.request,
                    })
                    .collect(),
            },
        }
    }
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/leaves",
    responses(
        (status = 200, description = "All leave requests, newest first", body = [LeaveResponse]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn leave_list(service: web::Data<LeaveService>) -> actix_web::Result<impl Responder> {
    let leaves = service.list().await?;
    Ok(HttpResponse::Ok().json(to_responses(leaves)))
}

#[utoipa::path(
    get,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "leave request 42 not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let leave_id = LeaveId::from(path.into_inner());
    let leave = service.get(&leave_id).await?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(leave)))
}

#[utoipa::path(
    get,
    path = "/api/leaves/employee/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee whose leaves to list")
    ),
    responses(
        (status = 200, description = "Leave requests of the employee", body = [LeaveResponse]),
        (status = 404, description = "Employee has no leave requests")
    ),
    tag = "Leave"
)]
pub async fn employee_leaves(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let leaves = service.list_for_employee(&employee_id).await?;

    if leaves.is_empty() {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": format!("No leave records found for employee {employee_id}")
        })));
    }

    Ok(HttpResponse::Ok().json(to_responses(leaves)))
}

#[utoipa::path(
    get,
    path = "/api/leaves/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Leave requests intersecting the window", body = [LeaveResponse]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Leave"
)]
pub async fn search_leaves(
    service: web::Data<LeaveService>,
    query: web::Query<SearchParams>,
) -> actix_web::Result<impl Responder> {
    let search = LeaveSearch::from(query.into_inner());
    let leaves = service.search(&search).await?;
    Ok(HttpResponse::Ok().json(to_responses(leaves)))
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body(
        content = LeaveRequest,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveResponse),
        (status = 400, description = "Invalid request, inverted date range or overlapping leave", body = Object, example = json!({
            "message": "duplicate leave application"
        }))
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    service: web::Data<LeaveService>,
    payload: web::Json<LeaveRequest>,
) -> actix_web::Result<impl Responder> {
    let leave = service.submit(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(LeaveResponse::from(leave)))
}

#[utoipa::path(
    put,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to update")
    ),
    request_body = LeavePatch,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveResponse),
        (status = 400, description = "Invalid patch, overlapping leave or illegal status change"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
    payload: web::Json<LeavePatch>,
) -> actix_web::Result<impl Responder> {
    let leave_id = LeaveId::from(path.into_inner());
    let leave = service.update(&leave_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(leave)))
}

/* =========================
Approve / reject leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leaves/{leave_id}/approve",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = LeaveResponse),
        (status = 400, description = "Leave request already processed", body = Object, example = json!({
            "message": "cannot change leave status from Rejected to Approved"
        })),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let leave_id = LeaveId::from(path.into_inner());
    let leave = service.approve(&leave_id).await?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(leave)))
}

#[utoipa::path(
    put,
    path = "/api/leaves/{leave_id}/reject",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveResponse),
        (status = 400, description = "Leave request already processed"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let leave_id = LeaveId::from(path.into_inner());
    let leave = service.reject(&leave_id).await?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(leave)))
}

#[utoipa::path(
    delete,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 200, description = "Leave request deleted", body = Object, example = json!({
            "message": "Leave request deleted",
            "id": "0b8c4a9e-1f57-4a39-9b53-7c1f0b1f2d11"
        })),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let leave_id = LeaveId::from(path.into_inner());
    service.delete(&leave_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request deleted",
        "id": leave_id
    })))
}

/* =========================
Batch import (RPA)
========================= */
#[utoipa::path(
    post,
    path = "/api/leaves/batch",
    request_body(
        content = [LeaveRequest],
        description = "Leave requests to import, processed in order",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Batch processed; per-item failures are reported in the body", body = BatchResponse),
        (status = 400, description = "Body is not a JSON array")
    ),
    tag = "Leave"
)]
pub async fn batch_leaves(
    service: web::Data<LeaveService>,
    payload: web::Json<Vec<Value>>,
) -> actix_web::Result<impl Responder> {
    let outcome = service.ingest_json(payload.into_inner()).await;
    Ok(HttpResponse::Ok().json(BatchResponse::from(outcome)))
}
