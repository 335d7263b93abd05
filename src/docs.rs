use crate::api::leave_request::{
    BatchFailureResponse, BatchResponse, BatchResults, LeaveResponse,
};
use crate::api::stats::{
    EmployeeSummaryResponse, StatsResponse, StatusCounts, TypeCounts, TypeDays,
};
use crate::model::{LeavePatch, LeaveRequest, LeaveStatus, LeaveType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Desk API",
        version = "0.1.0",
        description = r#"
## Leave Request Management

Employees submit leave applications, administrators approve or reject them,
and summary statistics are derived per employee and globally.

### 🔹 Rules
- A leave covers whole calendar days; both the start and end day count.
- An employee cannot hold two active leaves that share any day.
  Rejected leaves do not block new applications.
- Status moves only from **Pending** to **Approved** or **Rejected**.

### 📦 Batch import
`POST /api/leaves/batch` accepts a list of applications (for RPA tools).
Items are processed in order; a failing item is reported and never stops the rest.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::employee_leaves,
        crate::api::leave_request::search_leaves,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::batch_leaves,

        crate::api::stats::leave_stats,
        crate::api::stats::employee_summary
    ),
    components(
        schemas(
            LeaveRequest,
            LeavePatch,
            LeaveType,
            LeaveStatus,
            LeaveResponse,
            BatchResponse,
            BatchResults,
            BatchFailureResponse,
            StatsResponse,
            StatusCounts,
            TypeCounts,
            TypeDays,
            EmployeeSummaryResponse
        )
    ),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Stats", description = "Leave statistics APIs"),
    )
)]
pub struct ApiDoc;
