pub mod date_range;
pub mod leave_request;

pub use date_range::{DateRange, InvalidRange};
pub use leave_request::{LeaveId, LeavePatch, LeaveRecord, LeaveRequest, LeaveStatus, LeaveType};
