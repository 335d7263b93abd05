//! Leave-interval validation, conflict detection and the services built on them.

mod batch;
mod error;
mod lifecycle;
mod locks;
mod overlap;
mod service;

pub use batch::{BatchFailure, BatchIngestor, BatchOutcome};
pub use error::LeaveError;
pub use lifecycle::LeaveLifecycle;
pub use locks::EmployeeLocks;
pub use overlap::{OverlapPolicy, is_admissible};
pub use service::{EmployeeSummary, LeaveService, LeaveStats};
