use derive_more::Display;

use crate::model::{InvalidRange, LeaveId, LeaveStatus};
use crate::store::StoreError;

/// Every way a leave operation can be refused or fail.
///
/// The first five are caller mistakes the HTTP layer maps to 4xx;
/// `Persistence` is a collaborator failure and is surfaced as-is.
#[derive(Debug, Display)]
pub enum LeaveError {
    #[display(fmt = "{}", _0)]
    InvalidRequest(String),

    #[display(fmt = "{}", _0)]
    InvalidRange(InvalidRange),

    #[display(fmt = "duplicate leave application")]
    Overlap { conflicting: Vec<LeaveId> },

    #[display(fmt = "leave request {} not found", _0)]
    NotFound(LeaveId),

    #[display(fmt = "cannot change leave status from {} to {}", from, to)]
    IllegalTransition { from: LeaveStatus, to: LeaveStatus },

    #[display(fmt = "{}", _0)]
    Persistence(StoreError),
}

impl std::error::Error for LeaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeaveError::InvalidRange(e) => Some(e),
            LeaveError::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InvalidRange> for LeaveError {
    fn from(e: InvalidRange) -> Self {
        LeaveError::InvalidRange(e)
    }
}

impl From<StoreError> for LeaveError {
    fn from(e: StoreError) -> Self {
        LeaveError::Persistence(e)
    }
}
