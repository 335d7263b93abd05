use std::sync::Arc;

use chrono::Utc;

use super::{LeaveError, OverlapPolicy};
use crate::model::{DateRange, LeaveId, LeavePatch, LeaveRecord, LeaveRequest, LeaveStatus};
use crate::store::LeaveStore;

/// Validates and derives leave records. Reads from the store but never
/// writes to it; persisting the returned record is the caller's job.
///
/// Mutations take the current record as loaded by the caller while it
/// holds the owner's lock, so the check runs against that same snapshot.
#[derive(Clone)]
pub struct LeaveLifecycle {
    store: Arc<dyn LeaveStore>,
    policy: OverlapPolicy,
}

fn required(value: &str, field: &str) -> Result<String, LeaveError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeaveError::InvalidRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

impl LeaveLifecycle {
    pub fn new(store: Arc<dyn LeaveStore>, policy: OverlapPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(&self, request: LeaveRequest) -> Result<LeaveRecord, LeaveError> {
        let employee_id = required(&request.employee_id, "employeeId")?;
        let employee_name = required(&request.employee_name, "name")?;
        let range = DateRange::new(request.start_date, request.end_date)?;

        let existing = self.store.find_by_employee(&employee_id).await?;
        self.policy.check(&range, &existing, None)?;

        Ok(LeaveRecord {
            id: LeaveId::generate(),
            employee_id,
            employee_name,
            leave_type: request.leave_type,
            range,
            status: LeaveStatus::Pending,
            created_at: Utc::now(),
        })
    }

    /// Applies `patch` to `current`. A status equal to the current one is
    /// accepted as a no-op; any other status change must be legal.
    pub async fn update(&self, current: &LeaveRecord, patch: LeavePatch) -> Result<LeaveRecord, LeaveError> {
        let mut next = current.clone();

        if let Some(employee_id) = &patch.employee_id {
            next.employee_id = required(employee_id, "employeeId")?;
        }
        if let Some(employee_name) = &patch.employee_name {
            next.employee_name = required(employee_name, "name")?;
        }
        if let Some(leave_type) = patch.leave_type {
            next.leave_type = leave_type;
        }
        if let Some(status) = patch.status.filter(|s| *s != current.status) {
            if !current.status.can_transition_to(status) {
                return Err(LeaveError::IllegalTransition {
                    from: current.status,
                    to: status,
                });
            }
            next.status = status;
        }
        if patch.touches_range() {
            next.range = DateRange::new(
                patch.start_date.unwrap_or(current.range.start()),
                patch.end_date.unwrap_or(current.range.end()),
            )?;
        }

        let reassigned = next.employee_id != current.employee_id;
        if (patch.touches_range() || reassigned) && self.policy.is_active(next.status) {
            let existing = self.store.find_by_employee(&next.employee_id).await?;
            self.policy.check(&next.range, &existing, Some(&current.id))?;
        }

        Ok(next)
    }

    pub fn approve(&self, current: &LeaveRecord) -> Result<LeaveRecord, LeaveError> {
        transition(current, LeaveStatus::Approved)
    }

    pub fn reject(&self, current: &LeaveRecord) -> Result<LeaveRecord, LeaveError> {
        transition(current, LeaveStatus::Rejected)
    }
}

/// Status-only change; the record must currently be Pending.
fn transition(current: &LeaveRecord, target: LeaveStatus) -> Result<LeaveRecord, LeaveError> {
    if !current.status.can_transition_to(target) {
        return Err(LeaveError::IllegalTransition {
            from: current.status,
            to: target,
        });
    }
    Ok(LeaveRecord {
        status: target,
        ..current.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LeaveType;
    use crate::store::MemoryLeaveStore;
    use chrono::NaiveDate;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(employee: &str, start: &str, end: &str) -> LeaveRequest {
        LeaveRequest {
            employee_id: employee.to_string(),
            employee_name: "Jane Doe".to_string(),
            leave_type: LeaveType::Annual,
            start_date: day(start),
            end_date: day(end),
        }
    }

    fn setup() -> (Arc<MemoryLeaveStore>, LeaveLifecycle) {
        let store = MemoryLeaveStore::new_shared();
        let lifecycle = LeaveLifecycle::new(store.clone(), OverlapPolicy::default());
        (store, lifecycle)
    }

    async fn persisted(store: &MemoryLeaveStore, lifecycle: &LeaveLifecycle, req: LeaveRequest) -> LeaveRecord {
        let record = lifecycle.create(req).await.unwrap();
        store.insert(&record).await.unwrap();
        record
    }

    async fn reload(store: &MemoryLeaveStore, record: &LeaveRecord) -> LeaveRecord {
        store.find_by_id(&record.id).await.unwrap().unwrap()
    }

    #[actix_web::test]
    async fn create_derives_days_and_pending_status() {
        let (_, lifecycle) = setup();
        let record = lifecycle.create(request("E1", "2024-01-10", "2024-01-12")).await.unwrap();
        assert_eq!(record.days(), 3);
        assert_eq!(record.status, LeaveStatus::Pending);
        assert_eq!(record.employee_id, "E1");
    }

    #[actix_web::test]
    async fn create_trims_and_requires_identity_fields() {
        let (_, lifecycle) = setup();
        let record = lifecycle.create(request("  E1 ", "2024-01-10", "2024-01-10")).await.unwrap();
        assert_eq!(record.employee_id, "E1");

        let err = lifecycle.create(request("   ", "2024-01-10", "2024-01-10")).await.unwrap_err();
        assert!(matches!(err, LeaveError::InvalidRequest(ref m) if m == "employeeId is required"));
    }

    #[actix_web::test]
    async fn create_rejects_inverted_range() {
        let (_, lifecycle) = setup();
        let err = lifecycle.create(request("E1", "2024-01-12", "2024-01-10")).await.unwrap_err();
        assert!(matches!(err, LeaveError::InvalidRange(_)));
        assert_eq!(err.to_string(), "end date must be on or after start date");
    }

    #[actix_web::test]
    async fn create_rejects_overlap_but_accepts_adjacent_range() {
        let (store, lifecycle) = setup();
        let first = persisted(&store, &lifecycle, request("E1", "2024-01-10", "2024-01-12")).await;

        let err = lifecycle.create(request("E1", "2024-01-12", "2024-01-15")).await.unwrap_err();
        match err {
            LeaveError::Overlap { conflicting } => assert_eq!(conflicting, vec![first.id]),
            other => panic!("unexpected error: {other}"),
        }

        let adjacent = lifecycle.create(request("E1", "2024-01-13", "2024-01-15")).await.unwrap();
        assert_eq!(adjacent.days(), 3);

        // other employees are unaffected
        assert!(lifecycle.create(request("E2", "2024-01-10", "2024-01-12")).await.is_ok());
    }

    #[actix_web::test]
    async fn rejected_leave_does_not_block_new_request() {
        let (store, lifecycle) = setup();
        let first = persisted(&store, &lifecycle, request("E1", "2024-01-10", "2024-01-12")).await;
        let rejected = lifecycle.reject(&first).unwrap();
        store.update_by_id(&first.id, &rejected).await.unwrap();

        assert!(lifecycle.create(request("E1", "2024-01-11", "2024-01-11")).await.is_ok());
    }

    #[actix_web::test]
    async fn update_with_current_fields_is_a_no_op() {
        let (store, lifecycle) = setup();
        let record = persisted(&store, &lifecycle, request("E1", "2024-01-10", "2024-01-12")).await;

        let patch = LeavePatch {
            employee_id: Some(record.employee_id.clone()),
            employee_name: Some(record.employee_name.clone()),
            leave_type: Some(record.leave_type),
            start_date: Some(record.range.start()),
            end_date: Some(record.range.end()),
            status: Some(record.status),
        };
        let updated = lifecycle.update(&record, patch).await.unwrap();
        assert_eq!(updated, record);
    }

    #[actix_web::test]
    async fn update_rederives_days_and_checks_other_records() {
        let (store, lifecycle) = setup();
        let a = persisted(&store, &lifecycle, request("E1", "2024-01-10", "2024-01-12")).await;
        persisted(&store, &lifecycle, request("E1", "2024-01-20", "2024-01-22")).await;

        let extended = lifecycle
            .update(&a, LeavePatch {
                end_date: Some(day("2024-01-15")),
                ..LeavePatch::default()
            })
            .await
            .unwrap();
        assert_eq!(extended.days(), 6);

        let err = lifecycle
            .update(&a, LeavePatch {
                end_date: Some(day("2024-01-20")),
                ..LeavePatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Overlap { .. }));

        let err = lifecycle
            .update(&a, LeavePatch {
                start_date: Some(day("2024-01-13")),
                ..LeavePatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidRange(_)));
    }

    #[actix_web::test]
    async fn update_reassigning_employee_checks_new_owner() {
        let (store, lifecycle) = setup();
        let a = persisted(&store, &lifecycle, request("E1", "2024-01-10", "2024-01-12")).await;
        persisted(&store, &lifecycle, request("E2", "2024-01-11", "2024-01-11")).await;

        let err = lifecycle
            .update(&a, LeavePatch {
                employee_id: Some("E2".into()),
                ..LeavePatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Overlap { .. }));
    }

    #[actix_web::test]
    async fn update_enforces_status_machine() {
        let (store, lifecycle) = setup();
        let record = persisted(&store, &lifecycle, request("E1", "2024-01-10", "2024-01-12")).await;

        let approved = lifecycle.update(&record, LeavePatch::status(LeaveStatus::Approved)).await.unwrap();
        store.update_by_id(&record.id, &approved).await.unwrap();

        let err = lifecycle
            .update(&reload(&store, &record).await, LeavePatch::status(LeaveStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LeaveError::IllegalTransition {
                from: LeaveStatus::Approved,
                to: LeaveStatus::Pending
            }
        ));
    }

    #[actix_web::test]
    async fn approve_requires_pending_record() {
        let (store, lifecycle) = setup();
        let record = persisted(&store, &lifecycle, request("E1", "2024-01-10", "2024-01-12")).await;
        let rejected = lifecycle.reject(&record).unwrap();
        store.update_by_id(&record.id, &rejected).await.unwrap();

        let err = lifecycle.approve(&reload(&store, &record).await).unwrap_err();
        assert!(matches!(
            err,
            LeaveError::IllegalTransition {
                from: LeaveStatus::Rejected,
                to: LeaveStatus::Approved
            }
        ));
        assert!(matches!(lifecycle.reject(&rejected), Err(LeaveError::IllegalTransition { .. })));
    }
}
