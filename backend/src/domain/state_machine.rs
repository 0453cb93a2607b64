//! Enrollment lifecycle transitions.
//!
//! Two states, `active` and `inactive`, and three transitions:
//!
//! ```text
//!         change_staff (same state)
//!         +-----------+
//!         v           |
//!      +------+   deactivate   +----------+
//!      |active| -------------> | inactive |
//!      +------+ <------------- +----------+
//!                 reactivate
//! ```
//!
//! Every function here is pure: it takes the current record and an explicit `now`
//! and returns the next record (with `version` bumped) or the reason it refused.
//! Persisting the result is the caller's job.

use chrono::{DateTime, Utc};
use log::warn;
use shared::{EnrollmentStatus, StaffRemovalReason, StaffRole, SERVICE_DEACTIVATED};

use crate::domain::errors::EnrollmentError;
use crate::domain::history::close_assignment;
use crate::domain::models::enrollment::{ServiceEnrollment, StaffAssignment};

/// Staff selected for an enrollment, before the assignment time is known
#[derive(Debug, Clone, PartialEq)]
pub struct NewStaff {
    pub staff_id: String,
    pub staff_name: String,
    pub staff_role: StaffRole,
    pub assigned_by: String,
}

impl NewStaff {
    fn assign_at(self, now: DateTime<Utc>) -> StaffAssignment {
        StaffAssignment {
            staff_id: self.staff_id,
            staff_name: self.staff_name,
            staff_role: self.staff_role,
            assigned_at: now,
            assigned_by: self.assigned_by,
        }
    }
}

/// Why the current staff member is being replaced
#[derive(Debug, Clone, PartialEq)]
pub struct StaffChangeReason {
    pub reason: StaffRemovalReason,
    pub notes: Option<String>,
}

impl StaffChangeReason {
    pub fn new(reason: StaffRemovalReason) -> Self {
        Self { reason, notes: None }
    }

    pub fn other(notes: &str) -> Self {
        Self {
            reason: StaffRemovalReason::Other,
            notes: Some(notes.to_string()),
        }
    }

    /// Trimmed notes; `other` must carry some
    fn validated_notes(&self) -> Result<Option<String>, EnrollmentError> {
        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        if self.reason.requires_note() && notes.is_none() {
            return Err(EnrollmentError::invalid("Please describe the reason for the staff change"));
        }
        Ok(notes)
    }
}

fn ensure_role_matches(enrollment: &ServiceEnrollment, new_staff: &NewStaff) -> Result<(), EnrollmentError> {
    let required = enrollment.service_type.required_staff_role();
    if new_staff.staff_role != required {
        warn!(
            "Rejected {} for {} service {}: requires a {}",
            new_staff.staff_role, enrollment.service_type, enrollment.enrollment_id, required
        );
        return Err(EnrollmentError::invalid(format!(
            "{} services must be staffed by a {}, but {} is a {}",
            enrollment.service_type, required, new_staff.staff_name, new_staff.staff_role
        )));
    }
    Ok(())
}

/// Status precondition of `change_staff`, checkable before a staff member is chosen
pub fn ensure_can_change_staff(enrollment: &ServiceEnrollment) -> Result<(), EnrollmentError> {
    if enrollment.status != EnrollmentStatus::Active {
        return Err(EnrollmentError::invalid(
            "Staff can only be changed on an active service. Reactivate it instead.",
        ));
    }
    Ok(())
}

/// Status precondition of `reactivate`
pub fn ensure_can_reactivate(enrollment: &ServiceEnrollment) -> Result<(), EnrollmentError> {
    if enrollment.status != EnrollmentStatus::Inactive {
        return Err(EnrollmentError::invalid("This service is already active"));
    }
    Ok(())
}

/// Replace the staff member on an active enrollment.
///
/// The outgoing assignment is closed into history with `reason`; status and the
/// status-change fields are left alone.
pub fn change_staff(
    enrollment: &ServiceEnrollment,
    new_staff: NewStaff,
    reason: &StaffChangeReason,
    now: DateTime<Utc>,
) -> Result<ServiceEnrollment, EnrollmentError> {
    ensure_can_change_staff(enrollment)?;
    let current = enrollment.current_staff.as_ref().ok_or_else(|| {
        EnrollmentError::invalid("This service has no current staff member to replace")
    })?;
    ensure_role_matches(enrollment, &new_staff)?;
    if new_staff.staff_id == current.staff_id {
        return Err(EnrollmentError::invalid(format!(
            "{} is already assigned to this service",
            current.staff_name
        )));
    }
    let notes = reason.validated_notes()?;

    let closed = close_assignment(current, now, reason.reason.code(), notes);

    let mut next = enrollment.clone();
    next.staff_history.insert(0, closed);
    next.current_staff = Some(new_staff.assign_at(now));
    next.version = enrollment.version + 1;
    Ok(next)
}

/// Deactivate an active enrollment.
///
/// The open assignment is closed with `service_deactivated` regardless of the
/// enrollment-level `reason`, which is stored verbatim.
pub fn deactivate(
    enrollment: &ServiceEnrollment,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<ServiceEnrollment, EnrollmentError> {
    if enrollment.status != EnrollmentStatus::Active {
        return Err(EnrollmentError::invalid("This service is already inactive"));
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(EnrollmentError::invalid("A reason is required to deactivate a service"));
    }

    let mut next = enrollment.clone();
    if let Some(current) = next.current_staff.take() {
        next.staff_history
            .insert(0, close_assignment(&current, now, SERVICE_DEACTIVATED, None));
    }
    next.status = EnrollmentStatus::Inactive;
    next.status_changed_at = now;
    next.status_change_reason = Some(reason.to_string());
    next.version = enrollment.version + 1;
    Ok(next)
}

/// Reactivate an inactive enrollment with a new staff member.
///
/// History is untouched: nothing was open while the enrollment was inactive.
pub fn reactivate(
    enrollment: &ServiceEnrollment,
    new_staff: NewStaff,
    now: DateTime<Utc>,
) -> Result<ServiceEnrollment, EnrollmentError> {
    ensure_can_reactivate(enrollment)?;
    ensure_role_matches(enrollment, &new_staff)?;

    let mut next = enrollment.clone();
    next.current_staff = Some(new_staff.assign_at(now));
    next.status = EnrollmentStatus::Active;
    next.status_changed_at = now;
    next.status_change_reason = None;
    next.version = enrollment.version + 1;
    Ok(next)
}
