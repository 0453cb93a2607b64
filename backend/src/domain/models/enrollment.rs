use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{EnrollmentStatus, ServiceType, StaffRole};

/// Who serves an enrollment right now
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffAssignment {
    pub staff_id: String,
    pub staff_name: String,
    pub staff_role: StaffRole,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: String,
}

/// A closed assignment. Records are written once and never touched again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffHistoryRecord {
    pub history_id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub staff_role: StaffRole,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: String,
    pub removed_at: DateTime<Utc>,
    pub removal_reason: String,
    pub removal_notes: Option<String>,
    pub duration_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceEnrollment {
    pub enrollment_id: String,
    pub child_id: String,
    pub service_name: String,
    pub service_type: ServiceType,
    pub status: EnrollmentStatus,
    pub current_staff: Option<StaffAssignment>,
    /// Most recent first
    pub staff_history: Vec<StaffHistoryRecord>,
    pub enrolled_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
    pub status_change_reason: Option<String>,
    pub frequency: Option<String>,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub version: u64,
}

impl ServiceEnrollment {
    /// A freshly created enrollment: active, served by `staff`, no history.
    pub fn new_active(
        child_id: &str,
        service_name: &str,
        service_type: ServiceType,
        staff: StaffAssignment,
    ) -> Self {
        let enrolled_at = staff.assigned_at;
        Self {
            enrollment_id: shared::ServiceEnrollment::generate_id(),
            child_id: child_id.to_string(),
            service_name: service_name.to_string(),
            service_type,
            status: EnrollmentStatus::Active,
            current_staff: Some(staff),
            staff_history: Vec::new(),
            enrolled_at,
            status_changed_at: enrolled_at,
            status_change_reason: None,
            frequency: None,
            last_activity_date: None,
            version: shared::ServiceEnrollment::initial_version(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    /// Checks the status/current-staff invariants.
    ///
    /// Active enrollments must have a current staff member whose role fits the
    /// service type; inactive ones must have no current staff and a recorded reason.
    pub fn check_invariants(&self) -> Result<(), String> {
        match (&self.status, &self.current_staff) {
            (EnrollmentStatus::Active, None) => {
                Err(format!("Active enrollment {} has no current staff", self.enrollment_id))
            }
            (EnrollmentStatus::Active, Some(staff)) => {
                if staff.staff_role != self.service_type.required_staff_role() {
                    return Err(format!(
                        "Enrollment {} is a {} service but is staffed by a {}",
                        self.enrollment_id, self.service_type, staff.staff_role
                    ));
                }
                Ok(())
            }
            (EnrollmentStatus::Inactive, Some(_)) => Err(format!(
                "Inactive enrollment {} still has a current staff member",
                self.enrollment_id
            )),
            (EnrollmentStatus::Inactive, None) => {
                if self.status_change_reason.as_deref().map_or(true, |r| r.trim().is_empty()) {
                    return Err(format!(
                        "Inactive enrollment {} has no status change reason",
                        self.enrollment_id
                    ));
                }
                Ok(())
            }
        }
    }
}

fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid {} timestamp: {}", field, value))?
        .with_timezone(&Utc))
}

/// DTO form without display labels; the REST mapper fills those in
impl From<StaffAssignment> for shared::StaffAssignment {
    fn from(domain: StaffAssignment) -> Self {
        shared::StaffAssignment {
            staff_id: domain.staff_id,
            staff_name: domain.staff_name,
            staff_role: domain.staff_role,
            assigned_at: domain.assigned_at.to_rfc3339(),
            assigned_by: domain.assigned_by,
            serving_for: None,
        }
    }
}

impl TryFrom<shared::StaffAssignment> for StaffAssignment {
    type Error = anyhow::Error;

    fn try_from(dto: shared::StaffAssignment) -> Result<Self> {
        Ok(StaffAssignment {
            assigned_at: parse_timestamp(&dto.assigned_at, "assigned_at")?,
            staff_id: dto.staff_id,
            staff_name: dto.staff_name,
            staff_role: dto.staff_role,
            assigned_by: dto.assigned_by,
        })
    }
}

impl From<StaffHistoryRecord> for shared::StaffHistoryRecord {
    fn from(domain: StaffHistoryRecord) -> Self {
        shared::StaffHistoryRecord {
            history_id: domain.history_id,
            staff_id: domain.staff_id,
            staff_name: domain.staff_name,
            staff_role: domain.staff_role,
            assigned_at: domain.assigned_at.to_rfc3339(),
            assigned_by: domain.assigned_by,
            removed_at: domain.removed_at.to_rfc3339(),
            removal_reason: domain.removal_reason,
            removal_notes: domain.removal_notes,
            duration_days: domain.duration_days,
            duration_label: None,
        }
    }
}

/// Stored durations are taken as written, never recomputed
impl TryFrom<shared::StaffHistoryRecord> for StaffHistoryRecord {
    type Error = anyhow::Error;

    fn try_from(dto: shared::StaffHistoryRecord) -> Result<Self> {
        Ok(StaffHistoryRecord {
            assigned_at: parse_timestamp(&dto.assigned_at, "assigned_at")?,
            removed_at: parse_timestamp(&dto.removed_at, "removed_at")?,
            history_id: dto.history_id,
            staff_id: dto.staff_id,
            staff_name: dto.staff_name,
            staff_role: dto.staff_role,
            assigned_by: dto.assigned_by,
            removal_reason: dto.removal_reason,
            removal_notes: dto.removal_notes,
            duration_days: dto.duration_days,
        })
    }
}

impl From<ServiceEnrollment> for shared::ServiceEnrollment {
    fn from(domain: ServiceEnrollment) -> Self {
        shared::ServiceEnrollment {
            enrollment_id: domain.enrollment_id,
            child_id: domain.child_id,
            service_name: domain.service_name,
            service_type: domain.service_type,
            status: domain.status,
            current_staff: domain.current_staff.map(Into::into),
            staff_history: domain.staff_history.into_iter().map(Into::into).collect(),
            enrolled_at: domain.enrolled_at.to_rfc3339(),
            status_changed_at: domain.status_changed_at.to_rfc3339(),
            status_change_reason: domain.status_change_reason,
            frequency: domain.frequency,
            last_activity_date: domain.last_activity_date.map(|d| d.to_rfc3339()),
            version: domain.version,
        }
    }
}

impl TryFrom<shared::ServiceEnrollment> for ServiceEnrollment {
    type Error = anyhow::Error;

    fn try_from(dto: shared::ServiceEnrollment) -> Result<Self> {
        let current_staff = dto.current_staff.map(StaffAssignment::try_from).transpose()?;
        let staff_history = dto
            .staff_history
            .into_iter()
            .map(StaffHistoryRecord::try_from)
            .collect::<Result<Vec<_>>>()?;
        let last_activity_date = dto
            .last_activity_date
            .as_deref()
            .map(|d| parse_timestamp(d, "last_activity_date"))
            .transpose()?;

        Ok(ServiceEnrollment {
            enrolled_at: parse_timestamp(&dto.enrolled_at, "enrolled_at")?,
            status_changed_at: parse_timestamp(&dto.status_changed_at, "status_changed_at")?,
            enrollment_id: dto.enrollment_id,
            child_id: dto.child_id,
            service_name: dto.service_name,
            service_type: dto.service_type,
            status: dto.status,
            current_staff,
            staff_history,
            status_change_reason: dto.status_change_reason,
            frequency: dto.frequency,
            last_activity_date,
            version: dto.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn therapist() -> StaffAssignment {
        StaffAssignment {
            staff_id: "staff::t1".to_string(),
            staff_name: "Tess Ramos".to_string(),
            staff_role: StaffRole::Therapist,
            assigned_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            assigned_by: "admin::1".to_string(),
        }
    }

    #[test]
    fn test_new_active_enrollment() {
        let enrollment = ServiceEnrollment::new_active("child::1", "Speech Therapy", ServiceType::Therapy, therapist());

        assert!(enrollment.is_active());
        assert_eq!(enrollment.enrolled_at, enrollment.status_changed_at);
        assert_eq!(enrollment.version, 1);
        assert!(enrollment.check_invariants().is_ok());
    }

    #[test]
    fn test_invariant_violations_detected() {
        let mut enrollment = ServiceEnrollment::new_active("child::1", "Speech Therapy", ServiceType::Therapy, therapist());

        enrollment.status = EnrollmentStatus::Inactive;
        assert!(enrollment.check_invariants().is_err());

        enrollment.current_staff = None;
        assert!(enrollment.check_invariants().is_err(), "missing reason must be rejected");

        enrollment.status_change_reason = Some("Goals met".to_string());
        assert!(enrollment.check_invariants().is_ok());

        enrollment.status = EnrollmentStatus::Active;
        assert!(enrollment.check_invariants().is_err());
    }

    #[test]
    fn test_role_mismatch_violates_invariant() {
        let enrollment = ServiceEnrollment::new_active("child::1", "Music Class", ServiceType::Class, therapist());
        let err = enrollment.check_invariants().unwrap_err();
        assert!(err.contains("staffed by a therapist"));
    }

    #[test]
    fn test_dto_conversion_preserves_enrollment() {
        let mut enrollment = ServiceEnrollment::new_active("child::1", "Speech Therapy", ServiceType::Therapy, therapist());
        enrollment.staff_history.push(StaffHistoryRecord {
            history_id: "history::1".to_string(),
            staff_id: "staff::t0".to_string(),
            staff_name: "Lee Park".to_string(),
            staff_role: StaffRole::Therapist,
            assigned_at: Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).unwrap(),
            assigned_by: "admin::1".to_string(),
            removed_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            removal_reason: "other".to_string(),
            removal_notes: Some("Moved to the evening group".to_string()),
            duration_days: 365,
        });
        enrollment.frequency = Some("2x/week".to_string());

        let restored = ServiceEnrollment::try_from(shared::ServiceEnrollment::from(enrollment.clone())).unwrap();
        assert_eq!(restored, enrollment);
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let mut dto = shared::ServiceEnrollment::from(ServiceEnrollment::new_active(
            "child::1",
            "Speech Therapy",
            ServiceType::Therapy,
            therapist(),
        ));
        dto.enrolled_at = "yesterday".to_string();
        let err = ServiceEnrollment::try_from(dto).unwrap_err();
        assert!(err.to_string().contains("enrolled_at"));
    }
}
