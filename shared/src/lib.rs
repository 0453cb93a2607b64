use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed removal reason written into the history entry created by a deactivation.
/// Never offered as a user-selectable staff removal reason.
pub const SERVICE_DEACTIVATED: &str = "service_deactivated";

/// Selection value for a free-text deactivation reason
pub const OTHER_REASON: &str = "other";

/// Kind of service a child can be enrolled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Therapy,
    Class,
}

impl ServiceType {
    /// The staff role allowed to serve this kind of service
    pub fn required_staff_role(&self) -> StaffRole {
        match self {
            ServiceType::Therapy => StaffRole::Therapist,
            ServiceType::Class => StaffRole::Teacher,
        }
    }

    pub fn from_string(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "therapy" => Ok(ServiceType::Therapy),
            "class" => Ok(ServiceType::Class),
            other => Err(format!("Unknown service type: {}", other)),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Therapy => write!(f, "Therapy"),
            ServiceType::Class => write!(f, "Class"),
        }
    }
}

/// Lifecycle status of an enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Inactive,
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentStatus::Active => write!(f, "active"),
            EnrollmentStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Role of a staff member serving an enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Teacher,
    Therapist,
}

impl StaffRole {
    pub fn from_string(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "teacher" => Ok(StaffRole::Teacher),
            "therapist" => Ok(StaffRole::Therapist),
            other => Err(format!("Unknown staff role: {}", other)),
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffRole::Teacher => write!(f, "teacher"),
            StaffRole::Therapist => write!(f, "therapist"),
        }
    }
}

/// Role of the person looking at a child's enrollments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    Admin,
    Parent,
    Teacher,
    Therapist,
}

impl ViewerRole {
    /// Staff viewers only see enrollments they currently serve
    pub fn is_staff(&self) -> bool {
        matches!(self, ViewerRole::Teacher | ViewerRole::Therapist)
    }
}

/// Reason codes offered when replacing the staff member on an enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRemovalReason {
    StaffTransferred,
    SchedulingConflict,
    StaffResigned,
    ParentRequest,
    AdminDecision,
    /// Requires an accompanying free-text note
    Other,
}

impl StaffRemovalReason {
    pub const ALL: [StaffRemovalReason; 6] = [
        StaffRemovalReason::StaffTransferred,
        StaffRemovalReason::SchedulingConflict,
        StaffRemovalReason::StaffResigned,
        StaffRemovalReason::ParentRequest,
        StaffRemovalReason::AdminDecision,
        StaffRemovalReason::Other,
    ];

    /// Persisted code for this reason
    pub fn code(&self) -> &'static str {
        match self {
            StaffRemovalReason::StaffTransferred => "staff_transferred",
            StaffRemovalReason::SchedulingConflict => "scheduling_conflict",
            StaffRemovalReason::StaffResigned => "staff_resigned",
            StaffRemovalReason::ParentRequest => "parent_request",
            StaffRemovalReason::AdminDecision => "admin_decision",
            StaffRemovalReason::Other => "other",
        }
    }

    /// Human-readable label for dropdowns
    pub fn label(&self) -> &'static str {
        match self {
            StaffRemovalReason::StaffTransferred => "Staff transferred",
            StaffRemovalReason::SchedulingConflict => "Scheduling conflict",
            StaffRemovalReason::StaffResigned => "Staff resigned",
            StaffRemovalReason::ParentRequest => "Parent request",
            StaffRemovalReason::AdminDecision => "Admin decision",
            StaffRemovalReason::Other => "Other",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.code() == code)
    }

    pub fn requires_note(&self) -> bool {
        matches!(self, StaffRemovalReason::Other)
    }
}

/// The staff member currently serving an enrollment (denormalized snapshot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignment {
    pub staff_id: String,
    pub staff_name: String,
    pub staff_role: StaffRole,
    /// RFC 3339 timestamp
    pub assigned_at: String,
    /// Actor who made the assignment
    pub assigned_by: String,
    /// Display label such as "3 months", filled in for responses only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_for: Option<String>,
}

/// A closed staff assignment. Never edited after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffHistoryRecord {
    pub history_id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub staff_role: StaffRole,
    /// RFC 3339 timestamp
    pub assigned_at: String,
    pub assigned_by: String,
    /// RFC 3339 timestamp
    pub removed_at: String,
    /// A `StaffRemovalReason` code or `service_deactivated`
    pub removal_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_notes: Option<String>,
    pub duration_days: i64,
    /// Display label such as "1y 1m", filled in for responses only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_label: Option<String>,
}

/// One child's enrollment in one named service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEnrollment {
    pub enrollment_id: String,
    pub child_id: String,
    pub service_name: String,
    pub service_type: ServiceType,
    pub status: EnrollmentStatus,
    pub current_staff: Option<StaffAssignment>,
    /// Most recent first
    #[serde(default)]
    pub staff_history: Vec<StaffHistoryRecord>,
    /// RFC 3339 timestamp
    pub enrolled_at: String,
    /// RFC 3339 timestamp
    pub status_changed_at: String,
    pub status_change_reason: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    /// RFC 3339 timestamp, maintained by activity logging
    #[serde(default)]
    pub last_activity_date: Option<String>,
    #[serde(default = "ServiceEnrollment::initial_version")]
    pub version: u64,
}

impl ServiceEnrollment {
    /// Generate an enrollment ID
    pub fn generate_id() -> String {
        format!("enrollment::{}", uuid::Uuid::new_v4())
    }

    pub fn initial_version() -> u64 {
        1
    }
}

impl StaffHistoryRecord {
    /// Generate a history ID for list keying
    pub fn generate_id() -> String {
        format!("history::{}", uuid::Uuid::new_v4())
    }
}

/// Request for replacing the staff member on an active enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeStaffRequest {
    pub new_staff_id: String,
    /// `StaffRemovalReason` code
    pub reason: StaffRemovalReason,
    /// Required when `reason` is `other`
    #[serde(default)]
    pub reason_notes: Option<String>,
    pub actor_id: String,
}

/// Request for deactivating an enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeactivateServiceRequest {
    /// One of the configured labels, or `other`
    pub reason: String,
    /// Required when `reason` is `other`
    #[serde(default)]
    pub other_reason: Option<String>,
    /// Typed confirmation token, must read "disable"
    pub confirmation: String,
    pub actor_id: String,
}

/// Request for reactivating an inactive enrollment with a new staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactivateServiceRequest {
    pub new_staff_id: String,
    pub actor_id: String,
}

/// Response after a successful transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub enrollment: ServiceEnrollment,
    pub success_message: String,
}

/// Query for a child's enrollments as seen by a given viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentOverviewRequest {
    pub viewer_role: ViewerRole,
    #[serde(default)]
    pub viewer_id: Option<String>,
}

/// A child's enrollments split the way the enrollment panel shows them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentOverviewResponse {
    pub child_id: String,
    pub therapy: Vec<ServiceEnrollment>,
    pub group_class: Vec<ServiceEnrollment>,
    pub inactive: Vec<ServiceEnrollment>,
}

/// Query for staff that may serve a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleStaffRequest {
    pub service_type: ServiceType,
    pub service_name: String,
}

/// Staff directory entry offered in the "select new staff" dropdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffOption {
    pub staff_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    pub specializations: Vec<String>,
    /// Whether the staff member lists the requested service as a specialization
    pub specialization_match: bool,
}

/// Response containing eligible staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleStaffResponse {
    pub staff: Vec<StaffOption>,
}

/// Response containing the reason choices for the deactivate and change-staff modals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonOptionsResponse {
    pub deactivation_reasons: Vec<String>,
    pub staff_removal_reasons: Vec<ReasonOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonOption {
    pub code: String,
    pub label: String,
    pub requires_note: bool,
}

/// Discriminant of a failed enrollment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    Conflict,
    PersistenceError,
}

/// Error payload shown inline in the triggering modal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_staff_role() {
        assert_eq!(ServiceType::Therapy.required_staff_role(), StaffRole::Therapist);
        assert_eq!(ServiceType::Class.required_staff_role(), StaffRole::Teacher);
    }

    #[test]
    fn test_removal_reason_codes_match_wire_format() {
        for reason in StaffRemovalReason::ALL {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.code()));
            assert_eq!(StaffRemovalReason::from_code(reason.code()), Some(reason));
        }
        assert_eq!(StaffRemovalReason::from_code(SERVICE_DEACTIVATED), None);
    }

    #[test]
    fn test_only_other_requires_note() {
        let needing_note: Vec<_> = StaffRemovalReason::ALL
            .into_iter()
            .filter(|r| r.requires_note())
            .collect();
        assert_eq!(needing_note, vec![StaffRemovalReason::Other]);
    }

    #[test]
    fn test_enrollment_defaults_when_fields_missing() {
        let json = r#"{
            "enrollmentId": "enrollment::1",
            "childId": "child::1",
            "serviceName": "Speech Therapy",
            "serviceType": "Therapy",
            "status": "inactive",
            "currentStaff": null,
            "enrolledAt": "2024-01-01T00:00:00+00:00",
            "statusChangedAt": "2024-02-01T00:00:00+00:00",
            "statusChangeReason": "Goals met"
        }"#;

        let enrollment: ServiceEnrollment = serde_json::from_str(json).unwrap();
        assert_eq!(enrollment.version, 1);
        assert!(enrollment.staff_history.is_empty());
        assert_eq!(enrollment.frequency, None);
        assert_eq!(enrollment.status, EnrollmentStatus::Inactive);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ServiceEnrollment::generate_id();
        let b = ServiceEnrollment::generate_id();
        assert_ne!(a, b);
        assert!(a.starts_with("enrollment::"));
        assert!(StaffHistoryRecord::generate_id().starts_with("history::"));
    }

    #[test]
    fn test_parse_roles_and_types() {
        assert_eq!(StaffRole::from_string(" Therapist ").unwrap(), StaffRole::Therapist);
        assert!(StaffRole::from_string("janitor").is_err());
        assert_eq!(ServiceType::from_string("class").unwrap(), ServiceType::Class);
        assert!(ViewerRole::Teacher.is_staff());
        assert!(!ViewerRole::Parent.is_staff());
    }
}
