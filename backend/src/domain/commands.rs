//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the DTOs from the `shared`
//! crate to these internal types.

pub mod enrollment {
    use shared::ViewerRole;

    use crate::domain::models::enrollment::ServiceEnrollment;
    use crate::domain::state_machine::StaffChangeReason;

    /// Input for replacing the staff member on an enrollment.
    #[derive(Debug, Clone)]
    pub struct ChangeStaffCommand {
        pub enrollment_id: String,
        pub new_staff_id: String,
        pub reason: StaffChangeReason,
        pub actor_id: String,
    }

    /// Input for deactivating an enrollment.
    #[derive(Debug, Clone)]
    pub struct DeactivateServiceCommand {
        pub enrollment_id: String,
        /// Selected label or "other"
        pub reason: String,
        pub other_reason: Option<String>,
        /// What the user typed into the confirmation box
        pub confirmation: String,
        pub actor_id: String,
    }

    /// Input for reactivating an enrollment.
    #[derive(Debug, Clone)]
    pub struct ReactivateServiceCommand {
        pub enrollment_id: String,
        pub new_staff_id: String,
        pub actor_id: String,
    }

    /// Query for the enrollment panel of one child.
    #[derive(Debug, Clone)]
    pub struct EnrollmentOverviewQuery {
        pub child_id: String,
        pub viewer_role: ViewerRole,
        pub viewer_id: Option<String>,
    }

    /// Result of a successful transition.
    #[derive(Debug, Clone)]
    pub struct TransitionResult {
        pub enrollment: ServiceEnrollment,
        pub success_message: String,
    }
}
