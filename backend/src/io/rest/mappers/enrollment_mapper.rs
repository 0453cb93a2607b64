use chrono::{DateTime, Utc};
use shared::StaffRemovalReason;

use crate::domain::commands::enrollment::TransitionResult;
use crate::domain::history::{duration_days, format_duration};
use crate::domain::models::enrollment::ServiceEnrollment;
use crate::domain::models::staff::StaffMember;
use crate::domain::projection::EnrollmentOverview;
use crate::domain::reasons::DeactivationReasons;

pub struct EnrollmentMapper;

impl EnrollmentMapper {
    /// DTO for display: history entries carry their duration label and the current
    /// assignment how long it has been running at `now`
    pub fn to_display_dto(domain: ServiceEnrollment, now: DateTime<Utc>) -> shared::ServiceEnrollment {
        let serving_for = domain
            .current_staff
            .as_ref()
            .map(|staff| format_duration(duration_days(staff.assigned_at, now)));

        let mut dto = shared::ServiceEnrollment::from(domain);
        if let Some(current) = dto.current_staff.as_mut() {
            current.serving_for = serving_for;
        }
        for record in dto.staff_history.iter_mut() {
            record.duration_label = Some(format_duration(record.duration_days));
        }
        dto
    }

    pub fn to_display_dto_list(domain: Vec<ServiceEnrollment>, now: DateTime<Utc>) -> Vec<shared::ServiceEnrollment> {
        domain.into_iter().map(|e| Self::to_display_dto(e, now)).collect()
    }

    pub fn to_overview_response(overview: EnrollmentOverview, now: DateTime<Utc>) -> shared::EnrollmentOverviewResponse {
        shared::EnrollmentOverviewResponse {
            child_id: overview.child_id,
            therapy: Self::to_display_dto_list(overview.therapy, now),
            group_class: Self::to_display_dto_list(overview.group_class, now),
            inactive: Self::to_display_dto_list(overview.inactive, now),
        }
    }

    pub fn to_transition_response(result: TransitionResult, now: DateTime<Utc>) -> shared::EnrollmentResponse {
        shared::EnrollmentResponse {
            enrollment: Self::to_display_dto(result.enrollment, now),
            success_message: result.success_message,
        }
    }

    /// Choices for the deactivate modal and the change-staff modal
    pub fn to_reason_options(deactivation_reasons: &DeactivationReasons) -> shared::ReasonOptionsResponse {
        shared::ReasonOptionsResponse {
            deactivation_reasons: deactivation_reasons.choices(),
            staff_removal_reasons: StaffRemovalReason::ALL
                .iter()
                .map(|reason| shared::ReasonOption {
                    code: reason.code().to_string(),
                    label: reason.label().to_string(),
                    requires_note: reason.requires_note(),
                })
                .collect(),
        }
    }

    pub fn staff_to_option(member: StaffMember, service_name: &str) -> shared::StaffOption {
        let specialization_match = member.specializes_in(service_name);
        shared::StaffOption {
            staff_id: member.staff_id,
            first_name: member.first_name,
            last_name: member.last_name,
            role: member.role,
            specializations: member.specializations,
            specialization_match,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state_machine::{change_staff, NewStaff, StaffChangeReason};
    use crate::storage::files::test_utils::{sample_therapy_enrollment, test_time};
    use shared::{StaffRemovalReason, StaffRole};

    fn with_history() -> ServiceEnrollment {
        let enrollment = sample_therapy_enrollment("child::1", "A");
        let new_staff = NewStaff {
            staff_id: "B".to_string(),
            staff_name: "Staff B".to_string(),
            staff_role: StaffRole::Therapist,
            assigned_by: "admin::1".to_string(),
        };
        change_staff(
            &enrollment,
            new_staff,
            &StaffChangeReason::new(StaffRemovalReason::ParentRequest),
            test_time(400),
        )
        .unwrap()
    }

    #[test]
    fn test_display_dto_labels() {
        let dto = EnrollmentMapper::to_display_dto(with_history(), test_time(405));

        assert_eq!(dto.staff_history[0].duration_label.as_deref(), Some("1y 1m"));
        assert_eq!(dto.current_staff.unwrap().serving_for.as_deref(), Some("5 days"));
    }

    #[test]
    fn test_reason_options() {
        let options = EnrollmentMapper::to_reason_options(&DeactivationReasons::default());

        assert_eq!(options.deactivation_reasons.last().map(String::as_str), Some("other"));
        assert_eq!(options.staff_removal_reasons.len(), 6);
        let notes_required: Vec<_> = options
            .staff_removal_reasons
            .iter()
            .filter(|o| o.requires_note)
            .map(|o| o.code.as_str())
            .collect();
        assert_eq!(notes_required, vec!["other"]);
    }
}
