//! Enrollment service: the operations the portal calls to change who serves a
//! child, switch a service off, and switch it back on.
//!
//! Each operation loads the enrollment, checks its status, resolves the selected
//! staff member through the staff directory, runs the transition, and writes the
//! whole new document with a version check. The child's cached enrollment list is invalidated only after the
//! write is acknowledged, so the caller's next read sees its own change.

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use shared::ServiceType;
use std::sync::Arc;

use crate::domain::commands::enrollment::{
    ChangeStaffCommand, DeactivateServiceCommand, EnrollmentOverviewQuery, ReactivateServiceCommand,
    TransitionResult,
};
use crate::domain::confirmation::ConfirmationGate;
use crate::domain::errors::EnrollmentError;
use crate::domain::models::enrollment::ServiceEnrollment;
use crate::domain::models::staff::StaffMember;
use crate::domain::projection::{EnrollmentOverview, EnrollmentProjection};
use crate::domain::reasons::DeactivationReasons;
use crate::domain::state_machine::{self, NewStaff};
use crate::storage::traits::{EnrollmentStorage, StaffDirectory};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct EnrollmentService {
    storage: Arc<dyn EnrollmentStorage>,
    staff_directory: Arc<dyn StaffDirectory>,
    projection: EnrollmentProjection,
    deactivation_reasons: DeactivationReasons,
    confirmation: ConfirmationGate,
    clock: Clock,
}

impl EnrollmentService {
    pub fn new(
        storage: Arc<dyn EnrollmentStorage>,
        staff_directory: Arc<dyn StaffDirectory>,
        deactivation_reasons: DeactivationReasons,
    ) -> Self {
        let projection = EnrollmentProjection::new(storage.clone());
        Self {
            storage,
            staff_directory,
            projection,
            deactivation_reasons,
            confirmation: ConfirmationGate::default(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the time source (tests pin it to fixed instants)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn projection(&self) -> &EnrollmentProjection {
        &self.projection
    }

    pub fn deactivation_reasons(&self) -> &DeactivationReasons {
        &self.deactivation_reasons
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Replace the current staff member of an active enrollment
    pub async fn change_staff(&self, command: ChangeStaffCommand) -> Result<TransitionResult, EnrollmentError> {
        info!(
            "Changing staff on enrollment {} to {} ({})",
            command.enrollment_id,
            command.new_staff_id,
            command.reason.reason.code()
        );

        let enrollment = self.load_enrollment(&command.enrollment_id).await?;
        state_machine::ensure_can_change_staff(&enrollment)?;
        let new_staff = self.resolve_staff(&command.new_staff_id, &command.actor_id).await?;
        let staff_name = new_staff.staff_name.clone();

        let next = state_machine::change_staff(&enrollment, new_staff, &command.reason, self.now())
            .inspect_err(|e| warn!("Rejected staff change on {}: {}", command.enrollment_id, e))?;
        let saved = self.persist(&enrollment, next).await?;

        Ok(TransitionResult {
            success_message: format!("{} is now assigned to {}", staff_name, saved.service_name),
            enrollment: saved,
        })
    }

    /// Deactivate an active enrollment after the typed confirmation
    pub async fn deactivate_service(&self, command: DeactivateServiceCommand) -> Result<TransitionResult, EnrollmentError> {
        info!("Deactivating enrollment {} (requested by {})", command.enrollment_id, command.actor_id);

        self.confirmation.check(&command.confirmation)?;
        let reason = self
            .deactivation_reasons
            .resolve(&command.reason, command.other_reason.as_deref())?;

        let enrollment = self.load_enrollment(&command.enrollment_id).await?;
        let next = state_machine::deactivate(&enrollment, &reason, self.now())
            .inspect_err(|e| warn!("Rejected deactivation of {}: {}", command.enrollment_id, e))?;
        let saved = self.persist(&enrollment, next).await?;

        Ok(TransitionResult {
            success_message: format!("{} has been deactivated", saved.service_name),
            enrollment: saved,
        })
    }

    /// Reactivate an inactive enrollment with a new staff member
    pub async fn reactivate_service(&self, command: ReactivateServiceCommand) -> Result<TransitionResult, EnrollmentError> {
        info!(
            "Reactivating enrollment {} with {}",
            command.enrollment_id, command.new_staff_id
        );

        let enrollment = self.load_enrollment(&command.enrollment_id).await?;
        state_machine::ensure_can_reactivate(&enrollment)?;
        let new_staff = self.resolve_staff(&command.new_staff_id, &command.actor_id).await?;

        let next = state_machine::reactivate(&enrollment, new_staff, self.now())
            .inspect_err(|e| warn!("Rejected reactivation of {}: {}", command.enrollment_id, e))?;
        let saved = self.persist(&enrollment, next).await?;

        Ok(TransitionResult {
            success_message: format!("{} has been reactivated", saved.service_name),
            enrollment: saved,
        })
    }

    pub async fn list_eligible_staff(
        &self,
        service_type: ServiceType,
        service_name: &str,
    ) -> Result<Vec<StaffMember>, EnrollmentError> {
        Ok(self
            .staff_directory
            .list_staff_eligible_for_service(service_type, service_name)
            .await?)
    }

    pub async fn overview(&self, query: EnrollmentOverviewQuery) -> Result<EnrollmentOverview, EnrollmentError> {
        Ok(self
            .projection
            .overview(&query.child_id, query.viewer_role, query.viewer_id.as_deref())
            .await?)
    }

    async fn load_enrollment(&self, enrollment_id: &str) -> Result<ServiceEnrollment, EnrollmentError> {
        match self.storage.get_enrollment(enrollment_id).await {
            Ok(Some(enrollment)) => Ok(enrollment),
            Ok(None) => {
                warn!("Enrollment not found: {}", enrollment_id);
                Err(EnrollmentError::NotFound(
                    "This service enrollment no longer exists. Refresh to see the latest list.".to_string(),
                ))
            }
            Err(e) => {
                error!("Failed to load enrollment {}: {:#}", enrollment_id, e);
                Err(EnrollmentError::Persistence(e))
            }
        }
    }

    async fn resolve_staff(&self, staff_id: &str, actor_id: &str) -> Result<NewStaff, EnrollmentError> {
        if staff_id.trim().is_empty() {
            return Err(EnrollmentError::invalid("Please select a staff member"));
        }
        if actor_id.trim().is_empty() {
            return Err(EnrollmentError::invalid("The assigning user is required"));
        }

        let member = match self.staff_directory.get_staff(staff_id).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                warn!("Staff member not found: {}", staff_id);
                return Err(EnrollmentError::NotFound(
                    "The selected staff member no longer exists. Refresh and choose again.".to_string(),
                ));
            }
            Err(e) => {
                error!("Failed to look up staff member {}: {:#}", staff_id, e);
                return Err(EnrollmentError::Persistence(e));
            }
        };

        Ok(NewStaff {
            staff_name: member.display_name(),
            staff_id: member.staff_id,
            staff_role: member.role,
            assigned_by: actor_id.trim().to_string(),
        })
    }

    async fn persist(
        &self,
        previous: &ServiceEnrollment,
        next: ServiceEnrollment,
    ) -> Result<ServiceEnrollment, EnrollmentError> {
        match self.storage.save_if_version(&next, previous.version).await {
            Ok(true) => {
                self.projection.invalidate(&next.child_id).await;
                info!(
                    "Enrollment {} saved: {} with {} history entries (version {})",
                    next.enrollment_id,
                    next.status,
                    next.staff_history.len(),
                    next.version
                );
                Ok(next)
            }
            Ok(false) => Err(EnrollmentError::Conflict(
                "This service was changed by someone else. Refresh and try again.".to_string(),
            )),
            Err(e) => {
                error!("Failed to save enrollment {}: {:#}", next.enrollment_id, e);
                Err(EnrollmentError::Persistence(e))
            }
        }
    }
}
