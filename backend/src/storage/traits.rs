//! # Storage Traits
//!
//! Storage abstractions the domain layer works against, so the file-backed
//! implementations can be swapped for another document store without touching the
//! enrollment logic.

use anyhow::Result;
use async_trait::async_trait;
use shared::ServiceType;

use crate::domain::models::enrollment::ServiceEnrollment;
use crate::domain::models::staff::StaffMember;

/// Durable storage for enrollment documents
#[async_trait]
pub trait EnrollmentStorage: Send + Sync {
    /// All enrollments of a child, in no particular order
    async fn list_by_child(&self, child_id: &str) -> Result<Vec<ServiceEnrollment>>;

    /// Retrieve one enrollment by ID
    async fn get_enrollment(&self, enrollment_id: &str) -> Result<Option<ServiceEnrollment>>;

    /// Idempotent upsert keyed by `enrollment_id`
    async fn save(&self, enrollment: &ServiceEnrollment) -> Result<()>;

    /// Replace the stored document only if its version is still `expected_version`.
    ///
    /// Returns `false` without writing anything when the stored version differs or
    /// the document no longer exists. The compare and the write happen atomically.
    async fn save_if_version(&self, enrollment: &ServiceEnrollment, expected_version: u64) -> Result<bool>;
}

/// Read access to the staff directory
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// Staff whose role fits `service_type`.
    /// Those specializing in `service_name` come first, then by last and first name.
    async fn list_staff_eligible_for_service(
        &self,
        service_type: ServiceType,
        service_name: &str,
    ) -> Result<Vec<StaffMember>>;

    async fn get_staff(&self, staff_id: &str) -> Result<Option<StaffMember>>;
}
