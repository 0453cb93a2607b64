//! # Domain Module
//!
//! Business rules for the service-enrollment lifecycle of the center.
//!
//! A child is enrolled in a number of services (therapies and group classes). Each
//! enrollment has at most one current staff member and an append-only history of
//! past assignments. This module decides when an enrollment may change hands, be
//! switched off, or be switched back on, and what the history looks like afterwards.
//!
//! ## Module Organization
//!
//! - **models**: Enrollment, assignment, history, and staff member entities
//! - **history**: Closing an assignment into a history record and formatting durations
//! - **state_machine**: Pure transitions (`change_staff`, `deactivate`, `reactivate`)
//! - **reasons**: Deactivation reason choices and resolution of "other"
//! - **confirmation**: The typed confirmation gate in front of deactivation
//! - **projection**: Active/inactive split, grouping, viewer filtering, and the read cache
//! - **enrollment_service**: Orchestrates load, transition, versioned save, and cache invalidation
//! - **commands**: Internal command and query types used by the services
//! - **errors**: The error kinds returned to callers
//!
//! ## Business Rules
//!
//! - An active enrollment always has a current staff member; an inactive one never does
//! - History is only ever appended to, and every close records a reason and a duration
//! - Therapy services are served by therapists, group classes by teachers
//! - Staff viewers only see the enrollments they currently serve
//! - Transitions never mutate their input; a failed save leaves the stored record as it was

pub mod commands;
pub mod confirmation;
pub mod enrollment_service;
pub mod errors;
pub mod history;
pub mod models;
pub mod projection;
pub mod reasons;
pub mod state_machine;

pub use confirmation::ConfirmationGate;
pub use enrollment_service::EnrollmentService;
pub use errors::EnrollmentError;
pub use projection::EnrollmentProjection;
pub use reasons::DeactivationReasons;
