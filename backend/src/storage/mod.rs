//! # Storage Module
//!
//! Persistence for enrollment documents and read access to the staff directory.
//!
//! The domain layer only sees the traits in [`traits`]; the [`files`] backend keeps
//! one YAML document per enrollment and reads the staff directory from a CSV file.
//! Each enrollment is its own addressable document, so a transition replaces
//! exactly one file and listing a child's enrollments never needs the child record.

pub mod files;
pub mod traits;

pub use files::{EnrollmentRepository, FileConnection, StaffRepository};
pub use traits::{EnrollmentStorage, StaffDirectory};
