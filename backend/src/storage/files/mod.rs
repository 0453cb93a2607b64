pub mod connection;
pub mod enrollment_repository;
pub mod staff_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::FileConnection;
pub use enrollment_repository::EnrollmentRepository;
pub use staff_repository::StaffRepository;
