/// Test utilities for the file-backed repositories
///
/// `TestEnvironment` owns a temporary data directory that is removed when the
/// environment is dropped, even if the test panics.
use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use shared::{ServiceType, StaffRole};
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::FileConnection;
use super::enrollment_repository::EnrollmentRepository;
use super::staff_repository::StaffRepository;
use crate::domain::models::enrollment::{ServiceEnrollment, StaffAssignment};

pub const SAMPLE_STAFF_CSV: &str = "\
staff_id,first_name,last_name,role,specializations
T1,Ana,Lopez,therapist,Speech Therapy;Occupational Therapy
T2,Priya,Zimmer,therapist,Occupational Therapy
T3,Sam,Chen,therapist,Physical Therapy
X,Ben,Okafor,teacher,Music Class
Y,Dana,Abbott,teacher,Art Class
";

pub struct TestEnvironment {
    /// Kept alive so the directory survives until drop
    _temp_dir: TempDir,
    pub connection: FileConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("therapy_center_test")?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = FileConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    /// Environment whose staff directory holds `staff_csv`
    pub async fn with_staff(staff_csv: &str) -> Result<Self> {
        let env = Self::new().await?;
        std::fs::write(env.connection.staff_file_path(), staff_csv)?;
        Ok(env)
    }

    pub fn enrollment_repository(&self) -> EnrollmentRepository {
        EnrollmentRepository::new(self.connection.clone())
    }

    pub fn staff_repository(&self) -> StaffRepository {
        StaffRepository::new(self.connection.clone())
    }
}

pub fn test_time(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + chrono::Duration::days(day)
}

pub fn sample_assignment(staff_id: &str, role: StaffRole) -> StaffAssignment {
    StaffAssignment {
        staff_id: staff_id.to_string(),
        staff_name: format!("Staff {}", staff_id),
        staff_role: role,
        assigned_at: test_time(0),
        assigned_by: "admin::1".to_string(),
    }
}

pub fn sample_therapy_enrollment(child_id: &str, staff_id: &str) -> ServiceEnrollment {
    ServiceEnrollment::new_active(
        child_id,
        "Speech Therapy",
        ServiceType::Therapy,
        sample_assignment(staff_id, StaffRole::Therapist),
    )
}

pub fn sample_class_enrollment(child_id: &str, staff_id: &str) -> ServiceEnrollment {
    ServiceEnrollment::new_active(
        child_id,
        "Music Class",
        ServiceType::Class,
        sample_assignment(staff_id, StaffRole::Teacher),
    )
}
