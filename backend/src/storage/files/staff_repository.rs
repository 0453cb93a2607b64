//! # CSV Staff Directory
//!
//! Read-only view over `{data_directory}/staff.csv`, maintained by the staff
//! management screens.
//!
//! ```csv
//! staff_id,first_name,last_name,role,specializations
//! staff::1,Ana,Lopez,therapist,Speech Therapy;Occupational Therapy
//! staff::2,Ben,Okafor,teacher,Music Class
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use csv::ReaderBuilder;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use shared::{ServiceType, StaffRole};
use std::fs::File;
use std::io::BufReader;

use super::connection::FileConnection;
use crate::domain::models::staff::StaffMember;
use crate::storage::traits::StaffDirectory;

/// CSV record structure for staff members
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StaffRecord {
    staff_id: String,
    first_name: String,
    last_name: String,
    role: String,
    #[serde(default)]
    specializations: String,
}

impl TryFrom<StaffRecord> for StaffMember {
    type Error = anyhow::Error;

    fn try_from(record: StaffRecord) -> Result<Self> {
        let role = StaffRole::from_string(&record.role)
            .map_err(|e| anyhow::anyhow!("Failed to parse staff role: {}", e))?;

        Ok(StaffMember {
            staff_id: record.staff_id,
            first_name: record.first_name,
            last_name: record.last_name,
            role,
            specializations: record
                .specializations
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

#[derive(Clone)]
pub struct StaffRepository {
    connection: FileConnection,
}

impl StaffRepository {
    pub fn new(connection: FileConnection) -> Self {
        Self { connection }
    }

    fn read_staff(&self) -> Result<Vec<StaffMember>> {
        let path = self.connection.staff_file_path();
        if !path.exists() {
            debug!("Staff file {:?} doesn't exist, directory is empty", path);
            return Ok(Vec::new());
        }

        let file = File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let mut staff = Vec::new();
        for result in reader.deserialize::<StaffRecord>() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Failed to read staff record: {}. Skipping.", e);
                    continue;
                }
            };
            match StaffMember::try_from(record) {
                Ok(member) => staff.push(member),
                Err(e) => warn!("Failed to parse staff record: {}. Skipping.", e),
            }
        }
        Ok(staff)
    }
}

#[async_trait]
impl StaffDirectory for StaffRepository {
    async fn list_staff_eligible_for_service(
        &self,
        service_type: ServiceType,
        service_name: &str,
    ) -> Result<Vec<StaffMember>> {
        let required_role = service_type.required_staff_role();
        let mut eligible: Vec<StaffMember> = self
            .read_staff()?
            .into_iter()
            .filter(|member| member.role == required_role)
            .collect();

        eligible.sort_by(|a, b| {
            b.specializes_in(service_name)
                .cmp(&a.specializes_in(service_name))
                .then_with(|| a.last_name.to_lowercase().cmp(&b.last_name.to_lowercase()))
                .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
        });

        debug!(
            "{} staff eligible for {} service '{}'",
            eligible.len(),
            service_type,
            service_name
        );
        Ok(eligible)
    }

    async fn get_staff(&self, staff_id: &str) -> Result<Option<StaffMember>> {
        Ok(self
            .read_staff()?
            .into_iter()
            .find(|member| member.staff_id == staff_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::files::test_utils::{TestEnvironment, SAMPLE_STAFF_CSV};

    #[tokio::test]
    async fn test_eligible_staff_filtered_by_role_and_ordered() {
        let env = TestEnvironment::with_staff(SAMPLE_STAFF_CSV).await.unwrap();
        let repository = env.staff_repository();

        let therapists = repository
            .list_staff_eligible_for_service(ServiceType::Therapy, "Speech Therapy")
            .await
            .unwrap();

        let ids: Vec<_> = therapists.iter().map(|s| s.staff_id.as_str()).collect();
        // T1 specializes in speech; T2 and T3 are ordered by last name
        assert_eq!(ids, vec!["T1", "T3", "T2"]);
        assert!(therapists.iter().all(|s| s.role == StaffRole::Therapist));
    }

    #[tokio::test]
    async fn test_eligible_teachers_for_class() {
        let env = TestEnvironment::with_staff(SAMPLE_STAFF_CSV).await.unwrap();
        let teachers = env
            .staff_repository()
            .list_staff_eligible_for_service(ServiceType::Class, "Music Class")
            .await
            .unwrap();

        assert_eq!(teachers.len(), 2);
        assert_eq!(teachers[0].staff_id, "X");
        assert_eq!(teachers[0].specializations, vec!["Music Class".to_string()]);
    }

    #[tokio::test]
    async fn test_get_staff() {
        let env = TestEnvironment::with_staff(SAMPLE_STAFF_CSV).await.unwrap();
        let repository = env.staff_repository();

        let member = repository.get_staff("T2").await.unwrap().unwrap();
        assert_eq!(member.display_name(), "Priya Zimmer");
        assert!(repository.get_staff("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_and_bad_rows() {
        let env = TestEnvironment::new().await.unwrap();
        assert!(env.staff_repository().get_staff("T1").await.unwrap().is_none());

        let env = TestEnvironment::with_staff(
            "staff_id,first_name,last_name,role,specializations\nQ,Quinn,Ash,janitor,\nT9,Tara,Bell,therapist,\n",
        )
        .await
        .unwrap();
        let staff = env
            .staff_repository()
            .list_staff_eligible_for_service(ServiceType::Therapy, "Speech Therapy")
            .await
            .unwrap();
        assert_eq!(staff.len(), 1);
        assert!(staff[0].specializations.is_empty());
    }
}
