//! # YAML Enrollment Repository
//!
//! One YAML document per enrollment under `{data_directory}/enrollments/`.
//! Documents are written to a temp file and renamed into place, so readers see
//! either the old or the new document and never a partial one.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::connection::{write_atomically, FileConnection};
use crate::domain::models::enrollment::ServiceEnrollment;
use crate::storage::traits::EnrollmentStorage;

/// File-backed enrollment repository.
///
/// Clones share one write lock, which makes the version check and the write in
/// `save_if_version` a single step for everything using this repository.
#[derive(Clone)]
pub struct EnrollmentRepository {
    connection: FileConnection,
    write_lock: Arc<Mutex<()>>,
}

impl EnrollmentRepository {
    pub fn new(connection: FileConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Filesystem-safe document name for an enrollment ID.
    ///
    /// ASCII letters, digits and '-' are kept; every other byte becomes `_XX` (hex).
    /// The escape character is itself escaped, so distinct IDs never share a file.
    /// "enrollment::3f2a" -> "enrollment_3A_3A3f2a.yaml"
    pub fn document_file_name(enrollment_id: &str) -> String {
        let mut stem = String::with_capacity(enrollment_id.len());
        for byte in enrollment_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                stem.push(byte as char);
            } else {
                stem.push_str(&format!("_{:02X}", byte));
            }
        }
        format!("{}.yaml", stem)
    }

    fn document_path(&self, enrollment_id: &str) -> PathBuf {
        self.connection
            .enrollments_directory()
            .join(Self::document_file_name(enrollment_id))
    }

    fn read_document(path: &PathBuf) -> Result<ServiceEnrollment> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let dto: shared::ServiceEnrollment = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        ServiceEnrollment::try_from(dto).context("Failed to map stored enrollment to domain enrollment")
    }

    fn load(&self, enrollment_id: &str) -> Result<Option<ServiceEnrollment>> {
        let path = self.document_path(enrollment_id);
        if !path.exists() {
            return Ok(None);
        }

        let enrollment = Self::read_document(&path)?;
        if enrollment.enrollment_id != enrollment_id {
            warn!("Document {:?} belongs to {}, not {}", path, enrollment.enrollment_id, enrollment_id);
            return Ok(None);
        }
        Ok(Some(enrollment))
    }

    fn write(&self, enrollment: &ServiceEnrollment) -> Result<()> {
        self.connection.ensure_enrollments_directory()?;
        let path = self.document_path(&enrollment.enrollment_id);
        let yaml_content = serde_yaml::to_string(&shared::ServiceEnrollment::from(enrollment.clone()))?;
        write_atomically(&path, &yaml_content)?;
        info!(
            "Saved enrollment {} (child {}, {}, version {})",
            enrollment.enrollment_id, enrollment.child_id, enrollment.status, enrollment.version
        );
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStorage for EnrollmentRepository {
    async fn list_by_child(&self, child_id: &str) -> Result<Vec<ServiceEnrollment>> {
        let dir = self.connection.enrollments_directory();
        if !dir.exists() {
            debug!("Enrollments directory doesn't exist, returning empty list");
            return Ok(Vec::new());
        }

        let mut enrollments = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }

            match Self::read_document(&path) {
                Ok(enrollment) if enrollment.child_id == child_id => enrollments.push(enrollment),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable enrollment document {:?}: {:#}", path, e),
            }
        }

        debug!("Loaded {} enrollments for child {}", enrollments.len(), child_id);
        Ok(enrollments)
    }

    async fn get_enrollment(&self, enrollment_id: &str) -> Result<Option<ServiceEnrollment>> {
        self.load(enrollment_id)
    }

    async fn save(&self, enrollment: &ServiceEnrollment) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(enrollment)
    }

    async fn save_if_version(&self, enrollment: &ServiceEnrollment, expected_version: u64) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let stored_version = self.load(&enrollment.enrollment_id)?.map(|stored| stored.version);
        if stored_version != Some(expected_version) {
            warn!(
                "Version check failed for enrollment {}: expected {}, found {:?}",
                enrollment.enrollment_id, expected_version, stored_version
            );
            return Ok(false);
        }

        self.write(enrollment)?;
        Ok(true)
    }
}
