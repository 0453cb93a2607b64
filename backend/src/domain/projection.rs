//! Enrollment query and projection layer.
//!
//! Turns a child's stored enrollments into the shapes the enrollment panel shows:
//! active vs. inactive, therapy vs. group class, and the privacy filter for staff
//! viewers. Reads go through a per-child cache that the enrollment service
//! invalidates after every successful mutation.

use anyhow::Result;
use log::debug;
use shared::{EnrollmentStatus, ServiceType, ViewerRole};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::models::enrollment::ServiceEnrollment;
use crate::storage::traits::EnrollmentStorage;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionedEnrollments {
    pub active: Vec<ServiceEnrollment>,
    pub inactive: Vec<ServiceEnrollment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedEnrollments {
    pub therapy: Vec<ServiceEnrollment>,
    pub group_class: Vec<ServiceEnrollment>,
}

/// What one viewer sees of one child's enrollments
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentOverview {
    pub child_id: String,
    pub therapy: Vec<ServiceEnrollment>,
    pub group_class: Vec<ServiceEnrollment>,
    pub inactive: Vec<ServiceEnrollment>,
}

pub fn partition(enrollments: Vec<ServiceEnrollment>) -> PartitionedEnrollments {
    let (active, inactive) = enrollments
        .into_iter()
        .partition(|e| e.status == EnrollmentStatus::Active);
    PartitionedEnrollments { active, inactive }
}

pub fn group_by_service_type(active_enrollments: Vec<ServiceEnrollment>) -> GroupedEnrollments {
    let (therapy, group_class) = active_enrollments
        .into_iter()
        .partition(|e| e.service_type == ServiceType::Therapy);
    GroupedEnrollments { therapy, group_class }
}

/// Admins and parents see everything. Teachers and therapists only see the
/// enrollments they currently serve, which excludes every inactive enrollment.
pub fn filter_by_viewer_role(
    enrollments: Vec<ServiceEnrollment>,
    viewer_role: ViewerRole,
    viewer_id: Option<&str>,
) -> Vec<ServiceEnrollment> {
    if !viewer_role.is_staff() {
        return enrollments;
    }
    let Some(viewer_id) = viewer_id else {
        return Vec::new();
    };

    enrollments
        .into_iter()
        .filter(|e| {
            e.current_staff
                .as_ref()
                .is_some_and(|staff| staff.staff_id == viewer_id)
        })
        .collect()
}

fn sort_for_display(enrollments: &mut [ServiceEnrollment]) {
    enrollments.sort_by(|a, b| {
        a.service_name
            .to_lowercase()
            .cmp(&b.service_name.to_lowercase())
            .then_with(|| a.enrollment_id.cmp(&b.enrollment_id))
    });
}

/// Children whose lists are kept at once; the oldest entry goes first when full
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Vec<ServiceEnrollment>>,
    /// Insertion order of `entries`, oldest first
    order: VecDeque<String>,
    /// Bumped on every invalidation so a load that started before it can't
    /// repopulate the cache with the old list
    generation: u64,
}

impl CacheState {
    fn insert(&mut self, child_id: &str, enrollments: Vec<ServiceEnrollment>, capacity: usize) {
        if self.entries.insert(child_id.to_string(), enrollments).is_some() {
            return;
        }
        self.order.push_back(child_id.to_string());
        while self.entries.len() > capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    debug!("Evicted enrollment cache entry for child {}", oldest);
                }
                None => break,
            }
        }
    }

    fn remove(&mut self, child_id: &str) {
        if self.entries.remove(child_id).is_some() {
            self.order.retain(|id| id != child_id);
        }
    }
}

/// Read-through cache of enrollment lists keyed by child ID
#[derive(Clone)]
pub struct EnrollmentProjection {
    storage: Arc<dyn EnrollmentStorage>,
    cache: Arc<RwLock<CacheState>>,
    capacity: usize,
}

impl EnrollmentProjection {
    pub fn new(storage: Arc<dyn EnrollmentStorage>) -> Self {
        Self::with_capacity(storage, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(storage: Arc<dyn EnrollmentStorage>, capacity: usize) -> Self {
        Self {
            storage,
            cache: Arc::new(RwLock::new(CacheState::default())),
            capacity: capacity.max(1),
        }
    }

    /// All of a child's enrollments, from the cache when present
    pub async fn enrollments_for_child(&self, child_id: &str) -> Result<Vec<ServiceEnrollment>> {
        let generation = {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.entries.get(child_id) {
                debug!("Enrollment cache hit for child {}", child_id);
                return Ok(cached.clone());
            }
            cache.generation
        };

        debug!("Enrollment cache miss for child {}", child_id);
        let enrollments = self.storage.list_by_child(child_id).await?;

        let mut cache = self.cache.write().await;
        if cache.generation == generation {
            cache.insert(child_id, enrollments.clone(), self.capacity);
        }
        Ok(enrollments)
    }

    pub async fn cached_children(&self) -> usize {
        self.cache.read().await.entries.len()
    }

    /// Drop the cached list so the next read goes to storage
    pub async fn invalidate(&self, child_id: &str) {
        let mut cache = self.cache.write().await;
        cache.remove(child_id);
        cache.generation += 1;
        debug!("Invalidated enrollment cache for child {}", child_id);
    }

    pub async fn overview(
        &self,
        child_id: &str,
        viewer_role: ViewerRole,
        viewer_id: Option<&str>,
    ) -> Result<EnrollmentOverview> {
        let visible = filter_by_viewer_role(self.enrollments_for_child(child_id).await?, viewer_role, viewer_id);
        let PartitionedEnrollments { active, mut inactive } = partition(visible);
        let GroupedEnrollments { mut therapy, mut group_class } = group_by_service_type(active);

        sort_for_display(&mut therapy);
        sort_for_display(&mut group_class);
        sort_for_display(&mut inactive);

        Ok(EnrollmentOverview {
            child_id: child_id.to_string(),
            therapy,
            group_class,
            inactive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state_machine::deactivate;
    use crate::storage::files::test_utils::{
        sample_class_enrollment, sample_therapy_enrollment, test_time, TestEnvironment,
    };
    use crate::storage::traits::EnrollmentStorage;

    fn mixed_enrollments() -> Vec<ServiceEnrollment> {
        let mut occupational = sample_therapy_enrollment("child::1", "T1");
        occupational.service_name = "Occupational Therapy".to_string();
        let inactive = deactivate(&sample_therapy_enrollment("child::1", "T2"), "Goals met", test_time(3)).unwrap();

        vec![
            sample_therapy_enrollment("child::1", "T1"),
            occupational,
            sample_class_enrollment("child::1", "X"),
            inactive,
        ]
    }

    #[test]
    fn test_partition_and_group() {
        let PartitionedEnrollments { active, inactive } = partition(mixed_enrollments());
        assert_eq!(active.len(), 3);
        assert_eq!(inactive.len(), 1);

        let grouped = group_by_service_type(active);
        assert_eq!(grouped.therapy.len(), 2);
        assert_eq!(grouped.group_class.len(), 1);
        assert_eq!(grouped.group_class[0].service_name, "Music Class");
    }

    #[test]
    fn test_staff_viewer_sees_only_own_enrollments() {
        let visible = filter_by_viewer_role(mixed_enrollments(), ViewerRole::Therapist, Some("T1"));

        assert_eq!(visible.len(), 2);
        assert!(visible
            .iter()
            .all(|e| e.current_staff.as_ref().unwrap().staff_id == "T1"));
    }

    #[test]
    fn test_staff_viewer_never_sees_inactive() {
        // T2 served the inactive enrollment before it was deactivated
        let visible = filter_by_viewer_role(mixed_enrollments(), ViewerRole::Therapist, Some("T2"));
        assert!(visible.is_empty());
    }

    #[test]
    fn test_admin_and_parent_see_everything() {
        assert_eq!(filter_by_viewer_role(mixed_enrollments(), ViewerRole::Admin, None).len(), 4);
        assert_eq!(filter_by_viewer_role(mixed_enrollments(), ViewerRole::Parent, Some("parent::1")).len(), 4);
        assert!(filter_by_viewer_role(mixed_enrollments(), ViewerRole::Teacher, None).is_empty());
    }

    #[tokio::test]
    async fn test_overview_sorted_and_split() {
        let env = TestEnvironment::new().await.unwrap();
        let repository = Arc::new(env.enrollment_repository());
        for enrollment in mixed_enrollments() {
            repository.save(&enrollment).await.unwrap();
        }
        let projection = EnrollmentProjection::new(repository);

        let overview = projection.overview("child::1", ViewerRole::Admin, None).await.unwrap();

        let names: Vec<_> = overview.therapy.iter().map(|e| e.service_name.as_str()).collect();
        assert_eq!(names, vec!["Occupational Therapy", "Speech Therapy"]);
        assert_eq!(overview.group_class.len(), 1);
        assert_eq!(overview.inactive.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_serves_until_invalidated() {
        let env = TestEnvironment::new().await.unwrap();
        let repository = Arc::new(env.enrollment_repository());
        let enrollment = sample_therapy_enrollment("child::1", "T1");
        repository.save(&enrollment).await.unwrap();
        let projection = EnrollmentProjection::new(repository.clone());

        assert_eq!(projection.enrollments_for_child("child::1").await.unwrap().len(), 1);

        repository.save(&sample_class_enrollment("child::1", "X")).await.unwrap();
        assert_eq!(
            projection.enrollments_for_child("child::1").await.unwrap().len(),
            1,
            "cached list is served until invalidated"
        );

        projection.invalidate("child::1").await;
        assert_eq!(projection.enrollments_for_child("child::1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cache_is_bounded() {
        let env = TestEnvironment::new().await.unwrap();
        let repository = Arc::new(env.enrollment_repository());
        for child in ["child::1", "child::2", "child::3"] {
            repository.save(&sample_therapy_enrollment(child, "T1")).await.unwrap();
        }
        let projection = EnrollmentProjection::with_capacity(repository.clone(), 2);

        for child in ["child::1", "child::2", "child::3"] {
            assert_eq!(projection.enrollments_for_child(child).await.unwrap().len(), 1);
        }
        assert_eq!(projection.cached_children().await, 2);

        // child::1 was evicted, so its next read sees storage again
        repository.save(&sample_class_enrollment("child::1", "X")).await.unwrap();
        assert_eq!(projection.enrollments_for_child("child::1").await.unwrap().len(), 2);
        assert_eq!(projection.cached_children().await, 2);
    }
}
