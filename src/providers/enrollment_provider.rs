use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::errors::internal::EnrollmentError;
use crate::stores::{CatalogStore, EnrollmentStore};
use crate::types::ProviderResult;
use crate::types::db::{enrollment, unit};
use crate::types::internal::action_outcome::ActionOutcome;
use crate::types::internal::audit::EventType;
use crate::types::internal::audit_intent::AuditIntent;
use crate::types::internal::enrollment::{
    EnrollmentRequest, GroupOccupancy, Seat, lowest_free_slot,
};
use crate::types::internal::group_policy::GroupPolicy;

/// Assigns students to the first group of a unit with a free seat
///
/// Every method takes the connection to run on. `enroll` must be given a
/// transaction so its reads and the insert see the same snapshot; a lost
/// race surfaces as `EnrollmentError::SeatConflict` and the caller retries
/// the whole sequence.
pub struct EnrollmentProvider {
    enrollment_store: Arc<EnrollmentStore>,
    catalog_store: Arc<CatalogStore>,
    group_policy: GroupPolicy,
}

impl EnrollmentProvider {
    pub fn new(
        enrollment_store: Arc<EnrollmentStore>,
        catalog_store: Arc<CatalogStore>,
        group_policy: GroupPolicy,
    ) -> Self {
        Self {
            enrollment_store,
            catalog_store,
            group_policy,
        }
    }

    pub fn group_policy(&self) -> &GroupPolicy {
        &self.group_policy
    }

    /// Load the unit, checking it belongs to `school` when one is given
    async fn load_unit(
        &self,
        conn: &impl ConnectionTrait,
        unit_id: i32,
        school: Option<&str>,
    ) -> Result<unit::Model, InternalError> {
        let unit = self
            .catalog_store
            .find_unit(conn, unit_id)
            .await?
            .ok_or(EnrollmentError::UnitNotFound { unit_id })?;

        // Units of another school are invisible under this school's routes
        if let Some(school) = school {
            if !unit.school.eq_ignore_ascii_case(school.trim()) {
                tracing::debug!("Unit {} belongs to {}, not {}", unit_id, unit.school, school);
                return Err(EnrollmentError::UnitNotFound { unit_id }.into());
            }
        }

        Ok(unit)
    }

    async fn ensure_semester(
        &self,
        conn: &impl ConnectionTrait,
        semester_id: i32,
    ) -> Result<(), InternalError> {
        self.catalog_store
            .find_semester(conn, semester_id)
            .await?
            .ok_or(EnrollmentError::SemesterNotFound { semester_id })?;
        Ok(())
    }

    /// Record an enrollment in the earliest group with spare capacity
    ///
    /// # Errors
    /// * `InvalidStudentCode` - blank student code
    /// * `UnitNotFound` / `SemesterNotFound` - unknown ids, or a unit outside `school`
    /// * `DuplicateEnrollment` - the triple is already enrolled; nothing is written
    /// * `CapacityExhausted` - every group is full; nothing is written
    /// * `SeatConflict` - a concurrent writer won the race; retry
    pub async fn enroll(
        &self,
        conn: &impl ConnectionTrait,
        request: &EnrollmentRequest,
        school: Option<&str>,
    ) -> ProviderResult<enrollment::Model> {
        if request.student_code.is_empty() {
            return Err(EnrollmentError::InvalidStudentCode.into());
        }

        let unit = self.load_unit(conn, request.unit_id, school).await?;
        self.ensure_semester(conn, request.semester_id).await?;

        if self
            .enrollment_store
            .find_existing(conn, request)
            .await?
            .is_some()
        {
            return Err(EnrollmentError::DuplicateEnrollment {
                student_code: request.student_code.clone(),
                unit_id: request.unit_id,
                semester_id: request.semester_id,
            }
            .into());
        }

        let policy = self.group_policy.with_capacity_override(unit.group_capacity);
        let Some(seat) = self.first_free_seat(conn, request, &policy).await? else {
            return Err(EnrollmentError::CapacityExhausted {
                unit_id: request.unit_id,
                semester_id: request.semester_id,
                seats: policy.total_seats(),
            }
            .into());
        };

        let created = self.enrollment_store.insert(conn, request, &seat).await?;
        tracing::info!(
            "Enrolled {} in unit {} semester {} group {}",
            created.student_code,
            created.unit_id,
            created.semester_id,
            created.group_label
        );

        let intent = AuditIntent::new(EventType::EnrollmentCreated)
            .with_field("enrollment_id", created.id)
            .with_field("student_code", created.student_code.clone())
            .with_field("unit_id", created.unit_id)
            .with_field("unit_code", unit.code)
            .with_field("semester_id", created.semester_id)
            .with_field("group", created.group_label.clone())
            .with_field("slot", created.slot);

        Ok(ActionOutcome::new(created).with_audit(intent))
    }

    async fn first_free_seat(
        &self,
        conn: &impl ConnectionTrait,
        request: &EnrollmentRequest,
        policy: &GroupPolicy,
    ) -> Result<Option<Seat>, InternalError> {
        for group in policy.labels() {
            let taken = self
                .enrollment_store
                .taken_slots(conn, request.unit_id, request.semester_id, group)
                .await?;
            if let Some(slot) = lowest_free_slot(&taken, policy.capacity()) {
                return Ok(Some(Seat {
                    group: group.clone(),
                    slot,
                }));
            }
        }
        Ok(None)
    }

    /// Seats taken per group, in group order
    pub async fn occupancy(
        &self,
        conn: &impl ConnectionTrait,
        unit_id: i32,
        semester_id: i32,
        school: Option<&str>,
    ) -> Result<Vec<GroupOccupancy>, InternalError> {
        let unit = self.load_unit(conn, unit_id, school).await?;
        self.ensure_semester(conn, semester_id).await?;
        let policy = self.group_policy.with_capacity_override(unit.group_capacity);

        let mut groups = Vec::with_capacity(policy.labels().len());
        for group in policy.labels() {
            let enrolled = self
                .enrollment_store
                .count_in_group(conn, unit_id, semester_id, group)
                .await?;
            groups.push(GroupOccupancy {
                group: group.clone(),
                enrolled,
                capacity: policy.capacity(),
            });
        }
        Ok(groups)
    }

    /// A student's enrollments; `school` limits them to units of that school
    pub async fn student_enrollments(
        &self,
        conn: &impl ConnectionTrait,
        student_code: &str,
        school: Option<&str>,
    ) -> Result<Vec<enrollment::Model>, InternalError> {
        if student_code.trim().is_empty() {
            return Err(EnrollmentError::InvalidStudentCode.into());
        }
        self.enrollment_store
            .list_for_student(conn, student_code, school)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{seed_unit_and_semester, setup_portal_db};

    fn provider(capacity: u32) -> EnrollmentProvider {
        let labels = vec!["A".to_string(), "B".to_string()];
        EnrollmentProvider::new(
            Arc::new(EnrollmentStore::new()),
            Arc::new(CatalogStore::new()),
            GroupPolicy::new(labels, capacity).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_groups_fill_in_order() {
        let db = setup_portal_db().await;
        let (unit, semester) = seed_unit_and_semester(&db, None).await;
        let provider = provider(2);

        let mut groups = Vec::new();
        for i in 0..4 {
            let request = EnrollmentRequest::new(format!("S{i}"), unit.id, semester.id);
            let outcome = provider.enroll(&db, &request, None).await.unwrap();
            groups.push((outcome.value.group_label, outcome.value.slot));
            assert_eq!(outcome.audit.len(), 1);
        }

        assert_eq!(
            groups,
            vec![
                ("A".to_string(), 0),
                ("A".to_string(), 1),
                ("B".to_string(), 0),
                ("B".to_string(), 1)
            ]
        );

        let result = provider
            .enroll(&db, &EnrollmentRequest::new("S9", unit.id, semester.id), None)
            .await;
        assert!(matches!(
            result,
            Err(InternalError::Enrollment(EnrollmentError::CapacityExhausted { seats: 4, .. }))
        ));
    }

    #[tokio::test]
    async fn test_unit_capacity_override_applies() {
        let db = setup_portal_db().await;
        let (unit, semester) = seed_unit_and_semester(&db, Some(1)).await;
        let provider = provider(60);

        let first = provider
            .enroll(&db, &EnrollmentRequest::new("S1", unit.id, semester.id), None)
            .await
            .unwrap();
        let second = provider
            .enroll(&db, &EnrollmentRequest::new("S2", unit.id, semester.id), None)
            .await
            .unwrap();

        assert_eq!(first.value.group_label, "A");
        assert_eq!(second.value.group_label, "B");
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let db = setup_portal_db().await;
        let (unit, semester) = seed_unit_and_semester(&db, None).await;
        let provider = provider(2);

        let blank = provider
            .enroll(&db, &EnrollmentRequest::new("   ", unit.id, semester.id), None)
            .await;
        assert!(matches!(
            blank,
            Err(InternalError::Enrollment(EnrollmentError::InvalidStudentCode))
        ));

        let no_unit = provider
            .enroll(&db, &EnrollmentRequest::new("S1", 999, semester.id), None)
            .await;
        assert!(matches!(
            no_unit,
            Err(InternalError::Enrollment(EnrollmentError::UnitNotFound { unit_id: 999 }))
        ));

        let no_semester = provider
            .enroll(&db, &EnrollmentRequest::new("S1", unit.id, 999), None)
            .await;
        assert!(matches!(
            no_semester,
            Err(InternalError::Enrollment(EnrollmentError::SemesterNotFound { semester_id: 999 }))
        ));
    }

    #[tokio::test]
    async fn test_unit_of_other_school_is_not_found() {
        let db = setup_portal_db().await;
        let (unit, semester) = seed_unit_and_semester(&db, None).await;
        let provider = provider(2);

        let result = provider
            .enroll(&db, &EnrollmentRequest::new("S1", unit.id, semester.id), Some("SBS"))
            .await;
        assert!(matches!(
            result,
            Err(InternalError::Enrollment(EnrollmentError::UnitNotFound { .. }))
        ));

        let allowed = provider
            .enroll(&db, &EnrollmentRequest::new("S1", unit.id, semester.id), Some("sces"))
            .await;
        assert!(allowed.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_leaves_store_unchanged() {
        let db = setup_portal_db().await;
        let (unit, semester) = seed_unit_and_semester(&db, None).await;
        let provider = provider(2);
        let request = EnrollmentRequest::new("S1", unit.id, semester.id);

        provider.enroll(&db, &request, None).await.unwrap();
        let before = provider.occupancy(&db, unit.id, semester.id, None).await.unwrap();
        let result = provider.enroll(&db, &request, None).await;
        let after = provider.occupancy(&db, unit.id, semester.id, None).await.unwrap();

        assert!(matches!(
            result,
            Err(InternalError::Enrollment(EnrollmentError::DuplicateEnrollment { .. }))
        ));
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_occupancy_reports_every_group() {
        let db = setup_portal_db().await;
        let (unit, semester) = seed_unit_and_semester(&db, None).await;
        let provider = provider(2);

        for code in ["S1", "S2", "S3"] {
            provider
                .enroll(&db, &EnrollmentRequest::new(code, unit.id, semester.id), None)
                .await
                .unwrap();
        }

        let occupancy = provider.occupancy(&db, unit.id, semester.id, None).await.unwrap();
        assert_eq!(occupancy.len(), 2);
        assert_eq!((occupancy[0].enrolled, occupancy[0].is_full()), (2, true));
        assert_eq!((occupancy[1].enrolled, occupancy[1].is_full()), (1, false));
    }
}
