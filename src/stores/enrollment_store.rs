use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, sea_query::Query,
};

use crate::errors::InternalError;
use crate::errors::internal::EnrollmentError;
use crate::errors::internal::database::is_unique_violation;
use crate::types::db::{enrollment, unit};
use crate::types::internal::enrollment::{EnrollmentRequest, Seat};

/// Repository for enrollment rows
///
/// All reads used for seat selection must run on the same transaction as
/// the insert that follows them.
#[derive(Debug, Default, Clone)]
pub struct EnrollmentStore;

/// SQLite reports a lost write race as a lock error instead of a constraint error
fn is_write_race(err: &DbErr) -> bool {
    is_unique_violation(err) || err.to_string().contains("database is locked")
}

impl EnrollmentStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_existing(
        &self,
        conn: &impl ConnectionTrait,
        request: &EnrollmentRequest,
    ) -> Result<Option<enrollment::Model>, InternalError> {
        enrollment::Entity::find()
            .filter(enrollment::Column::StudentCode.eq(request.student_code.as_str()))
            .filter(enrollment::Column::UnitId.eq(request.unit_id))
            .filter(enrollment::Column::SemesterId.eq(request.semester_id))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_existing_enrollment", e))
    }

    /// Slot indexes already taken in one group
    pub async fn taken_slots(
        &self,
        conn: &impl ConnectionTrait,
        unit_id: i32,
        semester_id: i32,
        group: &str,
    ) -> Result<Vec<i32>, InternalError> {
        enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::Slot)
            .filter(enrollment::Column::UnitId.eq(unit_id))
            .filter(enrollment::Column::SemesterId.eq(semester_id))
            .filter(enrollment::Column::GroupLabel.eq(group))
            .order_by_asc(enrollment::Column::Slot)
            .into_tuple::<i32>()
            .all(conn)
            .await
            .map_err(|e| InternalError::database("taken_slots", e))
    }

    pub async fn count_in_group(
        &self,
        conn: &impl ConnectionTrait,
        unit_id: i32,
        semester_id: i32,
        group: &str,
    ) -> Result<u64, InternalError> {
        enrollment::Entity::find()
            .filter(enrollment::Column::UnitId.eq(unit_id))
            .filter(enrollment::Column::SemesterId.eq(semester_id))
            .filter(enrollment::Column::GroupLabel.eq(group))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_in_group", e))
    }

    /// Insert an enrollment into the given seat
    ///
    /// A unique index rejection means another writer took the seat or the
    /// triple first; it is reported as `SeatConflict` so the caller can retry.
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        request: &EnrollmentRequest,
        seat: &Seat,
    ) -> Result<enrollment::Model, InternalError> {
        enrollment::ActiveModel {
            student_code: Set(request.student_code.clone()),
            unit_id: Set(request.unit_id),
            semester_id: Set(request.semester_id),
            group_label: Set(seat.group.clone()),
            slot: Set(seat.slot),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| {
            if is_write_race(&e) {
                tracing::debug!("Enrollment insert lost a race: {}", e);
                InternalError::Enrollment(EnrollmentError::SeatConflict {
                    unit_id: request.unit_id,
                    semester_id: request.semester_id,
                })
            } else {
                InternalError::database("insert_enrollment", e)
            }
        })
    }

    /// Enrollments of a student, limited to units owned by `school` when given
    pub async fn list_for_student(
        &self,
        conn: &impl ConnectionTrait,
        student_code: &str,
        school: Option<&str>,
    ) -> Result<Vec<enrollment::Model>, InternalError> {
        let mut query =
            enrollment::Entity::find().filter(enrollment::Column::StudentCode.eq(student_code.trim()));
        if let Some(school) = school {
            query = query.filter(
                enrollment::Column::UnitId.in_subquery(
                    Query::select()
                        .column(unit::Column::Id)
                        .from(unit::Entity)
                        .and_where(unit::Column::School.eq(school))
                        .to_owned(),
                ),
            );
        }
        query
            .order_by_asc(enrollment::Column::SemesterId)
            .order_by_asc(enrollment::Column::UnitId)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_enrollments_for_student", e))
    }
}
