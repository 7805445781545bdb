use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::AppData;
use crate::audit::AuditLogger;
use crate::config::DatabaseConnections;
use crate::coordinators::AccessCoordinator;
use crate::errors::InternalError;
use crate::errors::internal::{AccessError, EnrollmentError};
use crate::providers::EnrollmentProvider;
use crate::types::db::enrollment;
use crate::types::internal::context::RequestContext;
use crate::types::internal::enrollment::{EnrollmentRequest, GroupOccupancy};

/// Orchestrates enrollment requests: guard, permission, transaction, retry, audit
pub struct EnrollmentCoordinator {
    connections: DatabaseConnections,
    access_coordinator: AccessCoordinator,
    enrollment_provider: Arc<EnrollmentProvider>,
    audit_logger: Arc<AuditLogger>,
    max_attempts: u32,
    seat_conflicts: AtomicU64,
}

impl EnrollmentCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            connections: app_data.connections.clone(),
            access_coordinator: AccessCoordinator::new(app_data.clone()),
            enrollment_provider: Arc::clone(&app_data.providers.enrollment_provider),
            audit_logger: Arc::clone(&app_data.audit_logger),
            max_attempts: app_data.enrollment_settings.max_attempts(),
            seat_conflicts: AtomicU64::new(0),
        }
    }

    /// Attempts that lost a seat race and were retried
    pub fn seat_conflicts(&self) -> u64 {
        self.seat_conflicts.load(Ordering::Relaxed)
    }

    /// Enroll a student in a unit of `school`
    ///
    /// Each attempt runs in its own transaction. When the insert loses a race
    /// for a seat the transaction is rolled back and the whole sequence runs
    /// again, so a concurrent duplicate is reported as `DuplicateEnrollment`
    /// and a taken seat moves on to the next free one.
    pub async fn enroll(
        &self,
        ctx: &RequestContext,
        requested_path: &str,
        school: &str,
        request: EnrollmentRequest,
    ) -> Result<enrollment::Model, InternalError> {
        self.access_coordinator
            .require_school(ctx, requested_path, school)
            .await?;

        let principal = ctx.principal().ok_or(AccessError::Unauthenticated)?;
        if !principal.can_manage_enrollments_of(&request.student_code) {
            if let Err(e) = self
                .audit_logger
                .log_access_denied(ctx, "enroll_other_student", None)
                .await
            {
                tracing::error!("Failed to audit denied enrollment: {}", e);
            }
            return Err(AccessError::not_permitted("enroll other students").into());
        }

        let school = school.trim().to_uppercase();
        for attempt in 1..=self.max_attempts {
            let txn = self.connections.begin_portal_transaction().await?;

            match self
                .enrollment_provider
                .enroll(&txn, &request, Some(&school))
                .await
            {
                Ok(outcome) => {
                    DatabaseConnections::commit_transaction(txn).await?;
                    self.audit_logger
                        .record_intents(ctx, Some(&school), outcome.audit)
                        .await;
                    return Ok(outcome.value);
                }
                Err(InternalError::Enrollment(EnrollmentError::SeatConflict { .. })) => {
                    Self::rollback(txn).await;
                    self.seat_conflicts.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(
                        request_id = %ctx.request_id,
                        "Enrollment attempt {}/{} lost a seat race, retrying",
                        attempt,
                        self.max_attempts
                    );
                }
                Err(err) => {
                    Self::rollback(txn).await;
                    if let InternalError::Enrollment(rejection) = &err {
                        self.audit_rejection(ctx, &school, &request, rejection).await;
                    }
                    return Err(err);
                }
            }
        }

        tracing::warn!(
            request_id = %ctx.request_id,
            "Enrollment of {} in unit {} gave up after {} attempts",
            request.student_code,
            request.unit_id,
            self.max_attempts
        );
        let err = EnrollmentError::Contention {
            attempts: self.max_attempts,
        };
        self.audit_rejection(ctx, &school, &request, &err).await;
        Err(err.into())
    }

    async fn rollback(txn: sea_orm::DatabaseTransaction) {
        if let Err(e) = txn.rollback().await {
            tracing::error!("Failed to roll back enrollment transaction: {}", e);
        }
    }

    async fn audit_rejection(
        &self,
        ctx: &RequestContext,
        school: &str,
        request: &EnrollmentRequest,
        rejection: &EnrollmentError,
    ) {
        if let Err(e) = self
            .audit_logger
            .log_enrollment_rejected(
                ctx,
                Some(school),
                &request.student_code,
                request.unit_id,
                request.semester_id,
                &rejection.to_string(),
            )
            .await
        {
            tracing::error!("Failed to audit enrollment rejection: {}", e);
        }
    }

    /// Per-group occupancy of a unit of `school` in a semester
    pub async fn group_occupancy(
        &self,
        ctx: &RequestContext,
        requested_path: &str,
        school: &str,
        unit_id: i32,
        semester_id: i32,
    ) -> Result<Vec<GroupOccupancy>, InternalError> {
        self.access_coordinator
            .require_school(ctx, requested_path, school)
            .await?;

        self.enrollment_provider
            .occupancy(&self.connections.portal, unit_id, semester_id, Some(school))
            .await
    }

    /// Enrollments of one student
    ///
    /// A student sees all of their own enrollments and admins see everyone's.
    /// Faculty admins and the Exam Office only see enrollments in units of
    /// their home school.
    pub async fn student_enrollments(
        &self,
        ctx: &RequestContext,
        student_code: &str,
    ) -> Result<Vec<enrollment::Model>, InternalError> {
        let principal = ctx.principal().ok_or(AccessError::Unauthenticated)?;
        let student_code = student_code.trim();
        if !principal.can_manage_enrollments_of(student_code) {
            self.audit_listing_denied(ctx).await;
            return Err(AccessError::not_permitted("view enrollments of other students").into());
        }

        let school = if principal.is_bypass() || principal.code == student_code {
            None
        } else {
            match principal.home_school.as_ref() {
                Some(home_school) => Some(home_school.as_str()),
                None => {
                    self.audit_listing_denied(ctx).await;
                    return Err(AccessError::NoFacultyAssignment.into());
                }
            }
        };

        self.enrollment_provider
            .student_enrollments(&self.connections.portal, student_code, school)
            .await
    }

    async fn audit_listing_denied(&self, ctx: &RequestContext) {
        if let Err(e) = self
            .audit_logger
            .log_access_denied(ctx, "view_student_enrollments", None)
            .await
        {
            tracing::error!("Failed to audit denied enrollment listing: {}", e);
        }
    }
}
