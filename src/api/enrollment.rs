use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, param::Path, payload::Json};

use crate::AppData;
use crate::api::BearerAuth;
use crate::coordinators::EnrollmentCoordinator;
use crate::errors::EnrollmentApiError;
use crate::providers::TokenProvider;
use crate::types::dto::enrollment::{EnrollRequest, EnrollmentResponse, GroupOccupancyResponse};
use crate::types::internal::context::RequestContext;
use crate::types::internal::enrollment::EnrollmentRequest;

/// Enrollment endpoints, scoped by the school in the route
pub struct EnrollmentApi {
    enrollment_coordinator: EnrollmentCoordinator,
    token_provider: Arc<TokenProvider>,
}

impl EnrollmentApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            token_provider: Arc::clone(&app_data.providers.token_provider),
            enrollment_coordinator: EnrollmentCoordinator::new(app_data),
        }
    }

    fn context(
        &self,
        req: &Request,
        auth: &BearerAuth,
    ) -> Result<RequestContext, EnrollmentApiError> {
        RequestContext::from_bearer(req, &auth.0, &self.token_provider)
            .map_err(EnrollmentApiError::from_internal_error)
    }
}

#[derive(Tags)]
enum EnrollmentTags {
    /// Student enrollments and group assignment
    Enrollment,
}

#[OpenApi]
impl EnrollmentApi {
    /// Enroll a student in a unit for a semester
    ///
    /// The student is placed in the first group with a free seat.
    #[oai(path = "/:school/enrollments", method = "post", tag = "EnrollmentTags::Enrollment")]
    async fn enroll(
        &self,
        req: &Request,
        auth: BearerAuth,
        school: Path<String>,
        body: Json<EnrollRequest>,
    ) -> Result<Json<EnrollmentResponse>, EnrollmentApiError> {
        let ctx = self.context(req, &auth)?;
        let requested_path = format!("/{}/enrollments", school.0.to_lowercase());
        let request = EnrollmentRequest::new(&body.student_code, body.unit_id, body.semester_id);

        let enrollment = self
            .enrollment_coordinator
            .enroll(&ctx, &requested_path, &school.0, request)
            .await
            .map_err(EnrollmentApiError::from_internal_error)?;

        Ok(Json(EnrollmentResponse::from(enrollment)))
    }

    /// Seats taken per group of a unit in a semester
    #[oai(
        path = "/:school/units/:unit_id/semesters/:semester_id/groups",
        method = "get",
        tag = "EnrollmentTags::Enrollment"
    )]
    async fn groups(
        &self,
        req: &Request,
        auth: BearerAuth,
        school: Path<String>,
        unit_id: Path<i32>,
        semester_id: Path<i32>,
    ) -> Result<Json<Vec<GroupOccupancyResponse>>, EnrollmentApiError> {
        let ctx = self.context(req, &auth)?;
        let requested_path = format!(
            "/{}/units/{}/semesters/{}/groups",
            school.0.to_lowercase(),
            unit_id.0,
            semester_id.0
        );

        let occupancy = self
            .enrollment_coordinator
            .group_occupancy(&ctx, &requested_path, &school.0, unit_id.0, semester_id.0)
            .await
            .map_err(EnrollmentApiError::from_internal_error)?;

        Ok(Json(occupancy.into_iter().map(GroupOccupancyResponse::from).collect()))
    }

    /// Enrollments of one student
    #[oai(
        path = "/students/:student_code/enrollments",
        method = "get",
        tag = "EnrollmentTags::Enrollment"
    )]
    async fn student_enrollments(
        &self,
        req: &Request,
        auth: BearerAuth,
        student_code: Path<String>,
    ) -> Result<Json<Vec<EnrollmentResponse>>, EnrollmentApiError> {
        let ctx = self.context(req, &auth)?;

        let enrollments = self
            .enrollment_coordinator
            .student_enrollments(&ctx, &student_code.0)
            .await
            .map_err(EnrollmentApiError::from_internal_error)?;

        Ok(Json(enrollments.into_iter().map(EnrollmentResponse::from).collect()))
    }
}
