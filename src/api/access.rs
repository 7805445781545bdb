use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::AppData;
use crate::coordinators::AccessCoordinator;
use crate::errors::AccessApiError;
use crate::providers::TokenProvider;
use crate::types::dto::access::{AccessCheckRequest, AccessCheckResponse};
use crate::types::internal::context::RequestContext;

/// School-scoped access checks for page navigation
pub struct AccessApi {
    access_coordinator: AccessCoordinator,
    token_provider: Arc<TokenProvider>,
}

impl AccessApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            token_provider: Arc::clone(&app_data.providers.token_provider),
            access_coordinator: AccessCoordinator::new(app_data),
        }
    }
}

#[derive(Tags)]
enum AccessTags {
    /// School-scoped access guard
    Access,
}

#[OpenApi(prefix_path = "/access")]
impl AccessApi {
    /// Run the access guard for the caller against a requested path
    ///
    /// The bearer token is optional: without one the guard answers with a
    /// redirect to the login page. A token that fails validation is rejected
    /// with 401.
    #[oai(path = "/check", method = "post", tag = "AccessTags::Access")]
    async fn check(
        &self,
        req: &Request,
        body: Json<AccessCheckRequest>,
    ) -> Result<Json<AccessCheckResponse>, AccessApiError> {
        let ctx = RequestContext::validate_request(req, &self.token_provider)
            .map_err(AccessApiError::from_internal_error)?;

        let decision = self
            .access_coordinator
            .check(&ctx, &body.path, body.school.as_deref())
            .await;

        Ok(Json(AccessCheckResponse::from(decision)))
    }
}
