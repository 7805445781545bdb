use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::types::dto::school::SchoolResponse;
use crate::types::internal::SchoolCode;

/// Static school table
pub struct SchoolsApi;

#[derive(Tags)]
enum SchoolTags {
    /// Schools known to the portal
    Schools,
}

#[OpenApi]
impl SchoolsApi {
    /// List every school with its display name
    #[oai(path = "/schools", method = "get", tag = "SchoolTags::Schools")]
    async fn list(&self) -> Json<Vec<SchoolResponse>> {
        Json(SchoolCode::ALL.into_iter().map(SchoolResponse::from).collect())
    }
}
