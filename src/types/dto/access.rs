use poem_openapi::Object;

use crate::types::internal::AccessDecision;

/// Path the caller wants to open, optionally with an explicit school
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct AccessCheckRequest {
    /// Requested resource path, e.g. `/sbs/units`
    pub path: String,

    /// School code supplied as a route parameter; switches the guard to explicit mode
    pub school: Option<String>,
}

/// Outcome of the school-scoped access guard
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct AccessCheckResponse {
    /// One of `allow`, `redirect`, `deny`
    pub decision: String,

    /// Home school attached to the request when allowed
    pub resolved_school: Option<String>,

    /// Where to send the user when redirected
    pub redirect_path: Option<String>,

    /// HTTP status the page should answer with when denied
    pub http_status: Option<u16>,

    pub message: Option<String>,
}

impl From<AccessDecision> for AccessCheckResponse {
    fn from(decision: AccessDecision) -> Self {
        let kind = decision.kind().to_string();
        match decision {
            AccessDecision::Allow { resolved_school } => Self {
                decision: kind,
                resolved_school: resolved_school.map(|s| s.as_str().to_string()),
                redirect_path: None,
                http_status: None,
                message: None,
            },
            AccessDecision::Redirect { path, message } => Self {
                decision: kind,
                resolved_school: None,
                redirect_path: Some(path),
                http_status: None,
                message,
            },
            AccessDecision::Deny { status, reason } => Self {
                decision: kind,
                resolved_school: None,
                redirect_path: None,
                http_status: Some(status),
                message: Some(reason.message().to_string()),
            },
        }
    }
}
