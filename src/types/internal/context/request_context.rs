use std::net::IpAddr;

use poem::Request;
use poem_openapi::auth::{Bearer, BearerAuthorization};

use crate::errors::InternalError;
use crate::providers::TokenProvider;
use crate::types::internal::{auth::Claims, principal::Principal};

use super::{request_id::RequestId, request_source::RequestSource};

/// Request context that flows through all layers
///
/// Contains contextual information about the current request that is needed
/// for authorization, logging and auditing across API, coordinator, provider
/// and store layers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Whether the request is authenticated (JWT validated successfully)
    pub authenticated: bool,

    /// Full JWT claims if authenticated
    pub claims: Option<Claims>,

    /// Roles and home school, evaluated once when the context is built
    pub principal: Option<Principal>,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// Actor who initiated the operation
    pub actor_id: String,
}

impl RequestContext {
    /// Unauthenticated API context with a fresh request id
    pub fn new() -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            authenticated: false,
            claims: None,
            principal: None,
            source: RequestSource::API,
            actor_id: "unknown".to_owned(),
        }
    }

    /// Create a RequestContext for CLI operations
    ///
    /// # Arguments
    /// * `command_name` - Name of the CLI command being executed
    pub fn for_cli(command_name: &str) -> Self {
        Self {
            source: RequestSource::CLI,
            actor_id: format!("cli:{}", command_name),
            ..Self::new()
        }
    }

    /// Create a RequestContext for system operations
    ///
    /// # Arguments
    /// * `operation_name` - Name of the system operation being executed
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            source: RequestSource::System,
            actor_id: format!("system:{}", operation_name),
            ..Self::new()
        }
    }

    fn extract_bearer(req: &Request) -> Option<Bearer> {
        Bearer::from_request(req).ok()
    }

    /// Extract IP address from request headers
    ///
    /// Checks X-Forwarded-For, X-Real-IP, and falls back to remote address.
    fn extract_ip_address(req: &Request) -> Option<IpAddr> {
        // Check X-Forwarded-For header (proxy/load balancer)
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                return ip.trim().parse().ok();
            }
        }

        // Check X-Real-IP header (nginx)
        if let Some(real_ip) = req.header("X-Real-IP") {
            return real_ip.parse().ok();
        }

        // Fall back to remote address
        req.remote_addr().as_socket_addr().map(|addr| addr.ip())
    }

    /// Create RequestContext from an incoming request
    ///
    /// Should be called at the beginning of every endpoint. A request without
    /// a bearer token yields an unauthenticated context, which the access
    /// guard turns into a redirect to the login page. A token that is present
    /// but invalid or expired is an error.
    ///
    /// # Arguments
    /// * `req` - The HTTP request
    /// * `token_provider` - TokenProvider for JWT validation
    pub fn validate_request(
        req: &Request,
        token_provider: &TokenProvider,
    ) -> Result<Self, InternalError> {
        match Self::extract_bearer(req) {
            Some(bearer) => Self::from_bearer(req, &bearer, token_provider),
            None => {
                let mut ctx = Self::new();
                ctx.ip_address = Self::extract_ip_address(req);
                tracing::trace!("Anonymous request context created: {:?}", ctx);
                Ok(ctx)
            }
        }
    }

    /// Create RequestContext from a bearer token the endpoint already extracted
    ///
    /// Used by endpoints that declare the `BearerAuth` security scheme.
    pub fn from_bearer(
        req: &Request,
        bearer: &Bearer,
        token_provider: &TokenProvider,
    ) -> Result<Self, InternalError> {
        let claims = token_provider.validate_jwt(&bearer.token).map_err(|e| {
            tracing::debug!("Bearer token rejected: {}", e);
            e
        })?;

        let mut ctx = Self::new().with_auth(claims);
        ctx.ip_address = Self::extract_ip_address(req);
        tracing::trace!("Request context created: {:?}", ctx);

        Ok(ctx)
    }

    /// Set the ip_address
    pub fn with_ip_address(mut self, ip_address: IpAddr) -> Self {
        self.ip_address = Some(ip_address);
        self
    }

    /// Set authentication state from validated claims
    pub fn with_auth(mut self, claims: Claims) -> Self {
        self.authenticated = true;
        self.actor_id = claims.sub.clone();
        self.principal = Some(Principal::from_claims(&claims));
        self.claims = Some(claims);
        self
    }

    /// Attach a principal resolved without a token (CLI and system operations)
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.authenticated = true;
        self.actor_id = principal.user_id.clone();
        self.principal = Some(principal);
        self
    }

    /// Set the actor_id
    pub fn with_actor_id(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
