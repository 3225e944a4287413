//! Tenant scoping for every scheduling endpoint. The upstream auth proxy is
//! expected to set both headers; requests without them are rejected before
//! any handler logic runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::api::problem::{unauthorized, ProblemResponse};

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Who is calling, and for which tenant.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, ProblemResponse> {
    let value = parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized(format!("Missing {name} header")))?;
    value
        .parse()
        .map_err(|_| unauthorized(format!("Malformed {name} header")))
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            tenant_id: header_uuid(parts, TENANT_HEADER)?,
            actor_id: header_uuid(parts, ACTOR_HEADER)?,
        })
    }
}
