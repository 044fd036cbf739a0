//! Principal resolution from the upstream auth gateway
//!
//! Authentication happens outside this service: the gateway verifies the
//! caller and forwards the resolved identity as `x-user-id` / `x-user-role`
//! headers. Requests without both headers are anonymous and may only reach
//! read-only routes, which is enforced by handlers extracting `Principal`
//! where a caller identity is required.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::UserRole;

/// Header carrying the resolved user id
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the resolved role
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Acting user resolved by the auth collaborator
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Principal {
    /// Whether this principal may manage the given activity
    pub fn may_manage(&self, organizer_id: Uuid) -> bool {
        self.role.is_admin() || self.user_id == organizer_id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(CoreError::Forbidden("authentication required"))?;

        let user_id = user_id
            .parse::<Uuid>()
            .map_err(|_| CoreError::Forbidden("malformed principal"))?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(CoreError::Forbidden("authentication required"))?;

        let role = role
            .parse::<UserRole>()
            .map_err(|_| CoreError::Forbidden("malformed principal"))?;

        Ok(Principal { user_id, role })
    }
}
