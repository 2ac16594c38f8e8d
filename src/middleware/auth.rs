use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::Role;
use crate::utils::token::decode_token;
use crate::AppState;

/// Identity attached to every authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn not_authenticated() -> Error {
    Error::Unauthorized("Not authenticated".into())
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verifies the bearer token, loads the account and rejects blocked users.
/// The role attached downstream is the stored one, not the token claim.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(&req).ok_or_else(not_authenticated)?;

    let claims = decode_token(token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        not_authenticated()
    })?;

    let user = state
        .user_service
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(not_authenticated)?;

    if user.is_blocked && user.role() != Role::Admin {
        tracing::info!(user_id = %user.id, "blocked account denied");
        return Err(Error::Forbidden(
            "Your account is blocked. Access denied.".into(),
        ));
    }

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        role: user.role(),
    });
    Ok(next.run(req).await)
}
