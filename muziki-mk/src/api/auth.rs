//! Bearer-token authentication middleware
//!
//! Validates the Authorization header and injects the verified claims
//! into request extensions for downstream handlers. Applied to protected
//! routes only; stream recording calls `maybe_authenticate` itself since
//! anonymous plays are allowed.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use muziki_common::auth::{verify_token, AuthClaims};
use muziki_common::{Error, Result};

use crate::api::ApiError;
use crate::AppState;

/// Authentication middleware for protected routes
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let claims = authenticate(&state, request.headers())?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Extract and verify the bearer credential from request headers
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthClaims> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::Auth("missing Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Auth("expected a Bearer credential".to_string()))?;

    verify_token(token, &state.token_secret)
}

/// Best-effort authentication for anonymous-capable routes
pub fn maybe_authenticate(state: &AppState, headers: &HeaderMap) -> Option<AuthClaims> {
    authenticate(state, headers).ok()
}
