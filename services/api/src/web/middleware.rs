//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use happy_thoughts_core::domain::Identity;
use happy_thoughts_core::ports::PortError;
use std::sync::Arc;
use tracing::{debug, error};

use crate::web::{protocol::HttpError, state::AppState};

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that validates the bearer token and resolves the caller.
///
/// If valid, inserts the caller's `Identity` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized before the handler runs.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    // 1. Extract the bearer token
    let token = bearer_token(req.headers()).ok_or_else(|| {
        debug!("Rejected request without a bearer token");
        HttpError::unauthorized()
    })?;

    // 2. Validate the token, get user_id
    let user_id = state
        .auth
        .validate_auth_session(token)
        .await
        .map_err(|e| match e {
            PortError::Unauthorized => {
                debug!("Rejected unknown or expired bearer token");
                HttpError::unauthorized()
            }
            other => {
                error!("Failed to validate bearer token: {:?}", other);
                HttpError::unauthorized()
            }
        })?;

    // 3. Insert the caller identity into request extensions
    req.extensions_mut().insert(Identity::from(user_id));

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_tokens_only() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("Basic abc123")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
