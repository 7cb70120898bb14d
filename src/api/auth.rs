use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::extract::JsonBody;
use super::{ApiError, AppState};
use crate::constants::messages;
use crate::domain::Actor;
use crate::services::{AuthError, SignupRequest, SignupResult, TokenRequest, TokenResult};

const INVALID_TOKEN: &str = "Given token not valid for any token type";

/// Who is making the request; `None` for anonymous callers.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<Actor>);

impl Caller {
    #[must_use]
    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => Self::FieldErrors(errors),
            AuthError::InvalidCode => Self::validation(messages::INVALID_CODE),
            AuthError::UserNotFound => Self::not_found("User"),
            AuthError::Unauthorized(reason) => {
                tracing::debug!(reason = %reason, "Rejected access token");
                Self::Unauthorized(INVALID_TOKEN.to_string())
            }
            AuthError::MailFailure(msg) => Self::MailFailure(msg),
            AuthError::Conflict(msg) => Self::Conflict(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <jwt>` into a [`Caller`] extension.
///
/// No header means an anonymous caller. A header that is present but does
/// not carry a valid token is a 401 on every route.
///
/// The caller is also attached to the response so the request log can
/// report who made the request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Owned so no borrow of the request is held across the await.
    let token = extract_bearer(request.headers())?.map(str::to_owned);

    let actor = match token {
        Some(token) => Some(state.auth_service().authenticate(&token).await?),
        None => None,
    };

    let caller = Caller(actor);
    request.extensions_mut().insert(caller.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(caller);
    Ok(response)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| ApiError::Unauthorized(INVALID_TOKEN.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup/
/// Registers a user (or reuses the matching one) and mails a confirmation code
pub async fn signup(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<Json<SignupResult>, ApiError> {
    let result = state.auth_service().signup(payload).await?;
    Ok(Json(result))
}

/// POST /auth/token/
/// Exchanges a confirmation code for an access token
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<TokenRequest>,
) -> Result<Json<TokenResult>, ApiError> {
    let result = state.auth_service().obtain_token(payload).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert!(matches!(extract_bearer(&headers), Ok(None)));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert!(matches!(extract_bearer(&headers), Ok(Some("abc.def"))));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(matches!(extract_bearer(&headers), Err(ApiError::Unauthorized(_))));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer(&headers).is_err());
    }
}
