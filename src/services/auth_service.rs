//! Domain service for signup, confirmation codes and access tokens.
//!
//! Signup creates (or reuses) an unconfirmed user and mails a confirmation
//! code; the code is exchanged once for an access token.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::is_unique_violation;
use crate::domain::Actor;
use crate::domain::validators::FieldErrors;
use crate::services::tokens::TokenError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Invalid confirmation code")]
    InvalidCode,

    #[error("User not found")]
    UserNotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Mail delivery failed: {0}")]
    MailFailure(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for AuthError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Echo of the accepted signup pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupResult {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub confirmation_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResult {
    pub token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers `(username, email)` or reuses the user holding exactly that
    /// pair, then mails a fresh confirmation code.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when either value is invalid or
    /// already belongs to a different user, and [`AuthError::MailFailure`]
    /// when the code could not be delivered.
    async fn signup(&self, request: SignupRequest) -> Result<SignupResult, AuthError>;

    /// Exchanges a confirmation code for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] for an unknown username and
    /// [`AuthError::InvalidCode`] for a wrong, expired or used code.
    async fn obtain_token(&self, request: TokenRequest) -> Result<TokenResult, AuthError>;

    /// Resolves a bearer token to the acting user.
    async fn authenticate(&self, token: &str) -> Result<Actor, AuthError>;
}
