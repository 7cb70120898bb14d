//! Domain service for user management and the caller's own profile.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Page, PageRequest, is_unique_violation};
use crate::domain::permissions::Denied;
use crate::domain::validators::FieldErrors;
use crate::domain::{Actor, Role, UserId};
use crate::entities::users;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Denied(#[from] Denied),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for UserError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

/// User as rendered by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<users::Model> for UserInfo {
    fn from(model: users::Model) -> Self {
        Self {
            role: model.role.parse().unwrap_or_default(),
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            bio: model.bio,
        }
    }
}

/// Create/update payload. `role` stays a string so an unknown value can be
/// reported as a field error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

/// The request actor for a stored user.
#[must_use]
pub fn actor_from_model(model: &users::Model) -> Actor {
    Actor {
        id: UserId::new(model.id),
        username: model.username.clone(),
        role: model.role.parse().unwrap_or_default(),
        is_staff: model.is_staff,
        is_superuser: model.is_superuser,
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(
        &self,
        actor: Option<&Actor>,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<UserInfo>, UserError>;

    async fn create_user(&self, actor: Option<&Actor>, input: UserInput)
    -> Result<UserInfo, UserError>;

    async fn get_user(&self, actor: Option<&Actor>, username: &str) -> Result<UserInfo, UserError>;

    async fn update_user(
        &self,
        actor: Option<&Actor>,
        username: &str,
        input: UserInput,
    ) -> Result<UserInfo, UserError>;

    async fn delete_user(&self, actor: Option<&Actor>, username: &str) -> Result<(), UserError>;

    /// The caller's own record.
    async fn me(&self, actor: Option<&Actor>) -> Result<UserInfo, UserError>;

    /// Updates the caller's own record. `role` in the payload is ignored.
    async fn update_me(&self, actor: Option<&Actor>, input: UserInput)
    -> Result<UserInfo, UserError>;
}
