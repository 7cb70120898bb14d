//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::EmailConfig;
use crate::db::Store;
use crate::db::repositories::now_timestamp;
use crate::db::repositories::user::NewUser;
use crate::domain::validators::{FieldErrors, validate_email, validate_text, validate_username};
use crate::domain::{Actor, UserId};
use crate::constants::messages;
use crate::services::auth_service::{
    AuthError, AuthService, SignupRequest, SignupResult, TokenRequest, TokenResult,
};
use crate::services::mailer::{Email, Mailer};
use crate::services::tokens::{AccessTokens, ConfirmationCodes};
use crate::services::user_service::actor_from_model;

pub struct SeaOrmAuthService {
    store: Store,
    codes: ConfirmationCodes,
    tokens: AccessTokens,
    mailer: Arc<dyn Mailer>,
    email: EmailConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        codes: ConfirmationCodes,
        tokens: AccessTokens,
        mailer: Arc<dyn Mailer>,
        email: EmailConfig,
    ) -> Self {
        Self {
            store,
            codes,
            tokens,
            mailer,
            email,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, request: SignupRequest) -> Result<SignupResult, AuthError> {
        let mut errors = FieldErrors::new();
        let username = errors.require("username", request.username);
        let email = errors.require("email", request.email);
        if let Some(username) = &username {
            errors.check("username", validate_username(username));
        }
        if let Some(email) = &email {
            errors.check("email", validate_email(email));
        }
        errors.into_result()?;

        let username = username.unwrap_or_default();
        let email = email.unwrap_or_default();

        let repo = self.store.user_repo();
        let by_username = repo.get_by_username(&username).await?;
        let by_email = repo.get_by_email(&email).await?;

        let mut errors = FieldErrors::new();
        if let Some(existing) = &by_username
            && existing.email != email
        {
            errors.add("username", messages::USERNAME_TAKEN);
        }
        if let Some(existing) = &by_email
            && existing.username != username
        {
            errors.add("email", messages::EMAIL_TAKEN);
        }
        errors.into_result()?;

        let user = match by_username {
            Some(user) => user,
            None => {
                let user = repo
                    .create(NewUser {
                        username: username.clone(),
                        email: email.clone(),
                        ..Default::default()
                    })
                    .await?;
                info!(username = %user.username, "New user signed up");
                user
            }
        };

        let code = self.codes.make(&user)?;
        let message = Email::confirmation(&self.email, &user.email, &user.username, &code);
        self.mailer.send(&message).await.map_err(|e| {
            error!(username = %user.username, error = %e, "Failed to send confirmation code");
            AuthError::MailFailure(e.to_string())
        })?;

        info!(username = %user.username, "Confirmation code sent");
        Ok(SignupResult {
            username: user.username,
            email: user.email,
        })
    }

    async fn obtain_token(&self, request: TokenRequest) -> Result<TokenResult, AuthError> {
        let mut errors = FieldErrors::new();
        let username = errors.require("username", request.username);
        let code = errors.require("confirmation_code", request.confirmation_code);
        if let Some(username) = &username {
            errors.check("username", validate_text(username, None));
        }
        if let Some(code) = &code {
            errors.check("confirmation_code", validate_text(code, None));
        }
        errors.into_result()?;

        let username = username.unwrap_or_default();
        let code = code.unwrap_or_default();

        let repo = self.store.user_repo();
        let user = repo
            .get_by_username(&username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.codes.check(&user, &code) {
            warn!(username = %user.username, "Rejected confirmation code");
            return Err(AuthError::InvalidCode);
        }

        repo.record_login(user.id, &now_timestamp()).await?;
        let token = self.tokens.issue(UserId::new(user.id))?;

        info!(username = %user.username, "Access token issued");
        Ok(TokenResult { token })
    }

    async fn authenticate(&self, token: &str) -> Result<Actor, AuthError> {
        let user_id = self
            .tokens
            .verify(token)
            .map_err(|e| AuthError::Unauthorized(e.to_string()))?;

        let user = self
            .store
            .user_repo()
            .get_by_id(user_id.value())
            .await?
            .ok_or_else(|| AuthError::Unauthorized("User not found".to_string()))?;

        if !user.is_active {
            return Err(AuthError::Unauthorized("User is inactive".to_string()));
        }

        Ok(actor_from_model(&user))
    }
}
