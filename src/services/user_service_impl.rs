//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::constants::{limits, messages};
use crate::db::repositories::user::{NewUser, UserChanges};
use crate::db::{Page, PageRequest, Store};
use crate::domain::permissions::{Action, Resource, authorize, require_authenticated};
use crate::domain::validators::{
    FieldErrors, validate_email, validate_optional_text, validate_username,
};
use crate::domain::{Actor, Role};
use crate::entities::users;
use crate::services::user_service::{UserError, UserInfo, UserInput, UserService};

pub struct SeaOrmUserService {
    store: Store,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn find(&self, username: &str) -> Result<users::Model, UserError> {
        self.store
            .user_repo()
            .get_by_username(username)
            .await?
            .ok_or(UserError::NotFound)
    }

    /// Validates the fields present in `input` and turns them into changes
    /// for the user `current` (or a new user when `None`).
    async fn validate_changes(
        &self,
        input: UserInput,
        current: Option<&users::Model>,
    ) -> Result<UserChanges, UserError> {
        let mut errors = FieldErrors::new();

        if let Some(username) = &input.username {
            errors.check("username", validate_username(username));
        }
        if let Some(email) = &input.email {
            errors.check("email", validate_email(email));
        }
        for (field, value) in [
            ("first_name", &input.first_name),
            ("last_name", &input.last_name),
        ] {
            if let Some(value) = value {
                errors.check(
                    field,
                    validate_optional_text(value, limits::PERSON_NAME_MAX_LENGTH),
                );
            }
        }
        let role = match input.role.as_deref().map(str::parse::<Role>) {
            Some(Ok(role)) => Some(role),
            Some(Err(message)) => {
                errors.add("role", message);
                None
            }
            None => None,
        };
        errors.into_result()?;

        let repo = self.store.user_repo();
        let current_id = current.map(|u| u.id);
        let mut errors = FieldErrors::new();

        if let Some(username) = &input.username
            && let Some(existing) = repo.get_by_username(username).await?
            && Some(existing.id) != current_id
        {
            errors.add("username", messages::USERNAME_TAKEN);
        }
        if let Some(email) = &input.email
            && let Some(existing) = repo.get_by_email(email).await?
            && Some(existing.id) != current_id
        {
            errors.add("email", messages::EMAIL_TAKEN);
        }
        errors.into_result()?;

        Ok(UserChanges {
            username: input.username,
            email: input.email,
            role,
            bio: input.bio,
            first_name: input.first_name,
            last_name: input.last_name,
        })
    }

    async fn apply(&self, user: users::Model, input: UserInput) -> Result<UserInfo, UserError> {
        let changes = self.validate_changes(input, Some(&user)).await?;
        let updated = self
            .store
            .user_repo()
            .update(user.id, changes)
            .await?
            .ok_or(UserError::NotFound)?;

        Ok(updated.into())
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list_users(
        &self,
        actor: Option<&Actor>,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<UserInfo>, UserError> {
        authorize(actor, Resource::UserDirectory, Action::Read, None).check()?;

        let page = self.store.user_repo().list(search, page).await?;
        Ok(page.map(UserInfo::from))
    }

    async fn create_user(
        &self,
        actor: Option<&Actor>,
        input: UserInput,
    ) -> Result<UserInfo, UserError> {
        authorize(actor, Resource::UserDirectory, Action::Create, None).check()?;

        let mut errors = FieldErrors::new();
        errors.require("username", input.username.as_ref());
        errors.require("email", input.email.as_ref());
        errors.into_result()?;

        let changes = self.validate_changes(input, None).await?;
        let user = self
            .store
            .user_repo()
            .create(NewUser {
                username: changes.username.unwrap_or_default(),
                email: changes.email.unwrap_or_default(),
                role: changes.role.unwrap_or_default(),
                bio: changes.bio.unwrap_or_default(),
                first_name: changes.first_name.unwrap_or_default(),
                last_name: changes.last_name.unwrap_or_default(),
                ..Default::default()
            })
            .await?;

        info!(username = %user.username, role = %user.role, "User created");
        Ok(user.into())
    }

    async fn get_user(&self, actor: Option<&Actor>, username: &str) -> Result<UserInfo, UserError> {
        authorize(actor, Resource::UserDirectory, Action::Read, None).check()?;
        Ok(self.find(username).await?.into())
    }

    async fn update_user(
        &self,
        actor: Option<&Actor>,
        username: &str,
        input: UserInput,
    ) -> Result<UserInfo, UserError> {
        authorize(actor, Resource::UserDirectory, Action::Update, None).check()?;

        let user = self.find(username).await?;
        self.apply(user, input).await
    }

    async fn delete_user(&self, actor: Option<&Actor>, username: &str) -> Result<(), UserError> {
        authorize(actor, Resource::UserDirectory, Action::Delete, None).check()?;

        let user = self.find(username).await?;
        if !self.store.user_repo().delete(user.id).await? {
            return Err(UserError::NotFound);
        }

        info!(username = %user.username, "User deleted");
        Ok(())
    }

    async fn me(&self, actor: Option<&Actor>) -> Result<UserInfo, UserError> {
        authorize(actor, Resource::OwnProfile, Action::Read, None).check()?;
        let actor = require_authenticated(actor)?;

        let user = self
            .store
            .user_repo()
            .get_by_id(actor.id.value())
            .await?
            .ok_or(UserError::NotFound)?;

        Ok(user.into())
    }

    async fn update_me(
        &self,
        actor: Option<&Actor>,
        mut input: UserInput,
    ) -> Result<UserInfo, UserError> {
        authorize(actor, Resource::OwnProfile, Action::Update, None).check()?;
        let actor = require_authenticated(actor)?;

        input.role = None;

        let user = self
            .store
            .user_repo()
            .get_by_id(actor.id.value())
            .await?
            .ok_or(UserError::NotFound)?;

        self.apply(user, input).await
    }
}
