//! Create-superuser command handler

use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::user::NewUser;
use crate::domain::Role;
use crate::domain::validators::{validate_email, validate_username};

pub async fn cmd_create_superuser(
    config: &Config,
    username: &str,
    email: &str,
) -> anyhow::Result<()> {
    validate_username(username).map_err(|e| anyhow::anyhow!("username: {e}"))?;
    validate_email(email).map_err(|e| anyhow::anyhow!("email: {e}"))?;

    let store = Store::new(&config.general.database_path).await?;
    let users = store.user_repo();

    if users.get_by_username(username).await?.is_some() {
        anyhow::bail!("User '{username}' already exists");
    }
    if users.get_by_email(email).await?.is_some() {
        anyhow::bail!("Email '{email}' is already registered");
    }

    let user = users
        .create(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            role: Role::Admin,
            is_staff: true,
            is_superuser: true,
            ..NewUser::default()
        })
        .await?;

    println!("✓ Superuser '{}' created (id {})", user.username, user.id);
    println!("Obtain a token with POST /auth/signup/ and /auth/token/.");
    Ok(())
}
