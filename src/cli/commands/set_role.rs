//! Set-role command handler

use crate::config::Config;
use crate::db::Store;
use crate::domain::Role;

pub async fn cmd_set_role(config: &Config, username: &str, role: &str) -> anyhow::Result<()> {
    let role: Role = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let store = Store::new(&config.general.database_path).await?;
    if store.user_repo().set_role(username, role).await? {
        println!("✓ {username} is now {role}");
    } else {
        println!("No user named '{username}'");
    }
    Ok(())
}
