//! Role management.
//!
//! ```bash
//! chq-cli role grant -e admin@chequealo.do -r admin
//! chq-cli role revoke -e admin@chequealo.do -r admin
//! chq-cli role list -e admin@chequealo.do
//! ```

use chequealo_core::{Email, UserRole};
use chequealo_site::db::{RoleRepository, UserRepository};
use chequealo_site::models::User;
use sqlx::PgPool;

use super::{CommandError, connect};

fn parse_role(role: &str) -> Result<UserRole, CommandError> {
    role.parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))
}

async fn find_user(pool: &PgPool, email: &str) -> Result<User, CommandError> {
    let parsed = Email::parse(email)?;
    UserRepository::new(pool)
        .get_by_email(&parsed)
        .await?
        .ok_or_else(|| CommandError::UnknownUser(email.to_owned()))
}

/// Grant a role to the user with this email.
///
/// # Errors
///
/// Returns an error for an invalid role, unknown user or database failure.
pub async fn grant(email: &str, role: &str) -> Result<(), CommandError> {
    let role = parse_role(role)?;
    let pool = connect().await?;
    let user = find_user(&pool, email).await?;

    if RoleRepository::new(&pool).grant(user.id, role).await? {
        tracing::info!("Granted {} to {} (id {})", role, user.email, user.id);
    } else {
        tracing::info!("{} already has {}", user.email, role);
    }
    Ok(())
}

/// Revoke a role from the user with this email.
///
/// # Errors
///
/// Returns an error for an invalid role, unknown user or database failure.
pub async fn revoke(email: &str, role: &str) -> Result<(), CommandError> {
    let role = parse_role(role)?;
    let pool = connect().await?;
    let user = find_user(&pool, email).await?;

    if RoleRepository::new(&pool).revoke(user.id, role).await? {
        tracing::info!("Revoked {} from {}", role, user.email);
    } else {
        tracing::warn!("{} did not have {}", user.email, role);
    }
    Ok(())
}

/// Print the roles granted to the user with this email.
///
/// # Errors
///
/// Returns an error for an unknown user or database failure.
pub async fn list(email: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let user = find_user(&pool, email).await?;
    let roles = RoleRepository::new(&pool).roles_for(user.id).await?;

    if roles.is_empty() {
        tracing::info!("{} has no roles", user.email);
    }
    for role in roles {
        tracing::info!("{}: {}", user.email, role);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert!(matches!(parse_role("admin"), Ok(UserRole::Admin)));
        assert!(matches!(parse_role("owner"), Ok(UserRole::Owner)));
        assert!(matches!(parse_role("superuser"), Err(CommandError::InvalidRole(_))));
    }
}
