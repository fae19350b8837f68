//! Database migration command.
//!
//! ```bash
//! chq-cli migrate
//! ```
//!
//! Applies `crates/site/migrations/`, which also creates the session table.

use super::{CommandError, connect};

/// Run the site database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;

    tracing::info!("Site migrations complete!");
    Ok(())
}
