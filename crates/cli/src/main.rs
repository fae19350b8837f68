//! Chequéalo CLI - Database migrations and role management.
//!
//! # Usage
//!
//! ```bash
//! # Apply site database migrations
//! chq-cli migrate
//!
//! # Make someone an administrator
//! chq-cli role grant -e admin@chequealo.do -r admin
//!
//! # Show someone's roles
//! chq-cli role list -e admin@chequealo.do
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "chq-cli")]
#[command(author, version, about = "Chequéalo RD CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage user roles
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Grant a role
    Grant {
        /// User email address
        #[arg(short, long)]
        email: String,

        /// Role (`admin`, `owner`, `user`)
        #[arg(short, long)]
        role: String,
    },
    /// Revoke a role
    Revoke {
        /// User email address
        #[arg(short, long)]
        email: String,

        /// Role (`admin`, `owner`, `user`)
        #[arg(short, long)]
        role: String,
    },
    /// List a user's roles
    List {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Role { action } => match action {
            RoleAction::Grant { email, role } => commands::role::grant(&email, &role).await?,
            RoleAction::Revoke { email, role } => commands::role::revoke(&email, &role).await?,
            RoleAction::List { email } => commands::role::list(&email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_role_grant() {
        let cli = Cli::try_parse_from(["chq-cli", "role", "grant", "-e", "a@b.do", "-r", "admin"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Role {
                action: RoleAction::Grant { .. }
            }
        ));
    }
}
