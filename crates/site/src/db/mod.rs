//! Database operations for the directory `PostgreSQL` schema.
//!
//! # Schema: `directory`
//!
//! ## Tables
//!
//! - `app_user`, `user_password` - Site accounts
//! - `user_role_grant` - Admin/owner/user role predicates
//! - `shop` - Directory entries (plus the `shop_rating` view)
//! - `review`, `review_reply` - Ratings and owner replies
//! - `shop_owner` - Verified owners, created by approved claims
//! - `user_favorite` - Saved shops
//! - `shop_claim_request`, `shop_update_request` - Moderation queues
//!
//! Sessions live in `tower_sessions.session`.
//!
//! Every uniqueness rule is a unique index and every single-use transition is a
//! conditional `UPDATE` or a locked transaction; the services may check first,
//! but the statements in this module are the authority.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p chequealo-cli -- migrate
//! ```

pub mod claims;
pub mod favorites;
pub mod replies;
pub mod reviews;
pub mod roles;
pub mod shops;
pub mod update_requests;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use chequealo_core::{AlreadyResolved, RequestStatus};

pub use claims::ClaimRepository;
pub use favorites::FavoriteRepository;
pub use replies::ReplyRepository;
pub use reviews::ReviewRepository;
pub use roles::RoleRepository;
pub use shops::ShopRepository;
pub use update_requests::UpdateRequestRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., second review for the same shop).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Moderation transition on a request that is no longer pending.
    #[error(transparent)]
    AlreadyResolved(#[from] AlreadyResolved),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into [`Self::Conflict`].
    pub(crate) fn from_unique(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(what.to_owned());
        }
        Self::Database(err)
    }
}

/// Error for a conditional transition that matched no pending row.
///
/// `current` is the request's status as re-read after the failed update.
pub(crate) fn not_pending(current: Option<RequestStatus>) -> RepositoryError {
    match current {
        None => RepositoryError::NotFound,
        Some(current) => RepositoryError::AlreadyResolved(AlreadyResolved { current }),
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unique_passes_through_other_errors() {
        let err = RepositoryError::from_unique(sqlx::Error::RowNotFound, "review");
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_not_pending_distinguishes_missing_from_resolved() {
        assert!(matches!(not_pending(None), RepositoryError::NotFound));
        assert!(matches!(
            not_pending(Some(RequestStatus::Approved)),
            RepositoryError::AlreadyResolved(AlreadyResolved {
                current: RequestStatus::Approved
            })
        ));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(RepositoryError::NotFound.to_string(), "not found");
        assert_eq!(
            RepositoryError::Conflict("review".to_string()).to_string(),
            "constraint violation: review"
        );
    }
}
