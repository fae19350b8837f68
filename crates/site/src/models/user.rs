//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use chequealo_core::{Email, UserId};

/// Name shown on reviews when a user has neither display name nor e-mail.
pub const ANONYMOUS_REVIEWER: &str = "Anónimo";

/// A site account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name recorded on the user's reviews.
    ///
    /// Display name if set, otherwise the local part of the e-mail address.
    #[must_use]
    pub fn reviewer_name(&self) -> String {
        reviewer_name(self.display_name.as_deref(), Some(&self.email))
    }
}

/// Resolve a reviewer name from whatever the account provides.
#[must_use]
pub fn reviewer_name(display_name: Option<&str>, email: Option<&Email>) -> String {
    display_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| email.map(Email::local_part))
        .unwrap_or(ANONYMOUS_REVIEWER)
        .to_string()
}

/// Aggregate numbers shown on a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProfileStats {
    pub review_count: i64,
    pub favorite_count: i64,
    /// Mean of the ratings this user has given, 0 when none.
    pub average_given_rating: f64,
}
