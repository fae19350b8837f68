//! Status and role enums for moderation and authorization.
//!
//! Claim and update requests share one three-state lifecycle:
//!
//! ```text
//! pending ──approve──▶ approved
//!    │
//!    └────reject────▶ rejected
//! ```
//!
//! Both resolved states are terminal. A rejected claim can be deleted by its
//! submitter so a fresh `pending` claim can be filed; that is a new row, never a
//! transition back to `pending`.

use serde::{Deserialize, Serialize};

/// Moderation status shared by claim and update requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "directory.request_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// An administrator's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

/// Attempted to resolve a request that is no longer pending.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("request already {current}")]
pub struct AlreadyResolved {
    /// The terminal status the request is in.
    pub current: RequestStatus,
}

impl RequestStatus {
    /// Apply a decision to this status.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyResolved`] when the request is already terminal; a
    /// repeated approval or rejection never re-applies anything.
    pub const fn resolve(self, decision: Decision) -> Result<Self, AlreadyResolved> {
        match (self, decision) {
            (Self::Pending, Decision::Approve) => Ok(Self::Approved),
            (Self::Pending, Decision::Reject) => Ok(Self::Rejected),
            (current, _) => Err(AlreadyResolved { current }),
        }
    }

    /// Lowercase name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship a claimant declares with the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "directory.claim_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ClaimRole {
    #[default]
    Owner,
    Manager,
}

/// Site-wide role used as an authorization predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "directory.user_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Moderates claims and update requests.
    Admin,
    /// Has at least one verified shop.
    Owner,
    /// Regular account.
    User,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Owner => write!(f, "owner"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}
