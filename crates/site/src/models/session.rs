//! Session-related types.
//!
//! Types stored in the session for authentication and location state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chequealo_core::{Coordinates, Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. Roles
/// are not cached here; they are read per request so a revoked admin loses
/// access immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Last browser-reported position.
///
/// Stored raw; [`LocationFix::coordinates`] re-validates on every read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub acquired_at: DateTime<Utc>,
}

impl LocationFix {
    /// Record a fix taken now.
    #[must_use]
    pub fn now(coordinates: Coordinates) -> Self {
        Self {
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
            acquired_at: Utc::now(),
        }
    }

    /// Validated coordinates, or `None` if the stored values are out of range.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::new(self.latitude, self.longitude).ok()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the last reported location fix.
    pub const LOCATION_FIX: &str = "location_fix";
}
