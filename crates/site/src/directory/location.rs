//! Browser location reports and fix freshness.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tower_sessions::Session;

use chequealo_core::Coordinates;

use crate::models::{LocationFix, session::keys};

/// Why the browser could not produce a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum LocationFailure {
    #[error("Permiso de ubicación denegado. Actívalo en la configuración de tu navegador.")]
    PermissionDenied,
    #[error("No se pudo determinar tu ubicación.")]
    PositionUnavailable,
    #[error("La solicitud de ubicación tardó demasiado. Inténtalo de nuevo.")]
    Timeout,
}

/// What the client reports after asking the browser for a position.
///
/// ```json
/// {"status": "fix", "latitude": 18.5, "longitude": -69.9}
/// {"status": "timeout"}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocationReport {
    Fix { latitude: f64, longitude: f64 },
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl LocationReport {
    /// The failure this report describes, if it is not a fix.
    #[must_use]
    pub const fn failure(&self) -> Option<LocationFailure> {
        match self {
            Self::Fix { .. } => None,
            Self::PermissionDenied => Some(LocationFailure::PermissionDenied),
            Self::PositionUnavailable => Some(LocationFailure::PositionUnavailable),
            Self::Timeout => Some(LocationFailure::Timeout),
        }
    }
}

/// The fix's coordinates if it is younger than `ttl` at `now`.
#[must_use]
pub fn fresh_coordinates(fix: &LocationFix, now: DateTime<Utc>, ttl: Duration) -> Option<Coordinates> {
    let ttl = chrono::Duration::from_std(ttl).ok()?;
    let age = now.signed_duration_since(fix.acquired_at);
    if age > ttl {
        return None;
    }
    fix.coordinates()
}

/// The session's fix if it is still fresh. A stale or invalid fix is
/// dropped from the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn session_coordinates(
    session: &Session,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<Option<Coordinates>, tower_sessions::session::Error> {
    let Some(fix) = session.get::<LocationFix>(keys::LOCATION_FIX).await? else {
        return Ok(None);
    };
    let coordinates = fresh_coordinates(&fix, now, ttl);
    if coordinates.is_none() {
        tracing::debug!(acquired_at = %fix.acquired_at, "Discarding stale location fix");
        session.remove::<LocationFix>(keys::LOCATION_FIX).await?;
    }
    Ok(coordinates)
}
