//! Browser location reports.
//!
//! The client asks the browser for a position and posts the outcome here. A
//! fix is kept in the session and used by the listing until it goes stale.

use axum::{Json, http::StatusCode};
use serde::Serialize;
use tower_sessions::Session;

use chequealo_core::Coordinates;

use crate::directory::LocationReport;
use crate::error::{AppError, Result};
use crate::models::{LocationFix, session::keys};

#[derive(Debug, Serialize)]
pub struct StoredFix {
    pub coordinates: Coordinates,
}

/// POST /api/location
///
/// # Errors
///
/// Returns 422 with a user-facing message for each failure kind and 400
/// for out-of-range coordinates.
pub async fn report(session: Session, Json(report): Json<LocationReport>) -> Result<Json<StoredFix>> {
    let (latitude, longitude) = match report {
        LocationReport::Fix {
            latitude,
            longitude,
        } => (latitude, longitude),
        other => {
            let failure = other
                .failure()
                .ok_or_else(|| AppError::Internal("unclassified location report".to_string()))?;
            tracing::debug!(?failure, "Location unavailable");
            session.remove::<LocationFix>(keys::LOCATION_FIX).await?;
            return Err(AppError::Location(failure));
        }
    };

    let coordinates =
        Coordinates::new(latitude, longitude).map_err(|e| AppError::BadRequest(e.to_string()))?;
    session
        .insert(keys::LOCATION_FIX, LocationFix::now(coordinates))
        .await?;

    Ok(Json(StoredFix { coordinates }))
}

/// DELETE /api/location
///
/// # Errors
///
/// Returns 500 if the session store fails.
pub async fn clear(session: Session) -> Result<StatusCode> {
    session.remove::<LocationFix>(keys::LOCATION_FIX).await?;
    Ok(StatusCode::NO_CONTENT)
}
