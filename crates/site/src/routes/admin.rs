//! Moderation dashboard. Every handler requires the admin role; the check
//! happens in `ModerationService`.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use chequealo_core::{ClaimRequestId, UpdateRequestId};

use crate::error::Result;
use crate::models::{ClaimRequest, ClaimWithShop, UpdateRequest, UpdateWithShop};
use crate::services::moderation::ModerationSummary;
use crate::services::{Caller, ModerationService};
use crate::state::AppState;

/// Optional body for approve/reject.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionBody {
    #[serde(default)]
    pub admin_notes: Option<String>,
}

fn notes(body: Option<&Json<DecisionBody>>) -> Option<&str> {
    body.and_then(|Json(b)| b.admin_notes.as_deref())
}

/// GET /api/admin/summary
///
/// # Errors
///
/// Returns 403 for non-admins.
pub async fn summary(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ModerationSummary>> {
    Ok(Json(ModerationService::new(state.pool()).summary(&caller).await?))
}

/// GET /api/admin/claims
///
/// # Errors
///
/// Returns 403 for non-admins.
pub async fn claims(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<ClaimWithShop>>> {
    Ok(Json(ModerationService::new(state.pool()).all_claims(&caller).await?))
}

/// GET /api/admin/update-requests
///
/// # Errors
///
/// Returns 403 for non-admins.
pub async fn update_requests(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<UpdateWithShop>>> {
    Ok(Json(ModerationService::new(state.pool()).all_updates(&caller).await?))
}

/// POST /api/admin/claims/{id}/approve
///
/// # Errors
///
/// Returns 403 for non-admins, 404 for an unknown claim and 409 when the
/// claim was already resolved.
pub async fn approve_claim(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ClaimRequestId>,
    body: Option<Json<DecisionBody>>,
) -> Result<Json<ClaimRequest>> {
    Ok(Json(
        ModerationService::new(state.pool())
            .approve_claim(&caller, id, notes(body.as_ref()))
            .await?,
    ))
}

/// POST /api/admin/claims/{id}/reject
///
/// # Errors
///
/// Returns 403 for non-admins, 404 for an unknown claim and 409 when the
/// claim was already resolved.
pub async fn reject_claim(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ClaimRequestId>,
    body: Option<Json<DecisionBody>>,
) -> Result<Json<ClaimRequest>> {
    Ok(Json(
        ModerationService::new(state.pool())
            .reject_claim(&caller, id, notes(body.as_ref()))
            .await?,
    ))
}

/// POST /api/admin/update-requests/{id}/approve
///
/// # Errors
///
/// Returns 403 for non-admins, 404 for an unknown request and 409 when it
/// was already resolved.
pub async fn approve_update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UpdateRequestId>,
    body: Option<Json<DecisionBody>>,
) -> Result<Json<UpdateRequest>> {
    Ok(Json(
        ModerationService::new(state.pool())
            .approve_update(&caller, id, notes(body.as_ref()))
            .await?,
    ))
}

/// POST /api/admin/update-requests/{id}/reject
///
/// # Errors
///
/// Returns 403 for non-admins, 404 for an unknown request and 409 when it
/// was already resolved.
pub async fn reject_update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UpdateRequestId>,
    body: Option<Json<DecisionBody>>,
) -> Result<Json<UpdateRequest>> {
    Ok(Json(
        ModerationService::new(state.pool())
            .reject_update(&caller, id, notes(body.as_ref()))
            .await?,
    ))
}
