//! Claimant-side claim management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use chequealo_core::ClaimRequestId;

use crate::error::Result;
use crate::services::{Caller, ModerationService};
use crate::state::AppState;

/// DELETE /api/claims/{id}
///
/// Deletes one of the caller's rejected claims so a new one can be filed.
///
/// # Errors
///
/// Returns 404 unless the claim is the caller's and was rejected.
pub async fn delete_rejected(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ClaimRequestId>,
) -> Result<StatusCode> {
    ModerationService::new(state.pool())
        .delete_rejected_claim(&caller, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
