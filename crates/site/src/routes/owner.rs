//! Owner dashboard: owned shops, their reviews, and replies.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use chequealo_core::{ReplyId, ReviewId, ShopId};

use crate::db::ShopRepository;
use crate::error::Result;
use crate::models::{OwnedShop, Reply, ReviewView};
use crate::services::{Caller, ReviewService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReplyBody {
    pub reply_text: String,
}

/// GET /api/owner/shops
///
/// # Errors
///
/// Returns 401 when not logged in.
pub async fn shops(State(state): State<AppState>, caller: Caller) -> Result<Json<Vec<OwnedShop>>> {
    Ok(Json(
        ShopRepository::new(state.pool()).owned_by(caller.user_id).await?,
    ))
}

/// GET /api/owner/shops/{id}/reviews
///
/// # Errors
///
/// Returns 403 unless the caller owns the shop.
pub async fn shop_reviews(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
) -> Result<Json<Vec<ReviewView>>> {
    Ok(Json(
        ReviewService::new(state.pool()).for_owned_shop(&caller, id).await?,
    ))
}

/// POST /api/owner/reviews/{id}/reply
///
/// # Errors
///
/// Returns 403 unless the caller owns the review's shop and 409 if the
/// review already has a reply.
pub async fn create_reply(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ReviewId>,
    Json(body): Json<ReplyBody>,
) -> Result<Response> {
    let reply = ReviewService::new(state.pool())
        .reply(&caller, id, &body.reply_text)
        .await?;
    Ok((StatusCode::CREATED, Json(reply)).into_response())
}

/// PUT /api/owner/replies/{id}
///
/// # Errors
///
/// Returns 403 unless the caller owns the reply's shop.
pub async fn update_reply(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ReplyId>,
    Json(body): Json<ReplyBody>,
) -> Result<Json<Reply>> {
    Ok(Json(
        ReviewService::new(state.pool())
            .update_reply(&caller, id, &body.reply_text)
            .await?,
    ))
}
