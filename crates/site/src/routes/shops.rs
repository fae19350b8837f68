//! Public directory: listing, shop detail, reviews, favorites and claims.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use chequealo_core::{Coordinates, ShopFields, ShopId};

use crate::db::ShopRepository;
use crate::directory::{listing, location::session_coordinates, near_me, shop_coordinates};
use crate::error::{AppError, Result};
use crate::middleware::OptionalCaller;
use crate::models::{ClaimRequest, ListedShop, Review, ReviewView, Shop, UpdateRequest};
use crate::services::moderation::{ClaimForm, ClaimStatus};
use crate::services::{Caller, FavoriteService, ModerationService, ReviewService};
use crate::state::AppState;

// =============================================================================
// Listing
// =============================================================================

/// Query parameters for the listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// How the listing was ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingMode {
    Featured,
    NearMe,
}

#[derive(Debug, Serialize)]
pub struct ListingResponse<'a> {
    pub mode: ListingMode,
    pub total: usize,
    pub shops: Vec<ListedShop<'a>>,
}

/// Origin for "near me": explicit query coordinates first, then a fresh
/// session fix.
async fn listing_origin(
    state: &AppState,
    session: &Session,
    query: &ListingQuery,
) -> Result<Option<Coordinates>> {
    match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng)
            .map(Some)
            .map_err(|e| AppError::BadRequest(e.to_string())),
        (None, None) => Ok(session_coordinates(
            session,
            Utc::now(),
            state.config().listing.location_fix_ttl,
        )
        .await?),
        _ => Err(AppError::BadRequest(
            "lat and lng must be given together".to_string(),
        )),
    }
}

/// GET /api/shops?q=&lat=&lng=
///
/// Featured-first listing, or distance order when an origin is known.
///
/// # Errors
///
/// Returns 400 for out-of-range or half-given coordinates.
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListingQuery>,
) -> Result<Response> {
    let origin = listing_origin(&state, &session, &query).await?;
    let shops = ShopRepository::new(state.pool()).list_all().await?;

    let (mode, listed) = match origin {
        Some(origin) => (ListingMode::NearMe, near_me(&shops, &query.q, origin)),
        None => (
            ListingMode::Featured,
            listing(&shops, &query.q, state.config().listing.featured),
        ),
    };

    Ok(Json(ListingResponse {
        mode,
        total: listed.len(),
        shops: listed,
    })
    .into_response())
}

// =============================================================================
// Detail
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ShopDetail {
    #[serde(flatten)]
    pub shop: Shop,
    pub coordinates: Option<Coordinates>,
    pub is_claimed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_reviewed: Option<bool>,
}

/// GET /api/shops/{id}
///
/// # Errors
///
/// Returns 404 for an unknown shop.
pub async fn show(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
    Path(id): Path<ShopId>,
) -> Result<Json<ShopDetail>> {
    let shops = ShopRepository::new(state.pool());
    let shop = shops
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("shop".to_string()))?;
    let is_claimed = shops.is_claimed(id).await?;

    let (is_favorite, has_reviewed) = match &caller {
        Some(caller) => {
            let favorite = FavoriteService::new(state.pool()).is_favorite(caller, id).await?;
            let reviewed = ReviewService::new(state.pool())
                .mine_for_shop(caller, id)
                .await?
                .is_some();
            (Some(favorite), Some(reviewed))
        }
        None => (None, None),
    };

    Ok(Json(ShopDetail {
        coordinates: shop_coordinates(&shop),
        shop,
        is_claimed,
        is_favorite,
        has_reviewed,
    }))
}

// =============================================================================
// Reviews
// =============================================================================

/// Review submission and edit body.
#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

/// GET /api/shops/{id}/reviews
///
/// # Errors
///
/// Returns 404 for an unknown shop.
pub async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<ShopId>,
) -> Result<Json<Vec<ReviewView>>> {
    Ok(Json(ReviewService::new(state.pool()).for_shop(id).await?))
}

/// POST /api/shops/{id}/reviews
///
/// # Errors
///
/// Returns 400 for invalid input, 404 for an unknown shop and 409 if the
/// caller already reviewed it.
pub async fn create_review(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
    Json(body): Json<ReviewBody>,
) -> Result<Response> {
    let review = ReviewService::new(state.pool())
        .submit(&caller, id, body.rating, &body.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review)).into_response())
}

/// GET /api/shops/{id}/reviews/mine
///
/// # Errors
///
/// Returns 401 when not logged in.
pub async fn my_review(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
) -> Result<Json<Option<Review>>> {
    Ok(Json(
        ReviewService::new(state.pool()).mine_for_shop(&caller, id).await?,
    ))
}

// =============================================================================
// Favorites
// =============================================================================

#[derive(Debug, Serialize)]
pub struct FavoriteState {
    pub favorite: bool,
    /// Whether this call changed anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

/// GET /api/shops/{id}/favorite
///
/// # Errors
///
/// Returns 401 when not logged in.
pub async fn favorite_state(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
) -> Result<Json<FavoriteState>> {
    let favorite = FavoriteService::new(state.pool()).is_favorite(&caller, id).await?;
    Ok(Json(FavoriteState {
        favorite,
        changed: None,
    }))
}

/// PUT /api/shops/{id}/favorite
///
/// # Errors
///
/// Returns 404 for an unknown shop.
pub async fn add_favorite(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
) -> Result<Json<FavoriteState>> {
    let added = FavoriteService::new(state.pool()).add(&caller, id).await?;
    Ok(Json(FavoriteState {
        favorite: true,
        changed: Some(added),
    }))
}

/// DELETE /api/shops/{id}/favorite
///
/// Removing a favorite that does not exist is not an error.
///
/// # Errors
///
/// Returns 401 when not logged in.
pub async fn remove_favorite(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
) -> Result<Json<FavoriteState>> {
    let removed = FavoriteService::new(state.pool()).remove(&caller, id).await?;
    Ok(Json(FavoriteState {
        favorite: false,
        changed: Some(removed),
    }))
}

// =============================================================================
// Claims and update requests
// =============================================================================

/// GET /api/shops/{id}/claim
///
/// # Errors
///
/// Returns 404 for an unknown shop.
pub async fn claim_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
) -> Result<Json<ClaimStatus>> {
    Ok(Json(
        ModerationService::new(state.pool()).claim_status(&caller, id).await?,
    ))
}

/// POST /api/shops/{id}/claim
///
/// # Errors
///
/// Returns 400 for an invalid form or an already claimed shop and 409 when
/// the caller already has a pending claim.
pub async fn submit_claim(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
    Json(form): Json<ClaimForm>,
) -> Result<Response> {
    let claim: ClaimRequest = ModerationService::new(state.pool())
        .submit_claim(&caller, id, &form)
        .await?;
    Ok((StatusCode::CREATED, Json(claim)).into_response())
}

/// GET /api/shops/{id}/update-requests/pending
///
/// # Errors
///
/// Returns 403 unless the caller owns the shop or is an admin.
pub async fn pending_update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
) -> Result<Json<Option<UpdateRequest>>> {
    Ok(Json(
        ModerationService::new(state.pool()).pending_update(&caller, id).await?,
    ))
}

/// POST /api/shops/{id}/update-requests
///
/// Takes the full edit form; only changed fields are stored.
///
/// # Errors
///
/// Returns 403 for non-owners, 400 for a blank name or no changes and 409
/// when an update is already pending.
pub async fn submit_update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ShopId>,
    Json(form): Json<ShopFields>,
) -> Result<Response> {
    let request = ModerationService::new(state.pool())
        .submit_update(&caller, id, &form)
        .await?;
    Ok((StatusCode::CREATED, Json(request)).into_response())
}
