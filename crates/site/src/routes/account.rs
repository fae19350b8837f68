//! The caller's own profile, reviews and favorites.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use chequealo_core::{ReviewId, UserRole};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::models::{FavoriteShop, ProfileStats, Review, User, UserReview};
use crate::routes::shops::ReviewBody;
use crate::services::{Caller, FavoriteService, ReviewService};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<UserRole>,
    pub stats: ProfileStats,
}

/// GET /api/me
///
/// # Errors
///
/// Returns 401 when not logged in.
pub async fn profile(State(state): State<AppState>, caller: Caller) -> Result<Json<Profile>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(caller.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;
    let stats = users.profile_stats(caller.user_id).await?;

    Ok(Json(Profile {
        user,
        roles: caller.roles,
        stats,
    }))
}

/// GET /api/me/reviews
///
/// # Errors
///
/// Returns 401 when not logged in.
pub async fn reviews(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<UserReview>>> {
    Ok(Json(ReviewService::new(state.pool()).by_caller(&caller).await?))
}

/// PATCH /api/me/reviews/{id}
///
/// A review can be edited once.
///
/// # Errors
///
/// Returns 409 when the edit was already used and 404 for someone else's
/// review.
pub async fn edit_review(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ReviewId>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<Review>> {
    Ok(Json(
        ReviewService::new(state.pool())
            .edit(&caller, id, body.rating, &body.comment)
            .await?,
    ))
}

/// GET /api/me/favorites
///
/// # Errors
///
/// Returns 401 when not logged in.
pub async fn favorites(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<FavoriteShop>>> {
    Ok(Json(FavoriteService::new(state.pool()).list(&caller).await?))
}
