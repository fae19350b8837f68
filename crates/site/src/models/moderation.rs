//! Claim and update requests awaiting moderation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;

use chequealo_core::{
    ClaimRequestId, ClaimRole, Email, RequestStatus, ShopId, ShopPatch, UpdateRequestId, UserId,
};

/// A user's request to be recognised as a shop's owner or manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ClaimRequest {
    pub id: ClaimRequestId,
    pub shop_id: ShopId,
    pub user_id: UserId,
    pub owner_name: String,
    pub email: Email,
    pub phone: String,
    pub role_type: ClaimRole,
    pub verification_proof: Option<String>,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated claim submission.
#[derive(Debug, Clone)]
pub struct NewClaim {
    pub owner_name: String,
    pub email: Email,
    pub phone: String,
    pub role_type: ClaimRole,
    pub verification_proof: Option<String>,
}

/// A proposed edit of a shop's public fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UpdateRequest {
    pub id: UpdateRequestId,
    pub shop_id: ShopId,
    pub user_id: UserId,
    pub proposed_changes: Json<ShopPatch>,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Claim request row for the admin queue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClaimWithShop {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: ClaimRequest,
    pub shop_name: String,
    pub shop_city: String,
}

/// Update request row for the admin queue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UpdateWithShop {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: UpdateRequest,
    pub shop_name: String,
    pub shop_city: String,
}
