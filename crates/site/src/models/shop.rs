//! Shop directory entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use chequealo_core::{FavoriteId, ShopFields, ShopId, ShopOwnerId};

/// A shop together with its rating aggregate from `directory.shop_rating`.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub schedule: String,
    pub whatsapp: bool,
    pub map_link: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Mean review rating, 0 when the shop has no reviews.
    pub average_rating: f64,
    pub review_count: i64,
}

impl Shop {
    /// The editable public fields, as an update form would be pre-filled.
    #[must_use]
    pub fn fields(&self) -> ShopFields {
        ShopFields {
            name: self.name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            schedule: self.schedule.clone(),
            whatsapp: self.whatsapp,
        }
    }
}

/// One entry of the public listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListedShop<'a> {
    #[serde(flatten)]
    pub shop: &'a Shop,
    pub featured: bool,
    /// Kilometres from the caller; only present in "near me" mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// A shop saved by the caller.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FavoriteShop {
    pub favorite_id: FavoriteId,
    pub favorited_at: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub shop: Shop,
}

/// A shop the caller is a verified owner of.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OwnedShop {
    pub ownership_id: ShopOwnerId,
    pub owner_since: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub shop: Shop,
}
