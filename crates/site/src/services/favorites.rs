//! Saved shops.

use sqlx::PgPool;

use chequealo_core::ShopId;

use super::{Caller, ServiceError};
use crate::db::{FavoriteRepository, ShopRepository};
use crate::models::FavoriteShop;

/// Favorite toggling keyed by (caller, shop).
pub struct FavoriteService<'a> {
    shops: ShopRepository<'a>,
    favorites: FavoriteRepository<'a>,
}

impl<'a> FavoriteService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            shops: ShopRepository::new(pool),
            favorites: FavoriteRepository::new(pool),
        }
    }

    /// Save a shop. Saving twice is a no-op that returns `false`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown shop.
    pub async fn add(&self, caller: &Caller, shop_id: ShopId) -> Result<bool, ServiceError> {
        if !self.shops.exists(shop_id).await? {
            return Err(ServiceError::NotFound("shop"));
        }
        Ok(self.favorites.add(caller.user_id, shop_id).await?)
    }

    /// Unsave a shop. Returns `false` when it was not saved; never an error
    /// for a missing favorite.
    ///
    /// # Errors
    ///
    /// Returns `Repository` on database failure.
    pub async fn remove(&self, caller: &Caller, shop_id: ShopId) -> Result<bool, ServiceError> {
        Ok(self.favorites.remove(caller.user_id, shop_id).await?)
    }

    /// # Errors
    ///
    /// Returns `Repository` on database failure.
    pub async fn is_favorite(&self, caller: &Caller, shop_id: ShopId) -> Result<bool, ServiceError> {
        Ok(self.favorites.is_favorite(caller.user_id, shop_id).await?)
    }

    /// # Errors
    ///
    /// Returns `Repository` on database failure.
    pub async fn list(&self, caller: &Caller) -> Result<Vec<FavoriteShop>, ServiceError> {
        Ok(self.favorites.list_for_user(caller.user_id).await?)
    }
}
