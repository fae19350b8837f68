//! Proposed edits of shop details.
//!
//! At most one request per shop can be pending (`uq_update_pending_per_shop`).
//! Approval applies the stored patch to the shop in the same transaction that
//! flips the request to `approved`.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use chequealo_core::{Decision, RequestStatus, ShopId, ShopPatch, UpdateRequestId, UserId};

use super::{RepositoryError, not_pending};
use crate::models::{UpdateRequest, UpdateWithShop};

const UPDATE_COLUMNS: &str =
    "id, shop_id, user_id, proposed_changes, status, admin_notes, created_at, updated_at";

/// Repository for `directory.shop_update_request`.
pub struct UpdateRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UpdateRequestRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// File a new pending update request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the shop already has a pending request.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, patch), fields(shop_id = %shop_id, user_id = %user_id))]
    pub async fn create(
        &self,
        shop_id: ShopId,
        user_id: UserId,
        patch: &ShopPatch,
    ) -> Result<UpdateRequest, RepositoryError> {
        let request = sqlx::query_as::<_, UpdateRequest>(&format!(
            r"
            INSERT INTO directory.shop_update_request (shop_id, user_id, proposed_changes)
            VALUES ($1, $2, $3)
            RETURNING {UPDATE_COLUMNS}
            "
        ))
        .bind(shop_id)
        .bind(user_id)
        .bind(Json(patch))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "pending update request already exists"))?;

        Ok(request)
    }

    /// Get an update request by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UpdateRequestId) -> Result<Option<UpdateRequest>, RepositoryError> {
        let request = sqlx::query_as::<_, UpdateRequest>(&format!(
            "SELECT {UPDATE_COLUMNS} FROM directory.shop_update_request WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(request)
    }

    /// The shop's pending update request, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pending_for_shop(
        &self,
        shop_id: ShopId,
    ) -> Result<Option<UpdateRequest>, RepositoryError> {
        let request = sqlx::query_as::<_, UpdateRequest>(&format!(
            r"
            SELECT {UPDATE_COLUMNS} FROM directory.shop_update_request
            WHERE shop_id = $1 AND status = 'pending'
            "
        ))
        .bind(shop_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(request)
    }

    /// Approve a pending request and apply its patch to the shop.
    ///
    /// Fields absent from the patch keep their current values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id.
    /// Returns `RepositoryError::AlreadyResolved` if the request is not pending.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, admin_notes), fields(update_id = %id))]
    pub async fn approve(
        &self,
        id: UpdateRequestId,
        admin_notes: Option<&str>,
    ) -> Result<UpdateRequest, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (status, shop_id, Json(patch)) =
            sqlx::query_as::<_, (RequestStatus, ShopId, Json<ShopPatch>)>(
                r"
                SELECT status, shop_id, proposed_changes
                FROM directory.shop_update_request
                WHERE id = $1
                FOR UPDATE
                ",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        status.resolve(Decision::Approve)?;

        sqlx::query(
            r"
            UPDATE directory.shop
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                city = COALESCE($5, city),
                schedule = COALESCE($6, schedule),
                whatsapp = COALESCE($7, whatsapp),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(shop_id)
        .bind(patch.name.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.address.as_deref())
        .bind(patch.city.as_deref())
        .bind(patch.schedule.as_deref())
        .bind(patch.whatsapp)
        .execute(&mut *tx)
        .await?;

        let request = sqlx::query_as::<_, UpdateRequest>(&format!(
            r"
            UPDATE directory.shop_update_request
            SET status = 'approved', admin_notes = COALESCE($2, admin_notes), updated_at = NOW()
            WHERE id = $1
            RETURNING {UPDATE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(admin_notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(request)
    }

    /// Reject a pending request. The shop is not touched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id.
    /// Returns `RepositoryError::AlreadyResolved` if the request is not pending.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, admin_notes), fields(update_id = %id))]
    pub async fn reject(
        &self,
        id: UpdateRequestId,
        admin_notes: Option<&str>,
    ) -> Result<UpdateRequest, RepositoryError> {
        let rejected = sqlx::query_as::<_, UpdateRequest>(&format!(
            r"
            UPDATE directory.shop_update_request
            SET status = 'rejected', admin_notes = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {UPDATE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(admin_notes)
        .fetch_optional(self.pool)
        .await?;

        match rejected {
            Some(request) => Ok(request),
            None => {
                let current = sqlx::query_scalar::<_, RequestStatus>(
                    "SELECT status FROM directory.shop_update_request WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
                Err(not_pending(current))
            }
        }
    }

    /// Every update request with its shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<UpdateWithShop>, RepositoryError> {
        let requests = sqlx::query_as::<_, UpdateWithShop>(
            r"
            SELECT u.id, u.shop_id, u.user_id, u.proposed_changes, u.status, u.admin_notes,
                   u.created_at, u.updated_at,
                   s.name AS shop_name, s.city AS shop_city
            FROM directory.shop_update_request u
            JOIN directory.shop s ON s.id = u.shop_id
            ORDER BY u.created_at DESC, u.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(requests)
    }

    /// Number of update requests awaiting a decision.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_pending(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM directory.shop_update_request WHERE status = 'pending'",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
