//! Ownership claim requests.
//!
//! Transitions are only ever `pending -> approved` or `pending -> rejected`.
//! Approval is one transaction holding a row lock on the request; rejection
//! is a single conditional update.

use sqlx::PgPool;
use tracing::instrument;

use chequealo_core::{ClaimRequestId, Decision, RequestStatus, ShopId, UserId};

use super::{RepositoryError, not_pending};
use crate::models::{ClaimRequest, ClaimWithShop, NewClaim};

const CLAIM_COLUMNS: &str = "id, shop_id, user_id, owner_name, email, phone, role_type, verification_proof, status, admin_notes, created_at, updated_at";

/// Repository for `directory.shop_claim_request`.
pub struct ClaimRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClaimRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// File a new pending claim.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a pending
    /// claim on this shop.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, claim), fields(shop_id = %shop_id, user_id = %user_id))]
    pub async fn create(
        &self,
        shop_id: ShopId,
        user_id: UserId,
        claim: &NewClaim,
    ) -> Result<ClaimRequest, RepositoryError> {
        let request = sqlx::query_as::<_, ClaimRequest>(&format!(
            r"
            INSERT INTO directory.shop_claim_request
                (shop_id, user_id, owner_name, email, phone, role_type, verification_proof)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLAIM_COLUMNS}
            "
        ))
        .bind(shop_id)
        .bind(user_id)
        .bind(&claim.owner_name)
        .bind(&claim.email)
        .bind(&claim.phone)
        .bind(claim.role_type)
        .bind(claim.verification_proof.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "pending claim already exists"))?;

        Ok(request)
    }

    /// Get a claim by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ClaimRequestId) -> Result<Option<ClaimRequest>, RepositoryError> {
        let request = sqlx::query_as::<_, ClaimRequest>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM directory.shop_claim_request WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(request)
    }

    /// The user's pending claim on a shop, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pending_for(
        &self,
        shop_id: ShopId,
        user_id: UserId,
    ) -> Result<Option<ClaimRequest>, RepositoryError> {
        let request = sqlx::query_as::<_, ClaimRequest>(&format!(
            r"
            SELECT {CLAIM_COLUMNS} FROM directory.shop_claim_request
            WHERE shop_id = $1 AND user_id = $2 AND status = 'pending'
            "
        ))
        .bind(shop_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(request)
    }

    /// The user's most recent rejected claim on a shop, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_rejected_for(
        &self,
        shop_id: ShopId,
        user_id: UserId,
    ) -> Result<Option<ClaimRequest>, RepositoryError> {
        let request = sqlx::query_as::<_, ClaimRequest>(&format!(
            r"
            SELECT {CLAIM_COLUMNS} FROM directory.shop_claim_request
            WHERE shop_id = $1 AND user_id = $2 AND status = 'rejected'
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "
        ))
        .bind(shop_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(request)
    }

    /// Delete one of the user's own rejected claims so they can file again.
    ///
    /// Returns `false` when no rejected claim with this id belongs to the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    #[instrument(skip(self), fields(claim_id = %id, user_id = %user_id))]
    pub async fn delete_rejected(
        &self,
        id: ClaimRequestId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM directory.shop_claim_request
            WHERE id = $1 AND user_id = $2 AND status = 'rejected'
            ",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Approve a pending claim and record the claimant as a verified owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id.
    /// Returns `RepositoryError::AlreadyResolved` if the claim is not pending.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, admin_notes), fields(claim_id = %id))]
    pub async fn approve(
        &self,
        id: ClaimRequestId,
        admin_notes: Option<&str>,
    ) -> Result<ClaimRequest, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let status = sqlx::query_scalar::<_, RequestStatus>(
            "SELECT status FROM directory.shop_claim_request WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        status.resolve(Decision::Approve)?;

        sqlx::query(
            r"
            INSERT INTO directory.shop_owner (shop_id, user_id)
            SELECT shop_id, user_id FROM directory.shop_claim_request WHERE id = $1
            ON CONFLICT (shop_id, user_id) DO NOTHING
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let request = sqlx::query_as::<_, ClaimRequest>(&format!(
            r"
            UPDATE directory.shop_claim_request
            SET status = 'approved', admin_notes = COALESCE($2, admin_notes), updated_at = NOW()
            WHERE id = $1
            RETURNING {CLAIM_COLUMNS}
            "
        ))
        .bind(id)
        .bind(admin_notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(request)
    }

    /// Reject a pending claim.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id.
    /// Returns `RepositoryError::AlreadyResolved` if the claim is not pending.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, admin_notes), fields(claim_id = %id))]
    pub async fn reject(
        &self,
        id: ClaimRequestId,
        admin_notes: Option<&str>,
    ) -> Result<ClaimRequest, RepositoryError> {
        let rejected = sqlx::query_as::<_, ClaimRequest>(&format!(
            r"
            UPDATE directory.shop_claim_request
            SET status = 'rejected', admin_notes = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {CLAIM_COLUMNS}
            "
        ))
        .bind(id)
        .bind(admin_notes)
        .fetch_optional(self.pool)
        .await?;

        match rejected {
            Some(request) => Ok(request),
            None => Err(not_pending(self.status_of(id).await?)),
        }
    }

    async fn status_of(&self, id: ClaimRequestId) -> Result<Option<RequestStatus>, RepositoryError> {
        let status = sqlx::query_scalar::<_, RequestStatus>(
            "SELECT status FROM directory.shop_claim_request WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(status)
    }

    /// Every claim with its shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ClaimWithShop>, RepositoryError> {
        let requests = sqlx::query_as::<_, ClaimWithShop>(
            r"
            SELECT c.id, c.shop_id, c.user_id, c.owner_name, c.email, c.phone, c.role_type,
                   c.verification_proof, c.status, c.admin_notes, c.created_at, c.updated_at,
                   s.name AS shop_name, s.city AS shop_city
            FROM directory.shop_claim_request c
            JOIN directory.shop s ON s.id = c.shop_id
            ORDER BY c.created_at DESC, c.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(requests)
    }

    /// Number of claims awaiting a decision.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_pending(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM directory.shop_claim_request WHERE status = 'pending'",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
