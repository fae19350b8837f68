//! Claim and update-request moderation.
//!
//! Submissions create `pending` rows; administrators move them to `approved`
//! or `rejected` exactly once. A rejected claim can be deleted by its
//! submitter so a fresh one can be filed.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use chequealo_core::{
    ClaimRequestId, ClaimRole, Email, ShopFields, ShopId, ShopPatch, UpdateRequestId,
};

use super::error::Duplicate;
use super::{Caller, ServiceError};
use crate::db::{ClaimRepository, ShopRepository, UpdateRequestRepository};
use crate::models::{
    ClaimRequest, ClaimWithShop, NewClaim, Shop, UpdateRequest, UpdateWithShop,
};

/// Claim form as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimForm {
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub role_type: ClaimRole,
    #[serde(default)]
    pub verification_proof: Option<String>,
}

impl ClaimForm {
    /// Validate and normalise the form.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank name or phone or a
    /// malformed e-mail address.
    pub fn validate(&self) -> Result<NewClaim, ServiceError> {
        let owner_name = self.owner_name.trim();
        if owner_name.is_empty() {
            return Err(ServiceError::Validation("owner name is required".to_string()));
        }
        let email = Email::parse(&self.email)
            .map_err(|e| ServiceError::Validation(format!("invalid email: {e}")))?;
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(ServiceError::Validation("phone is required".to_string()));
        }

        Ok(NewClaim {
            owner_name: owner_name.to_string(),
            email,
            phone: phone.to_string(),
            role_type: self.role_type,
            verification_proof: non_blank(self.verification_proof.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Trim every text field of an edit form and require a name.
///
/// # Errors
///
/// Returns `ServiceError::Validation` when the name is blank.
pub fn normalize_shop_form(form: &ShopFields) -> Result<ShopFields, ServiceError> {
    let normalized = ShopFields {
        name: form.name.trim().to_string(),
        phone: form.phone.trim().to_string(),
        address: form.address.trim().to_string(),
        city: form.city.trim().to_string(),
        schedule: form.schedule.trim().to_string(),
        whatsapp: form.whatsapp,
    };
    if normalized.name.is_empty() {
        return Err(ServiceError::Validation("shop name is required".to_string()));
    }
    Ok(normalized)
}

/// Build the patch an edit form proposes against the current shop.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for a blank name or a form that
/// changes nothing.
pub fn propose_patch(current: &Shop, form: &ShopFields) -> Result<ShopPatch, ServiceError> {
    let proposed = normalize_shop_form(form)?;
    let patch = ShopPatch::diff(&current.fields(), &proposed);
    if patch.is_empty() {
        return Err(ServiceError::Validation("no changes to submit".to_string()));
    }
    Ok(patch)
}

/// Claim state of a shop as seen by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimStatus {
    pub is_claimed: bool,
    pub pending: Option<ClaimRequest>,
    pub rejected: Option<ClaimRequest>,
}

/// Counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModerationSummary {
    pub pending_claims: i64,
    pub pending_updates: i64,
}

/// Claim and update-request workflow.
pub struct ModerationService<'a> {
    shops: ShopRepository<'a>,
    claims: ClaimRepository<'a>,
    updates: UpdateRequestRepository<'a>,
}

impl<'a> ModerationService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            shops: ShopRepository::new(pool),
            claims: ClaimRepository::new(pool),
            updates: UpdateRequestRepository::new(pool),
        }
    }

    // =========================================================================
    // Claims
    // =========================================================================

    /// Whether the shop is claimed, plus the caller's pending and most recent
    /// rejected claim.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown shop.
    pub async fn claim_status(
        &self,
        caller: &Caller,
        shop_id: ShopId,
    ) -> Result<ClaimStatus, ServiceError> {
        if !self.shops.exists(shop_id).await? {
            return Err(ServiceError::NotFound("shop"));
        }

        Ok(ClaimStatus {
            is_claimed: self.shops.is_claimed(shop_id).await?,
            pending: self.claims.pending_for(shop_id, caller.user_id).await?,
            rejected: self.claims.latest_rejected_for(shop_id, caller.user_id).await?,
        })
    }

    /// File an ownership claim.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad form or an already claimed shop,
    /// `NotFound` for an unknown shop and `Duplicate(Claim)` when the caller
    /// already has a pending claim on it.
    #[instrument(skip(self, caller, form), fields(user_id = %caller.user_id, shop_id = %shop_id))]
    pub async fn submit_claim(
        &self,
        caller: &Caller,
        shop_id: ShopId,
        form: &ClaimForm,
    ) -> Result<ClaimRequest, ServiceError> {
        let claim = form.validate()?;

        if !self.shops.exists(shop_id).await? {
            return Err(ServiceError::NotFound("shop"));
        }
        if self.shops.is_claimed(shop_id).await? {
            return Err(ServiceError::Validation(
                "this shop has already been claimed".to_string(),
            ));
        }
        if self.claims.pending_for(shop_id, caller.user_id).await?.is_some() {
            return Err(ServiceError::Duplicate(Duplicate::Claim));
        }

        let request = self
            .claims
            .create(shop_id, caller.user_id, &claim)
            .await
            .map_err(|e| ServiceError::duplicate_on_conflict(e, Duplicate::Claim))?;

        tracing::info!(claim_id = %request.id, "Claim submitted");
        Ok(request)
    }

    /// Delete one of the caller's rejected claims.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` unless the claim exists, is rejected and belongs to
    /// the caller.
    pub async fn delete_rejected_claim(
        &self,
        caller: &Caller,
        claim_id: ClaimRequestId,
    ) -> Result<(), ServiceError> {
        if self.claims.delete_rejected(claim_id, caller.user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("rejected claim"))
        }
    }

    /// Approve a claim, making the claimant a verified owner.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `NotFound` for an unknown claim and
    /// `AlreadyResolved` when it is no longer pending.
    #[instrument(skip(self, caller, notes), fields(admin_id = %caller.user_id, claim_id = %claim_id))]
    pub async fn approve_claim(
        &self,
        caller: &Caller,
        claim_id: ClaimRequestId,
        notes: Option<&str>,
    ) -> Result<ClaimRequest, ServiceError> {
        caller.require_admin()?;
        let notes = non_blank(notes);
        let request = self.claims.approve(claim_id, notes.as_deref()).await?;
        tracing::info!(status = %request.status, shop_id = %request.shop_id, "Claim resolved");
        Ok(request)
    }

    /// Reject a claim with optional notes.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `NotFound` for an unknown claim and
    /// `AlreadyResolved` when it is no longer pending.
    #[instrument(skip(self, caller, notes), fields(admin_id = %caller.user_id, claim_id = %claim_id))]
    pub async fn reject_claim(
        &self,
        caller: &Caller,
        claim_id: ClaimRequestId,
        notes: Option<&str>,
    ) -> Result<ClaimRequest, ServiceError> {
        caller.require_admin()?;
        let notes = non_blank(notes);
        let request = self.claims.reject(claim_id, notes.as_deref()).await?;
        tracing::info!(status = %request.status, shop_id = %request.shop_id, "Claim resolved");
        Ok(request)
    }

    // =========================================================================
    // Update requests
    // =========================================================================

    /// Fail closed unless the caller owns the shop or is an admin.
    async fn require_editor(&self, caller: &Caller, shop_id: ShopId) -> Result<(), ServiceError> {
        if caller.is_admin() || self.shops.is_owner(shop_id, caller.user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    /// The shop's pending update request, for owners and admins.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller may edit the shop.
    pub async fn pending_update(
        &self,
        caller: &Caller,
        shop_id: ShopId,
    ) -> Result<Option<UpdateRequest>, ServiceError> {
        self.require_editor(caller, shop_id).await?;
        Ok(self.updates.pending_for_shop(shop_id).await?)
    }

    /// Submit an edit form; only the fields that differ are stored.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller owns the shop or is an admin,
    /// `NotFound` for an unknown shop, `Validation` for a blank name or an
    /// unchanged form and `Duplicate(UpdateRequest)` if one is already pending.
    #[instrument(skip(self, caller, form), fields(user_id = %caller.user_id, shop_id = %shop_id))]
    pub async fn submit_update(
        &self,
        caller: &Caller,
        shop_id: ShopId,
        form: &ShopFields,
    ) -> Result<UpdateRequest, ServiceError> {
        self.require_editor(caller, shop_id).await?;

        let shop = self
            .shops
            .get(shop_id)
            .await?
            .ok_or(ServiceError::NotFound("shop"))?;
        let patch = propose_patch(&shop, form)?;

        if self.updates.pending_for_shop(shop_id).await?.is_some() {
            return Err(ServiceError::Duplicate(Duplicate::UpdateRequest));
        }

        let request = self
            .updates
            .create(shop_id, caller.user_id, &patch)
            .await
            .map_err(|e| ServiceError::duplicate_on_conflict(e, Duplicate::UpdateRequest))?;

        tracing::info!(
            update_id = %request.id,
            fields = ?patch.changed_fields(),
            "Update request submitted"
        );
        Ok(request)
    }

    /// Approve an update request, applying its patch to the shop.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `NotFound` for an unknown request
    /// and `AlreadyResolved` when it is no longer pending.
    #[instrument(skip(self, caller, notes), fields(admin_id = %caller.user_id, update_id = %update_id))]
    pub async fn approve_update(
        &self,
        caller: &Caller,
        update_id: UpdateRequestId,
        notes: Option<&str>,
    ) -> Result<UpdateRequest, ServiceError> {
        caller.require_admin()?;
        let notes = non_blank(notes);
        let request = self.updates.approve(update_id, notes.as_deref()).await?;
        tracing::info!(status = %request.status, shop_id = %request.shop_id, "Update request resolved");
        Ok(request)
    }

    /// Reject an update request with optional notes.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `NotFound` for an unknown request
    /// and `AlreadyResolved` when it is no longer pending.
    #[instrument(skip(self, caller, notes), fields(admin_id = %caller.user_id, update_id = %update_id))]
    pub async fn reject_update(
        &self,
        caller: &Caller,
        update_id: UpdateRequestId,
        notes: Option<&str>,
    ) -> Result<UpdateRequest, ServiceError> {
        caller.require_admin()?;
        let notes = non_blank(notes);
        let request = self.updates.reject(update_id, notes.as_deref()).await?;
        tracing::info!(status = %request.status, shop_id = %request.shop_id, "Update request resolved");
        Ok(request)
    }

    // =========================================================================
    // Admin views
    // =========================================================================

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins.
    pub async fn all_claims(&self, caller: &Caller) -> Result<Vec<ClaimWithShop>, ServiceError> {
        caller.require_admin()?;
        Ok(self.claims.list_all().await?)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins.
    pub async fn all_updates(&self, caller: &Caller) -> Result<Vec<UpdateWithShop>, ServiceError> {
        caller.require_admin()?;
        Ok(self.updates.list_all().await?)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins.
    pub async fn summary(&self, caller: &Caller) -> Result<ModerationSummary, ServiceError> {
        caller.require_admin()?;
        Ok(ModerationSummary {
            pending_claims: self.claims.count_pending().await?,
            pending_updates: self.updates.count_pending().await?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::directory::search::tests::shop;

    fn form() -> ClaimForm {
        ClaimForm {
            owner_name: " Juan Pérez ".to_string(),
            email: "juan@tallerjp.do".to_string(),
            phone: " 809-555-0101 ".to_string(),
            role_type: ClaimRole::Manager,
            verification_proof: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_claim_form_validates_and_trims() {
        let claim = form().validate().unwrap();
        assert_eq!(claim.owner_name, "Juan Pérez");
        assert_eq!(claim.phone, "809-555-0101");
        assert_eq!(claim.role_type, ClaimRole::Manager);
        assert_eq!(claim.verification_proof, None);
    }

    #[test]
    fn test_claim_form_rejects_missing_fields() {
        let mut blank_name = form();
        blank_name.owner_name = "  ".to_string();
        assert!(matches!(blank_name.validate(), Err(ServiceError::Validation(_))));

        let mut bad_email = form();
        bad_email.email = "juan.tallerjp.do".to_string();
        assert!(matches!(bad_email.validate(), Err(ServiceError::Validation(_))));

        let mut no_phone = form();
        no_phone.phone = String::new();
        assert!(matches!(no_phone.validate(), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_claim_form_role_defaults_to_owner() {
        let parsed: ClaimForm = serde_json::from_str(
            r#"{"owner_name":"Ana","email":"ana@example.do","phone":"809"}"#,
        )
        .unwrap();
        assert_eq!(parsed.role_type, ClaimRole::Owner);
        assert!(parsed.verification_proof.is_none());
    }

    #[test]
    fn test_propose_patch_keeps_only_changes() {
        let current = shop(1, "Taller Central", "Santo Domingo", 4.0, 3);
        let mut edited = current.fields();
        edited.city = " Santiago ".to_string();

        let patch = propose_patch(&current, &edited).unwrap();
        assert_eq!(patch.city.as_deref(), Some("Santiago"));
        assert_eq!(patch.changed_fields(), vec!["city"]);
    }

    #[test]
    fn test_propose_patch_rejects_unchanged_form() {
        let current = shop(1, "Taller Central", "Santo Domingo", 4.0, 3);
        let err = propose_patch(&current, &current.fields()).unwrap_err();
        assert_eq!(err.to_string(), "no changes to submit");

        let mut padded = current.fields();
        padded.name = "  Taller Central  ".to_string();
        assert!(propose_patch(&current, &padded).is_err());
    }

    #[test]
    fn test_propose_patch_requires_name() {
        let current = shop(1, "Taller Central", "Santo Domingo", 4.0, 3);
        let mut edited = current.fields();
        edited.name = "   ".to_string();
        edited.city = "Moca".to_string();
        assert!(matches!(
            propose_patch(&current, &edited),
            Err(ServiceError::Validation(_))
        ));
    }
}
