//! Storage-level rules against a migrated `PostgreSQL` database.
//!
//! Each test gets a fresh database from `sqlx::test`. They are ignored by
//! default; run with `DATABASE_URL` set and `-- --ignored`.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::util::ServiceExt;

use chequealo_core::{
    AlreadyResolved, ClaimRole, Email, Rating, RequestStatus, ShopFields, ShopPatch, UserRole,
};
use chequealo_integration_tests::{app_with_pool, count_rows, insert_caller, insert_shop};
use chequealo_site::db::{
    ClaimRepository, FavoriteRepository, RepositoryError, ReviewRepository, ShopRepository,
    UpdateRequestRepository,
};
use chequealo_site::models::NewClaim;
use chequealo_site::services::moderation::ClaimForm;
use chequealo_site::services::{
    Duplicate, FavoriteService, ModerationService, ReviewService, ServiceError,
};

fn new_claim() -> NewClaim {
    NewClaim {
        owner_name: "Juan Pérez".to_string(),
        email: Email::parse("juan@tallerjp.do").unwrap(),
        phone: "809-555-0101".to_string(),
        role_type: ClaimRole::Owner,
        verification_proof: None,
    }
}

// =============================================================================
// Reviews
// =============================================================================

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_second_review_is_rejected_by_storage(pool: PgPool) {
    let shop = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let user = insert_caller(&pool, "ana@example.do", &[]).await;
    let reviews = ReviewRepository::new(&pool);

    reviews
        .create(shop, user.user_id, "ana", Rating::new(5).unwrap(), "Muy buen trabajo")
        .await
        .unwrap();
    let second = reviews
        .create(shop, user.user_id, "ana", Rating::new(1).unwrap(), "Cambié de opinión")
        .await;

    assert!(matches!(second, Err(RepositoryError::Conflict(_))));
    assert_eq!(count_rows(&pool, "review", shop, user.user_id).await, 1);
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_review_through_service(pool: PgPool) {
    let shop = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let user = insert_caller(&pool, "ana@example.do", &[]).await;
    let service = ReviewService::new(&pool);

    let review = service.submit(&user, shop, 4, "Rápidos").await.unwrap();
    assert_eq!(review.reviewer_name, "ana");

    let err = service.submit(&user, shop, 5, "Otra vez").await.unwrap_err();
    assert!(matches!(err, ServiceError::Duplicate(Duplicate::Review)));
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_review_can_be_edited_once(pool: PgPool) {
    let shop = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let user = insert_caller(&pool, "ana@example.do", &[]).await;
    let service = ReviewService::new(&pool);

    let review = service.submit(&user, shop, 3, "Regular").await.unwrap();

    let edited = service.edit(&user, review.id, 5, "Lo resolvieron").await.unwrap();
    assert!(edited.has_been_edited);
    assert_eq!(edited.rating.stars(), 5);

    let err = service.edit(&user, review.id, 1, "Tercer intento").await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyEdited));

    let stored = ReviewRepository::new(&pool).get(review.id).await.unwrap().unwrap();
    assert_eq!(stored.comment, "Lo resolvieron");
    assert_eq!(stored.rating.stars(), 5);
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rating_aggregate_follows_reviews(pool: PgPool) {
    let shop = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let ana = insert_caller(&pool, "ana@example.do", &[]).await;
    let luis = insert_caller(&pool, "luis@example.do", &[]).await;
    let service = ReviewService::new(&pool);

    service.submit(&ana, shop, 5, "Excelente").await.unwrap();
    service.submit(&luis, shop, 2, "Caro").await.unwrap();

    let stored = ShopRepository::new(&pool).get(shop).await.unwrap().unwrap();
    assert_eq!(stored.review_count, 2);
    assert!((stored.average_rating - 3.5).abs() < 1e-9);
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_only_owners_reply_and_only_once(pool: PgPool) {
    let shop = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let reviewer = insert_caller(&pool, "ana@example.do", &[]).await;
    let owner = insert_caller(&pool, "juan@tallerjp.do", &[]).await;
    let service = ReviewService::new(&pool);

    let review = service.submit(&reviewer, shop, 4, "Bien").await.unwrap();

    let err = service.reply(&owner, review.id, "Gracias").await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden));

    let claim = ClaimRepository::new(&pool)
        .create(shop, owner.user_id, &new_claim())
        .await
        .unwrap();
    ClaimRepository::new(&pool).approve(claim.id, None).await.unwrap();

    let reply = service.reply(&owner, review.id, "¡Gracias, Ana!").await.unwrap();
    let err = service.reply(&owner, review.id, "Otra vez").await.unwrap_err();
    assert!(matches!(err, ServiceError::Duplicate(Duplicate::Reply)));

    let updated = service.update_reply(&owner, reply.id, "Gracias por venir").await.unwrap();
    assert_eq!(updated.reply_text, "Gracias por venir");
    assert!(updated.updated_at.is_some());

    let views = service.for_shop(shop).await.unwrap();
    let attached = views.first().and_then(|v| v.reply.as_ref()).map(|r| r.id);
    assert_eq!(attached, Some(reply.id));
}

// =============================================================================
// Favorites
// =============================================================================

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_favorites_are_idempotent(pool: PgPool) {
    let shop = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let user = insert_caller(&pool, "ana@example.do", &[]).await;
    let favorites = FavoriteRepository::new(&pool);

    assert!(favorites.add(user.user_id, shop).await.unwrap());
    assert!(!favorites.add(user.user_id, shop).await.unwrap());
    assert_eq!(count_rows(&pool, "user_favorite", shop, user.user_id).await, 1);

    assert!(favorites.remove(user.user_id, shop).await.unwrap());
    assert!(!favorites.remove(user.user_id, shop).await.unwrap());
    assert!(!favorites.is_favorite(user.user_id, shop).await.unwrap());
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_favorite_of_unknown_shop_is_not_found(pool: PgPool) {
    let user = insert_caller(&pool, "ana@example.do", &[]).await;
    let err = FavoriteService::new(&pool)
        .add(&user, chequealo_core::ShopId::new(9999))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("shop")));
}

// =============================================================================
// Claims
// =============================================================================

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_approving_claim_creates_one_owner(pool: PgPool) {
    let shop = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let claimant = insert_caller(&pool, "juan@tallerjp.do", &[]).await;
    let admin = insert_caller(&pool, "admin@chequealo.do", &[UserRole::Admin]).await;
    let service = ModerationService::new(&pool);

    let form = ClaimForm {
        owner_name: "Juan Pérez".to_string(),
        email: "juan@tallerjp.do".to_string(),
        phone: "809-555-0101".to_string(),
        role_type: ClaimRole::Owner,
        verification_proof: None,
    };
    let claim = service.submit_claim(&claimant, shop, &form).await.unwrap();
    assert_eq!(claim.status, RequestStatus::Pending);

    let err = service.approve_claim(&claimant, claim.id, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden));

    let approved = service
        .approve_claim(&admin, claim.id, Some("Verificado por teléfono"))
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.admin_notes.as_deref(), Some("Verificado por teléfono"));

    let shops = ShopRepository::new(&pool);
    assert!(shops.is_claimed(shop).await.unwrap());
    assert!(shops.is_owner(shop, claimant.user_id).await.unwrap());
    assert_eq!(count_rows(&pool, "shop_owner", shop, claimant.user_id).await, 1);

    let again = service.approve_claim(&admin, claim.id, None).await.unwrap_err();
    assert!(matches!(again, ServiceError::AlreadyResolved(_)));
    assert_eq!(count_rows(&pool, "shop_owner", shop, claimant.user_id).await, 1);
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rejecting_claim_stores_notes_and_allows_resubmission(pool: PgPool) {
    let shop = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let claimant = insert_caller(&pool, "juan@tallerjp.do", &[]).await;
    let claims = ClaimRepository::new(&pool);

    let claim = claims.create(shop, claimant.user_id, &new_claim()).await.unwrap();
    let duplicate = claims.create(shop, claimant.user_id, &new_claim()).await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

    let rejected = claims.reject(claim.id, Some("Sin prueba")).await.unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.admin_notes.as_deref(), Some("Sin prueba"));
    assert_eq!(count_rows(&pool, "shop_owner", shop, claimant.user_id).await, 0);

    let approve_after = claims.approve(claim.id, None).await;
    assert!(matches!(approve_after, Err(RepositoryError::AlreadyResolved(_))));

    let service = ModerationService::new(&pool);
    let status = service.claim_status(&claimant, shop).await.unwrap();
    assert!(!status.is_claimed);
    assert!(status.pending.is_none());
    assert_eq!(status.rejected.map(|c| c.id), Some(claim.id));

    service.delete_rejected_claim(&claimant, claim.id).await.unwrap();
    claims.create(shop, claimant.user_id, &new_claim()).await.unwrap();
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_resolving_unknown_claim_is_not_found(pool: PgPool) {
    let claims = ClaimRepository::new(&pool);
    let id = chequealo_core::ClaimRequestId::new(4242);
    assert!(matches!(claims.approve(id, None).await, Err(RepositoryError::NotFound)));
    assert!(matches!(claims.reject(id, None).await, Err(RepositoryError::NotFound)));
}

// =============================================================================
// Update requests
// =============================================================================

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_approving_update_changes_only_patched_fields(pool: PgPool) {
    let shop_id = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let admin = insert_caller(&pool, "admin@chequealo.do", &[UserRole::Admin]).await;
    let shops = ShopRepository::new(&pool);
    let before = shops.get(shop_id).await.unwrap().unwrap();

    let patch = ShopPatch {
        city: Some("Santiago".to_string()),
        ..ShopPatch::default()
    };
    let request = UpdateRequestRepository::new(&pool)
        .create(shop_id, admin.user_id, &patch)
        .await
        .unwrap();

    let approved = ModerationService::new(&pool)
        .approve_update(&admin, request.id, None)
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);

    let after = shops.get(shop_id).await.unwrap().unwrap();
    assert_eq!(after.city, "Santiago");
    assert_eq!(after.name, before.name);
    assert_eq!(after.address, before.address);
    assert_eq!(after.phone, before.phone);
    assert_eq!(after.schedule, before.schedule);
    assert_eq!(after.whatsapp, before.whatsapp);
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_owner_update_is_diffed_and_single_pending(pool: PgPool) {
    let shop_id = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let owner = insert_caller(&pool, "juan@tallerjp.do", &[]).await;
    let stranger = insert_caller(&pool, "otro@example.do", &[]).await;
    let claim = ClaimRepository::new(&pool)
        .create(shop_id, owner.user_id, &new_claim())
        .await
        .unwrap();
    ClaimRepository::new(&pool).approve(claim.id, None).await.unwrap();

    let shop = ShopRepository::new(&pool).get(shop_id).await.unwrap().unwrap();
    let form = ShopFields {
        phone: "829-555-0199".to_string(),
        ..shop.fields()
    };

    let service = ModerationService::new(&pool);
    let err = service.submit_update(&stranger, shop_id, &form).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden));

    let unchanged = service.submit_update(&owner, shop_id, &shop.fields()).await.unwrap_err();
    assert!(matches!(unchanged, ServiceError::Validation(_)));

    let request = service.submit_update(&owner, shop_id, &form).await.unwrap();
    assert_eq!(request.proposed_changes.0.changed_fields(), vec!["phone"]);

    let err = service.submit_update(&owner, shop_id, &form).await.unwrap_err();
    assert!(matches!(err, ServiceError::Duplicate(Duplicate::UpdateRequest)));
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_update_requests_leave_one_pending(pool: PgPool) {
    let shop_id = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let a = insert_caller(&pool, "a@example.do", &[UserRole::Admin]).await;
    let b = insert_caller(&pool, "b@example.do", &[UserRole::Admin]).await;
    let repo = UpdateRequestRepository::new(&pool);

    let first = ShopPatch {
        name: Some("Taller Pérez e Hijos".to_string()),
        ..ShopPatch::default()
    };
    let second = ShopPatch {
        whatsapp: Some(true),
        ..ShopPatch::default()
    };

    let (left, right) = tokio::join!(
        repo.create(shop_id, a.user_id, &first),
        repo.create(shop_id, b.user_id, &second)
    );

    let outcomes = [left.is_ok(), right.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    assert!(
        [left, right]
            .into_iter()
            .filter_map(Result::err)
            .all(|e| matches!(e, RepositoryError::Conflict(_)))
    );
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_approved_update_is_never_applied_twice(pool: PgPool) {
    let shop_id = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let admin = insert_caller(&pool, "admin@chequealo.do", &[UserRole::Admin]).await;
    let shops = ShopRepository::new(&pool);
    let updates = UpdateRequestRepository::new(&pool);
    let service = ModerationService::new(&pool);

    let to_moca = ShopPatch {
        city: Some("Moca".to_string()),
        ..ShopPatch::default()
    };
    let request = updates.create(shop_id, admin.user_id, &to_moca).await.unwrap();
    service.approve_update(&admin, request.id, None).await.unwrap();

    // An admin edit made after approval must survive a repeated approval.
    sqlx::query("UPDATE directory.shop SET city = 'La Vega' WHERE id = $1")
        .bind(shop_id)
        .execute(&pool)
        .await
        .unwrap();

    let again = service.approve_update(&admin, request.id, None).await.unwrap_err();
    assert!(matches!(
        again,
        ServiceError::AlreadyResolved(AlreadyResolved {
            current: RequestStatus::Approved
        })
    ));
    let reject_after = service.reject_update(&admin, request.id, Some("tarde")).await.unwrap_err();
    assert!(matches!(reject_after, ServiceError::AlreadyResolved(_)));

    let shop = shops.get(shop_id).await.unwrap().unwrap();
    assert_eq!(shop.city, "La Vega");
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rejecting_update_keeps_shop_and_stores_notes(pool: PgPool) {
    let shop_id = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let admin = insert_caller(&pool, "admin@chequealo.do", &[UserRole::Admin]).await;
    let member = insert_caller(&pool, "juan@tallerjp.do", &[]).await;
    let shops = ShopRepository::new(&pool);
    let before = shops.get(shop_id).await.unwrap().unwrap();

    let rename = ShopPatch {
        name: Some("Taller Nuevo".to_string()),
        ..ShopPatch::default()
    };
    let request = UpdateRequestRepository::new(&pool)
        .create(shop_id, member.user_id, &rename)
        .await
        .unwrap();

    let service = ModerationService::new(&pool);
    let err = service.reject_update(&member, request.id, Some("no")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden));

    let rejected = service.reject_update(&admin, request.id, Some("no")).await.unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.admin_notes.as_deref(), Some("no"));

    let after = shops.get(shop_id).await.unwrap().unwrap();
    assert_eq!(after.name, before.name);

    let approve_after = service.approve_update(&admin, request.id, None).await.unwrap_err();
    assert!(matches!(
        approve_after,
        ServiceError::AlreadyResolved(AlreadyResolved {
            current: RequestStatus::Rejected
        })
    ));
    assert_eq!(shops.get(shop_id).await.unwrap().unwrap().name, before.name);

    // The shop is free for a new pending request.
    UpdateRequestRepository::new(&pool)
        .create(shop_id, member.user_id, &rename)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_claim_approvals_insert_one_owner(pool: PgPool) {
    let shop = insert_shop(&pool, "Taller Pérez", "Santo Domingo").await;
    let claimant = insert_caller(&pool, "juan@tallerjp.do", &[]).await;
    let claims = ClaimRepository::new(&pool);
    let claim = claims.create(shop, claimant.user_id, &new_claim()).await.unwrap();

    let (left, right) = tokio::join!(claims.approve(claim.id, None), claims.approve(claim.id, None));

    assert_eq!([left.is_ok(), right.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(count_rows(&pool, "shop_owner", shop, claimant.user_id).await, 1);
}

// =============================================================================
// HTTP with a real session store
// =============================================================================

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_location_failure_messages(pool: PgPool) {
    for (status, prefix) in [
        ("permission_denied", "Permiso"),
        ("position_unavailable", "No se pudo"),
        ("timeout", "La solicitud"),
    ] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/location")
            .header("content-type", "application/json")
            .body(Body::from(format!(r#"{{"status":"{status}"}}"#)))
            .unwrap();
        let response = app_with_pool(pool.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with(prefix));
    }
}

#[sqlx::test(migrations = "../site/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_register_then_profile(pool: PgPool) {
    let app = app_with_pool(pool);

    let register = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"email":"maria@example.do","password":"correcto-caballo-bateria"}"#,
        ))
        .unwrap();
    let response = app.clone().oneshot(register).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string();

    let me = Request::builder()
        .uri("/api/me")
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(me).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["email"], "maria@example.do");
    assert_eq!(body["stats"]["review_count"], 0);
}
