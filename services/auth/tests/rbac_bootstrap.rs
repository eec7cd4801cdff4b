//! Role/permission resolution and bootstrap against an in-memory store

use auth::{
    AccessError, Authorizer,
    models::NewUser,
    rbac::{ADMIN_ROLE, USER_ROLE, permissions},
};
use chrono::Utc;
use std::time::Duration;
use common::database::{DatabaseConfig, init_pool};
use sqlx::SqlitePool;

async fn setup() -> (SqlitePool, Authorizer) {
    let pool = init_pool(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory pool");
    let authorizer = Authorizer::new(pool.clone());
    (pool, authorizer)
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.to_string(),
        email: format!("{}@example.com", name),
        password: "correct horse".to_string(),
    }
}

async fn insert_bare_user(pool: &SqlitePool, name: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash, created_at) \
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(format!("{}@example.com", name))
    .bind("not-a-hash")
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .expect("insert user");
    row.0
}

#[tokio::test]
async fn test_bootstrap_empty_store() {
    let (_pool, authorizer) = setup().await;

    let report = authorizer.bootstrap().await.unwrap();

    assert_eq!(report.baseline_grants, 0);
    assert_eq!(report.promoted_admin, None);
    assert_eq!(report.counts.roles, 2);
    assert_eq!(report.counts.permissions, 6);
    assert_eq!(report.counts.role_permissions, 7);
    assert_eq!(report.counts.assignments, 0);
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let (pool, authorizer) = setup().await;
    insert_bare_user(&pool, "first").await;

    let first = authorizer.bootstrap().await.unwrap();
    let second = authorizer.bootstrap().await.unwrap();

    assert_eq!(first.counts, second.counts);
    assert_eq!(second.baseline_grants, 0);
    assert_eq!(second.promoted_admin, None);
}

#[tokio::test]
async fn test_admin_role_holds_full_catalog() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();

    let roles = authorizer.list_roles().await.unwrap();
    let admin = roles.iter().find(|r| r.role.name == ADMIN_ROLE).unwrap();
    let user = roles.iter().find(|r| r.role.name == USER_ROLE).unwrap();

    assert_eq!(admin.permissions.len(), 6);
    assert_eq!(user.permissions.len(), 1);
    assert_eq!(user.permissions[0].name, permissions::VIEW_PDF);
}

#[tokio::test]
async fn test_bootstrap_grants_baseline_and_promotes_earliest() {
    let (pool, authorizer) = setup().await;
    let a = insert_bare_user(&pool, "alice").await;
    let b = insert_bare_user(&pool, "bob").await;

    let report = authorizer.bootstrap().await.unwrap();

    assert_eq!(report.baseline_grants, 2);
    assert_eq!(report.promoted_admin, Some(a));
    assert_eq!(authorizer.role_holders(ADMIN_ROLE).await.unwrap(), vec![a]);

    for id in [a, b] {
        let roles = authorizer.get_user_roles(id).await.unwrap();
        assert!(roles.iter().any(|r| r.name == USER_ROLE));
    }
    assert!(authorizer.has_permission(a, permissions::MANAGE_ROLES).await.unwrap());
    assert!(!authorizer.has_permission(b, permissions::MANAGE_ROLES).await.unwrap());
}

#[tokio::test]
async fn test_admin_transfer_survives_bootstrap() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();
    let a = authorizer.register_identity(&new_user("alice")).await.unwrap();
    let b = authorizer.register_identity(&new_user("bob")).await.unwrap();

    let report = authorizer.bootstrap().await.unwrap();
    assert_eq!(report.promoted_admin, Some(a.id));

    let admin = authorizer.find_role(ADMIN_ROLE).await.unwrap().unwrap();
    authorizer.assign_role(b.id, admin.id, Some(a.id)).await.unwrap();
    authorizer.remove_role(a.id, admin.id).await.unwrap();

    let report = authorizer.bootstrap().await.unwrap();
    assert_eq!(report.promoted_admin, None);
    assert_eq!(authorizer.role_holders(ADMIN_ROLE).await.unwrap(), vec![b.id]);
    assert!(!authorizer.has_permission(a.id, permissions::MANAGE_ROLES).await.unwrap());
    assert!(authorizer.has_permission(b.id, permissions::MANAGE_ROLES).await.unwrap());
}

#[tokio::test]
async fn test_ordinary_user_permissions() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();
    let user = authorizer.register_identity(&new_user("reader")).await.unwrap();

    assert!(authorizer.has_permission(user.id, permissions::VIEW_PDF).await.unwrap());
    assert!(!authorizer.has_permission(user.id, permissions::UPLOAD_PDF).await.unwrap());
    assert!(!authorizer.has_permission(user.id, permissions::MANAGE_ROLES).await.unwrap());
    assert!(!authorizer.has_permission(user.id, "no_such_permission").await.unwrap());
}

#[tokio::test]
async fn test_assign_role_twice_updates_granter() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();
    let granter = authorizer.register_identity(&new_user("granter")).await.unwrap();
    let other = authorizer.register_identity(&new_user("other")).await.unwrap();
    let target = authorizer.register_identity(&new_user("target")).await.unwrap();
    let admin = authorizer.find_role(ADMIN_ROLE).await.unwrap().unwrap();

    authorizer
        .assign_role(target.id, admin.id, Some(granter.id))
        .await
        .unwrap();
    authorizer
        .assign_role(target.id, admin.id, Some(other.id))
        .await
        .unwrap();

    let roles = authorizer.get_user_roles(target.id).await.unwrap();
    assert_eq!(roles.iter().filter(|r| r.name == ADMIN_ROLE).count(), 1);

    let grant = authorizer
        .find_assignment(target.id, admin.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grant.assigned_by, Some(other.id));
}

#[tokio::test]
async fn test_remove_absent_role_is_noop() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();
    let user = authorizer.register_identity(&new_user("reader")).await.unwrap();
    let admin = authorizer.find_role(ADMIN_ROLE).await.unwrap().unwrap();

    authorizer.remove_role(user.id, admin.id).await.unwrap();
    authorizer.remove_role(user.id, admin.id).await.unwrap();

    let roles = authorizer.get_user_roles(user.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, USER_ROLE);
}

#[tokio::test]
async fn test_authorize_without_identity_is_denied() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();

    assert!(!authorizer.authorize(None, permissions::VIEW_PDF).await.unwrap());
}

#[tokio::test]
async fn test_authorize_resolved_identity() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();
    let user = authorizer.register_identity(&new_user("reader")).await.unwrap();

    let identity = authorizer.resolve_identity_with_roles(user.id).await.unwrap();
    assert!(identity.has_role(USER_ROLE));
    assert!(authorizer.authorize(Some(&identity), permissions::VIEW_PDF).await.unwrap());
    assert!(!authorizer.authorize(Some(&identity), permissions::DELETE_PDF).await.unwrap());
}

#[tokio::test]
async fn test_unknown_user_is_an_error() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();

    let result = authorizer.resolve_identity_with_roles(999).await;
    assert!(matches!(result, Err(AccessError::UnknownUser(999))));
}

#[tokio::test]
async fn test_store_failure_is_not_a_denial() {
    let (pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();
    let user = authorizer.register_identity(&new_user("reader")).await.unwrap();
    let identity = authorizer.resolve_identity_with_roles(user.id).await.unwrap();

    pool.close().await;

    let result = authorizer.has_permission(user.id, permissions::VIEW_PDF).await;
    assert!(matches!(result, Err(AccessError::Storage(_))));

    let result = authorizer.authorize(Some(&identity), permissions::VIEW_PDF).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_register_and_authenticate() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();
    let user = authorizer.register_identity(&new_user("reader")).await.unwrap();

    let found = authorizer
        .authenticate("reader", "correct horse")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);

    assert!(authorizer.authenticate("reader", "wrong").await.unwrap().is_none());
    assert!(authorizer.authenticate("nobody", "correct horse").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let (_pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();
    authorizer.register_identity(&new_user("reader")).await.unwrap();

    let result = authorizer.register_identity(&new_user("reader")).await;
    assert!(matches!(
        result,
        Err(AccessError::Storage(common::error::DatabaseError::UniqueViolation(_)))
    ));
}

#[tokio::test]
async fn test_slow_permission_check_times_out() {
    let (pool, authorizer) = setup().await;
    authorizer.bootstrap().await.unwrap();
    let user = authorizer.register_identity(&new_user("reader")).await.unwrap();
    let identity = authorizer.resolve_identity_with_roles(user.id).await.unwrap();
    let authorizer = authorizer.with_check_timeout(Duration::from_millis(50));

    // the in-memory pool has a single connection
    let _held = pool.acquire().await.unwrap();

    let result = authorizer.authorize(Some(&identity), permissions::VIEW_PDF).await;
    assert!(matches!(result, Err(AccessError::Timeout(timeout)) if timeout == Duration::from_millis(50)));
}
