use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{AuthConfig, Engine, EngineError};
use migration::MigratorTrait;

async fn engine_with_secret(secret: &str) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .auth(AuthConfig::new(secret).bcrypt_cost(4))
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_secret("test-secret").await
}

#[tokio::test]
async fn register_returns_token_for_new_user() {
    let (engine, _db) = engine_with_db().await;

    let session = engine
        .register("Ana", "ana@x.com", "secret1")
        .await
        .unwrap();

    assert!(!session.token.is_empty());
    assert_eq!(session.user.name, "Ana");
    assert_eq!(session.user.email, "ana@x.com");
    assert_eq!(engine.verify(&session.token).await.unwrap(), session.user.id);
}

#[tokio::test]
async fn register_stores_a_hash_not_the_password() {
    let (engine, db) = engine_with_db().await;
    engine
        .register("Ana", "ana@x.com", "secret1")
        .await
        .unwrap();

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT password_hash FROM users WHERE email = 'ana@x.com'",
        ))
        .await
        .unwrap()
        .unwrap();
    let hash: String = row.try_get("", "password_hash").unwrap();
    assert_ne!(hash, "secret1");
    assert!(hash.starts_with("$2"));
}

#[tokio::test]
async fn register_rejects_taken_email_case_insensitively() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register("Ana", "ana@x.com", "secret1")
        .await
        .unwrap();

    let err = engine
        .register("Other Ana", "  ANA@X.com", "secret2")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("An account with this email already exists".to_string())
    );
}

#[tokio::test]
async fn register_validates_before_touching_storage() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.register("", "ana@x.com", "12345").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(
            "Name is required, Password must be at least 6 characters".to_string()
        )
    );
}

#[tokio::test]
async fn login_with_normalized_email() {
    let (engine, _db) = engine_with_db().await;
    let registered = engine
        .register("Ana", "ana@x.com", "secret1")
        .await
        .unwrap();

    let session = engine.login("Ana@X.COM", "secret1").await.unwrap();
    assert_eq!(session.user, registered.user);
    assert_eq!(engine.verify(&session.token).await.unwrap(), registered.user.id);
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_part_was_wrong() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register("Ana", "ana@x.com", "secret1")
        .await
        .unwrap();

    let wrong_password = engine.login("ana@x.com", "secret2").await.unwrap_err();
    let unknown_email = engine.login("bob@x.com", "secret1").await.unwrap_err();

    assert_eq!(
        wrong_password,
        EngineError::Auth("Invalid email or password".to_string())
    );
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn login_requires_both_fields() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.login("", "secret1").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn verify_rejects_garbage_and_foreign_tokens() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(engine.verify("").await, Err(EngineError::Auth(_))));
    assert!(matches!(
        engine.verify("abc.def.ghi").await,
        Err(EngineError::Auth(_))
    ));

    let (other, _other_db) = engine_with_secret("another-secret").await;
    let foreign = other
        .register("Ana", "ana@x.com", "secret1")
        .await
        .unwrap();
    assert!(matches!(
        engine.verify(&foreign.token).await,
        Err(EngineError::Auth(_))
    ));
}

#[tokio::test]
async fn verify_rejects_tokens_for_users_that_are_not_stored() {
    let (engine, _db) = engine_with_db().await;
    let (other, _other_db) = engine_with_secret("test-secret").await;
    // Valid signature, but the user only exists in the other database.
    let session = other
        .register("Ana", "ana@x.com", "secret1")
        .await
        .unwrap();

    assert!(matches!(
        engine.verify(&session.token).await,
        Err(EngineError::Auth(_))
    ));
}

#[tokio::test]
async fn builder_requires_auth_settings() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    assert!(Engine::builder().database(db).build().await.is_err());
}
