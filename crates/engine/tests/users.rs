mod common;

use engine::{EngineError, NewPost, NewTransaction};

use common::{befriend, engine_with_db, register};

#[tokio::test]
async fn register_returns_the_stored_profile() {
    let (engine, _db) = engine_with_db().await;

    let user = engine
        .register("  alice ", "alice@example.com", "secret")
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.profile_picture, None);
    assert_eq!(engine.user(user.id).await.unwrap(), user);
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .register("alice", "   ", "secret")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("Please fill all fields".to_string())
    );
}

#[tokio::test]
async fn register_rejects_taken_email_or_username() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "alice").await;

    let same_email = engine
        .register("alice2", "alice@example.com", "password")
        .await
        .unwrap_err();
    assert_eq!(
        same_email,
        EngineError::ExistingKey("User already exists".to_string())
    );

    let same_username = engine
        .register("alice", "other@example.com", "password")
        .await
        .unwrap_err();
    assert_eq!(
        same_username,
        EngineError::ExistingKey("User already exists".to_string())
    );
}

#[tokio::test]
async fn login_checks_the_password() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let logged = engine
        .login("alice@example.com", "password")
        .await
        .unwrap();
    assert_eq!(logged.id, alice.id);
    assert_eq!(logged.username, "alice");

    let wrong = engine
        .login("alice@example.com", "nope")
        .await
        .unwrap_err();
    assert_eq!(wrong, EngineError::InvalidCredentials);

    let unknown = engine
        .login("ghost@example.com", "password")
        .await
        .unwrap_err();
    assert_eq!(unknown, EngineError::InvalidCredentials);
}

#[tokio::test]
async fn profile_picture_is_set_and_cleared() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let updated = engine
        .set_profile_picture(alice.id, Some("/uploads/alice.png"))
        .await
        .unwrap();
    assert_eq!(updated.profile_picture.as_deref(), Some("/uploads/alice.png"));

    let cleared = engine.set_profile_picture(alice.id, Some("  ")).await.unwrap();
    assert_eq!(cleared.profile_picture, None);
}

#[tokio::test]
async fn delete_user_removes_everything_they_own() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    befriend(&engine, &alice, &bob).await;
    engine
        .create_transaction(alice.id, NewTransaction::new(1_250, "Food"))
        .await
        .unwrap();
    engine
        .upsert_budget(alice.id, Some("Food"), Some(10_000), None)
        .await
        .unwrap();
    engine
        .create_post(alice.id, NewPost::default().description("lunch"))
        .await
        .unwrap();

    engine.delete_user(alice.id).await.unwrap();

    assert_eq!(
        engine.user(alice.id).await.unwrap_err(),
        EngineError::KeyNotFound("User not found".to_string())
    );
    assert!(engine.list_friends(bob.id).await.unwrap().is_empty());
    assert!(engine.list_posts().await.unwrap().is_empty());
    assert!(engine.list_transactions(alice.id).await.unwrap().is_empty());
    assert!(engine.list_budgets(alice.id).await.unwrap().is_empty());

    // The email is free again.
    register(&engine, "alice").await;
}

#[tokio::test]
async fn delete_missing_user_fails() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.delete_user(42).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("User not found".to_string()));
}
