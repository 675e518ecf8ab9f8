use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{FeedRelay, ServerConfig, ServerState, router, types::post::PostView};

async fn app() -> (Router, FeedRelay) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    let state = ServerState::new(engine, &ServerConfig::new("test-secret"));
    let feed = state.feed.clone();
    (router(state), feed)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(request(method, uri, token, body))
        .await
        .unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Registers `username` and returns `(id, token)`.
async fn register(app: &Router, username: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (
        body["id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn register_then_login() {
    let (app, _) = app().await;
    let (id, _) = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "alice2", "email": "alice@example.com", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64(), Some(id));
    assert_eq!(body["username"], "alice");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["profile_picture"], Value::Null);
}

#[tokio::test]
async fn register_with_missing_fields_is_rejected() {
    let (app, _) = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please fill all fields");
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let (app, _) = app().await;

    let (status, body) = send(&app, "GET", "/api/friends", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authorized, no token");

    let (status, body) = send(&app, "GET", "/api/friends", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authorized, token failed");
}

#[tokio::test]
async fn token_of_a_deleted_account_stops_working() {
    let (app, _) = app().await;
    let (_, token) = register(&app, "alice").await;

    let (status, body) = send(&app, "DELETE", "/api/auth/delete", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account successfully deleted");

    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn friend_request_flow() {
    let (app, _) = app().await;
    let (alice_id, alice) = register(&app, "alice").await;
    let (bob_id, bob) = register(&app, "bob").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/friends/request",
        Some(&alice),
        Some(json!({"recipientId": alice_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You can't friend yourself!");

    let (status, body) = send(
        &app,
        "POST",
        "/api/friends/request",
        Some(&alice),
        Some(json!({"recipientId": bob_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Friend request sent!");

    let (status, body) = send(
        &app,
        "POST",
        "/api/friends/request",
        Some(&bob),
        Some(json!({"recipientId": alice_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Friend request already exists or is pending.");

    let (_, pending) = send(&app, "GET", "/api/friends/pending", Some(&bob), None).await;
    assert_eq!(pending[0]["sender_id"].as_i64(), Some(alice_id));
    assert_eq!(pending[0]["username"], "alice");

    let (status, body) = send(
        &app,
        "POST",
        "/api/friends/accept",
        Some(&bob),
        Some(json!({"senderId": alice_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Friend request accepted!");

    let (_, friends) = send(&app, "GET", "/api/friends", Some(&alice), None).await;
    assert_eq!(friends[0]["username"], "bob");
    let (_, pending) = send(&app, "GET", "/api/friends/pending", Some(&bob), None).await;
    assert_eq!(pending, json!([]));

    let (status, body) = send(
        &app,
        "POST",
        "/api/friends/remove",
        Some(&alice),
        Some(json!({"friendId": bob_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Friend removed successfully.");
}

#[tokio::test]
async fn search_requires_a_query() {
    let (app, _) = app().await;
    let (_, alice) = register(&app, "alice").await;
    register(&app, "bob").await;

    let (status, body) = send(&app, "GET", "/api/friends/search", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query is required");

    let (status, body) = send(
        &app,
        "GET",
        "/api/friends/search?query=BO",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["username"], "bob");
}

#[tokio::test]
async fn malformed_requests_get_a_json_bad_request() {
    let (app, _) = app().await;
    let (_, alice) = register(&app, "alice").await;

    let cases = [
        ("POST", "/api/friends/request", Some(json!({}))),
        (
            "POST",
            "/api/transactions",
            Some(json!({"amount_minor": "12.50", "category": "Food"})),
        ),
        (
            "POST",
            "/api/budgets",
            Some(json!({"category": "Food", "amount_minor": 10000, "period": "daily"})),
        ),
        ("DELETE", "/api/transactions/abc", None),
    ];
    for (method, uri, body) in cases {
        let (status, body) = send(&app, method, uri, Some(&alice), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert!(body["error"].is_string(), "{method} {uri}: {body}");
    }

    let (_, list) = send(&app, "GET", "/api/budgets", Some(&alice), None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn transactions_belong_to_their_owner() {
    let (app, _) = app().await;
    let (_, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;

    let (status, tx) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(&alice),
        Some(json!({"amount_minor": 1250, "category": "Food"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/transactions/{}", tx["id"]);

    let (status, body) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(&alice),
        Some(json!({"category": "Food"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Amount and category are required.");

    let (status, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, list) = send(&app, "GET", "/api/transactions", Some(&alice), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, updated) = send(
        &app,
        "PUT",
        &uri,
        Some(&alice),
        Some(json!({"amount_minor": 1500})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amount_minor"], 1500);
    assert_eq!(updated["category"], "Food");

    let (status, body) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted");
    let (_, list) = send(&app, "GET", "/api/transactions", Some(&alice), None).await;
    assert_eq!(list, json!([]));

    let (status, body) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Transaction not found");
}

#[tokio::test]
async fn budget_summary_and_leaderboard() {
    let (app, _) = app().await;
    let (_, alice) = register(&app, "alice").await;
    register(&app, "bob").await;

    let (status, budget) = send(
        &app,
        "POST",
        "/api/budgets",
        Some(&alice),
        Some(json!({"category": "Groceries", "amount_minor": 20000})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(budget["period"], "monthly");

    send(
        &app,
        "POST",
        "/api/transactions",
        Some(&alice),
        Some(json!({"amount_minor": 5000, "category": "Groceries"})),
    )
    .await;

    let (status, summary) = send(&app, "GET", "/api/budgets/summary", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary[0]["category"], "Groceries");
    assert_eq!(summary[0]["total_spent_minor"], 5000);
    assert_eq!(summary[0]["remaining_amount_minor"], 15000);

    let (status, board) = send(&app, "GET", "/api/leaderboard/global", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board[0]["username"], "alice");
    assert_eq!(board[0]["savings_percentage"], 0.75);
    assert_eq!(board[1]["username"], "bob");
    assert_eq!(board[1]["savings_percentage"], Value::Null);

    let (_, friends_board) =
        send(&app, "GET", "/api/leaderboard/friends", Some(&alice), None).await;
    assert_eq!(friends_board, json!([]));

    let uri = format!("/api/budgets/{}", budget["id"]);
    let (status, _) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, summary) = send(&app, "GET", "/api/budgets/summary", Some(&alice), None).await;
    assert_eq!(summary, json!([]));
}

#[tokio::test]
async fn new_posts_reach_open_feed_streams() {
    let (app, feed) = app().await;
    let (_, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;

    let stream = app
        .clone()
        .oneshot(request("GET", "/api/posts/stream", Some(&bob), None))
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);
    assert_eq!(stream.headers()[header::CONTENT_TYPE], "text/event-stream");
    let mut body = stream.into_body();

    let (status, post) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&alice),
        Some(json!({"amount_minor": 450, "category": "Coffee", "description": " flat white "})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["username"], "alice");
    assert_eq!(post["description"], "flat white");

    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let data = frame.into_data().unwrap();
    let text = std::str::from_utf8(&data).unwrap();
    let payload = text.trim().strip_prefix("data: ").unwrap();
    let event: Value = serde_json::from_str(payload).unwrap();
    assert_eq!(event["id"], post["id"]);
    assert_eq!(event["category"], "Coffee");

    drop(body);
    let (_, feed_list) = send(&app, "GET", "/api/posts", Some(&bob), None).await;
    assert_eq!(feed_list[0]["id"], post["id"]);
    // The closed stream no longer counts as a subscriber.
    let again: PostView = serde_json::from_value(post).unwrap();
    assert_eq!(feed.publish(again), 0);
}

#[tokio::test]
async fn only_the_author_deletes_a_post() {
    let (app, _) = app().await;
    let (_, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;

    let (_, post) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&alice),
        Some(json!({"description": "lunch", "amount_minor": 1500})),
    )
    .await;
    assert_eq!(post["amount_minor"], 1500);
    let uri = format!("/api/posts/{}", post["id"]);

    let (status, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &app,
        "PUT",
        &uri,
        Some(&alice),
        Some(json!({"description": "dinner", "amount_minor": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "dinner");
    assert_eq!(updated["amount_minor"], Value::Null);

    let (status, body) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post deleted");
}
