//! HTTP-level tests for the gateway router.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use outreach_auth::Role;
use outreach_config::AuthConfig;
use outreach_gateway::{create_router, GatewayState};
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../database/migrations");

struct Harness {
    app: Router,
    state: GatewayState,
    _temp_dir: TempDir,
}

async fn harness() -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("gateway_tests.db");

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.unwrap();
    MIGRATOR.run(&pool).await.unwrap();

    let state = GatewayState::new(pool, AuthConfig::default());
    let app = create_router(state.clone());

    Harness {
        app,
        state,
        _temp_dir: temp_dir,
    }
}

async fn send_request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }));

    (status, value, content_type)
}

/// Register a user over HTTP and log them in, returning (public id, token).
async fn register_and_login(h: &Harness, email: &str, role: Role) -> (String, String) {
    let (status, user, _) = send_request(
        &h.app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": "correct horse battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let public_id = user["id"].as_str().unwrap().to_string();

    if role != Role::Volunteer {
        let internal = h
            .state
            .authenticator
            .find_user_by_public_id(&public_id)
            .await
            .unwrap()
            .unwrap();
        h.state
            .authenticator
            .set_role(internal.id, role)
            .await
            .unwrap();
    }

    let (status, session, _) = send_request(
        &h.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "correct horse battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (public_id, session["token"].as_str().unwrap().to_string())
}

async fn create_channel(h: &Harness, token: &str, name: &str) -> String {
    let (status, channel, _) = send_request(
        &h.app,
        Method::POST,
        "/api/messaging/channels",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    channel["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_probe_reports_ok() {
    let h = harness().await;
    let (status, body, _) = send_request(&h.app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn me_requires_a_valid_session() {
    let h = harness().await;

    let (status, _, _) = send_request(&h.app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) =
        send_request(&h.app, Method::GET, "/api/auth/me", Some("bogus-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, token) = register_and_login(&h, "alice@example.org", Role::Volunteer).await;
    let (status, body, _) =
        send_request(&h.app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.org");
    assert_eq!(body["role"], "volunteer");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let h = harness().await;
    register_and_login(&h, "alice@example.org", Role::Volunteer).await;

    let (status, body, _) = send_request(
        &h.app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "alice@example.org", "password": "another" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn send_then_search_round_trip() {
    let h = harness().await;
    let (_, founder) = register_and_login(&h, "founder@example.org", Role::Founder).await;
    let channel_id = create_channel(&h, &founder, "general").await;

    let (status, body, _) = send_request(
        &h.app,
        Method::POST,
        "/api/messaging/send",
        Some(&founder),
        Some(json!({ "content": "hello", "channelId": channel_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], true);
    let message_id = body["id"].as_str().unwrap().to_string();

    let (status, body, _) = send_request(
        &h.app,
        Method::GET,
        &format!("/api/messaging/search?channelId={channel_id}&q=hello"),
        Some(&founder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["id"], message_id.as_str());
    assert_eq!(messages[0]["content"], "hello");
    assert_eq!(messages[0]["channelId"], channel_id.as_str());
}

#[tokio::test]
async fn send_with_both_destinations_is_a_validation_error() {
    let h = harness().await;
    let (peer_id, _) = register_and_login(&h, "peer@example.org", Role::Volunteer).await;
    let (_, founder) = register_and_login(&h, "founder@example.org", Role::Founder).await;
    let channel_id = create_channel(&h, &founder, "general").await;

    let (status, body, _) = send_request(
        &h.app,
        Method::POST,
        "/api/messaging/send",
        Some(&founder),
        Some(json!({
            "content": "ambiguous",
            "channelId": channel_id,
            "recipientId": peer_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("not both"));
}

#[tokio::test]
async fn channel_search_by_non_member_is_forbidden() {
    let h = harness().await;
    let (_, founder) = register_and_login(&h, "founder@example.org", Role::Founder).await;
    let (_, outsider) = register_and_login(&h, "outsider@example.org", Role::Volunteer).await;
    let channel_id = create_channel(&h, &founder, "board").await;

    let (status, _, _) = send_request(
        &h.app,
        Method::GET,
        &format!("/api/messaging/search?channelId={channel_id}"),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // After joining, the same search succeeds.
    let (status, _, _) = send_request(
        &h.app,
        Method::POST,
        &format!("/api/messaging/channels/{channel_id}/join"),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send_request(
        &h.app,
        Method::GET,
        &format!("/api/messaging/search?channelId={channel_id}"),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn export_is_founder_only_and_served_as_csv_attachment() {
    let h = harness().await;
    let (_, founder) = register_and_login(&h, "founder@example.org", Role::Founder).await;
    let (_, volunteer) = register_and_login(&h, "volunteer@example.org", Role::Volunteer).await;
    let channel_id = create_channel(&h, &founder, "general").await;

    send_request(
        &h.app,
        Method::POST,
        "/api/messaging/send",
        Some(&founder),
        Some(json!({ "content": "for the record", "channelId": channel_id })),
    )
    .await;

    let (status, _, _) = send_request(
        &h.app,
        Method::GET,
        "/api/messaging/export",
        Some(&volunteer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body, content_type) = send_request(
        &h.app,
        Method::GET,
        &format!("/api/messaging/export?channelId={channel_id}"),
        Some(&founder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/csv; charset=utf-8"));
    let raw = body["raw"].as_str().unwrap();
    assert!(raw.starts_with("id,sender_id,recipient_id,channel_id,content,created_at\n"));
    assert!(raw.contains("for the record"));
}

#[tokio::test]
async fn edit_and_delete_follow_ownership_rules() {
    let h = harness().await;
    let (_, founder) = register_and_login(&h, "founder@example.org", Role::Founder).await;
    let (_, volunteer) = register_and_login(&h, "volunteer@example.org", Role::Volunteer).await;
    let channel_id = create_channel(&h, &founder, "general").await;

    send_request(
        &h.app,
        Method::POST,
        &format!("/api/messaging/channels/{channel_id}/join"),
        Some(&volunteer),
        None,
    )
    .await;

    let (_, body, _) = send_request(
        &h.app,
        Method::POST,
        "/api/messaging/send",
        Some(&volunteer),
        Some(json!({ "content": "draft", "channelId": channel_id })),
    )
    .await;
    let message_id = body["id"].as_str().unwrap().to_string();

    // The founder is not the sender, so edit is forbidden.
    let (status, _, _) = send_request(
        &h.app,
        Method::PATCH,
        &format!("/api/messaging/messages/{message_id}"),
        Some(&founder),
        Some(json!({ "content": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body, _) = send_request(
        &h.app,
        Method::PATCH,
        &format!("/api/messaging/messages/{message_id}"),
        Some(&volunteer),
        Some(json!({ "content": "final" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "final");
    assert!(body["editedAt"].is_string());

    // Staff may delete another user's message.
    let (status, _, _) = send_request(
        &h.app,
        Method::DELETE,
        &format!("/api/messaging/messages/{message_id}"),
        Some(&founder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send_request(
        &h.app,
        Method::DELETE,
        &format!("/api/messaging/messages/{message_id}"),
        Some(&founder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn direct_messages_flow_between_two_users() {
    let h = harness().await;
    let (alice_id, alice) = register_and_login(&h, "alice@example.org", Role::Volunteer).await;
    let (bob_id, bob) = register_and_login(&h, "bob@example.org", Role::Volunteer).await;

    let (status, _, _) = send_request(
        &h.app,
        Method::POST,
        "/api/messaging/send",
        Some(&alice),
        Some(json!({ "content": "hi bob", "recipientId": bob_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body, _) = send_request(
        &h.app,
        Method::GET,
        &format!("/api/messaging/direct/{alice_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hi bob");
    assert_eq!(messages[0]["recipientId"], bob_id.as_str());
}
