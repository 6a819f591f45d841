//! Tests for the bearer-token gate.
//!
//! Tests cover:
//! - Tokens issued at registration/login authorize protected routes
//! - Expired tokens are rejected before the sweeper removes their record
//! - Tampered and foreign tokens are rejected even when a record matches
//! - The sweeper removes only expired records

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::{
    TEST_SECRET, body_json, create_test_app, create_test_app_with_duration, credentials_body,
    json_request, register, session_request,
};
use postgate::{auth::SessionManager, cleanup, db::Database, jwt::JwtConfig};
use std::sync::Arc;
use tower::ServiceExt;

async fn count_sessions(db: &Database) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
        .fetch_one(db.pool())
        .await
        .unwrap();
    row.0
}

fn flip_signature_bit(token: &str) -> String {
    let (signed, signature) = token.rsplit_once('.').unwrap();
    let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
    bytes[0] ^= 0x01;
    format!("{}.{}", signed, URL_SAFE_NO_PAD.encode(bytes))
}

#[tokio::test]
async fn test_valid_token_authorizes() {
    let (app, db) = create_test_app().await;
    let token = register(&app, "alice", "pw123456").await;

    let response = app
        .oneshot(session_request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let user = db.users().get_by_username("alice").await.unwrap().unwrap();
    assert_eq!(json["session_id"], token.as_str());
    assert_eq!(json["user_id"], user.id.as_str());
    assert_eq!(json["username"], "alice");
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let (app, _) = create_test_app().await;

    let response = app.oneshot(session_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("www-authenticate").unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(session_request(Some("Bearer not-a-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_signature_rejected_even_with_matching_record() {
    let (app, db) = create_test_app().await;
    let token = register(&app, "alice", "pw123456").await;
    let user = db.users().get_by_username("alice").await.unwrap().unwrap();

    let tampered = flip_signature_bit(&token);
    assert_ne!(tampered, token);
    db.sessions()
        .create(&tampered, &user.id, i64::MAX)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(session_request(Some(&format!("Bearer {}", tampered))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The original token is unaffected
    let response = app
        .oneshot(session_request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_valid_signature_without_record_is_unauthorized() {
    let (app, db) = create_test_app().await;
    register(&app, "alice", "pw123456").await;
    let user = db.users().get_by_username("alice").await.unwrap().unwrap();

    let unrecorded = JwtConfig::new(TEST_SECRET)
        .issue(&user.id, "alice")
        .unwrap()
        .token;

    let response = app
        .oneshot(session_request(Some(&format!("Bearer {}", unrecorded))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthorized_responses_do_not_reveal_cause() {
    let (app, db) = create_test_app().await;
    let token = register(&app, "alice", "pw123456").await;
    let user = db.users().get_by_username("alice").await.unwrap().unwrap();
    let unrecorded = JwtConfig::new(TEST_SECRET)
        .issue(&user.id, "alice")
        .unwrap()
        .token;

    let mut bodies = Vec::new();
    for header in [
        None,
        Some("Bearer garbage".to_string()),
        Some(format!("Bearer {}", flip_signature_bit(&token))),
        Some(format!("Bearer {}", unrecorded)),
    ] {
        let response = app
            .clone()
            .oneshot(session_request(header.as_deref()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(body_json(response).await);
    }

    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_alice_scenario() {
    let (app, db) = create_test_app_with_duration(1).await;

    register(&app, "alice", "pw123456").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/login",
            credentials_body("alice", "pw123456"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let user = db.users().get_by_username("alice").await.unwrap().unwrap();

    let response = app
        .clone()
        .oneshot(session_request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user_id"], user.id.as_str());

    // Wait past the token lifetime; nothing sweeps in between
    tokio::time::sleep(Duration::from_millis(2100)).await;

    let response = app
        .oneshot(session_request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The record is still stored, the rejection is by timestamp
    let row: Option<(String,)> = sqlx::query_as("SELECT id FROM sessions WHERE id = ?")
        .bind(&token)
        .fetch_optional(db.pool())
        .await
        .unwrap();
    assert!(row.is_some());
}

#[tokio::test]
async fn test_sweep_removes_only_expired_records() {
    let (app, db) = create_test_app_with_duration(1).await;
    let expiring = register(&app, "alice", "pw123456").await;

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let live_sessions = SessionManager::new(&db, Arc::new(JwtConfig::new(TEST_SECRET)));
    let bob = postgate::auth::Credentials::new(&db, 4)
        .register("bob", "pw123456")
        .await
        .unwrap();
    let live = live_sessions.create(&bob).await.unwrap();
    assert_eq!(count_sessions(&db).await, 2);

    cleanup::run_cleanup(&live_sessions).await;

    assert_eq!(count_sessions(&db).await, 1);
    assert!(live_sessions.validate(&live.id).await.is_ok());
    assert!(live_sessions.validate(&expiring).await.is_err());

    let response = app
        .oneshot(session_request(Some(&format!("Bearer {}", live.id))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
