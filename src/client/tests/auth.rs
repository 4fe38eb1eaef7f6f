use super::*;
use crate::error::Error;
use crate::types::Role;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn login_stores_the_token_and_returns_the_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({
            "username": "admin",
            "password": "secret",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"_id": "u1", "username": "admin", "role": "admin"},
            "token": "session-token-1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let user = client.login("admin", "secret").await.unwrap();

    assert_eq!(user.username, "admin");
    assert_eq!(user.role, Role::Admin);
    assert_eq!(client.token().await.as_deref(), Some("session-token-1"));
}

#[tokio::test]
async fn rejected_login_surfaces_the_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.login("admin", "wrong").await;

    match result {
        Err(Error::Auth(message)) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected Auth error, got {other:?}"),
    }

    assert_eq!(
        client.token().await,
        None,
        "a failed login must not leave a token behind"
    );
}

#[tokio::test]
async fn logout_clears_the_session_token() {
    let server = MockServer::start().await;
    let client = authed_client_for(&server).await;

    assert!(client.token().await.is_some());
    client.logout().await;
    assert_eq!(client.token().await, None);
}

#[tokio::test]
async fn restored_token_is_attached_to_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/certificates"))
        .and(wiremock::matchers::header(
            "authorization",
            "Bearer saved-session",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.set_token("saved-session").await;

    let certificates = client.list_certificates().await.unwrap();
    assert!(certificates.is_empty());
}
