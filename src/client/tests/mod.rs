use super::*;
use crate::config::ApiConfig;
use std::time::Duration;
use wiremock::MockServer;

mod auth;

/// Helper to create a client pointed at a mock backend
fn client_for(server: &MockServer) -> ApiClient {
    let config = ApiConfig {
        base_url: format!("{}/api", server.uri()),
        request_timeout: Duration::from_secs(5),
    };
    ApiClient::new(&config).expect("mock server URI must be a valid base URL")
}

/// Helper to create a client with a session token already in place
async fn authed_client_for(server: &MockServer) -> ApiClient {
    let client = client_for(server);
    client.set_token("test-token").await;
    client
}

#[test]
fn invalid_base_url_is_rejected_at_construction() {
    let config = ApiConfig {
        base_url: "not a url".to_string(),
        request_timeout: Duration::from_secs(5),
    };

    let result = ApiClient::new(&config);
    assert!(matches!(result, Err(crate::error::Error::Config { .. })));
}

#[test]
fn trailing_slash_in_base_url_is_normalized() {
    let config = ApiConfig {
        base_url: "http://localhost:5000/api/".to_string(),
        request_timeout: Duration::from_secs(5),
    };

    let client = ApiClient::new(&config).expect("valid URL");
    assert_eq!(
        client.endpoint("certificates"),
        "http://localhost:5000/api/certificates"
    );
}

#[tokio::test]
async fn calls_without_a_session_token_fail_before_the_network() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let result = client.list_certificates().await;

    assert!(matches!(result, Err(crate::error::Error::Auth(_))));
    assert!(
        server.received_requests().await.unwrap_or_default().is_empty(),
        "an unauthenticated call must not reach the backend"
    );
}
