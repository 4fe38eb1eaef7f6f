//! Shared fixtures for integration tests.

use cert_desk::{ApiClient, ApiConfig, ExportConfig};
use std::path::Path;
use std::time::Duration;
use wiremock::MockServer;

pub const PDF_BYTES: &[u8] = b"%PDF-1.4 rendered certificate";

/// Client pointed at the mock backend with a session token in place
pub async fn authed_client(server: &MockServer) -> ApiClient {
    let config = ApiConfig {
        base_url: format!("{}/api", server.uri()),
        request_timeout: Duration::from_secs(5),
    };
    let client = ApiClient::new(&config).expect("mock server URI must be valid");
    client.set_token("integration-token").await;
    client
}

/// Export config with zeroed delays so tests run instantly
pub fn quick_export_config(output_dir: &Path) -> ExportConfig {
    ExportConfig {
        max_attempts: 3,
        retry_base_delay: Duration::ZERO,
        inter_item_delay: Duration::ZERO,
        output_dir: output_dir.to_path_buf(),
    }
}
