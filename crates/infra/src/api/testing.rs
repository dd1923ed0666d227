//! Shared fixtures for the endpoint tests

use std::sync::Arc;

use async_trait::async_trait;
use emporia_domain::{ApiConfig, Result};
use wiremock::MockServer;

use super::{EmporiaClient, IdTokenProvider};

/// Always hands out `token`
pub(crate) struct StaticAuth;

#[async_trait]
impl IdTokenProvider for StaticAuth {
    async fn id_token(&self) -> Result<String> {
        Ok("token".into())
    }

    async fn reauthenticate(&self, _rejected_id_token: &str) -> Result<String> {
        Ok("token".into())
    }
}

/// Client whose legacy host is the server root and whose c-api host lives
/// under `/c`, so each mock also pins the host a call goes to
pub(crate) fn client(server: &MockServer) -> EmporiaClient {
    let config = ApiConfig {
        base_url: server.uri(),
        c_api_base_url: format!("{}/c", server.uri()),
        timeout_seconds: 5,
        max_attempts: 1,
    };
    EmporiaClient::new(config, Arc::new(StaticAuth)).unwrap()
}
