//! Emporia cloud API client
//!
//! Sends authenticated requests to the two vendor hosts. Every request
//! carries the Cognito id token as `authToken`; the c-api host additionally
//! wants it as a bearer token. A 401 answer triggers one re-authentication
//! and one retry of the same request.

use std::sync::Arc;

use emporia_domain::{ApiConfig, EmporiaError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::auth::IdTokenProvider;
use super::errors::ApiError;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Header carrying the id token on both hosts
pub const AUTH_TOKEN_HEADER: &str = "authToken";

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Which vendor host a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiHost {
    /// `api.emporiaenergy.com`
    Legacy,
    /// `c-api.emporiaenergy.com`
    CApi,
}

/// API client for the Emporia hosts
pub struct EmporiaClient {
    http: HttpClient,
    auth: Arc<dyn IdTokenProvider>,
    config: ApiConfig,
}

impl EmporiaClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns error if a base URL is invalid or the HTTP client cannot be
    /// created
    pub fn new(config: ApiConfig, auth: Arc<dyn IdTokenProvider>) -> Result<Self> {
        validate_base_urls(&config)?;
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .max_attempts(config.max_attempts)
            .build()?;
        Ok(Self::with_http_client(config, auth, http))
    }

    /// Create a client sharing an existing HTTP client
    pub fn with_http_client(
        config: ApiConfig,
        auth: Arc<dyn IdTokenProvider>,
        http: HttpClient,
    ) -> Self {
        Self { http, auth, config }
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> EmporiaClientBuilder {
        EmporiaClientBuilder::default()
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Absolute URL of `path` on `host`
    pub fn url(&self, host: ApiHost, path: &str) -> String {
        let base = match host {
            ApiHost::Legacy => &self.config.base_url,
            ApiHost::CApi => &self.config.c_api_base_url,
        };
        format!("{}{}", base.trim_end_matches('/'), path)
    }

    /// Execute a GET request and decode the JSON body
    ///
    /// # Errors
    ///
    /// Returns error if authentication or the request fails, the status is
    /// not a success or the body does not decode into `T`
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        host: ApiHost,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.execute(Method::GET, host, path, query, None).await?;
        decode(response).await
    }

    /// Execute a PUT request with a JSON body and decode the JSON answer
    ///
    /// # Errors
    ///
    /// Same as [`EmporiaClient::get_json`]
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put_json<B, T>(&self, host: ApiHost, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, host, path, &[], Some(&body)).await?;
        decode(response).await
    }

    /// Execute a PATCH request with a JSON body, ignoring the answer body
    ///
    /// # Errors
    ///
    /// Returns error if authentication or the request fails or the status is
    /// not a success
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn patch_json<B>(&self, host: ApiHost, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.execute(Method::PATCH, host, path, &[], Some(&body)).await?;
        Ok(())
    }

    /// Current id token from the token provider
    pub(crate) async fn id_token(&self) -> Result<String> {
        self.auth.id_token().await
    }

    /// Replace an id token the API rejected
    pub(crate) async fn reauthenticate(&self, rejected_id_token: &str) -> Result<String> {
        self.auth.reauthenticate(rejected_id_token).await
    }

    /// Open a long-lived GET on the c-api host, without the 401 retry
    ///
    /// The caller sees the raw status and decides how to reconnect.
    pub(crate) async fn open_stream(
        &self,
        path: &str,
        query: &[(&str, String)],
        accept: &str,
        id_token: &str,
    ) -> Result<Response> {
        let builder = self
            .http
            .streaming_request(Method::GET, self.url(ApiHost::CApi, path))
            .query(query)
            .header(AUTH_TOKEN_HEADER, id_token)
            .header(ACCEPT, accept)
            .bearer_auth(id_token);
        self.http.send(builder).await
    }

    async fn execute(
        &self,
        method: Method,
        host: ApiHost,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Response> {
        let token = self.auth.id_token().await?;
        let response = self.send_once(&method, host, path, query, body, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response, path).await;
        }

        warn!(%method, path, "Emporia rejected the id token, re-authenticating and retrying");
        let token = self.auth.reauthenticate(&token).await?;
        let response = self.send_once(&method, host, path, query, body, &token).await?;
        check_status(response, path).await
    }

    async fn send_once(
        &self,
        method: &Method,
        host: ApiHost,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        token: &str,
    ) -> Result<Response> {
        let mut builder = self.http.request(method.clone(), self.url(host, path));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder = authorize(builder, host, token);
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, JSON_UTF8).json(body);
        }

        debug!(%method, ?host, path, "Emporia request");
        self.http.send(builder).await
    }
}

fn authorize(builder: RequestBuilder, host: ApiHost, token: &str) -> RequestBuilder {
    let builder = builder.header(AUTH_TOKEN_HEADER, token);
    match host {
        ApiHost::Legacy => builder,
        ApiHost::CApi => builder.header(ACCEPT, "application/json").bearer_auth(token),
    }
}

async fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = ApiError::from_status(status, path, &body);
    warn!(path, %status, category = ?error.category(), "Emporia request failed");
    Err(error.into())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| EmporiaError::from(InfraError::from(e)))?;

    // No-content answers decode from `null` (`()`, `Option`, `Value`)
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(Value::Null).map_err(|_| {
            EmporiaError::Decode(format!(
                "Empty response ({}), but response type cannot be deserialized from empty body",
                status.as_u16()
            ))
        });
    }

    serde_json::from_slice(&bytes).map_err(EmporiaError::from)
}

fn validate_base_urls(config: &ApiConfig) -> Result<()> {
    for (key, value) in [("base_url", &config.base_url), ("c_api_base_url", &config.c_api_base_url)]
    {
        let parsed = url::Url::parse(value)
            .map_err(|e| EmporiaError::Config(format!("Invalid api.{key} '{value}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(EmporiaError::Config(format!(
                "api.{key} must be an http(s) URL: {value}"
            )));
        }
    }
    Ok(())
}

/// Builder for [`EmporiaClient`]
#[derive(Default)]
pub struct EmporiaClientBuilder {
    config: Option<ApiConfig>,
    auth: Option<Arc<dyn IdTokenProvider>>,
    http: Option<HttpClient>,
}

impl EmporiaClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the authentication provider
    pub fn auth(mut self, auth: Arc<dyn IdTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Share an HTTP client (e.g. with the identity client)
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or client creation fails
    pub fn build(self) -> Result<EmporiaClient> {
        let config = self.config.unwrap_or_default();
        let auth = self
            .auth
            .ok_or_else(|| EmporiaError::Config("Auth provider not set".to_string()))?;

        match self.http {
            Some(http) => {
                validate_base_urls(&config)?;
                Ok(EmporiaClient::with_http_client(config, auth, http))
            }
            None => EmporiaClient::new(config, auth),
        }
    }
}
