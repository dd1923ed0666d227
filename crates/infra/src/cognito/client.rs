//! Cognito identity provider client
//!
//! Speaks the AWS JSON 1.1 protocol directly: every operation is a `POST /`
//! with the operation named in `X-Amz-Target`. A password login is two
//! round trips (`InitiateAuth` with `USER_SRP_AUTH`, then
//! `RespondToAuthChallenge` answering `PASSWORD_VERIFIER`).

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use emporia_common::auth::{
    secret_hash, CognitoSrp, IdentityError, IdentityProvider, PasswordVerifierChallenge,
    TokenSet, PASSWORD_VERIFIER_CHALLENGE,
};
use emporia_domain::Config;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::types::{
    amz_target, AuthResponse, ErrorBody, InitiateAuthRequest, RespondToAuthChallengeRequest,
    REFRESH_TOKEN_AUTH, USER_SRP_AUTH,
};
use crate::http::HttpClient;

const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Identity provider backed by a Cognito user pool
pub struct CognitoIdentityClient {
    http: HttpClient,
    endpoint: String,
    user_pool_id: String,
    client_id: String,
    client_secret: Option<String>,
    /// `USER_ID_FOR_SRP` of the last login, needed for refresh `SECRET_HASH`
    last_user_id: Mutex<Option<String>>,
}

impl CognitoIdentityClient {
    pub fn new(
        http: HttpClient,
        endpoint: impl Into<String>,
        user_pool_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
            client_secret: None,
            last_user_id: Mutex::new(None),
        }
    }

    /// Client for the pool, app client and region named in `config`
    pub fn from_config(config: &Config, http: HttpClient) -> Self {
        Self::new(http, config.cognito_endpoint(), &config.user_pool_id, &config.client_id)
            .with_client_secret(config.client_secret.clone())
    }

    #[must_use]
    pub fn with_client_secret(mut self, client_secret: Option<String>) -> Self {
        self.client_secret = client_secret;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<Req, Resp>(&self, operation: &str, body: &Req) -> Result<Resp, IdentityError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|e| IdentityError::InvalidResponse(format!("Failed to encode request: {e}")))?;

        let request = self
            .http
            .request(Method::POST, &self.endpoint)
            .header("X-Amz-Target", amz_target(operation))
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(payload);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| IdentityError::Transport(e.to_string()))?;
        debug!(operation, %status, "Identity provider responded");

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|e| {
                IdentityError::InvalidResponse(format!("{operation} response: {e}"))
            });
        }

        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) if body.kind.is_some() || body.message.is_some() => {
                let kind = body.exception_name();
                let message = body.message.unwrap_or_default();
                warn!(operation, %status, kind = %kind, "Identity provider rejected request");
                Err(IdentityError::Rejected { kind, message })
            }
            _ if status.is_server_error() => {
                Err(IdentityError::Transport(format!("{operation} returned status {status}")))
            }
            _ => Err(IdentityError::InvalidResponse(format!(
                "{operation} returned status {status}: {text}"
            ))),
        }
    }

    async fn initiate_auth(
        &self,
        auth_flow: &str,
        auth_parameters: BTreeMap<String, String>,
    ) -> Result<AuthResponse, IdentityError> {
        let request = InitiateAuthRequest { auth_flow, client_id: &self.client_id, auth_parameters };
        self.call("InitiateAuth", &request).await
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityClient {
    #[instrument(skip(self, password), fields(pool = %self.user_pool_id))]
    async fn authenticate_srp(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenSet, IdentityError> {
        let srp = CognitoSrp::new(&self.user_pool_id, &self.client_id, username, password)?
            .with_client_secret(self.client_secret.clone());

        let initiated = self.initiate_auth(USER_SRP_AUTH, srp.auth_parameters()?).await?;
        let challenge_name = initiated.challenge_name.clone().unwrap_or_default();
        if challenge_name != PASSWORD_VERIFIER_CHALLENGE {
            return Err(IdentityError::UnsupportedChallenge(if challenge_name.is_empty() {
                "none".to_string()
            } else {
                challenge_name
            }));
        }

        let parameters = initiated.challenge_parameters.ok_or_else(|| {
            IdentityError::InvalidResponse("PASSWORD_VERIFIER without ChallengeParameters".into())
        })?;
        let challenge: PasswordVerifierChallenge = serde_json::from_value(parameters)
            .map_err(|e| IdentityError::InvalidResponse(format!("ChallengeParameters: {e}")))?;

        let responses = srp.process_challenge(&challenge, Utc::now())?;
        let request = RespondToAuthChallengeRequest {
            challenge_name: PASSWORD_VERIFIER_CHALLENGE,
            client_id: &self.client_id,
            challenge_responses: responses,
            session: initiated.session,
        };
        let answered: AuthResponse = self.call("RespondToAuthChallenge", &request).await?;

        if let Some(next) = answered.challenge_name.filter(|_| answered.authentication_result.is_none())
        {
            return Err(IdentityError::UnsupportedChallenge(next));
        }
        let result = answered.authentication_result.ok_or_else(|| {
            IdentityError::InvalidResponse("RespondToAuthChallenge without AuthenticationResult".into())
        })?;

        *self.last_user_id.lock().await = Some(challenge.user_id_for_srp);
        info!("SRP authentication completed");
        Ok(result.into())
    }

    #[instrument(skip(self, refresh_token), fields(pool = %self.user_pool_id))]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, IdentityError> {
        let mut parameters = BTreeMap::new();
        parameters.insert("REFRESH_TOKEN".to_string(), refresh_token.to_string());
        if let Some(secret) = &self.client_secret {
            if let Some(user_id) = self.last_user_id.lock().await.as_deref() {
                parameters
                    .insert("SECRET_HASH".to_string(), secret_hash(user_id, &self.client_id, secret)?);
            }
        }

        let response = self.initiate_auth(REFRESH_TOKEN_AUTH, parameters).await?;
        let result = response.authentication_result.ok_or_else(|| {
            IdentityError::InvalidResponse("REFRESH_TOKEN_AUTH without AuthenticationResult".into())
        })?;

        debug!("Tokens refreshed");
        Ok(result.into())
    }
}
