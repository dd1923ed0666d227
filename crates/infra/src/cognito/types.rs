//! Wire shapes of the Cognito identity provider JSON 1.1 protocol

use std::collections::BTreeMap;

use emporia_common::auth::TokenSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const USER_SRP_AUTH: &str = "USER_SRP_AUTH";
pub const REFRESH_TOKEN_AUTH: &str = "REFRESH_TOKEN_AUTH";

/// `X-Amz-Target` value for an operation
pub fn amz_target(operation: &str) -> String {
    format!("AWSCognitoIdentityProviderService.{operation}")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateAuthRequest<'a> {
    pub auth_flow: &'a str,
    pub client_id: &'a str,
    pub auth_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RespondToAuthChallengeRequest<'a> {
    pub challenge_name: &'a str,
    pub client_id: &'a str,
    pub challenge_responses: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Response of both `InitiateAuth` and `RespondToAuthChallenge`
///
/// Either a challenge or the final tokens are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub challenge_name: Option<String>,
    #[serde(default)]
    pub challenge_parameters: Option<Value>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub authentication_result: Option<AuthenticationResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub id_token: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl From<AuthenticationResult> for TokenSet {
    fn from(result: AuthenticationResult) -> Self {
        let mut tokens =
            TokenSet::new(result.id_token, result.access_token, result.refresh_token, result.expires_in);
        if let Some(token_type) = result.token_type {
            tokens.token_type = token_type;
        }
        tokens
    }
}

/// Error body: `{"__type": "NotAuthorizedException", "message": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "__type", default)]
    pub kind: Option<String>,
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Exception name without the `namespace#` prefix some endpoints add
    pub fn exception_name(&self) -> String {
        let kind = self.kind.as_deref().unwrap_or("UnknownError");
        kind.rsplit('#').next().unwrap_or(kind).to_string()
    }
}
