//! Conversions from external infrastructure errors into domain errors.

use emporia_common::auth::{IdentityError, TokenManagerError};
use emporia_domain::EmporiaError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub EmporiaError);

impl From<InfraError> for EmporiaError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<EmporiaError> for InfraError {
    fn from(value: EmporiaError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoEmporiaError {
    fn into_emporia(self) -> EmporiaError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → EmporiaError */
/* -------------------------------------------------------------------------- */

impl IntoEmporiaError for HttpError {
    fn into_emporia(self) -> EmporiaError {
        if self.is_timeout() {
            return EmporiaError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return EmporiaError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return EmporiaError::Decode(format!("Failed to decode HTTP body: {self}"));
        }

        if self.is_builder() {
            return EmporiaError::Internal(format!("Invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => EmporiaError::Auth(message),
                404 => EmporiaError::NotFound(message),
                _ => EmporiaError::Api { status: code, message },
            };
        }

        EmporiaError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_emporia())
    }
}

/* -------------------------------------------------------------------------- */
/* TokenManagerError → EmporiaError */
/* -------------------------------------------------------------------------- */

impl IntoEmporiaError for TokenManagerError {
    fn into_emporia(self) -> EmporiaError {
        match self {
            Self::AuthenticationFailed(IdentityError::Transport(message)) => {
                EmporiaError::Network(format!("Identity provider unreachable: {message}"))
            }
            missing @ Self::MissingCredentials => EmporiaError::Config(missing.to_string()),
            other => EmporiaError::Auth(other.to_string()),
        }
    }
}

impl From<TokenManagerError> for InfraError {
    fn from(value: TokenManagerError) -> Self {
        InfraError(value.into_emporia())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: EmporiaError = InfraError::from(error).into();
        match mapped {
            EmporiaError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn http_status_500_keeps_status_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::BAD_GATEWAY))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: EmporiaError = InfraError::from(error).into();
        assert!(matches!(mapped, EmporiaError::Api { status: 502, .. }));
    }

    #[test]
    fn token_errors_split_transport_from_rejection() {
        let unreachable =
            TokenManagerError::AuthenticationFailed(IdentityError::Transport("dns".into()));
        assert!(matches!(
            EmporiaError::from(InfraError::from(unreachable)),
            EmporiaError::Network(_)
        ));

        let rejected = TokenManagerError::AuthenticationFailed(IdentityError::Rejected {
            kind: "NotAuthorizedException".into(),
            message: "Incorrect username or password.".into(),
        });
        let mapped = EmporiaError::from(InfraError::from(rejected));
        assert!(mapped.is_unauthorized());
        assert!(mapped.to_string().contains("Incorrect username or password."));

        let missing = EmporiaError::from(InfraError::from(TokenManagerError::MissingCredentials));
        assert!(matches!(missing, EmporiaError::Config(_)));
    }
}
