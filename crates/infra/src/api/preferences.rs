//! App preferences endpoint
//!
//! The c-api host stores the mobile app preferences as base64 encoded JSON,
//! returned either as the whole body (a JSON string) or in a `preferences`
//! field.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use emporia_domain::constants::APP_PREFERENCES_PATH;
use emporia_domain::Result;
use serde_json::Value;
use tracing::error;

use super::client::{ApiHost, EmporiaClient};

impl EmporiaClient {
    /// Decoded app preferences; the raw answer when it does not decode
    pub async fn app_preferences(&self) -> Result<Value> {
        let raw: Value = self.get_json(ApiHost::CApi, APP_PREFERENCES_PATH, &[]).await?;
        Ok(decode_preferences(raw))
    }
}

/// Decode a preferences answer, returning it unchanged when it carries no
/// encoded payload or the payload is not base64 JSON.
pub fn decode_preferences(raw: Value) -> Value {
    let encoded = match &raw {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => map.get("preferences").and_then(Value::as_str),
        _ => None,
    };
    let Some(encoded) = encoded.map(str::trim).filter(|text| !text.is_empty()) else {
        return raw;
    };

    match decode_base64_json(encoded) {
        Ok(decoded) => decoded,
        Err(message) => {
            error!(error = %message, "Error decoding app preferences");
            raw
        }
    }
}

fn decode_base64_json(encoded: &str) -> std::result::Result<Value, String> {
    let bytes = STANDARD
        .decode(encoded)
        .or_else(|_| STANDARD_NO_PAD.decode(encoded))
        .map_err(|e| format!("invalid base64: {e}"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("invalid JSON payload: {e}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::testing::client;

    fn encode(value: &Value) -> String {
        STANDARD.encode(serde_json::to_vec(value).unwrap())
    }

    #[test]
    fn test_whole_body_is_encoded() {
        let prefs = json!({"currency": "CAD", "theme": "dark"});
        assert_eq!(decode_preferences(Value::String(encode(&prefs))), prefs);
    }

    #[test]
    fn test_preferences_field_is_encoded() {
        let prefs = json!({"energyUnit": "KilowattHours"});
        let raw = json!({"preferences": encode(&prefs), "version": 3});
        assert_eq!(decode_preferences(raw), prefs);
    }

    #[test]
    fn test_plain_json_passes_through() {
        let raw = json!({"theme": "light"});
        assert_eq!(decode_preferences(raw.clone()), raw);

        let empty = json!({"preferences": ""});
        assert_eq!(decode_preferences(empty.clone()), empty);
    }

    #[test]
    fn test_undecodable_payload_returns_raw() {
        let raw = json!({"preferences": "%%% not base64 %%%"});
        assert_eq!(decode_preferences(raw.clone()), raw);

        let not_json = Value::String(STANDARD.encode(b"plain text"));
        assert_eq!(decode_preferences(not_json.clone()), not_json);
    }

    #[tokio::test]
    async fn test_app_preferences_request_shape() {
        let prefs = json!({"currency": "CAD", "energyUnit": "KilowattHours"});
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/c/v1/customers/app-preferences"))
            .and(header("Authorization", "Bearer token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"preferences": encode(&prefs), "version": 3})),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).app_preferences().await.unwrap(), prefs);
    }
}
