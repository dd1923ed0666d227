//! Cognito flavoured SRP-6a client
//!
//! Implements the client side of the `USER_SRP_AUTH` flow used by AWS
//! Cognito user pools:
//!
//! 1. [`CognitoSrp::auth_parameters`] supplies `USERNAME` and `SRP_A` for
//!    `InitiateAuth`.
//! 2. The pool answers with a `PASSWORD_VERIFIER` challenge (`SRP_B`, `SALT`,
//!    `SECRET_BLOCK`, `USER_ID_FOR_SRP`).
//! 3. [`CognitoSrp::process_challenge`] derives the session key and signs
//!    the claim for `RespondToAuthChallenge`.
//!
//! All big integers travel as hex strings. Hashes are taken over the bytes
//! of "padded" hex, which keeps a leading zero byte whenever the high bit is
//! set so the value reads as positive.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// RFC 5054 3072-bit group prime.
const N_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D",
    "C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F",
    "83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9",
    "DE2BCBF6955817183995497CEA956AE515D2261898FA0510",
    "15728E5A8AAAC42DAD33170D04507A33A85521ABDF1CBA64",
    "ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6B",
    "F12FFA06D98A0864D87602733EC86A64521F2B18177B200C",
    "BBE117577A615D6C770988C0BAD946E208E24FA074E5AB31",
    "43DB5BFCE0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF",
);
const G_HEX: &str = "2";
const DERIVED_KEY_INFO: &[u8] = b"Caldera Derived Key";
const DERIVED_KEY_LEN: usize = 16;
const SMALL_A_BYTES: usize = 128;

/// Challenge name Cognito uses for the SRP verifier step.
pub const PASSWORD_VERIFIER_CHALLENGE: &str = "PASSWORD_VERIFIER";

/// Errors raised while computing SRP values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SrpError {
    #[error("Invalid user pool id (expected <region>_<name>): {0}")]
    InvalidPoolId(String),

    #[error("Invalid hex value for {field}")]
    InvalidHex { field: &'static str },

    #[error("Invalid base64 value for {field}: {message}")]
    InvalidBase64 { field: &'static str, message: String },

    #[error("Server SRP_B failed the safety check (B mod N == 0)")]
    InvalidServerValue,

    #[error("SRP scrambling parameter u is zero")]
    ZeroScrambler,

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
}

/// `ChallengeParameters` of a `PASSWORD_VERIFIER` challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PasswordVerifierChallenge {
    pub user_id_for_srp: String,
    #[serde(rename = "SRP_B")]
    pub srp_b: String,
    pub salt: String,
    pub secret_block: String,
}

/// Client state for one SRP handshake.
///
/// A fresh ephemeral `a` is drawn on construction, so build a new instance
/// per authentication attempt.
pub struct CognitoSrp {
    pool_name: String,
    client_id: String,
    client_secret: Option<String>,
    username: String,
    password: String,
    big_n: BigUint,
    g: BigUint,
    k: BigUint,
    small_a: BigUint,
    large_a: BigUint,
}

impl std::fmt::Debug for CognitoSrp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CognitoSrp")
            .field("pool_name", &self.pool_name)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl CognitoSrp {
    /// Start a handshake for `username` against `user_pool_id`.
    ///
    /// # Arguments
    /// * `user_pool_id` - Pool id in `<region>_<name>` form
    /// * `client_id` - App client id
    /// * `username` - Login name sent as `USERNAME`
    /// * `password` - Plain password, only ever hashed locally
    ///
    /// # Errors
    /// Returns [`SrpError::InvalidPoolId`] if the pool id has no `_`.
    pub fn new(
        user_pool_id: &str,
        client_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, SrpError> {
        let big_n = parse_hex(N_HEX, "N")?;
        let small_a = loop {
            let mut bytes = [0u8; SMALL_A_BYTES];
            rand::thread_rng().fill_bytes(&mut bytes);
            let candidate = BigUint::from_bytes_be(&bytes) % &big_n;
            if candidate != BigUint::from(0u8) {
                break candidate;
            }
        };
        Self::with_private_value(user_pool_id, client_id, username, password, small_a)
    }

    fn with_private_value(
        user_pool_id: &str,
        client_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        small_a: BigUint,
    ) -> Result<Self, SrpError> {
        let pool_name = pool_name(user_pool_id)?;
        let big_n = parse_hex(N_HEX, "N")?;
        let g = parse_hex(G_HEX, "g")?;
        let k = parse_hex(&hex_hash(&format!("00{N_HEX}0{G_HEX}"))?, "k")?;
        let large_a = g.modpow(&small_a, &big_n);
        if large_a == BigUint::from(0u8) {
            return Err(SrpError::KeyDerivation("A mod N == 0".to_string()));
        }

        Ok(Self {
            pool_name,
            client_id: client_id.into(),
            client_secret: None,
            username: username.into(),
            password: password.into(),
            big_n,
            g,
            k,
            small_a,
            large_a,
        })
    }

    /// Attach the app client secret; adds `SECRET_HASH` to every request.
    #[must_use]
    pub fn with_client_secret(mut self, client_secret: Option<String>) -> Self {
        self.client_secret = client_secret;
        self
    }

    /// `SRP_A` as lowercase hex without padding.
    pub fn srp_a(&self) -> String {
        format!("{:x}", self.large_a)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `AuthParameters` for `InitiateAuth` with `USER_SRP_AUTH`.
    ///
    /// # Errors
    /// Returns [`SrpError::KeyDerivation`] if the secret hash cannot be keyed.
    pub fn auth_parameters(&self) -> Result<BTreeMap<String, String>, SrpError> {
        let mut params = BTreeMap::new();
        params.insert("USERNAME".to_string(), self.username.clone());
        params.insert("SRP_A".to_string(), self.srp_a());
        if let Some(secret) = &self.client_secret {
            params.insert(
                "SECRET_HASH".to_string(),
                secret_hash(&self.username, &self.client_id, secret)?,
            );
        }
        Ok(params)
    }

    /// Build the `ChallengeResponses` for `RespondToAuthChallenge`.
    ///
    /// # Arguments
    /// * `challenge` - Parameters of the `PASSWORD_VERIFIER` challenge
    /// * `now` - Signing instant, echoed back as `TIMESTAMP`
    ///
    /// # Errors
    /// Returns [`SrpError`] when the server values are malformed or fail the
    /// SRP safety checks.
    pub fn process_challenge(
        &self,
        challenge: &PasswordVerifierChallenge,
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<String, String>, SrpError> {
        let timestamp = format_timestamp(now);
        let server_b = parse_hex(&challenge.srp_b, "SRP_B")?;
        let key =
            self.password_authentication_key(&challenge.user_id_for_srp, &server_b, &challenge.salt)?;

        let secret_block = BASE64.decode(challenge.secret_block.as_bytes()).map_err(|e| {
            SrpError::InvalidBase64 { field: "SECRET_BLOCK", message: e.to_string() }
        })?;

        let mut mac = new_hmac(&key)?;
        mac.update(self.pool_name.as_bytes());
        mac.update(challenge.user_id_for_srp.as_bytes());
        mac.update(&secret_block);
        mac.update(timestamp.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        let mut responses = BTreeMap::new();
        responses.insert("TIMESTAMP".to_string(), timestamp);
        responses.insert("USERNAME".to_string(), challenge.user_id_for_srp.clone());
        responses
            .insert("PASSWORD_CLAIM_SECRET_BLOCK".to_string(), challenge.secret_block.clone());
        responses.insert("PASSWORD_CLAIM_SIGNATURE".to_string(), signature);
        if let Some(secret) = &self.client_secret {
            responses.insert(
                "SECRET_HASH".to_string(),
                secret_hash(&self.username, &self.client_id, secret)?,
            );
        }
        Ok(responses)
    }

    fn password_authentication_key(
        &self,
        user_id_for_srp: &str,
        server_b: &BigUint,
        salt_hex: &str,
    ) -> Result<[u8; DERIVED_KEY_LEN], SrpError> {
        let zero = BigUint::from(0u8);
        if server_b % &self.big_n == zero {
            return Err(SrpError::InvalidServerValue);
        }

        let u = parse_hex(
            &hex_hash(&format!("{}{}", pad_hex(&self.large_a), pad_hex(server_b)))?,
            "u",
        )?;
        if u == zero {
            return Err(SrpError::ZeroScrambler);
        }

        let x = self.private_key(user_id_for_srp, salt_hex)?;
        let g_mod_pow_x = self.g.modpow(&x, &self.big_n);
        let k_g_x = (&self.k * g_mod_pow_x) % &self.big_n;
        let base = ((server_b % &self.big_n) + &self.big_n - k_g_x) % &self.big_n;
        let exponent = &self.small_a + &u * &x;
        let s = base.modpow(&exponent, &self.big_n);

        let ikm = decode_hex(&pad_hex(&s), "S")?;
        let salt = decode_hex(&pad_hex(&u), "u")?;
        let mut okm = [0u8; DERIVED_KEY_LEN];
        Hkdf::<Sha256>::new(Some(&salt), &ikm)
            .expand(DERIVED_KEY_INFO, &mut okm)
            .map_err(|e| SrpError::KeyDerivation(e.to_string()))?;
        Ok(okm)
    }

    fn private_key(&self, user_id_for_srp: &str, salt_hex: &str) -> Result<BigUint, SrpError> {
        let identity = format!("{}{}:{}", self.pool_name, user_id_for_srp, self.password);
        let identity_hash = hex::encode(Sha256::digest(identity.as_bytes()));
        // Salt goes through the integer form so leading zero bytes are dropped
        let salt = parse_hex(salt_hex, "SALT")?;
        parse_hex(&hex_hash(&format!("{}{}", pad_hex(&salt), identity_hash))?, "x")
    }
}

/// `SECRET_HASH` = base64(HMAC-SHA256(client_secret, username || client_id)).
///
/// # Errors
/// Returns [`SrpError::KeyDerivation`] if the HMAC cannot be keyed.
pub fn secret_hash(
    username: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, SrpError> {
    let mut mac = new_hmac(client_secret.as_bytes())?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Timestamp in the exact shape Cognito signs: `Mon Jan 5 07:03:09 UTC 2026`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%a %b %-d %H:%M:%S UTC %Y").to_string()
}

fn pool_name(user_pool_id: &str) -> Result<String, SrpError> {
    match user_pool_id.split_once('_') {
        Some((_, name)) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(SrpError::InvalidPoolId(user_pool_id.to_string())),
    }
}

fn new_hmac(key: &[u8]) -> Result<HmacSha256, SrpError> {
    HmacSha256::new_from_slice(key).map_err(|e| SrpError::KeyDerivation(e.to_string()))
}

fn parse_hex(value: &str, field: &'static str) -> Result<BigUint, SrpError> {
    BigUint::parse_bytes(value.as_bytes(), 16).ok_or(SrpError::InvalidHex { field })
}

fn decode_hex(value: &str, field: &'static str) -> Result<Vec<u8>, SrpError> {
    hex::decode(value).map_err(|_| SrpError::InvalidHex { field })
}

/// SHA-256 over the bytes encoded by `hex_value`, returned as hex.
fn hex_hash(hex_value: &str) -> Result<String, SrpError> {
    let bytes = decode_hex(hex_value, "hash input")?;
    Ok(hex::encode(Sha256::digest(bytes)))
}

fn pad_hex(value: &BigUint) -> String {
    pad_hex_str(&format!("{value:x}"))
}

/// Even-length hex with a leading `00` when the high nibble is set.
fn pad_hex_str(hex_value: &str) -> String {
    if hex_value.len() % 2 == 1 {
        format!("0{hex_value}")
    } else if hex_value.starts_with(|c: char| "89ABCDEFabcdef".contains(c)) {
        format!("00{hex_value}")
    } else {
        hex_value.to_string()
    }
}
