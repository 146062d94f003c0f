use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_ROLE: &str = "Default";

/// Identity claims carried in the identity token. The identity provider
/// prefixes its own claim names, so both forms are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(rename = "cognito:username", alias = "username", alias = "preferred_username")]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "custom:role", alias = "role", default = "default_role")]
    pub role: String,
    pub sub: String,
    #[serde(default)]
    pub exp: Option<i64>,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

impl IdentityClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|at| at <= now).unwrap_or(false)
    }
}

/// Decode identity claims from a JWT payload without verifying the
/// signature. The API verifies tokens; the client only reads them.
pub fn decode_identity_token(token: &str) -> ClientResult<IdentityClaims> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ClientError::Token("identity token is empty".to_string()));
    }

    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<IdentityClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| ClientError::Token(format!("could not decode identity token: {}", e)))?;

    Ok(data.claims)
}
