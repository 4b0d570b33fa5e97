use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Identity claims carried by the login token.
///
/// The auth backend verifies the signature before redirecting, so the
/// client only decodes the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// Decodes identity claims from a login token without checking the
/// signature or expiry.
pub fn decode_identity(token: &str) -> Result<Identity, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Identity>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| SessionError::InvalidToken(e.to_string()))?;

    Ok(data.claims)
}
