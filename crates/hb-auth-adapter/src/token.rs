use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::session::AdminError;

#[derive(Debug, Deserialize)]
struct LoginClaims {
    #[serde(default)]
    exp: Option<u64>,
}

pub fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

/// Reads the `exp` claim of a login token.
///
/// The signature belongs to the backend and is not checked here; the claim is
/// only used to stop sending a token the backend would reject anyway.
pub fn token_expiry(token: &str) -> Result<Option<u64>, AdminError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<LoginClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|err| AdminError::InvalidToken(err.to_string()))?;

    Ok(token_data.claims.exp)
}
