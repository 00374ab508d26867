use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Motorista,
    Cliente,
}

/// Claims minted by the identity provider. `sub` is the uid drivers are
/// assigned by on trips.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?
    .claims;

    // Driver routes key trip ownership on the subject
    if claims.sub.trim().is_empty() {
        return Err(AppError::Unauthorized("Token has no subject".to_string()));
    }

    Ok(claims)
}

/// Sign a short-lived HS256 token, standing in for the identity provider.
#[cfg(test)]
pub fn sign_test_token(sub: &str, role: UserRole, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: sub.to_string(),
        email: format!("{}@example.com", sub),
        role,
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
