use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    routes::AppState,
};

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Expiry as a unix timestamp
    pub exp: usize,
}

/// Signing material and token policy, shared via application state
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_minutes: i64,
}

impl AuthKeys {
    /// HS256 keys derived from the configured secret
    pub fn new(secret: &str, expiry_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_minutes,
        }
    }

    /// Issues a bearer token for the given user
    pub fn issue(&self, user_id: Uuid) -> AppResult<String> {
        let expires_at = Utc::now() + Duration::minutes(self.expiry_minutes);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Validates a token and returns its claims
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

/// Hashes a password for storage
pub fn hash_password(plain: &str) -> AppResult<String> {
    let hashed = bcrypt::hash(plain, bcrypt::DEFAULT_COST)?;
    Ok(hashed)
}

/// Checks a password against its stored hash
pub fn verify_password(plain: &str, hashed: &str) -> AppResult<bool> {
    let matches = bcrypt::verify(plain, hashed)?;
    Ok(matches)
}

/// The authenticated caller, extracted from the Authorization header
///
/// Extraction fails with 401 before the handler body runs, so handlers taking
/// this parameter never see unauthenticated requests.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Expected a bearer token".to_string()))?;

        let claims = state.auth.verify(token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

        Ok(AuthUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let keys = AuthKeys::new("test-secret", 30);
        let user_id = Uuid::new_v4();

        let token = keys.issue(user_id).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let keys = AuthKeys::new("test-secret", 30);
        let other = AuthKeys::new("different-secret", 30);

        let token = keys.issue(Uuid::new_v4()).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let keys = AuthKeys::new("test-secret", 30);
        assert!(keys.verify("not.a.token").is_err());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hashed = hash_password("hunter2").unwrap();

        assert_ne!(hashed, "hunter2");
        assert!(verify_password("hunter2", &hashed).unwrap());
        assert!(!verify_password("wrong", &hashed).unwrap());
    }
}
