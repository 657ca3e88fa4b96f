//! HS256 JWT issuing and validation

use crate::auth::models::Claims;
use chrono::{Duration, Utc};
use clipvault_core::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiry_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, issuer: impl Into<String>, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            expiry_hours,
        }
    }

    /// Issue an access token for `user_id`
    pub fn issue_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate and decode a bearer token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AppError::Unauthorized("Invalid token issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("Invalid token signature".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid or expired token: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "jwt-test-secret-at-least-32-characters";

    #[test]
    fn test_issue_and_validate() {
        let service = JwtService::new(SECRET, "clipvault-access", 1);
        let user_id = Uuid::new_v4();

        let token = service.issue_token(user_id).unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "clipvault-access");
    }

    #[test]
    fn test_rejects_other_secret() {
        let issuer = JwtService::new(SECRET, "clipvault-access", 1);
        let verifier = JwtService::new("another-secret-at-least-32-characters!", "clipvault-access", 1);

        let token = issuer.issue_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_rejects_other_issuer() {
        let issuer = JwtService::new(SECRET, "someone-else", 1);
        let verifier = JwtService::new(SECRET, "clipvault-access", 1);

        let token = issuer.issue_token(Uuid::new_v4()).unwrap();
        match verifier.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid token issuer"),
            other => panic!("expected issuer rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_expired() {
        let service = JwtService::new(SECRET, "clipvault-access", -1);
        let token = service.issue_token(Uuid::new_v4()).unwrap();
        match service.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("expected expiry rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_garbage() {
        let service = JwtService::new(SECRET, "clipvault-access", 1);
        assert!(service.validate_token("not-a-jwt").is_err());
    }
}
