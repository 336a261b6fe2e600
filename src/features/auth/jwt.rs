use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{AuthenticatedUser, User, UserRole};
use crate::core::config::JwtConfig;
use crate::core::error::AppError;

const MISSING_SECRET: &str = "JWT secret not configured";

/// Claims carried by access tokens issued at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens with a shared secret
pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        if config.secret.is_none() {
            tracing::warn!("JWT_SECRET is not set; login and protected routes will fail");
        }
        Self { config }
    }

    fn secret(&self) -> Result<&[u8], AppError> {
        self.config
            .secret
            .as_deref()
            .map(str::as_bytes)
            .ok_or_else(|| AppError::Configuration(MISSING_SECRET.to_string()))
    }

    /// Token lifetime in seconds
    pub fn expires_in(&self) -> i64 {
        self.config.expires_in.as_secs() as i64
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let secret = self.secret()?;
        let iat = Utc::now().timestamp();
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            iat,
            exp: iat + self.expires_in(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let secret = self.secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway.as_secs();
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".to_string()),
                _ => {
                    tracing::debug!("Rejected token: {}", e);
                    AppError::Unauthorized("Invalid token".to_string())
                }
            })
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = self.decode_claims(token)?;
        Ok(AuthenticatedUser {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(secret: Option<&str>, expires_in_secs: u64) -> JwtConfig {
        JwtConfig {
            secret: secret.map(String::from),
            expires_in: Duration::from_secs(expires_in_secs),
            leeway: Duration::from_secs(0),
        }
    }

    fn sample_user(role: UserRole) -> User {
        User {
            id: Uuid::now_v7(),
            email: "driver@example.com".to_string(),
            password_hash: String::new(),
            name: Some("Driver".to_string()),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issued_token_carries_identity() {
        let service = JwtService::new(config(Some("test-secret"), 3600));
        let user = sample_user(UserRole::Admin);

        let token = service.issue(&user).unwrap();
        let claims = service.decode_claims(&token).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new(config(Some("secret-a"), 3600));
        let verifier = JwtService::new(config(Some("secret-b"), 3600));
        let token = issuer.issue(&sample_user(UserRole::User)).unwrap();

        let err = verifier.validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Invalid token"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtService::new(config(Some("test-secret"), 3600));
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: Uuid::now_v7(),
            email: "old@example.com".to_string(),
            role: UserRole::User,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = service.validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token expired"));
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let service = JwtService::new(config(None, 3600));

        let err = service.issue(&sample_user(UserRole::User)).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));

        let err = service.validate_token("a.b.c").unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        let service = JwtService::new(config(Some("test-secret"), 3600));
        assert!(matches!(
            service.validate_token("not-a-jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
