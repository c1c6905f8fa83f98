use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::{AppError, AppResult};

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // User ID
    pub exp: i64,           // Expiry timestamp
    pub iat: i64,           // Issued at timestamp
    pub token_type: String, // "access" or "refresh"
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies the two token classes. Access and refresh tokens are
/// signed with independent secrets, so neither verifier accepts the other's
/// tokens.
pub struct AuthService {
    jwt_config: JwtConfig,
    access_encoding_key: EncodingKey,
    access_decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt_config: JwtConfig) -> Self {
        let access_encoding_key = EncodingKey::from_secret(jwt_config.access_secret.as_bytes());
        let access_decoding_key = DecodingKey::from_secret(jwt_config.access_secret.as_bytes());
        let refresh_encoding_key = EncodingKey::from_secret(jwt_config.refresh_secret.as_bytes());
        let refresh_decoding_key = DecodingKey::from_secret(jwt_config.refresh_secret.as_bytes());

        Self {
            jwt_config,
            access_encoding_key,
            access_decoding_key,
            refresh_encoding_key,
            refresh_decoding_key,
        }
    }

    /// Hash a password using Argon2 with a fresh random salt
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash. Any failure, including an
    /// unparseable hash, is treated as a mismatch.
    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(password_hash) {
            Ok(hash) => hash,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Generate an access token (15-minute expiry by default)
    pub fn issue_access_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::minutes(self.jwt_config.access_token_expiry_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };

        encode(&Header::default(), &claims, &self.access_encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Generate a refresh token (7-day expiry by default)
    pub fn issue_refresh_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::days(self.jwt_config.refresh_token_expiry_days);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
            token_type: TOKEN_TYPE_REFRESH.to_string(),
        };

        encode(&Header::default(), &claims, &self.refresh_encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate refresh token: {}", e)))
    }

    pub fn issue_token_pair(&self, user_id: Uuid) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user_id)?,
            refresh_token: self.issue_refresh_token(user_id)?,
        })
    }

    /// Validate an access token. Returns None on any failure: bad signature,
    /// malformed token, wrong token class, or expiry.
    pub fn verify_access_token(&self, token: &str) -> Option<Claims> {
        self.verify(token, &self.access_decoding_key, TOKEN_TYPE_ACCESS)
    }

    /// Validate a refresh token. Same contract as [`verify_access_token`].
    pub fn verify_refresh_token(&self, token: &str) -> Option<Claims> {
        self.verify(token, &self.refresh_decoding_key, TOKEN_TYPE_REFRESH)
    }

    fn verify(&self, token: &str, key: &DecodingKey, token_type: &str) -> Option<Claims> {
        let validation = Validation::default();

        decode::<Claims>(token, key, &validation)
            .ok()
            .map(|data| data.claims)
            .filter(|claims| claims.token_type == token_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            access_secret: "access_secret_for_testing_only".to_string(),
            refresh_secret: "refresh_secret_for_testing_only".to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn test_password_hashing() {
        let auth_service = AuthService::new(get_test_jwt_config());
        let password = "SecurePassword123!";

        let hash = auth_service.hash_password(password).unwrap();
        assert!(auth_service.verify_password(password, &hash));
        assert!(!auth_service.verify_password("WrongPassword", &hash));
    }

    #[test]
    fn test_verify_password_with_garbage_hash() {
        let auth_service = AuthService::new(get_test_jwt_config());
        assert!(!auth_service.verify_password("anything", "not a phc string"));
        assert!(!auth_service.verify_password("anything", ""));
    }

    #[test]
    fn test_token_issue_and_verify() {
        let auth_service = AuthService::new(get_test_jwt_config());
        let user_id = Uuid::new_v4();

        let token = auth_service.issue_access_token(user_id).unwrap();
        let claims = auth_service.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_pair_verifies_to_same_user() {
        let auth_service = AuthService::new(get_test_jwt_config());
        let user_id = Uuid::new_v4();

        let pair = auth_service.issue_token_pair(user_id).unwrap();
        let access = auth_service.verify_access_token(&pair.access_token).unwrap();
        let refresh = auth_service
            .verify_refresh_token(&pair.refresh_token)
            .unwrap();

        assert_eq!(access.sub, user_id.to_string());
        assert_eq!(refresh.sub, user_id.to_string());
    }

    #[test]
    fn test_secrets_are_not_interchangeable() {
        let auth_service = AuthService::new(get_test_jwt_config());
        let user_id = Uuid::new_v4();

        let access = auth_service.issue_access_token(user_id).unwrap();
        let refresh = auth_service.issue_refresh_token(user_id).unwrap();

        assert!(auth_service.verify_refresh_token(&access).is_none());
        assert!(auth_service.verify_access_token(&refresh).is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = get_test_jwt_config();
        let auth_service = AuthService::new(config.clone());
        let now = Utc::now();

        // Issued 20 minutes ago with a 15-minute lifetime, well past the
        // verifier's leeway.
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: (now - Duration::minutes(5)).timestamp(),
            iat: (now - Duration::minutes(20)).timestamp(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.access_secret.as_bytes()),
        )
        .unwrap();

        assert!(auth_service.verify_access_token(&token).is_none());
    }

    #[test]
    fn test_unexpired_token_is_accepted() {
        let config = get_test_jwt_config();
        let auth_service = AuthService::new(config.clone());
        let now = Utc::now();

        // Issued 14 minutes ago: still inside the 15-minute window.
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: (now + Duration::minutes(1)).timestamp(),
            iat: (now - Duration::minutes(14)).timestamp(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.access_secret.as_bytes()),
        )
        .unwrap();

        assert!(auth_service.verify_access_token(&token).is_some());
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let auth_service = AuthService::new(get_test_jwt_config());

        assert!(auth_service.verify_access_token("not.a.jwt").is_none());
        assert!(auth_service.verify_access_token("").is_none());
        assert!(auth_service.verify_refresh_token("garbage").is_none());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let auth_service = AuthService::new(get_test_jwt_config());
        let token = auth_service.issue_access_token(Uuid::new_v4()).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');

        assert!(auth_service.verify_access_token(&tampered).is_none());
    }
}
