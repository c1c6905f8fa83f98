use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthService;
use crate::db::repository;
use crate::models::{
    AppError, AppResult, AuthResponse, LoginRequest, RefreshResponse, RegisterRequest,
};

pub struct UserService {
    db_pool: PgPool,
    auth_service: Arc<AuthService>,
}

impl UserService {
    pub fn new(db_pool: PgPool, auth_service: Arc<AuthService>) -> Self {
        Self {
            db_pool,
            auth_service,
        }
    }

    /// Register a new user and hand back a fresh token pair.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthResponse> {
        let (email, password, name) = match (req.email, req.password, req.name) {
            (Some(email), Some(password), Some(name))
                if !email.is_empty() && !password.is_empty() && !name.is_empty() =>
            {
                (email, password, name)
            }
            _ => {
                return Err(AppError::Validation(
                    "Email, password, and name are required".to_string(),
                ))
            }
        };

        if password.len() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters long".to_string(),
            ));
        }

        let email = email.trim().to_lowercase();

        if repository::find_user_by_email(&self.db_pool, &email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = self.auth_service.hash_password(&password)?;

        // The existence check above races with concurrent registrations; the
        // unique constraint is the arbiter and the loser sees a conflict.
        let user = repository::create_user(&self.db_pool, &email, &name, &password_hash)
            .await
            .map_err(|e| {
                if repository::is_unique_violation(&e) {
                    AppError::Conflict("User with this email already exists".to_string())
                } else {
                    AppError::from(e)
                }
            })?;

        let tokens = self.auth_service.issue_token_pair(user.id)?;

        Ok(AuthResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Authenticate by email and password. Unknown email and wrong password
    /// produce the identical response so callers cannot probe for accounts.
    pub async fn login(&self, req: LoginRequest) -> AppResult<AuthResponse> {
        let (email, password) = match (req.email, req.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                (email, password)
            }
            _ => {
                return Err(AppError::Validation(
                    "Email and password are required".to_string(),
                ))
            }
        };

        let email = email.trim().to_lowercase();

        let user = repository::find_user_by_email(&self.db_pool, &email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        if !self.auth_service.verify_password(&password, &user.password_hash) {
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        let tokens = self.auth_service.issue_token_pair(user.id)?;

        Ok(AuthResponse {
            message: "Login successful".to_string(),
            user: user.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Exchange a valid refresh token for a new access token. The refresh
    /// token itself is not rotated.
    pub async fn refresh(&self, refresh_token: Option<String>) -> AppResult<RefreshResponse> {
        let refresh_token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Validation("Refresh token is required".to_string()))?;

        let claims = self
            .auth_service
            .verify_refresh_token(&refresh_token)
            .ok_or_else(|| {
                AppError::Forbidden("Invalid or expired refresh token".to_string())
            })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Forbidden("Invalid or expired refresh token".to_string()))?;

        let access_token = self.auth_service.issue_access_token(user_id)?;

        Ok(RefreshResponse { access_token })
    }
}
