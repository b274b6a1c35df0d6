//! Authentication and user account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::Algorithm;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    lending::STARTING_CREDITS,
    models::{
        user::{LoginRequest, SignupRequest},
        NewUser, User, UserClaims,
    },
    repository::Repository,
};

const SECONDS_PER_DAY: i64 = 24 * 3600;

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    algorithm: Algorithm,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> AppResult<Self> {
        let algorithm = config
            .algorithm()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self {
            repository,
            config,
            algorithm,
        })
    }

    /// Register a new user with the starting credit balance
    pub async fn signup(&self, request: SignupRequest) -> AppResult<User> {
        request.validate()?;

        if self.repository.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Validation("Email taken".to_string()));
        }

        let new_user = NewUser {
            hashed_password: self.hash_password(&request.password)?,
            email: request.email,
            full_name: request.full_name,
            unit_no: request.unit_no,
            whatsapp_no: request.whatsapp_no,
            credits: STARTING_CREDITS,
        };

        let user = self.repository.users.create(&new_user).await?;
        tracing::info!("User {} signed up (id={})", user.email, user.id);
        Ok(user)
    }

    /// Check credentials and return a signed token
    pub async fn login(&self, request: &LoginRequest) -> AppResult<String> {
        let invalid = || AppError::Authentication("Invalid credentials".to_string());

        let user = self
            .repository
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;

        if !self.verify_password(&user, &request.password)? {
            tracing::debug!("Rejected login for {}", request.email);
            return Err(invalid());
        }

        self.create_token_for_user(&user)
    }

    /// Resolve a bearer token into the user it was issued to
    pub async fn resolve(&self, token: &str) -> AppResult<User> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret, self.algorithm)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AppError::Authentication("Invalid token".to_string())
            })?;

        self.repository
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Authentication("User not found".to_string()))
    }

    /// Create JWT token for a user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + self.config.jwt_expiration_days * SECONDS_PER_DAY;

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret, self.algorithm)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.hashed_password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
