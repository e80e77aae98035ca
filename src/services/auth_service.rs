use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::auth::{Claims, JwtError, PasswordError, PasswordHasher, TokenService};
use crate::config::SecurityConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, PublicUser};
use crate::database::UserRepository;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email or username is already registered")]
    UserAlreadyExists,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Token lifetime of {0} hours is out of range")]
    InvalidTokenLifetime(u64),
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error("Password hashing error: {0}")]
    Password(#[from] PasswordError),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Registration, login and token verification over a user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: TokenService,
    /// Verified against on unknown-email logins so both failure paths pay
    /// for one Argon2 run.
    dummy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        tokens: TokenService,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash("unused-dummy-password")?;
        Ok(Self {
            users,
            hasher,
            tokens,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub fn from_config(
        users: Arc<dyn UserRepository>,
        security: &SecurityConfig,
    ) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new(
            security.password_hash_memory_kib,
            security.password_hash_iterations,
        )?;
        let hours = security.jwt_expiry_hours;
        let ttl = i64::try_from(hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .ok_or(AuthError::InvalidTokenLifetime(hours))?;
        let tokens = TokenService::new(&security.jwt_secret, ttl);
        Self::new(users, hasher, tokens)
    }

    /// Inputs are expected to have passed `validate_register` already.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, AuthError> {
        let username = username.trim().to_string();
        let email = normalize_email(email);

        if self
            .users
            .find_by_email_or_username(&email, &username)
            .await?
            .is_some()
        {
            warn!("Registration rejected: email or username already taken");
            return Err(AuthError::UserAlreadyExists);
        }

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let user = self
            .users
            .create(NewUser { username, email, password_hash })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Database(other),
            })?;

        info!("Registered user {}", user.id);
        Ok(PublicUser::from(&user))
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.verify_password(password, self.dummy_hash.to_string()).await?;
            warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self.verify_password(password, user.password_hash.clone()).await?;
        if !matches {
            warn!("Login failed for user {}: wrong password", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id.as_str(), &user.email, &user.username)?;
        info!("User {} logged in", user.id);

        Ok(LoginResponse { token, user: PublicUser::from(&user) })
    }

    pub fn verify_token(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let claims = self.tokens.verify(token)?;
        debug!("Verified token for user {}", claims.user_id);
        Ok(claims)
    }

    async fn verify_password(&self, password: &str, stored: String) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &stored)).await?)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
