/// Authentication service
///
/// Orchestrates registration, login and token-to-user resolution over a
/// `UserStore`, a `CredentialHasher` and a `TokenIssuer`, all injected at
/// construction.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::auth::jwt::TokenIssuer;
use crate::auth::password::CredentialHasher;
use crate::error::{AppError, AuthError};
use crate::store::{lock, UserPublic, UserRecord, UserStore};

/// Successful login response
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
    issuer: TokenIssuer,
    /// Makes the exists-then-create sequence of registration atomic
    registration: Mutex<()>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hasher: CredentialHasher, issuer: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            issuer,
            registration: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Register a new user.
    ///
    /// # Errors
    /// - `DuplicateEmail` if the email is already stored
    /// - `Store` if the record could not be persisted
    #[tracing::instrument(name = "register_user", skip_all, fields(email = %email))]
    pub fn register_user(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<UserPublic, AppError> {
        let password_hash = self.hasher.hash(password)?;

        let _guard = lock(&self.registration);
        if self.store.exists(email) {
            return Err(AuthError::DuplicateEmail.into());
        }
        let user = self.store.create(email, &password_hash, full_name)?;

        tracing::info!("User registered successfully");
        Ok(UserPublic::from(user))
    }

    /// Check credentials and issue an access token.
    ///
    /// An unknown email and a wrong password both yield `InvalidCredentials`.
    #[tracing::instrument(name = "authenticate_user", skip_all, fields(email = %email))]
    pub fn authenticate_user(&self, email: &str, password: &str) -> Result<TokenResponse, AppError> {
        let user = self
            .store
            .find_by_email(email)
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self
            .issuer
            .issue_default(&user.email)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!("User logged in successfully");
        Ok(TokenResponse::bearer(access_token))
    }

    /// Resolve the stored user a bearer token was issued for.
    ///
    /// # Errors
    /// - `InvalidToken` if the token fails verification
    /// - `UserNotFound` if the subject no longer exists
    pub fn resolve_user_from_token(&self, token: &str) -> Result<UserRecord, AppError> {
        let claims = self.issuer.verify(token).map_err(|e| {
            tracing::warn!(error = %e, "Token verification failed");
            AuthError::InvalidToken
        })?;

        self.store.find_by_email(claims.subject()).ok_or_else(|| {
            tracing::warn!(subject = %claims.subject(), "Token subject no longer exists");
            AuthError::UserNotFound.into()
        })
    }

    /// Public lookup by email.
    pub fn find_user(&self, email: &str) -> Option<UserPublic> {
        self.store.find_by_email(email).map(UserPublic::from)
    }
}
