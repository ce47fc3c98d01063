use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;
use validator::Validate;

use crate::entities::token::AuthResponse;
use crate::entities::user::{LoginUser, NewAdmin, SessionUser};
use crate::errors::{AppError, AuthError};
use crate::auth::password::{hash_password, verify_password};
use crate::repositories::identity::{IdentityProvider, SessionSubscription};
use crate::repositories::token::TokenServiceRepository;
use crate::repositories::user::UserRepository;

const SESSION_EVENT_CAPACITY: usize = 64;

/// Password-based identity provider issuing JWT access tokens.
pub struct AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenServiceRepository,
{
    pub user_repo: R,
    pub token_service: T,
    /// Signed-out tokens mapped to their expiry (unix seconds).
    revoked: DashMap<String, usize>,
    events: broadcast::Sender<Option<SessionUser>>,
}

impl<R, T> AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenServiceRepository,
{
    pub fn new(user_repo: R, token_service: T) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        AuthHandler {
            user_repo,
            token_service,
            revoked: DashMap::new(),
            events,
        }
    }

    /// Creates the configured admin account unless it already exists.
    pub async fn ensure_admin(&self, request: NewAdmin) -> Result<bool, AppError> {
        request.validate()?;

        if self.user_repo.get_user_by_email(&request.email).await?.is_some() {
            return Ok(false);
        }

        let hashed_password = hash_password(&request.password)?;
        let insert = request.prepare_for_insert(hashed_password);

        match self.user_repo.create_user(&insert).await {
            Ok(id) => {
                tracing::info!(user_id = %id, "Admin account created");
                Ok(true)
            }
            Err(AppError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Logs in by email and password. Unknown email, wrong password and
    /// backend failures map to distinct errors.
    pub async fn login(&self, request: LoginUser) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let user = self.user_repo.get_user_by_email(&request.email)
            .await
            .map_err(|e| {
                tracing::error!("User lookup failed: {}", e);
                AuthError::AuthenticationFailed
            })?
            .ok_or(AuthError::UnknownIdentity)?;

        let is_password_valid = verify_password(&request.password, &user.password_hash)
            .map_err(|e| {
                tracing::error!("Password verification failed: {}", e);
                AuthError::AuthenticationFailed
            })?;
        if !is_password_valid {
            return Err(AuthError::WrongCredentials);
        }

        let access_token = self.token_service.create_jwt(&user)?;
        let session = SessionUser::from(&user);

        tracing::info!(user_id = %user.id, "User logged in successfully");
        // No subscribers is fine
        let _ = self.events.send(Some(session.clone()));

        Ok(AuthResponse::new(access_token, self.token_service.expires_in(), session))
    }

    /// Revokes the access token until it would have expired anyway.
    pub fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let claims = self.token_service.decode_jwt(access_token)?.claims;

        self.revoked.insert(access_token.to_string(), claims.exp);
        tracing::info!(user_id = %claims.sub, "User logged out");
        let _ = self.events.send(None);
        Ok(())
    }

    pub fn session_for(&self, access_token: &str) -> Result<SessionUser, AuthError> {
        if self.revoked.contains_key(access_token) {
            return Err(AuthError::TokenRevoked);
        }
        let claims = self.token_service.decode_jwt(access_token)?.claims;
        claims.session_user().ok_or(AuthError::InvalidToken)
    }

    /// Drops revocation entries whose tokens have expired.
    pub fn purge_expired_revocations(&self) -> usize {
        let now = Utc::now().timestamp() as usize;
        let before = self.revoked.len();
        self.revoked.retain(|_, exp| *exp > now);
        before.saturating_sub(self.revoked.len())
    }
}

#[async_trait]
impl<R, T> IdentityProvider for AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenServiceRepository,
{
    async fn sign_in(&self, credentials: LoginUser) -> Result<AuthResponse, AuthError> {
        self.login(credentials).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.logout(access_token)
    }

    fn current_session(&self, access_token: &str) -> Option<SessionUser> {
        self.session_for(access_token).ok()
    }

    fn subscribe(&self) -> SessionSubscription {
        self.events.subscribe()
    }
}
