use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{
    entities::{token::AuthResponse, user::{LoginUser, SessionUser}},
    errors::AuthError,
};

/// Session change notifications: `Some(user)` on sign-in, `None` on sign-out.
/// Dropping the receiver unsubscribes.
pub type SessionSubscription = broadcast::Receiver<Option<SessionUser>>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, credentials: LoginUser) -> Result<AuthResponse, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Resolves the session behind an access token, if it is still valid.
    fn current_session(&self, access_token: &str) -> Option<SessionUser>;

    fn subscribe(&self) -> SessionSubscription;
}
