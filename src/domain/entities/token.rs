use chrono::{DateTime, Duration, Utc};
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

use crate::entities::user::{SessionUser, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: SessionUser,
}

impl AuthResponse {
    pub fn new(access_token: String, expires_in: i64, user: SessionUser) -> Self {
        AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    /// Unique per issued token so revocation never hits a sibling token.
    pub jti: String,
    pub email: String,
    pub admin: bool,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    /// Claims for a fresh access token issued at `now`.
    pub fn issue(user: &User, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Claims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            admin: user.is_admin,
            exp: (now + lifetime).timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }

    pub fn session_user(&self) -> Option<SessionUser> {
        let id = Uuid::parse_str(&self.sub).ok()?;
        Some(SessionUser {
            id,
            email: self.email.clone(),
            is_admin: self.admin,
        })
    }
}
