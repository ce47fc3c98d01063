use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, Header, TokenData, Validation};

use crate::entities::token::Claims;
use crate::entities::user::User;
use crate::errors::AuthError;
use crate::repositories::token::TokenServiceRepository;
use crate::settings::{AppConfig, JwtKeys};

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

/// Issues and checks HS512 access tokens signed with the configured secret.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    lifetime: Duration,
    validation: Validation,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        JwtService {
            keys: JwtKeys::from(config),
            lifetime: Duration::minutes(config.jwt_expiration_minutes),
            validation,
        }
    }
}

impl TokenServiceRepository for JwtService {
    fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims::issue(user, Utc::now(), self.lifetime);

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding).map_err(|e| {
            tracing::warn!("Failed to encode JWT: {}", e);
            AuthError::TokenCreation
        })
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        decode::<Claims>(token, &self.keys.decoding, &self.validation).map_err(AuthError::from)
    }

    fn expires_in(&self) -> i64 {
        self.lifetime.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn service(minutes: i64) -> JwtService {
        let mut config = crate::settings::tests::base_config();
        config.jwt_expiration_minutes = minutes;
        JwtService::new(&config)
    }

    fn admin() -> User {
        User {
            id: Uuid::new_v4(),
            email: "admin@example.com".into(),
            password_hash: String::new(),
            is_admin: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_decodes_to_the_same_session() {
        let jwt = service(5);
        let user = admin();

        let token = jwt.create_jwt(&user).unwrap();
        let session = jwt.decode_jwt(&token).unwrap().claims.session_user().unwrap();

        assert_eq!(session.id, user.id);
        assert!(session.is_admin);
    }

    #[test]
    fn tokens_issued_together_are_distinct() {
        let jwt = service(5);
        let user = admin();

        assert_ne!(jwt.create_jwt(&user).unwrap(), jwt.create_jwt(&user).unwrap());
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let jwt = service(-1);
        let token = jwt.create_jwt(&admin()).unwrap();

        assert_eq!(jwt.decode_jwt(&token).unwrap_err(), AuthError::TokenExpired);
    }
}
