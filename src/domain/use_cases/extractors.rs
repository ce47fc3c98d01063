use actix_web::{FromRequest, HttpRequest, HttpMessage};
use futures_util::future::{ready, Ready};
use crate::{entities::user::SessionUser, errors::AuthError};

/// The signed-in user attached by the auth middleware; 401 without one.
#[derive(Debug)]
pub struct AuthSession(pub SessionUser);

impl FromRequest for AuthSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<SessionUser>() {
            Some(user) => ready(Ok(AuthSession(user.clone()))),
            None => ready(Err(AuthError::NotSignedIn.into())),
        }
    }
}

/// Admin-only variant: 403 for a non-admin session, 401 without a session.
#[derive(Debug)]
pub struct AdminSession(pub SessionUser);

impl FromRequest for AdminSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<SessionUser>() {
            Some(user) if user.is_admin => {
                ready(Ok(AdminSession(user.clone())))
            }
            Some(_) => {
                ready(Err(AuthError::Forbidden("Admin access required".into()).into()))
            }
            None => {
                ready(Err(AuthError::NotSignedIn.into()))
            }
        }
    }
}
