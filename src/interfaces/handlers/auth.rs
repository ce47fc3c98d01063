use actix_web::{get, post, web, HttpRequest, HttpResponse, ResponseError};
use tracing::instrument;

use crate::entities::user::LoginUser;
use crate::errors::AuthError;
use crate::middlewares::auth::bearer_token;
use crate::repositories::identity::IdentityProvider;
use crate::use_cases::extractors::AuthSession;
use crate::AppState;

#[post("/login")]
#[instrument(skip(state, credentials), fields(email = %credentials.email))]
pub async fn login(
    state: web::Data<AppState>,
    credentials: web::Json<LoginUser>
) -> HttpResponse {
    match state.auth_handler.sign_in(credentials.into_inner()).await {
        Ok(auth_response) => HttpResponse::Ok().json(auth_response),
        Err(e) => {
            tracing::warn!("Sign-in rejected: {}", e);
            e.error_response()
        }
    }
}

#[post("/logout")]
pub async fn logout(
    session: AuthSession,
    request: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AuthError> {
    let access_token = bearer_token(request.headers()).ok_or(AuthError::NotSignedIn)?;

    state.auth_handler.sign_out(&access_token).await?;
    tracing::debug!(user = %session.0.email, "Session closed");

    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Logged out successfully"})))
}

#[get("/session")]
pub async fn current_session(session: AuthSession) -> HttpResponse {
    HttpResponse::Ok().json(session.0)
}
