use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::{self, HeaderMap}, StatusCode},
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{
    handlers::json_error::json_error,
    repositories::identity::IdentityProvider,
    session_gate::{GateOutcome, SessionGate},
    AppState,
};

/// Attaches the session behind a bearer token to every request and gates
/// everything under `/admin`.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                return service.call(req).await;
            }

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing in middleware");
                let response = json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "Application state unavailable",
                );
                return Ok(req.into_response(response));
            };

            let session = bearer_token(req.headers())
                .and_then(|token| state.auth_handler.current_session(&token));

            if !is_protected_route(req.path()) {
                if let Some(user) = session {
                    req.extensions_mut().insert(user);
                }
                return service.call(req).await;
            }

            let mut gate = SessionGate::new();
            gate.resolve(session);

            match gate.outcome() {
                GateOutcome::Render(user) if user.is_admin => {
                    req.extensions_mut().insert(user);
                    service.call(req).await
                }
                GateOutcome::Render(user) => {
                    tracing::warn!(user = %user.email, path = req.path(), "Admin access required");
                    let response = json_error(
                        StatusCode::FORBIDDEN,
                        "Forbidden",
                        "Admin access required",
                    );
                    Ok(req.into_response(response))
                }
                GateOutcome::Redirect(location) => {
                    tracing::debug!(path = req.path(), "Redirecting unauthenticated request");
                    Ok(req.into_response(redirect_to(location)))
                }
                GateOutcome::Loading => {
                    tracing::error!("Session gate did not settle");
                    let response = json_error(
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Unavailable",
                        "Session check did not complete",
                    );
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

fn is_protected_route(path: &str) -> bool {
    path == "/admin" || path.starts_with("/admin/")
}

fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}
