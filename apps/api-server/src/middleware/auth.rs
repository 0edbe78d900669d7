//! Authentication extractor - the guard in front of protected routes.

use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use blog_core::domain::User;
use blog_core::ports::{AuthError, TokenService};

use crate::state::AppState;

/// Authenticated principal extractor.
///
/// Verifies the bearer token and resolves the user it names. Use this in
/// handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub token: String,
}

/// Error type for authentication failures.
///
/// Every failure mode - missing header, malformed or expired token, bad
/// signature, unknown user - produces the same fixed 401 body. Callers get
/// no hint which check failed.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        tracing::debug!("Authentication failed: {}", self.0);
        HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Please authenticate." }))
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AuthenticationError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthenticationError(AuthError::MissingAuth))?;

    let auth_str = auth_header.to_str().map_err(|_| {
        AuthenticationError(AuthError::InvalidToken(
            "Invalid authorization header".to_string(),
        ))
    })?;

    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        AuthenticationError(AuthError::InvalidToken(
            "Expected Bearer token".to_string(),
        ))
    })?;

    Ok(token.to_string())
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let token_service = req
                .app_data::<web::Data<Arc<dyn TokenService>>>()
                .ok_or_else(|| {
                    tracing::error!("TokenService not found in app data");
                    AuthenticationError(AuthError::InvalidToken(
                        "Server configuration error".to_string(),
                    ))
                })?;
            let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
                tracing::error!("AppState not found in app data");
                AuthenticationError(AuthError::InvalidToken(
                    "Server configuration error".to_string(),
                ))
            })?;

            let token = bearer_token(&req)?;
            let claims = token_service
                .validate_token(&token)
                .map_err(AuthenticationError)?;

            // The token may outlive the account it names
            let user = state
                .users
                .find_by_id(claims.user_id)
                .await
                .map_err(|e| AuthenticationError(AuthError::InvalidToken(e.to_string())))?
                .ok_or(AuthenticationError(AuthError::UnknownPrincipal))?;

            Ok(Identity { user, token })
        })
    }
}
