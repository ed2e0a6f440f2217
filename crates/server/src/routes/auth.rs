use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::notifier::HttpProfileNotifier;
use service::auth::repo::seaorm::SeaOrmUserRepository;
use service::auth::token::{TokenClaims, TokenIssuer};
use service::auth::AuthService;

use crate::errors::ApiError;
use crate::openapi::TokenResponse;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<SeaOrmUserRepository, HttpProfileNotifier>>,
    /// Shared with the auth service; the middleware needs its own handle
    /// to validate incoming bearer tokens.
    pub tokens: TokenIssuer,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOutput {
    pub user_id: Uuid,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeOutput {
    pub user_id: String,
    pub email: String,
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Email already exists"), (status = 502, description = "Profile service failed")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<RegisterOutput>, Response> {
    // Boundary validation only; the service itself takes inputs as-is
    if let Err(e) = models::user::validate_email(&input.email) {
        return Err((StatusCode::BAD_REQUEST, e.to_string()).into_response());
    }
    if let Err(e) = models::user::validate_name(&input.first_name) {
        return Err((StatusCode::BAD_REQUEST, e.to_string()).into_response());
    }
    if let Err(e) = models::user::validate_name(&input.last_name) {
        return Err((StatusCode::BAD_REQUEST, e.to_string()).into_response());
    }
    if input.password.len() < 8 {
        return Err((StatusCode::BAD_REQUEST, "password too short (>=8)".to_string()).into_response());
    }

    let user = state
        .auth
        .register(input)
        .await
        .map_err(|e| ApiError(e).into_response())?;
    Ok(Json(RegisterOutput { user_id: user.id, message: "User registered successfully." }))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in", body = TokenResponse), (status = 401, description = "Invalid email or password"), (status = 403, description = "Email not verified")))]
pub async fn login(
    State(state): State<ServerState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginOutput>, ApiError> {
    let token = state.auth.authenticate(input).await?;
    Ok(Json(LoginOutput { token }))
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current identity"), (status = 401, description = "Missing or invalid token")))]
pub async fn me(Extension(claims): Extension<TokenClaims>) -> Json<MeOutput> {
    Json(MeOutput { user_id: claims.sub, email: claims.email })
}

/// Middleware guarding the protected surface: expects
/// `Authorization: Bearer <token>`, validates it against the configured
/// key/issuer/audience and injects the claims into request extensions.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match header {
        Some(h) => {
            let prefix = "Bearer ";
            if !h.starts_with(prefix) {
                tracing::warn!(path = %req.uri().path(), "invalid Authorization format (expect Bearer)");
                return Err(StatusCode::UNAUTHORIZED);
            }
            h[prefix.len()..].to_string()
        }
        None => {
            tracing::warn!(path = %req.uri().path(), "missing Authorization header");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    match state.tokens.decode(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), error = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
