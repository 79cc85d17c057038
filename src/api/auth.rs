//! Authentication API endpoints
//!
//! - POST /api/v1/login - Login
//! - GET/POST /api/v1/logout - Logout
//! - POST /api/v1/register - Registration
//!
//! A successful login or registration sets an `HttpOnly` session cookie.
//! Failed logins and duplicate registrations are answered with HTTP 200 and
//! the outcome in the body.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{
    clear_session_cookie, extract_session_token, session_cookie, ApiError, AppState,
};
use crate::models::{CreateUserInput, Session, User};
use crate::services::UserServiceError;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "userName")]
    pub user_name: String,
    pub password: String,
}

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "userName")]
    pub user_name: String,
    pub password: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl From<RegisterRequest> for CreateUserInput {
    fn from(body: RegisterRequest) -> Self {
        Self {
            username: body.user_name,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
        }
    }
}

/// Build the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout).post(logout))
        .route("/register", post(register))
}

/// POST /api/v1/login
///
/// A successful login replaces the session the client presented, if any.
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(invalid_body)?;

    let outcome = state
        .user_service
        .login(&body.user_name, &body.password)
        .await
        .map_err(|e| {
            tracing::error!("Login failed: {}", e);
            ApiError::internal_error(e.to_string())
        })?;

    match outcome {
        Some((user, session)) => {
            let previous = extract_session_token(&headers);
            if let Err(e) = state.user_service.logout(previous.as_deref()).await {
                tracing::warn!("Failed to delete previous session on login: {}", e);
            }
            tracing::info!("{} logged in", user.username);
            Ok(authenticated(&user, &session))
        }
        None => Ok(Json(json!({ "userName": body.user_name })).into_response()),
    }
}

/// GET|POST /api/v1/logout
///
/// Always succeeds, with or without a session.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = extract_session_token(&headers);
    if let Err(e) = state.user_service.logout(token.as_deref()).await {
        tracing::warn!("Failed to delete session on logout: {}", e);
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "userName": "" })),
    )
        .into_response()
}

/// POST /api/v1/register
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(invalid_body)?;
    let user_name = body.user_name.clone();

    match state.user_service.register(body.into()).await {
        Ok((user, session)) => {
            tracing::info!("Registered new user {}", user.username);
            Ok(authenticated(&user, &session))
        }
        Err(UserServiceError::AlreadyRegistered(_)) => {
            tracing::debug!("{} is already registered", user_name);
            Ok(Json(json!({ "userName": user_name, "error": "Already Registered" })).into_response())
        }
        Err(UserServiceError::Validation(msg)) => Err(ApiError::validation_error(msg)),
        Err(e) => {
            tracing::error!("Registration failed: {}", e);
            Err(ApiError::internal_error(e.to_string()))
        }
    }
}

fn authenticated(user: &User, session: &Session) -> Response {
    let body = Json(json!({ "userName": user.username, "status": "Authenticated" }));
    match session_cookie(&session.id) {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], body).into_response(),
        None => body.into_response(),
    }
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::with_details(
        "VALIDATION_ERROR",
        "Invalid request body",
        json!({ "reason": rejection.body_text() }),
    )
}
