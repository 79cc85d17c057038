//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The API error type used for framework-level failures
//! - Session resolution (cookie or bearer token) into a request `Identity`

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::ServicesConfig;
use crate::db::repositories::{
    SqlxCarMakeRepository, SqlxCarModelRepository, SqlxSessionRepository, SqlxUserRepository,
};
use crate::models::{User, SESSION_DURATION_DAYS};
use crate::services::{CatalogService, DealerGateway, ReviewService, UserService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub user_service: Arc<UserService>,
    pub catalog_service: Arc<CatalogService>,
    pub gateway: Arc<DealerGateway>,
    pub review_service: Arc<ReviewService>,
}

impl AppState {
    /// Wire repositories and services on top of a migrated pool
    pub fn new(pool: crate::db::DynDatabasePool, services: &ServicesConfig) -> anyhow::Result<Self> {
        let user_service = Arc::new(UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
        ));
        let catalog_service = Arc::new(CatalogService::new(
            SqlxCarMakeRepository::boxed(pool.clone()),
            SqlxCarModelRepository::boxed(pool.clone()),
        ));
        let gateway = Arc::new(DealerGateway::new(services)?);
        let review_service = Arc::new(ReviewService::new(
            gateway.clone(),
            gateway.clone(),
            services.review_concurrency,
        ));

        Ok(Self {
            pool,
            user_service,
            catalog_service,
            gateway,
            review_service,
        })
    }
}

/// The user behind the current request, if any
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<User>);

impl Identity {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned().unwrap_or_default())
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract session token from the `Authorization` header or the `session` cookie
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    for cookie_header in headers.get_all(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Resolve the session of every request into an `Identity` extension.
///
/// Missing, unknown and expired sessions are anonymous. A failing session
/// lookup is logged and also treated as anonymous.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut identity = Identity::default();

    if let Some(token) = extract_session_token(request.headers()) {
        match state.user_service.validate_session(&token).await {
            Ok(user) => identity = Identity(user),
            Err(e) => tracing::error!("Session validation failed: {}", e),
        }
    }

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str) -> Option<HeaderValue> {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token,
        SESSION_DURATION_DAYS * 24 * 60 * 60
    );
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_token_from_bearer_header() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc-123")]);
        assert_eq!(extract_session_token(&map), Some("abc-123".to_string()));
    }

    #[test]
    fn test_token_from_cookie() {
        let map = headers(&[(header::COOKIE, "theme=dark; session=tok; other=1")]);
        assert_eq!(extract_session_token(&map), Some("tok".to_string()));
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let map = headers(&[
            (header::COOKIE, "session=from-cookie"),
            (header::AUTHORIZATION, "Bearer from-header"),
        ]);
        assert_eq!(extract_session_token(&map), Some("from-header".to_string()));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(extract_session_token(&HeaderMap::new()), None);

        let map = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "session="),
        ]);
        assert_eq!(extract_session_token(&map), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc").unwrap();
        let cookie = cookie.to_str().unwrap();

        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(clear_session_cookie().to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn test_api_error_status() {
        let cases = [
            (ApiError::validation_error("x"), StatusCode::BAD_REQUEST),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::internal_error("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
