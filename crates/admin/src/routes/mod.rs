//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (storage reachable)
//!
//! # Accounts
//! POST /api/register                 - Create account and log in
//! POST /api/login                    - Log in
//! POST /api/logout                   - Destroy session
//! GET  /api/user                     - Current user            (session)
//! PUT  /api/user                     - Update own profile      (session)
//!
//! # Catalog (reads public, writes need a session)
//! GET|POST       /api/shop-categories
//! GET|PUT|DELETE /api/shop-categories/{id}
//! GET|POST       /api/shops            (?categoryId=)
//! GET|PUT|DELETE /api/shops/{id}
//!
//! # Sales (session)
//! GET|POST /api/orders                 (?shopId=)
//! GET|PUT  /api/orders/{id}
//! GET|POST /api/transactions           (?orderId=)
//! GET      /api/transactions/{id}
//!
//! # Analytics (public)
//! GET  /api/analytics/sales
//! GET  /api/analytics/shops
//! ```

pub mod analytics;
pub mod auth;
pub mod orders;
pub mod shop_categories;
pub mod shops;
pub mod transactions;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::middleware::create_session_layer;
use crate::state::AppState;

/// All API routes, without state or layers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth::router())
        .merge(shop_categories::router())
        .merge(shops::router())
        .merge(orders::router())
        .merge(transactions::router())
        .merge(analytics::router())
}

/// The API with its session layer and state attached.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.storage().session_store(), state.config());

    routes().layer(session_layer).with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if storage is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.storage().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AdminConfig, PasswordHashConfig};
    use crate::db::InMemoryStorage;

    fn test_app(allow_registration: bool) -> Router {
        let mut config = AdminConfig::in_memory();
        config.allow_registration = allow_registration;
        config.password_hash = PasswordHashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        };
        let state = AppState::new(config, Arc::new(InMemoryStorage::new())).unwrap();
        app(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = test_app(true);
        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_current_user_requires_session() {
        let app = test_app(true);
        let (status, body) = send(&app, get("/api/user")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn test_writes_require_session() {
        let app = test_app(true);
        let (status, _) = send(
            &app,
            json_request("POST", "/api/shop-categories", r#"{"name": "Bakery"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, get("/api/orders")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_reads() {
        let app = test_app(true);
        let (status, body) = send(&app, get("/api/shop-categories")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));

        let (status, body) = send(&app, get("/api/analytics/sales")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let app = test_app(true);
        let (status, body) = send(&app, get("/api/shops/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "id");

        let (status, _) = send(&app, get("/api/shops/7")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_register_sets_cookie_and_hides_password() {
        let app = test_app(true);
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/register",
                r#"{"username": "alice", "password": "secret123"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert!(cookie.starts_with("km_admin_session="));
        assert!(cookie.contains("HttpOnly"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["username"], "alice");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_registration_can_be_disabled() {
        let app = test_app(false);
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/register",
                r#"{"username": "alice", "password": "secret123"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Registration is disabled");
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let app = test_app(true);
        let (status, body) = send(
            &app,
            json_request("POST", "/api/login", r#"{"username": "alice"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Username and password are required");
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let app = test_app(true);
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/login",
                r#"{"username": "nouser", "password": "x"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid username or password");
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let app = test_app(true);
        let (status, _) = send(&app, json_request("POST", "/api/logout", "")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, json_request("POST", "/api/logout", "")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
