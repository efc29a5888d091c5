//! HTTP surface of the attendance gate.
//!
//! # Modules
//!
//! - [`auth`]: Login and forced password change form handlers
//! - [`middleware`]: Gate middleware for protected pages
//! - [`pages`]: HTML rendering
//! - [`request_id`]: Request correlation and HTTP metrics
//!
//! # Endpoints Overview
//!
//! - `GET /?session=<token>` - Home page (gated)
//! - `POST /login` - Submit the entry password
//! - `POST /change-password?session=<token>` - Forced password change (gated)
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ag_server::api::{create_router, AppState};
//! use attendance_gate::{AuthConfig, Authenticator, MemoryRowStore, SheetRecordRepository};
//! use std::{sync::Arc, time::Duration};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let store = Arc::new(MemoryRowStore::new());
//! let repository = Arc::new(SheetRecordRepository::new(store, Duration::from_secs(5)));
//! let state = AppState {
//!     authenticator: Arc::new(Authenticator::new(repository, AuthConfig::from_env())),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8501").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod middleware;
pub mod pages;
pub mod request_id;

use attendance_gate::Authenticator;
use axum::{
    Extension, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;

use middleware::{GateQuery, GateSession};

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
}

/// Create the router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /                 - Home or forced change form (gated)
/// POST /change-password  - Store a new password (gated)
/// POST /login            - Entry password (public)
/// GET  /health           - Health check (public)
/// ```
pub fn create_router(state: AppState) -> Router {
    let gated_routes = Router::new()
        .route("/", get(index))
        .route("/change-password", post(auth::change_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::gate_middleware,
        ));

    Router::new()
        .merge(gated_routes)
        .route("/login", post(auth::login))
        .route("/health", get(health_check))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

/// Landing page for admitted requests.
///
/// A session that logged in with the first-run password sees nothing but the
/// change form until a new password is stored.
async fn index(
    Extension(session): Extension<GateSession>,
    Query(query): Query<GateQuery>,
) -> Html<String> {
    if session.context.must_change_password {
        return Html(pages::render_change_password_page(session.token(), None));
    }
    Html(pages::render_home_page(
        session.token(),
        query.bookmark == Some(1),
    ))
}

/// Health check endpoint for monitoring.
///
/// Returns `200 OK` when the record store answers and the encryption key is
/// configured, `503 Service Unavailable` otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8501/health
/// # {"status":"healthy","store":true,"encryption_key":true,"timestamp":"2026-10-17T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.authenticator.health_check().await.is_ok();
    let key_configured = state.authenticator.is_configured();
    let overall_healthy = store_healthy && key_configured;

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if overall_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "encryption_key": key_configured,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
