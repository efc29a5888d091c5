//! Gate middleware for protected pages.
//!
//! Runs the authenticator once per request. Admitted requests continue to
//! the handler with a [`GateSession`] in their extensions; everything else is
//! answered here with the password prompt or the blocked page.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use ag_server::api::middleware::gate_middleware;
//! # use ag_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let protected_routes: Router<AppState> = Router::new()
//!     .route("/", get(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), gate_middleware));
//! # let _ = protected_routes;
//! ```

use attendance_gate::auth::{
    AuthError, AuthMethod, GateOutcome, GateState, RequestContext, SessionContext,
};
use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use super::{AppState, pages, request_id::RequestId};
use crate::{logging, metrics};

/// Query parameters understood by every gated page
#[derive(Debug, Default, Deserialize)]
pub struct GateQuery {
    /// Sealed session token
    pub session: Option<String>,
    /// Set to 1 right after a password login
    pub bookmark: Option<u8>,
}

/// Session state of an admitted request
#[derive(Debug, Clone)]
pub struct GateSession {
    pub context: SessionContext,
    pub method: AuthMethod,
    /// Token that admitted the request, to keep in links and forms
    pub token: Option<String>,
}

impl GateSession {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Build the authenticator's view of a request from its headers and token
pub fn request_context(headers: &HeaderMap, session_token: Option<&str>) -> RequestContext {
    let mut request = RequestContext::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            request.insert_header(name.as_str(), value);
        }
    }
    match session_token {
        Some(token) => request.with_session_token(token),
        None => request,
    }
}

/// Middleware running the gate and injecting [`GateSession`].
///
/// # Behavior
///
/// - **Admitted** (token or fingerprint): Injects `GateSession` → Calls next handler
/// - **Awaiting password**: Returns `401 Unauthorized` with the password prompt
/// - **Blocked**: Returns `500` (configuration) or `503` (store) with an error page
pub async fn gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let query = Query::<GateQuery>::try_from_uri(request.uri())
        .map(|Query(query)| query)
        .unwrap_or_default();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string());
    let gate_request = request_context(request.headers(), query.session.as_deref());

    let mut context = SessionContext::new();
    match state
        .authenticator
        .check(&mut context, &gate_request, None)
        .await
    {
        Ok(GateOutcome::Authenticated { method, .. }) => {
            metrics::gate_authenticated_total(method.as_str());
            logging::log_gate_decision(
                &GateState::Authenticated.to_string(),
                Some(method.as_str()),
                request_id.as_deref(),
            );

            let token = match method {
                AuthMethod::Token => gate_request.token().map(str::to_string),
                _ => None,
            };
            request.extensions_mut().insert(GateSession {
                context,
                method,
                token,
            });
            next.run(request).await
        }
        Ok(GateOutcome::AwaitingPassword { first_run, .. }) => {
            logging::log_gate_decision(
                &GateState::AwaitingPassword.to_string(),
                None,
                request_id.as_deref(),
            );
            (
                StatusCode::UNAUTHORIZED,
                Html(pages::render_login_page(None, first_run, None)),
            )
                .into_response()
        }
        Err(e) => blocked_response(&e, request_id.as_deref()),
    }
}

/// Response for a request the gate could not decide
pub fn blocked_response(err: &AuthError, request_id: Option<&str>) -> Response {
    let (status, cause) = if err.is_configuration() {
        (StatusCode::INTERNAL_SERVER_ERROR, "config")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "store")
    };

    metrics::gate_blocked_total(cause);
    logging::log_gate_decision(&GateState::Blocked.to_string(), None, request_id);
    logging::log_security_event("gate_blocked", request_id, &err.to_string());

    (status, Html(pages::render_blocked_page(&err.client_message()))).into_response()
}
