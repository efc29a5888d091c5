//! Authentication form handlers.
//!
//! This module provides the two form endpoints of the gate:
//! - Login with the shared entry password
//! - Forced password change after a first-run login
//!
//! Both answer with HTML. A successful login redirects to a URL carrying the
//! freshly sealed session token, which the member is encouraged to bookmark.
//!
//! # Examples
//!
//! Login:
//! ```bash
//! curl -i -X POST http://localhost:8501/login \
//!   -H "Content-Type: application/x-www-form-urlencoded" \
//!   -d 'password=welcome1'
//! # HTTP/1.1 303 See Other
//! # location: /?session=AQ3x...&bookmark=1
//! ```

use attendance_gate::auth::{AuthMethod, GateOutcome, PasswordChange, SessionContext};
use axum::{
    Extension, Form,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::{
    AppState,
    middleware::{GateQuery, GateSession, blocked_response, request_context},
    pages,
    request_id::RequestId,
};
use crate::{logging, metrics};

const WRONG_PASSWORD: &str = "비밀번호가 틀렸습니다. / Wrong password.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Home URL, keeping the session token when there is one
fn home_location(token: Option<&str>, bookmark: bool) -> String {
    match (token, bookmark) {
        (Some(token), true) => format!("/?session={token}&bookmark=1"),
        (Some(token), false) => format!("/?session={token}"),
        (None, _) => "/".to_string(),
    }
}

/// Check the submitted entry password.
///
/// Runs the full gate with the submission, so a request that is already
/// admitted by token or fingerprint simply goes home.
///
/// # Form Fields
///
/// - `password`: The shared entry password (empty counts as not submitted)
///
/// # Response
///
/// - `303 See Other` to `/?session=<token>&bookmark=1` after a password login
/// - `303 See Other` to `/` when admitted without a new token
///
/// # Errors
///
/// - `401 Unauthorized`: Wrong or missing password, prompt shown again
/// - `500` / `503`: Gate blocked (configuration or store problem)
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<GateQuery>,
    request_id: RequestId,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let gate_request = request_context(&headers, query.session.as_deref());
    let submission = Some(form.password.as_str()).filter(|p| !p.is_empty());

    let mut context = SessionContext::new();
    match state
        .authenticator
        .check(&mut context, &gate_request, submission)
        .await
    {
        Ok(GateOutcome::Authenticated {
            method,
            issued_token,
        }) => {
            metrics::gate_authenticated_total(method.as_str());
            let location = match method {
                AuthMethod::Password => {
                    metrics::login_attempts_total(true);
                    tracing::info!(
                        request_id = %request_id.as_str(),
                        first_run = context.must_change_password,
                        "Password login"
                    );
                    home_location(issued_token.as_deref(), context.show_bookmark_hint)
                }
                AuthMethod::Token => home_location(gate_request.token(), false),
                _ => home_location(None, false),
            };
            Redirect::to(&location).into_response()
        }
        Ok(GateOutcome::AwaitingPassword {
            rejected,
            first_run,
        }) => {
            if rejected {
                metrics::login_attempts_total(false);
                logging::log_security_event(
                    "failed_login",
                    Some(request_id.as_str()),
                    "Wrong entry password",
                );
            }
            let error = rejected.then_some(WRONG_PASSWORD);
            (
                StatusCode::UNAUTHORIZED,
                Html(pages::render_login_page(None, first_run, error)),
            )
                .into_response()
        }
        Err(e) => blocked_response(&e, Some(request_id.as_str())),
    }
}

/// Store a new entry password after a first-run login.
///
/// Sits behind the gate middleware, so the session is already admitted.
///
/// # Form Fields
///
/// - `new_password`, `confirm_password`: Must be non-empty and equal
///
/// # Response
///
/// - `303 See Other` home once the password is stored, or when no change
///   was pending
/// - `400 Bad Request`: Empty fields or mismatch, form shown again
///
/// # Errors
///
/// - `503 Service Unavailable`: The password could not be written
pub async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<GateSession>,
    request_id: RequestId,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    let mut context = session.context.clone();
    let result = state
        .authenticator
        .change_password(&mut context, &form.new_password, &form.confirm_password)
        .await;

    match result {
        Ok(PasswordChange::Changed) => {
            logging::log_security_event(
                "password_changed",
                Some(request_id.as_str()),
                "Entry password changed",
            );
            Redirect::to(&home_location(session.token(), false)).into_response()
        }
        Ok(PasswordChange::NotRequired) => {
            Redirect::to(&home_location(session.token(), false)).into_response()
        }
        Ok(outcome) => (
            StatusCode::BAD_REQUEST,
            Html(pages::render_change_password_page(
                session.token(),
                Some(outcome.message()),
            )),
        )
            .into_response(),
        Err(e) => blocked_response(&e, Some(request_id.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_location() {
        assert_eq!(home_location(Some("t"), true), "/?session=t&bookmark=1");
        assert_eq!(home_location(Some("t"), false), "/?session=t");
        assert_eq!(home_location(None, true), "/");
    }
}
