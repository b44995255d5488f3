//! Route layer that times whole handler invocations.
//!
//! Every request through the layer is recorded into the configured timer,
//! tagged with `method`, `uri` (the matched route), `status` and `outcome`.
//! Failed responses are recorded too.

use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use meterkit_core::Timer;

use crate::app_state::AppState;

pub async fn timed(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let uri = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let sample = Timer::start();
    let response = next.run(req).await;
    let status = response.status();

    let id = app
        .timed_id()
        .clone()
        .tag("method", method)
        .tag("uri", uri)
        .tag("status", status.as_str())
        .tag("outcome", outcome(status));

    match app.registry().timer(&id) {
        Ok(timer) => {
            sample.stop(&timer);
        }
        Err(e) => tracing::warn!(%id, error = %e, "timed request not recorded"),
    }

    response
}

/// Status class label.
pub fn outcome(status: StatusCode) -> &'static str {
    if status.is_informational() {
        "INFORMATIONAL"
    } else if status.is_success() {
        "SUCCESS"
    } else if status.is_redirection() {
        "REDIRECTION"
    } else if status.is_client_error() {
        "CLIENT_ERROR"
    } else if status.is_server_error() {
        "SERVER_ERROR"
    } else {
        "UNKNOWN"
    }
}
