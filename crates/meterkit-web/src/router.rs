//! Axum router wiring.
//!
//! `/metrics/*` demo endpoints plus `/healthz`. Only the timed-annotation
//! route sits behind the `timed` layer.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, controller, ops, timed};

pub fn build_router(state: AppState) -> Router {
    let timed_routes = Router::new()
        .route("/metrics/timed-annotation", get(controller::timed_annotation))
        .route_layer(middleware::from_fn_with_state(state.clone(), timed::timed));

    Router::new()
        .route("/metrics/counter", get(controller::counter))
        .route("/metrics/timer", get(controller::timer))
        .merge(timed_routes)
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
