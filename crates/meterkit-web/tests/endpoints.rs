#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use meterkit_core::{global, Measurement, MeterId, TimeUnit};
use meterkit_web::app_state::AppState;
use meterkit_web::config::{self, WebConfig};
use meterkit_web::controller::{Outcome, COUNTER_METRIC, TIMER_METRIC};
use meterkit_web::router::build_router;
use meterkit_web::timed::outcome;

fn local_state() -> AppState {
    let cfg = config::load_from_str(
        r#"
version: 1
metrics:
  common_tags: { app: "meterkit-web" }
  publish_global: false
"#,
    )
    .unwrap();
    AppState::new(cfg).unwrap()
}

async fn get(app: &Router, uri: &str) -> StatusCode {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn counter_endpoint_counts_requests() {
    let state = local_state();
    let app = build_router(state.clone());

    for _ in 0..3 {
        assert_eq!(get(&app, "/metrics/counter").await, StatusCode::OK);
    }

    let counter = state
        .registry()
        .counter(&MeterId::new(COUNTER_METRIC))
        .unwrap();
    assert_eq!(counter.count(), 3.0);

    let (id, _) = state.registry().iter().next().unwrap();
    assert_eq!(id.tag_value("app"), Some("meterkit-web"));
}

#[tokio::test]
async fn timer_endpoint_records_handler_block() {
    let state = local_state();
    let app = build_router(state.clone());

    assert_eq!(get(&app, "/metrics/timer").await, StatusCode::OK);

    let timer = state.registry().timer(&MeterId::new(TIMER_METRIC)).unwrap();
    assert_eq!(timer.count(), 1);
    assert!(timer.total_time(TimeUnit::Milliseconds) >= 100.0);
}

#[tokio::test]
async fn timed_layer_records_every_outcome() {
    let state = local_state();
    let app = build_router(state.clone());

    let mut statuses = Vec::new();
    for _ in 0..20 {
        statuses.push(get(&app, "/metrics/timed-annotation").await);
    }

    let mut recorded = 0;
    state.registry().for_each(|id, meter| {
        if id.name() == "test.timed.annotation.metric" {
            assert_eq!(id.tag_value("uri"), Some("/metrics/timed-annotation"));
            assert_eq!(id.tag_value("method"), Some("GET"));
            if let Measurement::Timer { count, .. } = meter.measure() {
                recorded += count;
            }
        }
    });
    assert_eq!(recorded, 20);

    for status in statuses {
        let id = MeterId::new("test.timed.annotation.metric")
            .tag("method", "GET")
            .tag("uri", "/metrics/timed-annotation")
            .tag("status", status.as_str())
            .tag("outcome", outcome(status));
        assert!(state.registry().find(&id).is_some(), "missing {id}");
    }
}

#[tokio::test]
async fn untimed_routes_skip_the_layer() {
    let state = local_state();
    let app = build_router(state.clone());

    assert_eq!(get(&app, "/healthz").await, StatusCode::OK);
    assert_eq!(get(&app, "/metrics/counter").await, StatusCode::OK);

    let timed = state
        .registry()
        .iter()
        .filter(|(id, _)| id.name() == "test.timed.annotation.metric")
        .count();
    assert_eq!(timed, 0);
}

#[test]
fn outcome_rolls_match_distribution() {
    let outcomes: Vec<Outcome> = (0..20).map(Outcome::from_roll).collect();
    let count = |o: Outcome| outcomes.iter().filter(|x| **x == o).count();

    assert_eq!(count(Outcome::NotFound), 5);
    assert_eq!(count(Outcome::BadRequest), 5);
    assert_eq!(count(Outcome::ServerError), 4);
    assert_eq!(count(Outcome::Success), 6);

    assert_eq!(
        Outcome::NotFound.respond().unwrap_err().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(Outcome::Success.respond().unwrap(), "Test Timed Annotation Metric");
}

#[test]
fn outcome_labels() {
    assert_eq!(outcome(StatusCode::OK), "SUCCESS");
    assert_eq!(outcome(StatusCode::NOT_FOUND), "CLIENT_ERROR");
    assert_eq!(outcome(StatusCode::INTERNAL_SERVER_ERROR), "SERVER_ERROR");
    assert_eq!(outcome(StatusCode::MOVED_PERMANENTLY), "REDIRECTION");
}

#[tokio::test]
async fn published_registry_receives_global_increments() {
    let cfg = WebConfig::default();
    let state = AppState::new(cfg).unwrap();

    global::counter("web-test.global.hits").increment().unwrap();

    let hits = state
        .registry()
        .counter(&MeterId::new("web-test.global.hits"))
        .unwrap();
    assert_eq!(hits.count(), 1.0);

    global::remove(&state.registry());
}
