//! Demo endpoints under `/metrics`.
//!
//! - `/metrics/counter`          : bump a counter per request
//! - `/metrics/timer`            : time a block inside the handler
//! - `/metrics/timed-annotation` : whole handler timed by the `timed` layer

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use rand::Rng;

use meterkit_core::MeterId;

use crate::app_state::AppState;
use crate::error::{Result, WebError};

pub const COUNTER_METRIC: &str = "test.counter.metric";
pub const TIMER_METRIC: &str = "test.timer.metric";

pub async fn counter(State(app): State<AppState>) -> Result<&'static str> {
    let registry = app.registry();
    tracing::info!(
        meters = registry.len(),
        common_tags = registry.common_tags().count(),
        "meter registry in use"
    );

    registry.counter(&MeterId::new(COUNTER_METRIC))?.increment();

    Ok("Test Counter Metric")
}

pub async fn timer(State(app): State<AppState>) -> Result<&'static str> {
    let timer = app.registry().timer(&MeterId::new(TIMER_METRIC))?;

    timer
        .record_async(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            tracing::info!("useless task");
        })
        .await;

    Ok("Test Timer Metric")
}

/// Result of one `timed-annotation` call, picked from a roll in `0..20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    BadRequest,
    ServerError,
    Success,
}

impl Outcome {
    pub fn from_roll(roll: u32) -> Self {
        match roll {
            0..=4 => Outcome::NotFound,
            5..=9 => Outcome::BadRequest,
            10..=13 => Outcome::ServerError,
            _ => Outcome::Success,
        }
    }

    pub fn respond(self) -> Result<&'static str> {
        match self {
            Outcome::NotFound => {
                tracing::warn!("Warning");
                Err(WebError::Status(StatusCode::NOT_FOUND))
            }
            Outcome::BadRequest => {
                tracing::warn!("Warning");
                Err(WebError::Status(StatusCode::BAD_REQUEST))
            }
            Outcome::ServerError => {
                tracing::error!("Error");
                Err(WebError::Status(StatusCode::INTERNAL_SERVER_ERROR))
            }
            Outcome::Success => {
                tracing::info!("Success");
                Ok("Test Timed Annotation Metric")
            }
        }
    }
}

pub async fn timed_annotation() -> Result<&'static str> {
    let roll = rand::thread_rng().gen_range(0..20);
    Outcome::from_roll(roll).respond()
}
