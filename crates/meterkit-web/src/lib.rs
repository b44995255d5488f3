//! meterkit web demo library entry.
//!
//! Wires a `MeterRegistry` into an axum app: handlers that count and time
//! inside their body, and a route layer that times whole handlers. Consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod controller;
pub mod error;
pub mod ops;
pub mod router;
pub mod timed;
