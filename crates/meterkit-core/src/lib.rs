//! meterkit core: in-process meters, registries and registry composition.
//!
//! - [`MeterId`]: name + unordered tag set, the lookup key.
//! - [`Counter`], [`Gauge`], [`Timer`]: the three meter kinds, wrapped in [`Meter`].
//! - [`MeterRegistry`]: get-or-create storage, one meter per identity.
//! - [`CompositeRegistry`]: fans operations out to its current members.
//! - [`global`]: one process-wide composite registry.
//!
//! The crate carries no runtime or transport dependencies; web layers and
//! exporters call into it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Bad input surfaces
//! as `MeterError`, and gauge reads never fail (they return `NaN`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod composite;
pub mod error;
pub mod global;
pub mod id;
pub mod meter;
pub mod registry;

pub use composite::{CompositeCounter, CompositeGauge, CompositeRegistry, CompositeTimer};
/// Shared result type.
pub use error::{ErrorCode, MeterError, Result};
pub use id::{MeterId, Tag};
pub use meter::{
    Counter, Gauge, Measurement, Meter, MeterKind, MeterSnapshot, TimeUnit, Timer, TimerSample,
};
pub use registry::MeterRegistry;
