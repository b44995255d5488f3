//! Process-wide composite registry.
//!
//! Created empty on first access and kept until the process exits. All
//! mutation goes through [`registry()`], so there is a single member list
//! for the whole process.

use std::sync::{Arc, OnceLock};

use crate::composite::{CompositeCounter, CompositeGauge, CompositeRegistry, CompositeTimer};
use crate::error::Result;
use crate::id::MeterId;
use crate::registry::MeterRegistry;

static REGISTRY: OnceLock<CompositeRegistry> = OnceLock::new();

/// The global composite registry.
pub fn registry() -> &'static CompositeRegistry {
    REGISTRY.get_or_init(CompositeRegistry::new)
}

pub fn add(member: Arc<MeterRegistry>) -> bool {
    registry().add(member)
}

pub fn remove(member: &Arc<MeterRegistry>) -> bool {
    registry().remove(member)
}

pub fn counter(id: impl Into<MeterId>) -> CompositeCounter {
    registry().counter(id)
}

pub fn timer(id: impl Into<MeterId>) -> CompositeTimer {
    registry().timer(id)
}

pub fn gauge<T, F>(id: impl Into<MeterId>, obj: &Arc<T>, accessor: F) -> Result<CompositeGauge>
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> f64 + Send + Sync + 'static,
{
    registry().gauge(id, obj, accessor)
}
