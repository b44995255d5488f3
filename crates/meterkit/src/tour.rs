//! Guided walkthrough of the meterkit API.
//!
//! Each step builds what it needs, records something and returns the value it
//! reports, so the `tour` binary can print it and tests can check it.

use std::sync::{Arc, RwLock};

use meterkit_core::meter::{Counter, Gauge};
use meterkit_core::{global, CompositeRegistry, MeterId, MeterRegistry, Result, TimeUnit};

fn empleados() -> MeterId {
    MeterId::new("numero.empleados").tag("oficina", "John Doe")
}

/// Counter straight from a registry: 1 + 200.
pub fn simple_registry() -> Result<f64> {
    let registry = MeterRegistry::new();
    let counter = registry.counter(&empleados())?;

    counter.increment();
    counter.increment_by(200.0)?;

    Ok(counter.count())
}

/// Composite counter incremented before any member exists. Reads 0: the
/// increments had nowhere to go.
pub fn composite_before_member() -> Result<f64> {
    let composite = CompositeRegistry::new();
    let counter = composite.counter(empleados());

    counter.increment()?;
    counter.increment_by(200.0)?;

    composite.add(Arc::new(MeterRegistry::new()));

    Ok(counter.count())
}

/// Composite counter incremented after a member was added: 201.
pub fn composite_after_member() -> Result<f64> {
    let composite = CompositeRegistry::new();
    let counter = composite.counter(empleados());

    composite.add(Arc::new(MeterRegistry::new()));

    counter.increment()?;
    counter.increment_by(200.0)?;

    Ok(counter.count())
}

/// Global composite: 1 + 200 here, 150 more from another lookup. The
/// member registry is removed again before returning.
pub fn global_registry() -> Result<f64> {
    let counter = global::counter(empleados());

    let member = Arc::new(MeterRegistry::new());
    global::add(Arc::clone(&member));

    counter.increment()?;
    counter.increment_by(200.0)?;
    increment_from_elsewhere()?;

    let count = member.counter(&empleados())?.count();
    global::remove(&member);
    Ok(count)
}

fn increment_from_elsewhere() -> Result<()> {
    global::counter(empleados()).increment_by(150.0)
}

/// Counter declared through its builder.
pub fn counter_builder() -> Result<f64> {
    let registry = MeterRegistry::new();
    let counter = Counter::builder("numero.estudiantes")
        .description("Número de estudiantes")
        .tag("curso", "Métricas con Micrometer")
        .register(&registry)?;

    counter.increment();
    counter.increment_by(200.0)?;

    Ok(counter.count())
}

/// Timer around a short loop; returns `(count, total ms)`.
pub fn timer() -> Result<(u64, f64)> {
    let registry = MeterRegistry::new();
    let timer = registry.timer(&MeterId::new("tiempo.ejecucion"))?;

    timer.record(|| {
        for i in 0..100 {
            tracing::debug!(i, "loop");
        }
    });

    Ok((timer.count(), timer.total_time(TimeUnit::Milliseconds)))
}

/// Gauge over a list's size; returns the reading before and after filling it.
pub fn gauge_builder() -> Result<(f64, f64)> {
    let registry = MeterRegistry::new();
    let names: Arc<RwLock<Vec<String>>> = Arc::new(RwLock::new(Vec::with_capacity(4)));

    let gauge = Gauge::builder("tam.lista", &names, |list| {
        list.read().map(|l| l.len() as f64).unwrap_or(f64::NAN)
    })
    .register(&registry)?;

    let before = gauge.value();
    names
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .extend(["Juan", "Felipe", "Laura", "Karla"].map(String::from));
    let after = gauge.value();

    Ok((before, after))
}
