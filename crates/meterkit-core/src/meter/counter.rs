use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{MeterError, Result};
use crate::id::MeterId;
use crate::registry::MeterRegistry;

/// Monotonic floating-point counter.
///
/// The running total is kept as `f64` bits inside an `AtomicU64` and updated
/// with a compare-and-swap loop, so concurrent increments are never lost.
#[derive(Debug, Default)]
pub struct Counter {
    bits: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a builder for a counter named `name`.
    pub fn builder(name: impl Into<String>) -> CounterBuilder {
        CounterBuilder {
            id: MeterId::new(name),
            description: None,
        }
    }

    /// Increment by 1.
    pub fn increment(&self) {
        self.add(1.0);
    }

    /// Increment by `amount`.
    ///
    /// Negative, NaN and infinite amounts are rejected with
    /// `InvalidArgument`; the total is left untouched.
    pub fn increment_by(&self, amount: f64) -> Result<()> {
        check_amount(amount)?;
        self.add(amount);
        Ok(())
    }

    /// Current total.
    pub fn count(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    fn add(&self, amount: f64) {
        let mut cur = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(cur) + amount).to_bits();
            match self
                .bits
                .compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => cur = actual,
            }
        }
    }
}

pub(crate) fn check_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(MeterError::InvalidArgument(format!(
            "counter increment must be a finite amount >= 0, got {amount}"
        )))
    }
}

/// Fluent registration for a [`Counter`].
#[derive(Debug)]
pub struct CounterBuilder {
    id: MeterId,
    description: Option<String>,
}

impl CounterBuilder {
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.id = self.id.tag(key, value);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get or create the counter in `registry`. The first registration's
    /// description is kept.
    pub fn register(self, registry: &MeterRegistry) -> Result<Arc<Counter>> {
        registry.typed(&self.id, self.description, Counter::new)
    }
}
