use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::Result;
use crate::id::MeterId;
use crate::registry::MeterRegistry;

type Sampler = Arc<dyn Fn() -> Option<f64> + Send + Sync>;

/// Samples a value off an object it does not own.
///
/// The gauge keeps only a `Weak` reference to the observed object. Each
/// `value()` call upgrades it and runs the accessor; once the object is gone
/// the gauge reads `NaN` instead of failing.
#[derive(Clone)]
pub struct Gauge {
    sample: Sampler,
}

impl Gauge {
    /// Observe `obj` through `accessor`.
    pub fn observe<T, F>(obj: &Arc<T>, accessor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        let weak: Weak<T> = Arc::downgrade(obj);
        Self {
            sample: Arc::new(move || weak.upgrade().map(|o| accessor(&o))),
        }
    }

    /// Start a builder for a gauge named `name` over `obj`.
    pub fn builder<T, F>(name: impl Into<String>, obj: &Arc<T>, accessor: F) -> GaugeBuilder
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        GaugeBuilder {
            id: MeterId::new(name),
            description: None,
            gauge: Self::observe(obj, accessor),
        }
    }

    /// Current sample, or `NaN` when the observed object was dropped.
    pub fn value(&self) -> f64 {
        (self.sample)().unwrap_or(f64::NAN)
    }

    /// False once the observed object was dropped.
    pub fn is_available(&self) -> bool {
        (self.sample)().is_some()
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge").finish_non_exhaustive()
    }
}

/// Fluent registration for a [`Gauge`].
#[derive(Debug)]
pub struct GaugeBuilder {
    id: MeterId,
    description: Option<String>,
    gauge: Gauge,
}

impl GaugeBuilder {
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.id = self.id.tag(key, value);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Register into `registry`. If a gauge already exists under this id the
    /// existing one is returned and this builder's object is not observed.
    pub fn register(self, registry: &MeterRegistry) -> Result<Arc<Gauge>> {
        let gauge = self.gauge;
        registry.typed(&self.id, self.description, move || gauge)
    }
}
