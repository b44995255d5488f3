//! Meter variants and the tagged union the registries store.
//!
//! Every identity resolves to exactly one kind, fixed when the meter is first
//! created. Registries check the kind on each lookup and report
//! `MeterError::TypeMismatch` instead of handing out the wrong shape.

pub mod counter;
pub mod gauge;
pub mod timer;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::id::MeterId;

pub use counter::{Counter, CounterBuilder};
pub use gauge::{Gauge, GaugeBuilder};
pub use timer::{TimeUnit, Timer, TimerBuilder, TimerSample};

/// Kind tag of a [`Meter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterKind {
    Counter,
    Gauge,
    Timer,
}

impl MeterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeterKind::Counter => "counter",
            MeterKind::Gauge => "gauge",
            MeterKind::Timer => "timer",
        }
    }
}

impl fmt::Display for MeterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered meter. Cloning shares the underlying instance.
#[derive(Debug, Clone)]
pub enum Meter {
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
    Timer(Arc<Timer>),
}

impl Meter {
    pub fn kind(&self) -> MeterKind {
        match self {
            Meter::Counter(_) => MeterKind::Counter,
            Meter::Gauge(_) => MeterKind::Gauge,
            Meter::Timer(_) => MeterKind::Timer,
        }
    }

    pub fn as_counter(&self) -> Option<&Arc<Counter>> {
        match self {
            Meter::Counter(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_gauge(&self) -> Option<&Arc<Gauge>> {
        match self {
            Meter::Gauge(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_timer(&self) -> Option<&Arc<Timer>> {
        match self {
            Meter::Timer(t) => Some(t),
            _ => None,
        }
    }

    /// True when both handles point at the same meter instance.
    pub fn same_instance(&self, other: &Meter) -> bool {
        match (self, other) {
            (Meter::Counter(a), Meter::Counter(b)) => Arc::ptr_eq(a, b),
            (Meter::Gauge(a), Meter::Gauge(b)) => Arc::ptr_eq(a, b),
            (Meter::Timer(a), Meter::Timer(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Read the current value(s).
    pub fn measure(&self) -> Measurement {
        match self {
            Meter::Counter(c) => Measurement::Counter { count: c.count() },
            Meter::Gauge(g) => Measurement::Gauge { value: g.value() },
            Meter::Timer(t) => Measurement::Timer {
                count: t.count(),
                total_nanos: t.total_nanos(),
                max_nanos: t.max_nanos(),
            },
        }
    }
}

/// Point-in-time reading of one meter. Gauge `NaN` serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measurement {
    Counter { count: f64 },
    Gauge { value: f64 },
    Timer {
        count: u64,
        total_nanos: u64,
        max_nanos: u64,
    },
}

/// One registry entry as seen by an exporter.
#[derive(Debug, Clone, Serialize)]
pub struct MeterSnapshot {
    pub id: MeterId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub measurement: Measurement,
}

/// Typed access to one [`Meter`] variant.
pub(crate) trait MeterType: Sized {
    const KIND: MeterKind;

    fn wrap(this: Arc<Self>) -> Meter;
    fn unwrap(meter: Meter) -> Option<Arc<Self>>;
}

impl MeterType for Counter {
    const KIND: MeterKind = MeterKind::Counter;

    fn wrap(this: Arc<Self>) -> Meter {
        Meter::Counter(this)
    }
    fn unwrap(meter: Meter) -> Option<Arc<Self>> {
        match meter {
            Meter::Counter(c) => Some(c),
            _ => None,
        }
    }
}

impl MeterType for Gauge {
    const KIND: MeterKind = MeterKind::Gauge;

    fn wrap(this: Arc<Self>) -> Meter {
        Meter::Gauge(this)
    }
    fn unwrap(meter: Meter) -> Option<Arc<Self>> {
        match meter {
            Meter::Gauge(g) => Some(g),
            _ => None,
        }
    }
}

impl MeterType for Timer {
    const KIND: MeterKind = MeterKind::Timer;

    fn wrap(this: Arc<Self>) -> Meter {
        Meter::Timer(this)
    }
    fn unwrap(meter: Meter) -> Option<Arc<Self>> {
        match meter {
            Meter::Timer(t) => Some(t),
            _ => None,
        }
    }
}
