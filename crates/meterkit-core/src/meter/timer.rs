use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::id::MeterId;
use crate::registry::MeterRegistry;

/// Unit for reading accumulated timer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    pub fn nanos_per_unit(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60_000_000_000,
            TimeUnit::Hours => 3_600_000_000_000,
        }
    }

    /// Convert an integer nanosecond total to this unit. Whole units and the
    /// remainder are converted separately so large totals keep sub-unit
    /// precision.
    pub fn convert_nanos(self, nanos: u64) -> f64 {
        let per = self.nanos_per_unit();
        (nanos / per) as f64 + (nanos % per) as f64 / per as f64
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "us",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "h",
        }
    }
}

/// Counts timed events and accumulates their wall-clock duration.
///
/// Durations are stored once, as integer nanoseconds; every read converts
/// from that stored total.
#[derive(Debug, Default)]
pub struct Timer {
    count: AtomicU64,
    total_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a builder for a timer named `name`.
    pub fn builder(name: impl Into<String>) -> TimerBuilder {
        TimerBuilder {
            id: MeterId::new(name),
            description: None,
        }
    }

    /// Start a sample to be stopped against a timer later.
    pub fn start() -> TimerSample {
        TimerSample {
            started: Instant::now(),
        }
    }

    /// Time `op`. The event is recorded whether `op` returns or unwinds; its
    /// result (an `Err` included) and any panic pass through untouched.
    pub fn record<R>(&self, op: impl FnOnce() -> R) -> R {
        let _recording = Recording::start(self);
        op()
    }

    /// Time a future until it completes. A future dropped before completion
    /// is recorded up to the drop.
    pub async fn record_async<F: Future>(&self, fut: F) -> F::Output {
        let _recording = Recording::start(self);
        fut.await
    }

    /// Record a duration measured elsewhere.
    pub fn record_duration(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        let _ = self
            .total_nanos
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |t| {
                Some(t.saturating_add(nanos))
            });
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn total_time(&self, unit: TimeUnit) -> f64 {
        unit.convert_nanos(self.total_nanos())
    }

    /// Average duration per event; 0 before the first event.
    pub fn mean(&self, unit: TimeUnit) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        unit.convert_nanos(self.total_nanos() / count)
    }

    /// Longest single event seen so far.
    pub fn max(&self, unit: TimeUnit) -> f64 {
        unit.convert_nanos(self.max_nanos())
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_nanos(self.total_nanos())
    }

    pub(crate) fn total_nanos(&self) -> u64 {
        self.total_nanos.load(Ordering::Relaxed)
    }

    pub(crate) fn max_nanos(&self) -> u64 {
        self.max_nanos.load(Ordering::Relaxed)
    }
}

/// Records into its timer on drop, including during unwinding.
struct Recording<'a> {
    timer: &'a Timer,
    started: Instant,
}

impl<'a> Recording<'a> {
    fn start(timer: &'a Timer) -> Self {
        Self {
            timer,
            started: Instant::now(),
        }
    }
}

impl Drop for Recording<'_> {
    fn drop(&mut self) {
        self.timer.record_duration(self.started.elapsed());
    }
}

/// A started measurement not yet bound to a timer.
#[derive(Debug, Clone, Copy)]
pub struct TimerSample {
    started: Instant,
}

impl TimerSample {
    /// Record the elapsed time into `timer` and return it.
    pub fn stop(self, timer: &Timer) -> Duration {
        let elapsed = self.started.elapsed();
        timer.record_duration(elapsed);
        elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Fluent registration for a [`Timer`].
#[derive(Debug)]
pub struct TimerBuilder {
    id: MeterId,
    description: Option<String>,
}

impl TimerBuilder {
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.id = self.id.tag(key, value);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn register(self, registry: &MeterRegistry) -> Result<Arc<Timer>> {
        registry.typed(&self.id, self.description, Timer::new)
    }
}
