//! Fan-out over a changing set of member registries.
//!
//! Handles returned by a [`CompositeRegistry`] remember only the identity.
//! Every operation resolves the members present at that moment and applies
//! itself to each member's own meter for the identity. Consequences:
//!
//! - members added later receive later operations;
//! - removed members stop receiving them;
//! - operations issued while there are no members are dropped for good.
//!
//! Reads go to the first member only, without creating anything there. With
//! no member, or no such meter in it, counters and timers read 0 and gauges
//! read `NaN`.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::id::MeterId;
use crate::meter::counter::check_amount;
use crate::meter::{Counter, Gauge, MeterKind, TimeUnit, Timer};
use crate::registry::MeterRegistry;

type Members = Arc<RwLock<Vec<Arc<MeterRegistry>>>>;

fn current(members: &Members) -> Vec<Arc<MeterRegistry>> {
    members.read().unwrap_or_else(|e| e.into_inner()).clone()
}

fn first(members: &Members) -> Option<Arc<MeterRegistry>> {
    members
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .first()
        .cloned()
}

/// Ordered set of shared member registries. Cloning shares the member list.
#[derive(Debug, Clone, Default)]
pub struct CompositeRegistry {
    members: Members,
}

impl CompositeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `registry`. Adding a registry that is already a member is a
    /// no-op returning `false`, so one registry never receives an operation
    /// twice.
    pub fn add(&self, registry: Arc<MeterRegistry>) -> bool {
        let mut members = self.members.write().unwrap_or_else(|e| e.into_inner());
        if members.iter().any(|m| Arc::ptr_eq(m, &registry)) {
            tracing::warn!("registry is already a member of this composite");
            return false;
        }
        members.push(registry);
        tracing::debug!(members = members.len(), "registry added to composite");
        true
    }

    /// Remove `registry` (matched by pointer). Returns whether it was a member.
    pub fn remove(&self, registry: &Arc<MeterRegistry>) -> bool {
        let mut members = self.members.write().unwrap_or_else(|e| e.into_inner());
        let Some(pos) = members.iter().position(|m| Arc::ptr_eq(m, registry)) else {
            return false;
        };
        members.remove(pos);
        tracing::debug!(members = members.len(), "registry removed from composite");
        true
    }

    pub fn members(&self) -> Vec<Arc<MeterRegistry>> {
        current(&self.members)
    }

    pub fn len(&self) -> usize {
        self.members.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn counter(&self, id: impl Into<MeterId>) -> CompositeCounter {
        CompositeCounter {
            id: id.into(),
            members: Arc::clone(&self.members),
        }
    }

    pub fn timer(&self, id: impl Into<MeterId>) -> CompositeTimer {
        CompositeTimer {
            id: id.into(),
            members: Arc::clone(&self.members),
        }
    }

    /// Gauge over `obj`, registered now in every current member and lazily
    /// in members added later (on the next `value()`). When any current
    /// member holds another kind under `id`, nothing is registered.
    pub fn gauge<T, F>(
        &self,
        id: impl Into<MeterId>,
        obj: &Arc<T>,
        accessor: F,
    ) -> Result<CompositeGauge>
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        let gauge = CompositeGauge {
            id: id.into(),
            gauge: Gauge::observe(obj, accessor),
            members: Arc::clone(&self.members),
        };
        let members = current(&self.members);
        for member in &members {
            member.check_kind(&gauge.id, MeterKind::Gauge)?;
        }
        for member in &members {
            member.register_gauge(&gauge.id, &gauge.gauge)?;
        }
        Ok(gauge)
    }
}

/// Counter handle resolved against the composite's members on every call.
#[derive(Debug, Clone)]
pub struct CompositeCounter {
    id: MeterId,
    members: Members,
}

impl CompositeCounter {
    pub fn id(&self) -> &MeterId {
        &self.id
    }

    pub fn increment(&self) -> Result<()> {
        self.increment_by(1.0)
    }

    /// Apply to every current member. The amount is validated even when
    /// there are no members; with none, the increment is dropped. Member
    /// counters are resolved first, so a kind mismatch in any member leaves
    /// all of them unchanged.
    pub fn increment_by(&self, amount: f64) -> Result<()> {
        check_amount(amount)?;
        let counters = current(&self.members)
            .iter()
            .map(|m| m.counter(&self.id))
            .collect::<Result<Vec<Arc<Counter>>>>()?;
        if counters.is_empty() {
            tracing::trace!(id = %self.id, "composite has no members; increment dropped");
        }
        for counter in counters {
            counter.increment_by(amount)?;
        }
        Ok(())
    }

    /// Count held by the first member, 0 when there is none.
    pub fn count(&self) -> f64 {
        first(&self.members)
            .and_then(|m| m.find(&self.id))
            .and_then(|meter| meter.as_counter().map(|c| c.count()))
            .unwrap_or(0.0)
    }
}

/// Timer handle resolved against the composite's members on every call.
#[derive(Debug, Clone)]
pub struct CompositeTimer {
    id: MeterId,
    members: Members,
}

impl CompositeTimer {
    pub fn id(&self) -> &MeterId {
        &self.id
    }

    fn resolve(&self) -> Result<Vec<Arc<Timer>>> {
        current(&self.members)
            .iter()
            .map(|m| m.timer(&self.id))
            .collect()
    }

    /// Time `op` once and record the span into each current member's timer.
    ///
    /// Member timers are resolved before `op` runs: on a kind mismatch the
    /// error is returned and `op` is not run. With no members `op` still
    /// runs and only the measurement is dropped.
    pub fn record<R>(&self, op: impl FnOnce() -> R) -> Result<R> {
        let timers = self.resolve()?;
        let _recording = FanOutRecording::start(timers);
        Ok(op())
    }

    /// Async counterpart of [`record`](Self::record).
    pub async fn record_async<F: Future>(&self, fut: F) -> Result<F::Output> {
        let timers = self.resolve()?;
        let _recording = FanOutRecording::start(timers);
        Ok(fut.await)
    }

    pub fn record_duration(&self, elapsed: Duration) -> Result<()> {
        for timer in self.resolve()? {
            timer.record_duration(elapsed);
        }
        Ok(())
    }

    fn first_timer(&self) -> Option<Arc<Timer>> {
        first(&self.members)
            .and_then(|m| m.find(&self.id))
            .and_then(|meter| meter.as_timer().cloned())
    }

    pub fn count(&self) -> u64 {
        self.first_timer().map(|t| t.count()).unwrap_or(0)
    }

    pub fn total_time(&self, unit: TimeUnit) -> f64 {
        self.first_timer().map(|t| t.total_time(unit)).unwrap_or(0.0)
    }
}

struct FanOutRecording {
    timers: Vec<Arc<Timer>>,
    started: Instant,
}

impl FanOutRecording {
    fn start(timers: Vec<Arc<Timer>>) -> Self {
        Self {
            timers,
            started: Instant::now(),
        }
    }
}

impl Drop for FanOutRecording {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        for timer in &self.timers {
            timer.record_duration(elapsed);
        }
    }
}

/// Gauge handle; reads the first member's gauge for the identity.
#[derive(Debug, Clone)]
pub struct CompositeGauge {
    id: MeterId,
    gauge: Gauge,
    members: Members,
}

impl CompositeGauge {
    pub fn id(&self) -> &MeterId {
        &self.id
    }

    /// Register into members that joined since the last call, then read the
    /// first member's gauge. `NaN` without members or once the observed
    /// object is gone. Members holding another kind under this id are
    /// skipped.
    pub fn value(&self) -> f64 {
        let mut value = None;
        for member in current(&self.members) {
            match member.register_gauge(&self.id, &self.gauge) {
                Ok(g) => {
                    value.get_or_insert_with(|| g.value());
                }
                Err(e) => {
                    tracing::warn!(id = %self.id, error = %e, "composite gauge skipped member");
                }
            }
        }
        value.unwrap_or(f64::NAN)
    }
}
