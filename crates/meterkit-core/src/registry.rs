//! In-memory meter registry.
//!
//! Meters live in a `DashMap` keyed by identity. First-time creation goes
//! through the map's entry API, which holds the shard lock for the key, so
//! racing callers always end up with the same instance. Each entry carries a
//! creation sequence number used to iterate in insertion order.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{MeterError, Result};
use crate::id::{MeterId, Tag};
use crate::meter::{Counter, Gauge, Meter, MeterKind, MeterSnapshot, MeterType, Timer};

#[derive(Debug)]
struct Registered {
    meter: Meter,
    description: Option<String>,
    created_seq: u64,
}

/// Owns `MeterId -> Meter`. Share it with `Arc` to use it from many threads
/// or to add it to a [`CompositeRegistry`](crate::CompositeRegistry).
#[derive(Debug, Default)]
pub struct MeterRegistry {
    meters: DashMap<MeterId, Registered>,
    common_tags: BTreeSet<Tag>,
    seq: AtomicU64,
}

impl MeterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose every identity also carries `tags`.
    pub fn with_common_tags<K, V>(tags: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            common_tags: tags.into_iter().map(|(k, v)| Tag::new(k, v)).collect(),
            ..Self::default()
        }
    }

    pub fn common_tags(&self) -> impl Iterator<Item = &Tag> {
        self.common_tags.iter()
    }

    /// Return the meter bound to `id`, creating it with `make` on first use.
    ///
    /// Fails with `TypeMismatch` when `id` is bound to another kind, or when
    /// `make` builds something other than `kind`. `make` runs under the
    /// map's shard lock and must not call back into this registry.
    pub fn get_or_create(
        &self,
        id: &MeterId,
        kind: MeterKind,
        make: impl FnOnce() -> Meter,
    ) -> Result<Meter> {
        self.get_or_create_described(id, kind, None, make)
    }

    fn get_or_create_described(
        &self,
        id: &MeterId,
        kind: MeterKind,
        description: Option<String>,
        make: impl FnOnce() -> Meter,
    ) -> Result<Meter> {
        match self.meters.entry(id.merged(&self.common_tags)) {
            Entry::Occupied(e) => {
                let existing = e.get().meter.kind();
                if existing != kind {
                    tracing::warn!(id = %e.key(), %existing, requested = %kind, "meter kind mismatch");
                    return Err(MeterError::TypeMismatch {
                        id: e.key().to_string(),
                        existing,
                        requested: kind,
                    });
                }
                Ok(e.get().meter.clone())
            }
            Entry::Vacant(v) => {
                let meter = make();
                if meter.kind() != kind {
                    return Err(MeterError::TypeMismatch {
                        id: v.key().to_string(),
                        existing: meter.kind(),
                        requested: kind,
                    });
                }
                let created_seq = self.seq.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(id = %v.key(), %kind, "meter created");
                v.insert(Registered {
                    meter: meter.clone(),
                    description,
                    created_seq,
                });
                Ok(meter)
            }
        }
    }

    /// `TypeMismatch` when `id` is already bound to a kind other than `kind`.
    /// Creates nothing.
    pub(crate) fn check_kind(&self, id: &MeterId, kind: MeterKind) -> Result<()> {
        let key = id.merged(&self.common_tags);
        match self.meters.get(&key).map(|e| e.meter.kind()) {
            Some(existing) if existing != kind => Err(MeterError::TypeMismatch {
                id: key.to_string(),
                existing,
                requested: kind,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn typed<M: MeterType>(
        &self,
        id: &MeterId,
        description: Option<String>,
        make: impl FnOnce() -> M,
    ) -> Result<Arc<M>> {
        let meter =
            self.get_or_create_described(id, M::KIND, description, || M::wrap(Arc::new(make())))?;
        let existing = meter.kind();
        M::unwrap(meter).ok_or_else(|| MeterError::TypeMismatch {
            id: id.to_string(),
            existing,
            requested: M::KIND,
        })
    }

    pub fn counter(&self, id: &MeterId) -> Result<Arc<Counter>> {
        self.typed(id, None, Counter::new)
    }

    pub fn timer(&self, id: &MeterId) -> Result<Arc<Timer>> {
        self.typed(id, None, Timer::new)
    }

    /// Gauge over `obj`. An existing gauge under `id` wins; `obj` is then not
    /// observed.
    pub fn gauge<T, F>(&self, id: &MeterId, obj: &Arc<T>, accessor: F) -> Result<Arc<Gauge>>
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.typed(id, None, || Gauge::observe(obj, accessor))
    }

    pub(crate) fn register_gauge(&self, id: &MeterId, gauge: &Gauge) -> Result<Arc<Gauge>> {
        self.typed(id, None, || gauge.clone())
    }

    /// Look up without creating.
    pub fn find(&self, id: &MeterId) -> Option<Meter> {
        self.meters
            .get(&id.merged(&self.common_tags))
            .map(|r| r.value().meter.clone())
    }

    /// Drop the meter bound to `id`. Handles already held keep working but
    /// are no longer reachable through the registry; the next request builds
    /// a fresh meter.
    pub fn remove(&self, id: &MeterId) -> bool {
        let removed = self.meters.remove(&id.merged(&self.common_tags)).is_some();
        if removed {
            tracing::debug!(%id, "meter removed");
        }
        removed
    }

    pub fn clear(&self) {
        self.meters.clear();
    }

    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }

    /// Snapshot of all meters in insertion order. Meters created while the
    /// snapshot is taken may be missing.
    pub fn iter(&self) -> std::vec::IntoIter<(MeterId, Meter)> {
        let mut entries: Vec<(u64, MeterId, Meter)> = self
            .meters
            .iter()
            .map(|r| (r.value().created_seq, r.key().clone(), r.value().meter.clone()))
            .collect();
        entries.sort_by_key(|(seq, _, _)| *seq);
        entries
            .into_iter()
            .map(|(_, id, meter)| (id, meter))
            .collect::<Vec<_>>()
            .into_iter()
    }

    pub fn for_each(&self, mut visitor: impl FnMut(&MeterId, &Meter)) {
        for (id, meter) in self.iter() {
            visitor(&id, &meter);
        }
    }

    /// Current readings for an exporter, in insertion order.
    pub fn snapshot(&self) -> Vec<MeterSnapshot> {
        let mut entries: Vec<(u64, MeterId, Option<String>, Meter)> = self
            .meters
            .iter()
            .map(|r| {
                let reg = r.value();
                (reg.created_seq, r.key().clone(), reg.description.clone(), reg.meter.clone())
            })
            .collect();
        entries.sort_by_key(|(seq, ..)| *seq);

        // Gauges run caller code, so sample after the shard locks are released.
        entries
            .into_iter()
            .map(|(_, id, description, meter)| MeterSnapshot {
                id,
                description,
                measurement: meter.measure(),
            })
            .collect()
    }
}
