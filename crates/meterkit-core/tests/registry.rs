//! Identity, get-or-create and iteration.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Barrier};
use std::thread;

use meterkit_core::meter::{Counter, Timer};
use meterkit_core::{Measurement, Meter, MeterId, MeterKind, MeterRegistry};

#[test]
fn identity_ignores_tag_order() {
    let a = MeterId::new("http.requests").tag("method", "GET").tag("uri", "/a");
    let b = MeterId::with_tags("http.requests", [("uri", "/a"), ("method", "GET")]);
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "http.requests{method=GET,uri=/a}");

    // same key, different value: distinct tags, distinct identity
    let c = MeterId::new("http.requests").tag("uri", "/a").tag("uri", "/b");
    assert_ne!(a, c);
    assert_eq!(c.tags().count(), 2);
    assert_eq!(MeterId::new("").to_string(), "");
}

#[test]
fn equal_identities_share_one_meter() {
    let registry = MeterRegistry::new();
    let a = MeterId::with_tags("numero.empleados", [("oficina", "John Doe"), ("pais", "ES")]);
    let b = MeterId::with_tags("numero.empleados", [("pais", "ES"), ("oficina", "John Doe")]);

    let first = registry.counter(&a).unwrap();
    let second = registry.counter(&b).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    first.increment();
    second.increment_by(200.0).unwrap();
    assert_eq!(first.count(), 201.0);
    assert_eq!(registry.len(), 1);
}

#[test]
fn kind_mismatch_is_rejected() {
    let registry = MeterRegistry::new();
    let id = MeterId::new("tiempo.ejecucion");
    registry.timer(&id).unwrap();

    let err = registry.counter(&id).expect_err("timer id reused as counter");
    assert_eq!(err.code().as_str(), "TYPE_MISMATCH");

    let err = registry
        .get_or_create(&MeterId::new("other"), MeterKind::Timer, || {
            Meter::Counter(Arc::new(Counter::new()))
        })
        .expect_err("constructor of the wrong kind");
    assert_eq!(err.code().as_str(), "TYPE_MISMATCH");
    assert!(registry.find(&MeterId::new("other")).is_none());
}

#[test]
fn concurrent_first_requests_create_one_meter() {
    let registry = Arc::new(MeterRegistry::new());
    let barrier = Arc::new(Barrier::new(8));
    let id = MeterId::new("test.counter.metric");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            let id = id.clone();
            thread::spawn(move || {
                barrier.wait();
                let c = registry.counter(&id).unwrap();
                c.increment();
                c
            })
        })
        .collect();

    let counters: Vec<Arc<Counter>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(counters.iter().all(|c| Arc::ptr_eq(c, &counters[0])));
    assert_eq!(counters[0].count(), 8.0);
    assert_eq!(registry.len(), 1);
}

#[test]
fn remove_resets_state() {
    let registry = MeterRegistry::new();
    let cid = MeterId::new("requests");
    let tid = MeterId::new("latency");

    registry.counter(&cid).unwrap().increment_by(3.0).unwrap();
    registry.timer(&tid).unwrap().record(|| ());

    assert!(registry.remove(&cid));
    assert!(registry.remove(&tid));
    assert!(!registry.remove(&tid));

    assert_eq!(registry.counter(&cid).unwrap().count(), 0.0);
    assert_eq!(registry.timer(&tid).unwrap().count(), 0);
}

#[test]
fn iteration_follows_insertion_order() {
    let registry = MeterRegistry::new();
    for name in ["c", "a", "b"] {
        registry.counter(&MeterId::new(name)).unwrap();
    }
    registry.timer(&MeterId::new("0")).unwrap();

    let names: Vec<String> = registry.iter().map(|(id, _)| id.name().to_string()).collect();
    assert_eq!(names, ["c", "a", "b", "0"]);

    // restartable
    let mut seen = Vec::new();
    registry.for_each(|id, meter| seen.push((id.name().to_string(), meter.kind())));
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[3], ("0".to_string(), MeterKind::Timer));
}

#[test]
fn common_tags_apply_to_every_identity() {
    let registry = MeterRegistry::with_common_tags([("app", "demo")]);
    let c = registry.counter(&MeterId::new("hits")).unwrap();
    c.increment();

    let (id, _) = registry.iter().next().unwrap();
    assert_eq!(id.tag_value("app"), Some("demo"));
    assert_eq!(id, MeterId::new("hits").tag("app", "demo"));

    // lookups with or without the common tag resolve to the same meter
    let found = registry.find(&MeterId::new("hits")).unwrap();
    assert!(found.same_instance(&Meter::Counter(c)));
}

#[test]
fn builders_register_with_description() {
    let registry = MeterRegistry::new();
    let counter = Counter::builder("numero.estudiantes")
        .description("Número de estudiantes")
        .tag("curso", "Métricas con Micrometer")
        .register(&registry)
        .unwrap();
    counter.increment();
    counter.increment_by(200.0).unwrap();

    let timer = Timer::builder("tiempo.ejecucion").register(&registry).unwrap();
    timer.record(|| ());

    let again = registry
        .counter(&MeterId::new("numero.estudiantes").tag("curso", "Métricas con Micrometer"))
        .unwrap();
    assert_eq!(again.count(), 201.0);

    let snap = registry.snapshot();
    assert_eq!(snap.len(), 2);
    assert_eq!(snap[0].description.as_deref(), Some("Número de estudiantes"));
    assert_eq!(snap[0].measurement, Measurement::Counter { count: 201.0 });
    assert!(matches!(snap[1].measurement, Measurement::Timer { count: 1, .. }));
}

#[test]
fn snapshot_serializes_for_exporters() {
    let registry = MeterRegistry::new();
    registry
        .counter(&MeterId::new("numero.empleados").tag("oficina", "John Doe"))
        .unwrap()
        .increment_by(201.0)
        .unwrap();

    let json = serde_json::to_value(registry.snapshot()).unwrap();
    assert_eq!(json[0]["kind"], "counter");
    assert_eq!(json[0]["count"], 201.0);
    assert_eq!(json[0]["id"]["name"], "numero.empleados");
    assert_eq!(json[0]["id"]["tags"][0]["key"], "oficina");
    assert!(json[0].get("description").is_none());
}
