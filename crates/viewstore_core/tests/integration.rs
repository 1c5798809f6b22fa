//! Integration tests for the store core.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::Arc;
use viewstore_core::{
    ActionRequest, Batch, Engine, EngineError, EngineResult, MockEngine, SnapshotUpdate, Store,
    StoreConfig, Value,
};

/// An engine that announces each dispatch and blocks until the test
/// grants a permit, so tests can observe the queue mid-flight.
struct GateEngine {
    started: Mutex<mpsc::Sender<String>>,
    permits: Mutex<mpsc::Receiver<()>>,
    responses: Mutex<VecDeque<Batch>>,
}

impl GateEngine {
    fn new(responses: Vec<Batch>) -> (Arc<Self>, mpsc::Receiver<String>, mpsc::Sender<()>) {
        let (started_tx, started_rx) = mpsc::channel();
        let (permit_tx, permit_rx) = mpsc::channel();
        let engine = Arc::new(Self {
            started: Mutex::new(started_tx),
            permits: Mutex::new(permit_rx),
            responses: Mutex::new(responses.into()),
        });
        (engine, started_rx, permit_tx)
    }
}

impl Engine for GateEngine {
    fn call(&self, request: &ActionRequest) -> EngineResult<Batch> {
        self.started
            .lock()
            .send(request.name.clone())
            .map_err(|e| EngineError::transport(e.to_string()))?;
        self.permits
            .lock()
            .recv()
            .map_err(|e| EngineError::transport(e.to_string()))?;
        Ok(self.responses.lock().pop_front().unwrap_or_default())
    }
}

fn slice(n: i64) -> Value {
    Value::map(vec![("n".to_string(), Value::Integer(n))])
}

#[test]
fn later_action_waits_for_earlier_batch() {
    // Given actions A then B, A's batch is fully applied before B's
    // engine call is dispatched.
    let (engine, started, permits) = GateEngine::new(vec![
        Batch::new(vec![SnapshotUpdate::put("slice", 1, slice(1))]),
        Batch::new(vec![SnapshotUpdate::put("slice", 2, slice(2))]),
    ]);
    let store = Store::with_engine(engine);

    let ticket_a = store.emit("a", None).unwrap();
    let ticket_b = store.emit("b", None).unwrap();

    // A is in flight, B is queued behind it; nothing is applied yet.
    assert_eq!(started.recv().unwrap(), "a");
    assert!(store.snapshot("slice").is_none());

    permits.send(()).unwrap();

    // The moment B is dispatched, A's batch must already be visible.
    assert_eq!(started.recv().unwrap(), "b");
    let snapshot = store.snapshot("slice").unwrap();
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.value, slice(1));

    permits.send(()).unwrap();
    ticket_a.wait().unwrap();
    ticket_b.wait().unwrap();
    assert_eq!(store.snapshot("slice").unwrap().version, 2);
}

#[test]
fn batches_are_atomic_under_concurrent_readers() {
    // For a batch touching p1..p3, no reader ever observes some but
    // not all of them reflecting the batch.
    struct TripletEngine {
        round: Mutex<u64>,
    }
    impl Engine for TripletEngine {
        fn call(&self, _request: &ActionRequest) -> EngineResult<Batch> {
            let mut round = self.round.lock();
            *round += 1;
            let version = *round;
            Ok(Batch::new(vec![
                SnapshotUpdate::put("p1", version, slice(version as i64)),
                SnapshotUpdate::put("p2", version, slice(version as i64)),
                SnapshotUpdate::put("p3", version, slice(version as i64)),
            ]))
        }
    }

    let store = Arc::new(Store::with_engine(Arc::new(TripletEngine {
        round: Mutex::new(0),
    })));

    let reader_store = Arc::clone(&store);
    let reader = std::thread::spawn(move || {
        for _ in 0..2000 {
            let snapshots = reader_store.snapshots(&["p1", "p2", "p3"]);
            let present = snapshots.iter().flatten().count();
            assert!(
                present == 0 || present == 3,
                "observed a partially applied batch"
            );
            if present == 3 {
                let versions: Vec<u64> = snapshots.iter().flatten().map(|s| s.version).collect();
                assert_eq!(versions[0], versions[1]);
                assert_eq!(versions[1], versions[2]);
            }
        }
    });

    for _ in 0..50 {
        store.emit("tick", None).unwrap();
    }
    store.wait_idle().unwrap();
    reader.join().unwrap();
}

#[test]
fn versions_increase_across_actions() {
    struct CountingEngine {
        sequence: Mutex<u64>,
    }
    impl Engine for CountingEngine {
        fn call(&self, _request: &ActionRequest) -> EngineResult<Batch> {
            let mut sequence = self.sequence.lock();
            *sequence += 1;
            Ok(Batch::new(vec![SnapshotUpdate::put(
                "counter",
                *sequence,
                slice(*sequence as i64),
            )]))
        }
    }

    let store = Store::with_engine(Arc::new(CountingEngine {
        sequence: Mutex::new(0),
    }));

    let mut last = 0;
    for _ in 0..10 {
        store.emit("bump", None).unwrap();
        store.wait_idle().unwrap();
        let version = store.snapshot("counter").unwrap().version;
        assert!(version > last);
        last = version;
    }
}

#[test]
fn get_sync_waits_for_every_queued_action() {
    let engine = Arc::new(MockEngine::new());
    for version in 1..=4u64 {
        engine.push_response(Ok(Batch::new(vec![SnapshotUpdate::put(
            "counter",
            version,
            slice(version as i64),
        )])));
    }

    let store = Store::with_engine(Arc::clone(&engine) as Arc<dyn Engine>);
    for _ in 0..4 {
        store.emit("bump", None).unwrap();
    }

    // get_sync returns only after all four actions settled.
    let decoded = store.get_sync("counter").unwrap().unwrap();
    assert_eq!(decoded.as_raw().unwrap().req_i64("n").unwrap(), 4);
}

#[test]
fn failed_action_does_not_stall_followers() {
    let engine = Arc::new(MockEngine::new());
    engine.push_response(Err(EngineError::transport("engine crashed")));
    engine.push_response(Ok(Batch::new(vec![SnapshotUpdate::put(
        "slice",
        1,
        slice(1),
    )])));

    let store = Store::with_engine(Arc::clone(&engine) as Arc<dyn Engine>);
    let failed = store.emit("doomed", None).unwrap();
    let ok = store.emit("fine", None).unwrap();

    assert!(failed.wait().is_err());
    ok.wait().unwrap();
    assert_eq!(store.snapshot("slice").unwrap().version, 1);
}

#[test]
fn subscriber_sees_settled_state_for_each_change() {
    let engine = Arc::new(MockEngine::new());
    engine.push_response(Ok(Batch::new(vec![
        SnapshotUpdate::put("auth/state", 1, slice(1)),
        SnapshotUpdate::put("route", 1, Value::from("/feed")),
    ])));

    let store = Arc::new(Store::with_engine(Arc::clone(&engine) as Arc<dyn Engine>));

    let observed = Arc::new(Mutex::new(Vec::new()));
    let observed_clone = Arc::clone(&observed);
    let store_clone = Arc::clone(&store);
    let handle = store.subscribe("auth/state", move |change| {
        // Sibling updates from the same batch are already visible.
        let route = store_clone
            .snapshot("route")
            .map(|s| s.value)
            .and_then(|v| v.as_text().map(str::to_string));
        observed_clone.lock().push((change.path.clone(), route));
    });

    store.emit("login", None).unwrap().wait().unwrap();

    let observed = observed.lock();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].0, "auth/state");
    assert_eq!(observed[0].1.as_deref(), Some("/feed"));
    drop(handle);
}

#[test]
fn get_sync_timeout_is_configurable() {
    struct NeverEngine;
    impl Engine for NeverEngine {
        fn call(&self, _request: &ActionRequest) -> EngineResult<Batch> {
            std::thread::sleep(std::time::Duration::from_millis(500));
            Ok(Batch::empty())
        }
    }

    let config = StoreConfig::new("impatient")
        .with_get_sync_timeout(std::time::Duration::from_millis(20));
    let store = Store::new(config, Arc::new(NeverEngine));

    store.emit("slow", None).unwrap();
    assert!(store.get_sync("anything").is_err());

    // Let the worker finish before the store drops.
    store.close();
}
