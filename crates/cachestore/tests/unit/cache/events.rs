//! # Event Reporting Tests

use std::cell::RefCell;
use std::rc::Rc;

use cachestore::{
    CacheConfig, CacheEvent, CacheObserver, CacheStats, CacheStore, Fanout, LogObserver,
    ManualClock, PolicyKind,
};
use mockall::mock;
use mockall::predicate::eq;
use pretty_assertions::assert_eq;

mock! {
    pub Observer {}
    impl CacheObserver for Observer {
        fn notify(&mut self, event: &CacheEvent);
    }
}

#[derive(Default)]
struct Recorder(Vec<CacheEvent>);

impl CacheObserver for Recorder {
    fn notify(&mut self, event: &CacheEvent) {
        self.0.push(event.clone());
    }
}

fn recorded_store() -> (
    Rc<ManualClock>,
    Rc<RefCell<Recorder>>,
    CacheStore<Rc<ManualClock>>,
) {
    let clock = Rc::new(ManualClock::new());
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let store = CacheStore::with_observer(
        CacheConfig::new(1, 2, 2),
        Rc::clone(&clock),
        Rc::clone(&recorder),
    )
    .unwrap();
    (clock, recorder, store)
}

#[test]
fn test_event_sequence_for_eviction() {
    let (clock, recorder, mut store) = recorded_store();
    clock.advance(1);
    store.set(0x00, &[0; 4]).unwrap();
    clock.advance(1);
    store.set(0x10, &[0; 4]).unwrap();
    store.find(0x20).unwrap();
    store.is_full(0x20).unwrap();
    let victim = store.pick_line(0x20).unwrap().address;
    store.erase(victim).unwrap();
    store.set(0x20, &[0; 4]).unwrap();
    store.find(0x20).unwrap();
    drop(store);

    assert_eq!(
        recorder.borrow().0,
        vec![
            CacheEvent::Constructed {
                sets: 2,
                ways: 2,
                block_bytes: 4,
                policy: PolicyKind::Lru
            },
            CacheEvent::Inserted {
                address: 0x00,
                set: 0,
                way: 0
            },
            CacheEvent::Inserted {
                address: 0x10,
                set: 0,
                way: 1
            },
            CacheEvent::Miss {
                address: 0x20,
                set: 0
            },
            CacheEvent::FullCheck {
                address: 0x20,
                set: 0,
                full: true
            },
            CacheEvent::VictimChosen {
                address: 0x20,
                set: 0,
                way: 0,
                victim: 0x00,
                valid: true
            },
            CacheEvent::Erased {
                address: 0x00,
                set: 0,
                way: 0
            },
            CacheEvent::Inserted {
                address: 0x20,
                set: 0,
                way: 0
            },
            CacheEvent::Hit {
                address: 0x20,
                set: 0,
                way: 0
            },
            CacheEvent::Destroyed { occupancy: 2 },
        ]
    );
}

#[test]
fn test_failed_operations_emit_nothing() {
    let (_clock, recorder, mut store) = recorded_store();
    store.set(0x00, &[0; 4]).unwrap();
    let before = recorder.borrow().0.len();

    assert!(store.set(0x00, &[0; 4]).is_err());
    assert!(store.erase(0x10).is_err());
    assert!(store.find(0x03).is_err());
    assert!(store.contains(0x00).unwrap());

    assert_eq!(recorder.borrow().0.len(), before);
}

#[test]
fn test_mock_observer_sees_hit() {
    let mut observer = MockObserver::new();
    observer
        .expect_notify()
        .withf(|e| matches!(e, CacheEvent::Constructed { .. }))
        .times(1)
        .return_const(());
    observer
        .expect_notify()
        .withf(|e| matches!(e, CacheEvent::Inserted { .. }))
        .times(1)
        .return_const(());
    observer
        .expect_notify()
        .with(eq(CacheEvent::Hit {
            address: 0x04,
            set: 1,
            way: 0,
        }))
        .times(1)
        .return_const(());
    observer
        .expect_notify()
        .withf(|e| matches!(e, CacheEvent::Destroyed { occupancy: 1 }))
        .times(1)
        .return_const(());

    let clock = ManualClock::new();
    let mut store = CacheStore::with_observer(CacheConfig::new(1, 2, 2), &clock, observer).unwrap();
    store.set(0x04, &[0; 4]).unwrap();
    store.find(0x04).unwrap();
}

#[test]
fn test_observer_does_not_change_results() {
    let trace = [0x00u64, 0x10, 0x00, 0x20, 0x30, 0x10, 0x00];

    let run = |mut store: CacheStore<Rc<ManualClock>>, clock: Rc<ManualClock>| {
        let mut log = Vec::new();
        for &a in &trace {
            clock.advance(1);
            if store.find(a).unwrap().1.is_some() {
                log.push((a, None));
                continue;
            }
            let mut evicted = None;
            if store.is_full(a).unwrap() {
                let v = store.pick_line(a).unwrap().address;
                store.erase(v).unwrap();
                evicted = Some(v);
            }
            store.set(a, &[a as u8; 4]).unwrap();
            log.push((a, evicted));
        }
        log
    };

    let config = CacheConfig::new(0, 2, 2);
    let plain_clock = Rc::new(ManualClock::new());
    let plain = CacheStore::new(config.clone(), Rc::clone(&plain_clock)).unwrap();

    let observed_clock = Rc::new(ManualClock::new());
    let fanout = Fanout::new()
        .with(LogObserver)
        .with(CacheStats::new())
        .with(Recorder::default());
    let observed = CacheStore::with_observer(config, Rc::clone(&observed_clock), fanout).unwrap();

    assert_eq!(run(plain, plain_clock), run(observed, observed_clock));
}

#[test]
fn test_stats_through_store() {
    let clock = Rc::new(ManualClock::new());
    let stats = Rc::new(RefCell::new(CacheStats::new()));
    let mut store = CacheStore::with_observer(
        CacheConfig::new(0, 1, 0),
        Rc::clone(&clock),
        Rc::clone(&stats),
    )
    .unwrap();

    store.find(0x1).unwrap();
    store.set(0x1, &[0]).unwrap();
    store.find(0x1).unwrap();
    store.is_full(0x2).unwrap();
    store.pick_line(0x2).unwrap();
    store.erase(0x1).unwrap();

    assert_eq!(
        *stats.borrow(),
        CacheStats {
            hits: 1,
            misses: 1,
            full_checks: 1,
            insertions: 1,
            evictions: 1,
            erasures: 1,
        }
    );
}

#[test]
fn test_log_observer_emits_records() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();

    let clock = ManualClock::new();
    let mut store = CacheStore::with_observer(CacheConfig::default(), &clock, LogObserver).unwrap();
    store.set(0x40, &[0; 64]).unwrap();
    assert!(store.find(0x40).unwrap().1.is_some());
    assert!(!store.is_full(0x40).unwrap());
}
