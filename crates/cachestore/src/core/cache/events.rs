//! Structured events reported by the store.
//!
//! Observers are notified after the state change they describe has been
//! applied. They receive shared references only, so attaching or removing an
//! observer never changes what the store returns.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use super::policies::PolicyKind;

/// Something that happened inside a [`CacheStore`](super::CacheStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CacheEvent {
    /// Line table allocated.
    Constructed {
        sets: usize,
        ways: usize,
        block_bytes: usize,
        policy: PolicyKind,
    },
    /// Store dropped with `occupancy` valid lines.
    Destroyed { occupancy: usize },
    /// `find` matched a resident block.
    Hit { address: u64, set: usize, way: usize },
    /// `find` matched nothing.
    Miss { address: u64, set: usize },
    /// `is_full` was queried.
    FullCheck { address: u64, set: usize, full: bool },
    /// `pick_line` recommended `victim` to make room for `address`.
    VictimChosen {
        address: u64,
        set: usize,
        way: usize,
        victim: u64,
        valid: bool,
    },
    /// `set` filled a vacant line.
    Inserted { address: u64, set: usize, way: usize },
    /// `erase` invalidated a line.
    Erased { address: u64, set: usize, way: usize },
}

/// Sink for [`CacheEvent`]s.
pub trait CacheObserver {
    fn notify(&mut self, event: &CacheEvent);
}

impl<T: CacheObserver + ?Sized> CacheObserver for Box<T> {
    fn notify(&mut self, event: &CacheEvent) {
        (**self).notify(event);
    }
}

/// Lets the caller keep a handle on an observer owned by the store.
impl<T: CacheObserver + ?Sized> CacheObserver for Rc<RefCell<T>> {
    fn notify(&mut self, event: &CacheEvent) {
        self.borrow_mut().notify(event);
    }
}

/// Forwards events through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl CacheObserver for LogObserver {
    fn notify(&mut self, event: &CacheEvent) {
        match *event {
            CacheEvent::Constructed {
                sets,
                ways,
                block_bytes,
                policy,
            } => log::info!(
                "cache store constructed: {sets} sets x {ways} ways, {block_bytes}-byte blocks, {policy}"
            ),
            CacheEvent::Destroyed { occupancy } => {
                log::info!("cache store destroyed with {occupancy} resident blocks")
            }
            CacheEvent::Hit { address, set, way } => {
                log::debug!("hit {address:#x} (set {set}, way {way})")
            }
            CacheEvent::Miss { address, set } => log::debug!("miss {address:#x} (set {set})"),
            CacheEvent::FullCheck { address, set, full } => {
                log::trace!("set {set} full={full} for {address:#x}")
            }
            CacheEvent::VictimChosen {
                address,
                set,
                way,
                victim,
                valid,
            } => log::debug!(
                "victim for {address:#x}: {victim:#x} (set {set}, way {way}, valid={valid})"
            ),
            CacheEvent::Inserted { address, set, way } => {
                log::debug!("insert {address:#x} (set {set}, way {way})")
            }
            CacheEvent::Erased { address, set, way } => {
                log::debug!("erase {address:#x} (set {set}, way {way})")
            }
        }
    }
}

/// Delivers each event to several observers, in order.
#[derive(Default)]
pub struct Fanout {
    observers: Vec<Box<dyn CacheObserver>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: impl CacheObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn push(&mut self, observer: Box<dyn CacheObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl CacheObserver for Fanout {
    fn notify(&mut self, event: &CacheEvent) {
        for observer in &mut self.observers {
            observer.notify(event);
        }
    }
}
