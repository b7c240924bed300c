//! Logical clock.
//!
//! The store stamps lines with the value returned by [`Clock::now`] when a
//! block is inserted and whenever it hits. It never advances the clock; that
//! is the job of whatever drives the simulation.

use std::cell::Cell;
use std::rc::Rc;

/// A point in logical time.
pub type Tick = u64;

/// Read-only source of monotonically non-decreasing logical time.
pub trait Clock {
    /// Returns the current logical time.
    fn now(&self) -> Tick;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Tick {
        (**self).now()
    }
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn now(&self) -> Tick {
        (**self).now()
    }
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn now(&self) -> Tick {
        (**self).now()
    }
}

/// Adapts a closure into a [`Clock`].
pub struct FnClock<F>(pub F);

impl<F: Fn() -> Tick> Clock for FnClock<F> {
    fn now(&self) -> Tick {
        (self.0)()
    }
}

/// Clock advanced explicitly by its owner.
///
/// Share it with the store through an `Rc` and keep a handle to step time.
#[derive(Debug, Default)]
pub struct ManualClock {
    tick: Cell<Tick>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(tick: Tick) -> Self {
        Self {
            tick: Cell::new(tick),
        }
    }

    /// Moves time forward by `delta` ticks and returns the new time.
    pub fn advance(&self, delta: Tick) -> Tick {
        let next = self.tick.get().saturating_add(delta);
        self.tick.set(next);
        next
    }

    /// Jumps to `tick`. Moving backwards is ignored to keep time monotonic.
    pub fn set(&self, tick: Tick) {
        if tick > self.tick.get() {
            self.tick.set(tick);
        }
    }

    pub fn now(&self) -> Tick {
        self.tick.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Tick {
        self.tick.get()
    }
}
