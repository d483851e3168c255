use std::cell::Cell;
use std::time::Instant;

/// Milliseconds since an arbitrary monotonic origin.
///
/// Every engine operation takes one of these explicitly so that sessions can be
/// replayed deterministically in tests.
pub type Millis = u64;

/// Source of engine timestamps
pub trait Clock {
    fn now(&self) -> Millis;
}

/// Wall clock backed by `Instant`, counting from construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Convert an `Instant` captured elsewhere (e.g. when a key was read) into
    /// this clock's time base. Instants before the origin clamp to zero.
    pub fn at(&self, instant: Instant) -> Millis {
        instant
            .checked_duration_since(self.origin)
            .unwrap_or_default()
            .as_millis() as Millis
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Millis {
        self.at(Instant::now())
    }
}

/// Hand-driven clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, t: Millis) {
        self.now.set(t);
    }

    pub fn advance(&self, by: Millis) -> Millis {
        let t = self.now.get() + by;
        self.now.set(t);
        t
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.get()
    }
}
