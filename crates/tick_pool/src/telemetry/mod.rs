//! Observability counters
//!
//! Entities report their activation and deactivation to an injected sink so the
//! number of live instances can be traced without ambient global state.

use std::cell::Cell;

/// Name of the live projectile counter
pub const ACTIVE_PROJECTILES: &str = "Game/ActiveProjectiles";

/// Sink for a single up/down counter
pub trait CounterSink {
    /// One more live instance
    fn increment(&self);
    /// One fewer live instance
    fn decrement(&self);
}

/// Up/down counter that never reports a negative value
#[derive(Debug)]
pub struct ActiveCounter {
    name: &'static str,
    value: Cell<u64>,
    peak: Cell<u64>,
}

impl ActiveCounter {
    /// Create a counter at zero
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            value: Cell::new(0),
            peak: Cell::new(0),
        }
    }

    /// Counter name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current value
    pub fn current(&self) -> u64 {
        self.value.get()
    }

    /// Highest value seen
    pub fn peak(&self) -> u64 {
        self.peak.get()
    }
}

impl Default for ActiveCounter {
    fn default() -> Self {
        Self::new(ACTIVE_PROJECTILES)
    }
}

impl CounterSink for ActiveCounter {
    fn increment(&self) {
        let value = self.value.get() + 1;
        self.value.set(value);
        self.peak.set(self.peak.get().max(value));
        log::trace!("{} = {value}", self.name);
    }

    fn decrement(&self) {
        match self.value.get().checked_sub(1) {
            Some(value) => {
                self.value.set(value);
                log::trace!("{} = {value}", self.name);
            }
            None => log::warn!("{} decremented below zero; clamped", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_up_and_down() {
        let counter = ActiveCounter::default();
        for _ in 0..5 {
            counter.increment();
        }
        for _ in 0..3 {
            counter.decrement();
        }
        assert_eq!(counter.current(), 2);
        assert_eq!(counter.peak(), 5);
        assert_eq!(counter.name(), ACTIVE_PROJECTILES);
    }

    #[test]
    fn test_never_negative() {
        let counter = ActiveCounter::new("test");
        counter.decrement();
        assert_eq!(counter.current(), 0);
        counter.increment();
        assert_eq!(counter.current(), 1);
    }
}
