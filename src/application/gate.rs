//! Single-flight admission gate

use std::sync::atomic::{AtomicBool, Ordering};

/// Admits at most one operation at a time. A second request while one is
/// in flight is rejected, never queued.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to enter the gate; the gate reopens when the guard is dropped.
    pub fn try_acquire(&self) -> Option<FlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| FlightGuard { gate: self })
    }

    /// Sequentially consistent, so two gates that each check the other
    /// after entering cannot both admit.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

/// Held while an admitted operation runs
#[derive(Debug)]
pub struct FlightGuard<'a> {
    gate: &'a SingleFlight,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected() {
        let gate = SingleFlight::new();
        let guard = gate.try_acquire();
        assert!(guard.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
    }

    #[test]
    fn dropping_guard_reopens_gate() {
        let gate = SingleFlight::new();
        drop(gate.try_acquire());
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }
}
