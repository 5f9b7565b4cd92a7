//! Boundary-row gates for the pipelined evolver.
//!
//! A gate carries the latest generation written for one boundary row.
//! Readers wait until that generation reaches what they need; the writer
//! publishes after every row it finishes. Monotonic generations replace a
//! per-half-step done flag, so there is nothing to reset between steps.

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
pub(crate) struct RowGate {
    generation: Mutex<u64>,
    ready: Condvar,
}

impl RowGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record that the row now holds `generation` and wake every waiter.
    pub(crate) fn publish(&self, generation: u64) {
        let mut current = self.generation.lock();
        debug_assert!(generation >= *current);
        *current = generation;
        drop(current);
        self.ready.notify_all();
    }

    /// Block until the row holds at least `generation`.
    /// Returns whether the caller actually had to wait.
    pub(crate) fn wait_for(&self, generation: u64) -> bool {
        let mut current = self.generation.lock();
        let mut stalled = false;
        while *current < generation {
            stalled = true;
            self.ready.wait(&mut current);
        }
        stalled
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        *self.generation.lock()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::RowGate;

    #[test]
    fn wait_returns_immediately_when_ready() {
        let gate = RowGate::new();
        assert!(!gate.wait_for(0));
        gate.publish(3);
        assert!(!gate.wait_for(2));
        assert!(!gate.wait_for(3));
        assert_eq!(gate.generation(), 3);
    }

    #[test]
    fn waiter_wakes_on_publish_and_reports_the_stall() {
        let gate = Arc::new(RowGate::new());
        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.wait_for(5))
        };
        // Give the waiter time to block on the condvar first.
        thread::sleep(Duration::from_millis(100));
        for generation in 1..=5 {
            gate.publish(generation);
        }
        assert!(waiter.join().expect("waiter thread panicked"));
        assert_eq!(gate.generation(), 5);
    }

    #[test]
    fn ping_pong_between_two_rows() {
        // Two threads alternately advance their own row, each waiting for
        // the other to catch up first.
        let gates = Arc::new([RowGate::new(), RowGate::new()]);
        let handles: Vec<_> = (0..2)
            .map(|side| {
                let gates = Arc::clone(&gates);
                thread::spawn(move || {
                    for generation in 0..200u64 {
                        gates[1 - side].wait_for(generation);
                        gates[side].publish(generation + 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert_eq!(gates[0].generation(), 200);
        assert_eq!(gates[1].generation(), 200);
    }
}
