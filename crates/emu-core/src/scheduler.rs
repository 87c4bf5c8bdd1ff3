//! Cycle-ordered event scheduler.
//!
//! A priority queue of `(due_cycle, event)` pairs plus a monotonic cycle
//! counter. This is the timing backbone for any core built around "run the
//! CPU, then let peripherals react to elapsed cycles" rather than a
//! per-cycle master-clock tick: PPU line transitions, timer overflows, and
//! DMA re-triggers are all future events rather than work done every cycle.
//!
//! Events carry a small `Copy` tag (`E`) instead of a boxed closure. A
//! boxed `FnMut` would need to capture `&mut` references into sibling
//! components (the DMA engine, the interrupt controller, ...) which fights
//! the borrow checker the moment a callback needs to touch more than one of
//! them. Tag-and-dispatch keeps the scheduler itself free of any knowledge
//! of what an event *means* — the caller's `on_fire` closure (or the
//! fired-event `Vec` from [`Scheduler::drain_due`]) decides that.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::Ticks;

struct Entry<E> {
    due: u64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}
impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest due_cycle (and,
        // on a tie, the earliest insertion) sorts to the top.
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A cycle-ordered priority queue of future events.
///
/// `schedule` inserts an event at `current + cycles_from_now`. `tick`
/// advances the current cycle and invokes `on_fire` for every event whose
/// due cycle has been reached, in `(due_cycle, insertion_order)` order.
/// `on_fire` receives `&mut Scheduler<E>` so it can schedule further events
/// (e.g. a PPU HBlank event rescheduling itself for the next line).
pub struct Scheduler<E> {
    current: u64,
    next_seq: u64,
    queue: BinaryHeap<Entry<E>>,
}

impl<E> Scheduler<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// The current cycle counter.
    #[must_use]
    pub const fn now(&self) -> Ticks {
        Ticks::new(self.current)
    }

    /// Insert `event`, due `cycles_from_now` cycles after the current cycle.
    pub fn schedule(&mut self, cycles_from_now: u64, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            due: self.current + cycles_from_now,
            seq,
            event,
        });
    }

    /// True if no event is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The due cycle of the earliest pending event, if any.
    #[must_use]
    pub fn peek_due(&self) -> Option<u64> {
        self.queue.peek().map(|e| e.due)
    }

    /// Advance the current cycle by `n` and invoke `on_fire` for every event
    /// whose due cycle is now `<= current`, earliest first. `on_fire` may
    /// call `schedule` again on the `&mut Self` it's given; newly scheduled
    /// events that are immediately due (zero cycles from now) fire within
    /// the same `tick` call.
    pub fn tick(&mut self, n: u64, mut on_fire: impl FnMut(&mut Self, E)) {
        self.current += n;
        loop {
            let due = match self.queue.peek() {
                Some(entry) if entry.due <= self.current => entry.due,
                _ => break,
            };
            let _ = due;
            let entry = self.queue.pop().expect("peeked entry must exist");
            on_fire(self, entry.event);
        }
    }

    /// Clear all pending events and reset the cycle counter to zero.
    pub fn reset(&mut self) {
        self.current = 0;
        self.next_seq = 0;
        self.queue.clear();
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_cycle_order_with_fifo_ties() {
        let mut sched: Scheduler<&'static str> = Scheduler::new();
        sched.schedule(5, "a");
        sched.schedule(10, "b");
        sched.schedule(5, "c");

        let mut fired = Vec::new();
        sched.tick(20, |_s, e| fired.push(e));

        assert_eq!(fired, vec!["a", "c", "b"]);
    }

    #[test]
    fn callback_can_reschedule() {
        let mut sched: Scheduler<u32> = Scheduler::new();
        sched.schedule(5, 1);

        let mut fired = Vec::new();
        sched.tick(5, |s, e| {
            fired.push(e);
            if e < 3 {
                s.schedule(0, e + 1);
            }
        });

        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn tick_advances_even_with_no_events() {
        let mut sched: Scheduler<u32> = Scheduler::new();
        sched.tick(7, |_, _| unreachable!());
        assert_eq!(sched.now(), Ticks::new(7));
    }

    #[test]
    fn partial_advance_leaves_future_events_pending() {
        let mut sched: Scheduler<&'static str> = Scheduler::new();
        sched.schedule(10, "late");
        let mut fired = Vec::new();
        sched.tick(5, |_s, e| fired.push(e));
        assert!(fired.is_empty());
        assert_eq!(sched.peek_due(), Some(10));
        sched.tick(5, |_s, e| fired.push(e));
        assert_eq!(fired, vec!["late"]);
    }
}
