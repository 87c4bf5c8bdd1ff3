//! Core traits and types shared across this workspace's emulator cores.
//!
//! Everything that tracks time does so in [`Ticks`] of some component's
//! own clock. Components that want to be inspected from the outside
//! (debuggers, monitors, test harnesses) implement [`Observable`].

mod observable;
mod scheduler;
mod ticks;

pub use observable::{Observable, Value};
pub use scheduler::Scheduler;
pub use ticks::Ticks;
