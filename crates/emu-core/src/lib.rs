//! Core types for driving a cycle-counted emulation from a frame loop.
//!
//! Everything is measured in ticks of the emulated machine's base clock.
//! Wall-clock time only enters at the edge, where it is converted once.

mod clock;
mod counter;
mod observable;
mod ticks;

pub use clock::MasterClock;
pub use counter::{CycleCounter, CycleReader, CycleWriter};
pub use observable::{Observable, Value};
pub use ticks::Ticks;
