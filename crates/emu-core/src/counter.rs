//! Monotonic cycle counter shared across threads.
//!
//! One side of the emulator (typically the audio output thread) publishes
//! how far along the emulated timeline it has got; the frame loop reads it.
//! The counter has exactly one writer and never goes backwards.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Ticks;

/// Constructor for a writer/reader pair over one shared counter.
pub struct CycleCounter;

impl CycleCounter {
    /// Create a counter starting at zero.
    #[must_use]
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (CycleWriter, CycleReader) {
        let cell = Arc::new(AtomicU64::new(0));
        (
            CycleWriter {
                cell: Arc::clone(&cell),
            },
            CycleReader { cell },
        )
    }
}

/// The single writer of a cycle counter. Not `Clone`.
#[derive(Debug)]
pub struct CycleWriter {
    cell: Arc<AtomicU64>,
}

impl CycleWriter {
    /// Publish a new position. Values behind the current one are ignored.
    pub fn advance_to(&self, position: Ticks) {
        // Single writer: a plain load/compare/store cannot race another store.
        let current = self.cell.load(Ordering::Relaxed);
        if position.get() > current {
            self.cell.store(position.get(), Ordering::Release);
        }
    }

    /// Current published position.
    #[must_use]
    pub fn get(&self) -> Ticks {
        Ticks::new(self.cell.load(Ordering::Relaxed))
    }

    /// A new reader of this counter.
    #[must_use]
    pub fn reader(&self) -> CycleReader {
        CycleReader {
            cell: Arc::clone(&self.cell),
        }
    }
}

/// A read handle on a cycle counter.
#[derive(Debug, Clone)]
pub struct CycleReader {
    cell: Arc<AtomicU64>,
}

impl CycleReader {
    /// Latest published position.
    #[must_use]
    pub fn get(&self) -> Ticks {
        Ticks::new(self.cell.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let (_writer, reader) = CycleCounter::new();
        assert_eq!(reader.get(), Ticks::ZERO);
    }

    #[test]
    fn never_moves_backwards() {
        let (writer, reader) = CycleCounter::new();
        writer.advance_to(Ticks(1_000));
        writer.advance_to(Ticks(400));
        assert_eq!(reader.get(), Ticks(1_000));
        writer.advance_to(Ticks(1_001));
        assert_eq!(reader.get(), Ticks(1_001));
    }

    #[test]
    fn readers_share_the_writer_value() {
        let (writer, reader) = CycleCounter::new();
        let second = writer.reader();
        let third = reader.clone();
        writer.advance_to(Ticks(42));
        assert_eq!(second.get(), Ticks(42));
        assert_eq!(third.get(), Ticks(42));
    }

    #[test]
    fn visible_from_another_thread() {
        let (writer, reader) = CycleCounter::new();
        let handle = std::thread::spawn(move || {
            for i in 1..=1_000 {
                writer.advance_to(Ticks(i));
            }
        });
        handle.join().unwrap();
        assert_eq!(reader.get(), Ticks(1_000));
    }
}
