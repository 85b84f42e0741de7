//! Base clock configuration.

use std::time::Duration;

use crate::Ticks;

/// Base clock of an emulated machine.
///
/// All cycle budgets, audio accounting and frame lengths derive from this
/// frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Clock frequency in Hz (e.g., `1_750_000` for a KC85/3).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }

    /// A fixed fraction of one second of ticks, `frequency / divisor`.
    ///
    /// `fraction(100)` is ten milliseconds worth of cycles.
    #[must_use]
    pub const fn fraction(&self, divisor: u64) -> Ticks {
        Ticks::new(self.frequency_hz / divisor)
    }

    /// Ticks elapsed over a wall-clock duration.
    #[must_use]
    pub fn ticks_in(&self, duration: Duration) -> Ticks {
        let ticks = u128::from(self.frequency_hz) * duration.as_micros() / 1_000_000;
        Ticks::new(u64::try_from(ticks).unwrap_or(u64::MAX))
    }

    /// Ticks covered by `samples` audio samples at `sample_rate`.
    #[must_use]
    pub fn ticks_for_samples(&self, samples: u64, sample_rate: u32) -> Ticks {
        if sample_rate == 0 {
            return Ticks::ZERO;
        }
        let ticks = u128::from(samples) * u128::from(self.frequency_hz) / u128::from(sample_rate);
        Ticks::new(u64::try_from(ticks).unwrap_or(u64::MAX))
    }

    /// Wall-clock length of a tick span.
    #[must_use]
    pub fn duration_of(&self, ticks: Ticks) -> Duration {
        if self.frequency_hz == 0 {
            return Duration::ZERO;
        }
        let micros = u128::from(ticks.get()) * 1_000_000 / u128::from(self.frequency_hz);
        Duration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
    }
}
