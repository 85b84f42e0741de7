//! Audio-driven cycle budget.
//!
//! Each frame the core is told to run until its generated cycle count lands
//! inside a window placed 10-40 ms ahead of what the audio output has
//! already played. Running less starves the output; running more piles up
//! latency. The window depends only on the current playback position, so a
//! core that falls behind is pulled forward on the very next frame.

use emu_core::{MasterClock, Ticks};

/// Divisor giving the minimum lead: 1/100 s of cycles.
const MIN_AHEAD_DIVISOR: u64 = 100;

/// Divisor giving the maximum lead: 1/25 s of cycles.
const MAX_AHEAD_DIVISOR: u64 = 25;

/// Target window for one stepping call, in absolute emulated cycles.
///
/// `(0, 0)` asks the core to step one frame on its own timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleBudget {
    pub min: Ticks,
    pub max: Ticks,
}

impl CycleBudget {
    /// Let the core pick its own single-frame step.
    pub const DEFAULT_STEP: Self = Self {
        min: Ticks::ZERO,
        max: Ticks::ZERO,
    };

    /// Window for a given playback position.
    ///
    /// `processed` is the number of cycles the audio output has consumed.
    /// Zero means playback has not started, which yields [`Self::DEFAULT_STEP`].
    #[must_use]
    pub fn ahead_of(processed: Ticks, clock: MasterClock) -> Self {
        if processed.is_zero() {
            return Self::DEFAULT_STEP;
        }
        Self {
            min: processed + clock.fraction(MIN_AHEAD_DIVISOR),
            max: processed + clock.fraction(MAX_AHEAD_DIVISOR),
        }
    }

    /// Whether this is the "step one frame" signal.
    #[must_use]
    pub const fn is_default_step(&self) -> bool {
        self.min.is_zero() && self.max.is_zero()
    }

    /// Whether an absolute cycle position lies inside the window.
    #[must_use]
    pub fn contains(&self, position: Ticks) -> bool {
        self.min <= position && position <= self.max
    }
}
