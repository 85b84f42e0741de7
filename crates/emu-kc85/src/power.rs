//! Power state and frame-scheduled power events.
//!
//! Two events are scheduled by frame index: the automatic power-on after
//! startup, and the program load that follows a game-start power cycle.
//! Both are deadlines: they fire on the first frame at or past the target,
//! then are gone. A frame the caller skips cannot make an event miss.

/// Machine power state, as reported by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Off,
    On,
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// A program load waiting for the machine to finish booting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGame {
    pub name: String,
    pub due_frame: u64,
}

/// Deadlines for the automatic power-on and the pending program load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    switch_on_at: Option<u64>,
    pending_game: Option<PendingGame>,
}

impl Schedule {
    /// Schedule with an optional automatic power-on frame.
    #[must_use]
    pub fn new(switch_on_at: Option<u64>) -> Self {
        Self {
            switch_on_at,
            pending_game: None,
        }
    }

    /// Consume the automatic power-on if `frame` has reached it.
    pub fn take_switch_on(&mut self, frame: u64) -> bool {
        match self.switch_on_at {
            Some(at) if frame >= at => {
                self.switch_on_at = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the automatic power-on.
    pub fn cancel_switch_on(&mut self) -> Option<u64> {
        self.switch_on_at.take()
    }

    /// Record a program load, replacing any earlier one.
    ///
    /// Returns the replaced request.
    pub fn schedule_game(&mut self, name: impl Into<String>, due_frame: u64) -> Option<PendingGame> {
        self.pending_game.replace(PendingGame {
            name: name.into(),
            due_frame,
        })
    }

    /// Consume the pending program load if `frame` has reached it.
    pub fn take_due_game(&mut self, frame: u64) -> Option<PendingGame> {
        if self
            .pending_game
            .as_ref()
            .is_some_and(|game| frame >= game.due_frame)
        {
            self.pending_game.take()
        } else {
            None
        }
    }

    /// Drop the pending program load.
    pub fn cancel_game(&mut self) -> Option<PendingGame> {
        self.pending_game.take()
    }

    #[must_use]
    pub fn switch_on_at(&self) -> Option<u64> {
        self.switch_on_at
    }

    #[must_use]
    pub fn pending_game(&self) -> Option<&PendingGame> {
        self.pending_game.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_on_fires_once_at_deadline() {
        let mut schedule = Schedule::new(Some(10));
        for frame in 1..10 {
            assert!(!schedule.take_switch_on(frame), "frame {frame}");
        }
        assert!(schedule.take_switch_on(10));
        assert!(!schedule.take_switch_on(11));
        assert_eq!(schedule.switch_on_at(), None);
    }

    #[test]
    fn switch_on_survives_skipped_frame() {
        let mut schedule = Schedule::new(Some(10));
        assert!(!schedule.take_switch_on(9));
        assert!(schedule.take_switch_on(12));
    }

    #[test]
    fn no_switch_on_configured() {
        let mut schedule = Schedule::new(None);
        assert!(!schedule.take_switch_on(u64::MAX));
    }

    #[test]
    fn later_game_request_replaces_earlier() {
        let mut schedule = Schedule::default();
        assert_eq!(schedule.schedule_game("Pengo", 310), None);
        let replaced = schedule.schedule_game("Digger", 320);
        assert_eq!(replaced.map(|g| g.name), Some("Pengo".to_string()));
        assert_eq!(
            schedule.pending_game(),
            Some(&PendingGame {
                name: "Digger".to_string(),
                due_frame: 320
            })
        );
    }

    #[test]
    fn game_fires_once() {
        let mut schedule = Schedule::default();
        schedule.schedule_game("Pengo", 5);
        assert_eq!(schedule.take_due_game(4), None);
        assert_eq!(schedule.take_due_game(5).map(|g| g.due_frame), Some(5));
        assert_eq!(schedule.take_due_game(6), None);
    }

    #[test]
    fn power_state_from_flag() {
        assert_eq!(PowerState::from(true), PowerState::On);
        assert_eq!(PowerState::from(false), PowerState::Off);
    }
}
