//! Keyboard input for KC85-family machines.
//!
//! The cores take a single latched key code per frame, as the KC85 keyboard
//! controller does: the most recently pressed key that is still held, or 0.
//! Two sources feed it:
//! 1. Live host key events (`key_down`/`key_up`) between frames.
//! 2. `InputQueue` - frame-timed events for scripted typing.

use std::collections::VecDeque;

use crate::core::EmulationCore;

/// A key on the emulated keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KcKey {
    /// Printable ASCII character.
    Char(char),
    Enter,
    Space,
    Left,
    Right,
    Up,
    Down,
    /// BRK.
    Break,
    /// DEL.
    Delete,
    /// F1-F6.
    Function(u8),
}

impl KcKey {
    /// Key code latched into the core.
    ///
    /// Returns `None` for characters the machines cannot type.
    #[must_use]
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Char(ch) if ch.is_ascii_graphic() => Some(ch as u8),
            Self::Char(' ') | Self::Space => Some(0x20),
            Self::Char('\n') | Self::Enter => Some(0x0D),
            Self::Char(_) => None,
            Self::Left => Some(0x08),
            Self::Right => Some(0x09),
            Self::Down => Some(0x0A),
            Self::Up => Some(0x0B),
            Self::Break => Some(0x03),
            Self::Delete => Some(0x01),
            Self::Function(n @ 1..=6) => Some(0xF0 + n),
            Self::Function(_) => None,
        }
    }
}

/// A timed keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    /// Frame at which this event fires.
    pub frame: u64,
    pub key: KcKey,
    /// True = press, false = release.
    pub pressed: bool,
}

/// Frame-ordered scripted key events.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event, keeping frame order (stable for equal frames).
    pub fn push(&mut self, event: InputEvent) {
        let pos = self
            .events
            .iter()
            .position(|e| e.frame > event.frame)
            .unwrap_or(self.events.len());
        self.events.insert(pos, event);
    }

    /// Enqueue typing a string, holding each key for 3 frames with a 3-frame
    /// gap. Untypeable characters are skipped.
    ///
    /// Returns the next free frame after the last character.
    pub fn enqueue_text(&mut self, text: &str, start_frame: u64) -> u64 {
        let hold = 3u64;
        let gap = 3u64;
        let mut frame = start_frame;

        for ch in text.chars() {
            let key = KcKey::Char(ch);
            if key.code().is_none() {
                continue;
            }
            self.push(InputEvent {
                frame,
                key,
                pressed: true,
            });
            self.push(InputEvent {
                frame: frame + hold,
                key,
                pressed: false,
            });
            frame += hold + gap;
        }

        frame
    }

    /// Remove and return all events due at or before `frame`.
    pub fn take_due(&mut self, frame: u64) -> impl Iterator<Item = InputEvent> + '_ {
        let due = self
            .events
            .iter()
            .position(|e| e.frame > frame)
            .unwrap_or(self.events.len());
        self.events.drain(..due)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Held keys plus the scripted queue.
#[derive(Debug, Default)]
pub struct Keyboard {
    /// Held keys, most recent last.
    held: Vec<KcKey>,
    queue: InputQueue,
}

impl Keyboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: KcKey) {
        if key.code().is_some() && !self.held.contains(&key) {
            self.held.push(key);
        }
    }

    pub fn key_up(&mut self, key: KcKey) {
        self.held.retain(|&k| k != key);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Mutable access to the scripted queue.
    pub fn queue(&mut self) -> &mut InputQueue {
        &mut self.queue
    }

    /// Code of the key the core should see now (0 = none).
    #[must_use]
    pub fn current_code(&self) -> u8 {
        self.held
            .last()
            .and_then(|key| key.code())
            .unwrap_or(0)
    }

    /// Apply scripted events for `frame` and latch the current key into
    /// the core.
    pub fn handle_input(&mut self, frame: u64, core: &mut dyn EmulationCore) {
        let due: Vec<InputEvent> = self.queue.take_due(frame).collect();
        for event in due {
            if event.pressed {
                self.key_down(event.key);
            } else {
                self.key_up(event.key);
            }
        }
        core.put_key(self.current_code());
    }
}
