//! Per-frame driver: power state, deferred events, pacing and display.
//!
//! # Frame loop
//!
//! `update()` is called once per host display frame with the wall time
//! since the previous call. While the machine is on, each frame runs:
//!
//! 1. due program load (if any),
//! 2. keyboard latch,
//! 3. cycle budget from the audio playback position,
//! 4. core step to the budget,
//! 5. audio pump.
//!
//! While it is off, the only work is checking the automatic power-on.

use std::time::Duration;

use emu_core::{MasterClock, Observable, Value};
use tracing::{debug, info, warn};

use crate::audio::AudioConsumer;
use crate::catalog::ProgramLoader;
use crate::config::DriverConfig;
use crate::core::EmulationCore;
use crate::device::{Device, DeviceFamily, RomVariant};
use crate::expansion::{DEFAULT_SLOTS, REGISTERED_MODULES};
use crate::keyboard::Keyboard;
use crate::power::{PendingGame, PowerState, Schedule};
use crate::sync::CycleBudget;
use crate::video::{RenderMode, SurfaceUpdater, VideoDispatcher};

/// Drives one emulated machine from the host frame loop.
pub struct FrameDriver<C, A, L>
where
    C: EmulationCore,
    A: AudioConsumer,
    L: ProgramLoader,
{
    core: C,
    audio: A,
    loader: L,
    device: Device,
    rom: RomVariant,
    clock: MasterClock,
    boot_frames: u64,
    /// Frames since construction.
    frame: u64,
    schedule: Schedule,
    keyboard: Keyboard,
    /// Created on first render.
    video: Option<VideoDispatcher>,
}

impl<C, A, L> FrameDriver<C, A, L>
where
    C: EmulationCore,
    A: AudioConsumer,
    L: ProgramLoader,
{
    /// Create a driver for the configured model. The machine starts off.
    ///
    /// # Panics
    ///
    /// Panics if the configured ROM cannot boot the configured model.
    pub fn new(config: &DriverConfig, mut core: C, audio: A, loader: L) -> Self {
        let device = config.device;
        let rom = config.rom();
        assert!(
            device.accepts_rom(rom),
            "{rom:?} cannot boot {device}"
        );

        if device.family() == DeviceFamily::Kc85 {
            for spec in &REGISTERED_MODULES {
                core.register_module(spec);
            }
        }

        Self {
            core,
            audio,
            loader,
            device,
            rom,
            clock: device.clock(),
            boot_frames: config.boot_frames,
            frame: 0,
            schedule: Schedule::new(config.switch_on_delay_frames),
            keyboard: Keyboard::new(),
            video: None,
        }
    }

    /// Run one host frame. `frame_time` is the wall time since the last call.
    pub fn update(&mut self, frame_time: Duration) {
        self.frame += 1;

        if self.is_switched_on() {
            if let Some(game) = self.schedule.take_due_game(self.frame) {
                self.start_due_game(&game);
            }

            self.keyboard.handle_input(self.frame, &mut self.core);

            let budget = CycleBudget::ahead_of(self.audio.processed_cycles(), self.clock);
            let micros = u32::try_from(frame_time.as_micros()).unwrap_or(u32::MAX);
            self.core.step_to(micros, budget, self.audio.sink());
            self.audio.pump(self.clock);
        } else if self.schedule.take_switch_on(self.frame) {
            debug!(frame = self.frame, "automatic power-on");
            self.switch_on();
        }
    }

    /// Flip the power switch.
    ///
    /// This is a user action: it cancels the automatic power-on, and
    /// switching off cancels a pending program load.
    pub fn toggle_power(&mut self) {
        if let Some(at) = self.schedule.cancel_switch_on() {
            debug!(at, "automatic power-on cancelled");
        }

        if self.is_switched_on() {
            self.core.power_off();
            debug!(frame = self.frame, "power off");
            if let Some(game) = self.schedule.cancel_game() {
                debug!(name = %game.name, "pending program dropped by power-off");
            }
        } else {
            self.switch_on();
        }
    }

    /// Warm reset, only if running.
    pub fn reset(&mut self) {
        if self.is_switched_on() {
            self.core.reset();
        }
    }

    /// Power-cycle the machine and load `name` once it has booted.
    ///
    /// Replaces any program load still pending. If no catalog entry for
    /// this model matches when the load is due, nothing happens.
    pub fn start_game(&mut self, name: &str) {
        if self.is_switched_on() {
            self.toggle_power();
        }
        self.toggle_power();

        let due_frame = self.frame + self.boot_frames;
        self.schedule.schedule_game(name, due_frame);
        info!(name, due_frame, "program start scheduled");
    }

    /// Upload the latest frame to the display. Does nothing while off.
    ///
    /// The display surface is created on the first call; pass the same
    /// updater every time.
    pub fn render(&mut self, surfaces: &mut dyn SurfaceUpdater, mode: RenderMode) {
        if !self.is_switched_on() {
            return;
        }
        if self.video.is_none() {
            self.video = Some(VideoDispatcher::new(self.device.family(), surfaces));
        }
        if let Some(dispatcher) = &self.video {
            dispatcher.dispatch(&self.core, surfaces, mode);
        }
    }

    /// Power off and hand back the collaborators.
    pub fn discard(mut self) -> (C, A, L) {
        if self.is_switched_on() {
            self.core.power_off();
        }
        (self.core, self.audio, self.loader)
    }

    fn switch_on(&mut self) {
        self.core.power_on(self.device, self.rom);
        // The core counts from zero again; so must the playback position.
        self.audio.restart(self.clock);
        if self.device.family() == DeviceFamily::Kc85 {
            for (slot, module) in DEFAULT_SLOTS {
                if !self.core.slot_occupied(slot) {
                    self.core.insert_module(slot, module);
                }
            }
        }
        debug!(frame = self.frame, device = %self.device, "power on");
    }

    fn start_due_game(&mut self, game: &PendingGame) {
        let Some(entry) = self.loader.find(&game.name, self.device) else {
            debug!(name = %game.name, device = %self.device, "no catalog entry, program not started");
            return;
        };
        if let Err(e) = self.loader.load_and_start(&mut self.core, entry) {
            warn!(name = %game.name, "program not started: {e}");
        }
    }

    #[must_use]
    pub fn is_switched_on(&self) -> bool {
        self.core.is_powered_on()
    }

    #[must_use]
    pub fn power_state(&self) -> PowerState {
        PowerState::from(self.is_switched_on())
    }

    /// Frames since construction.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn device(&self) -> Device {
        self.device
    }

    #[must_use]
    pub fn rom(&self) -> RomVariant {
        self.rom
    }

    #[must_use]
    pub fn clock(&self) -> MasterClock {
        self.clock
    }

    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn keyboard(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    #[must_use]
    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut C {
        &mut self.core
    }

    #[must_use]
    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<C, A, L> Observable for FrameDriver<C, A, L>
where
    C: EmulationCore,
    A: AudioConsumer,
    L: ProgramLoader,
{
    fn query(&self, path: &str) -> Option<Value> {
        let pending = self.schedule.pending_game();
        match path {
            "frame" => Some(self.frame.into()),
            "powered" => Some(self.is_switched_on().into()),
            "device" => Some(self.device.name().into()),
            "clock_hz" => Some(self.clock.frequency_hz.into()),
            "switch_on_frame" => Some(self.schedule.switch_on_at().into()),
            "pending_game.name" => Some(pending.map(|g| g.name.as_str()).into()),
            "pending_game.frame" => Some(pending.map(|g| g.due_frame).into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "frame",
            "powered",
            "device",
            "clock_hz",
            "switch_on_frame",
            "pending_game.name",
            "pending_game.frame",
        ]
    }
}
