//! Reference core for headless runs and tests.
//!
//! `HeadlessCore` has no CPU: it only keeps the emulated timeline. Stepping
//! advances a cycle counter the way a real core must (into the requested
//! window, or one 50 Hz frame), emits a square-wave tone at the output
//! sample rate, and paints a moving test pattern into the family's
//! framebuffer. Memory, slots and key latch behave like the real thing so
//! the driver's side effects can be observed.

use std::collections::BTreeMap;
use std::time::Duration;

use emu_core::{MasterClock, Ticks};
use format_kcc::KccImage;

use crate::core::{EmulationCore, FrameSource, SampleSink};
use crate::device::{Device, RomVariant};
use crate::expansion::{ModuleKind, ModuleSpec};
use crate::sync::CycleBudget;

/// Video refresh of the emulated machines.
const DISPLAY_HZ: u64 = 50;

/// Test tone frequency.
const TONE_HZ: u64 = 440;

/// Tone amplitude.
const TONE_LEVEL: f32 = 0.25;

/// Cycle-counting stand-in for an emulation core.
pub struct HeadlessCore {
    device: Device,
    clock: MasterClock,
    sample_rate: u32,
    powered: bool,
    rom: Option<RomVariant>,
    /// Cycles generated since power-on.
    generated: Ticks,
    /// Samples emitted since power-on.
    samples: u64,
    framebuffer: Vec<u8>,
    memory: Vec<u8>,
    pc: Option<u16>,
    key: u8,
    registered: Vec<ModuleSpec>,
    slots: BTreeMap<u8, ModuleKind>,
    power_ons: u32,
    power_offs: u32,
    resets: u32,
}

impl HeadlessCore {
    #[must_use]
    pub fn new(device: Device, sample_rate: u32) -> Self {
        let video = device.family().video();
        Self {
            device,
            clock: device.clock(),
            sample_rate,
            powered: false,
            rom: None,
            generated: Ticks::ZERO,
            samples: 0,
            framebuffer: vec![0; video.frame_bytes()],
            memory: vec![0; 0x1_0000],
            pc: None,
            key: 0,
            registered: Vec::new(),
            slots: BTreeMap::new(),
            power_ons: 0,
            power_offs: 0,
            resets: 0,
        }
    }

    /// Cycles generated since the last power-on.
    #[must_use]
    pub fn generated(&self) -> Ticks {
        self.generated
    }

    /// Completed 50 Hz frames since the last power-on.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.generated.get() / self.clock.ticks_per_frame(DISPLAY_HZ).get()
    }

    #[must_use]
    pub fn key(&self) -> u8 {
        self.key
    }

    #[must_use]
    pub fn rom(&self) -> Option<RomVariant> {
        self.rom
    }

    #[must_use]
    pub fn pc(&self) -> Option<u16> {
        self.pc
    }

    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory[usize::from(addr)]
    }

    #[must_use]
    pub fn slot(&self, slot: u8) -> Option<ModuleKind> {
        self.slots.get(&slot).copied()
    }

    #[must_use]
    pub fn registered_modules(&self) -> &[ModuleSpec] {
        &self.registered
    }

    /// (power-ons, power-offs, resets) since creation.
    #[must_use]
    pub fn power_events(&self) -> (u32, u32, u32) {
        (self.power_ons, self.power_offs, self.resets)
    }

    fn target_for(&self, elapsed_us: u32, budget: CycleBudget) -> Ticks {
        if budget.is_default_step() {
            return self.generated + self.clock.ticks_per_frame(DISPLAY_HZ);
        }
        let wanted = self.generated
            + self
                .clock
                .ticks_in(Duration::from_micros(u64::from(elapsed_us)));
        // Never run backwards, even if the window is already behind us.
        wanted.max(budget.min).min(budget.max).max(self.generated)
    }

    fn emit_audio(&mut self, sink: &mut dyn SampleSink) {
        let half_period = u64::from(self.sample_rate) / (2 * TONE_HZ);
        loop {
            let next = self
                .clock
                .ticks_for_samples(self.samples + 1, self.sample_rate);
            if next > self.generated {
                break;
            }
            let high = half_period > 0 && (self.samples / half_period) % 2 == 0;
            sink.push_sample(if high { TONE_LEVEL } else { -TONE_LEVEL });
            self.samples += 1;
        }
    }

    fn paint(&mut self) {
        let width = self.device.family().video().width as usize;
        let shift = self.frames() as usize;
        let key = self.key;
        for (i, pixel) in self.framebuffer.chunks_exact_mut(4).enumerate() {
            let x = i % width;
            let y = i / width;
            let bar = ((x + shift) / 8) % 2 == 0;
            pixel[0] = if bar { 0xFF } else { 0x20 };
            pixel[1] = (y % 256) as u8;
            pixel[2] = key;
            pixel[3] = 0xFF;
        }
    }
}

impl EmulationCore for HeadlessCore {
    fn power_on(&mut self, device: Device, rom: RomVariant) {
        assert_eq!(device, self.device, "core was built for {}", self.device);
        self.powered = true;
        self.rom = Some(rom);
        self.generated = Ticks::ZERO;
        self.samples = 0;
        self.pc = None;
        self.memory.fill(0);
        self.power_ons += 1;
        self.paint();
    }

    fn power_off(&mut self) {
        self.powered = false;
        self.framebuffer.fill(0);
        self.power_offs += 1;
    }

    fn reset(&mut self) {
        self.pc = None;
        self.resets += 1;
    }

    fn is_powered_on(&self) -> bool {
        self.powered
    }

    fn step_to(&mut self, elapsed_us: u32, budget: CycleBudget, sink: &mut dyn SampleSink) {
        if !self.powered {
            return;
        }
        let frames_before = self.frames();
        self.generated = self.target_for(elapsed_us, budget);
        self.emit_audio(sink);
        if self.frames() != frames_before {
            self.paint();
        }
    }

    fn framebuffer(&self, source: FrameSource) -> &[u8] {
        if source == self.device.family().video().source {
            &self.framebuffer
        } else {
            &[]
        }
    }

    fn put_key(&mut self, code: u8) {
        self.key = code;
    }

    fn register_module(&mut self, spec: &ModuleSpec) {
        self.registered.push(*spec);
    }

    fn slot_occupied(&self, slot: u8) -> bool {
        self.slots.contains_key(&slot)
    }

    fn insert_module(&mut self, slot: u8, module: ModuleKind) {
        self.slots.insert(slot, module);
    }

    fn load_program(&mut self, image: &KccImage) {
        let start = usize::from(image.load_addr);
        let end = (start + image.data.len()).min(self.memory.len());
        self.memory[start..end].copy_from_slice(&image.data[..end - start]);
        self.pc = image.exec_addr;
    }
}
