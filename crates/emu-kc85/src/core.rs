//! Interface of the emulation core the driver runs.
//!
//! The core executes CPU and chip emulation; the driver only decides when
//! it runs, how far, and what happens around power transitions.

use format_kcc::KccImage;

use crate::device::{Device, RomVariant};
use crate::expansion::{ModuleKind, ModuleSpec};
use crate::sync::CycleBudget;

/// Which framebuffer a core exposes for a device family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSource {
    /// KC85 linear RGBA8 buffer decoded from IRM video memory.
    Kc85Linear,
    /// Z9001/KC87 RGBA8 buffer.
    Z9001Rgba,
    /// Z1013 RGBA8 buffer.
    Z1013Rgba,
}

/// Receiver for audio samples generated while the core steps.
pub trait SampleSink {
    /// Queue one mono sample in the range -1.0..=1.0.
    fn push_sample(&mut self, sample: f32);
}

impl SampleSink for Vec<f32> {
    fn push_sample(&mut self, sample: f32) {
        self.push(sample);
    }
}

/// An emulation core for one of the supported machines.
pub trait EmulationCore {
    /// Power on as `device` booting `rom`.
    fn power_on(&mut self, device: Device, rom: RomVariant);

    /// Power off. Expansion modules stay seated.
    fn power_off(&mut self);

    /// Warm reset of a running machine.
    fn reset(&mut self);

    /// Whether the machine is switched on.
    fn is_powered_on(&self) -> bool;

    /// Advance emulated time.
    ///
    /// With a non-default budget the core runs until its generated cycle
    /// count lies within `budget`, using `elapsed_us` as the preferred
    /// amount of time to cover. With [`CycleBudget::DEFAULT_STEP`] it runs
    /// one frame on its own timing. Audio is delivered to `sink` as it is
    /// generated.
    fn step_to(&mut self, elapsed_us: u32, budget: CycleBudget, sink: &mut dyn SampleSink);

    /// RGBA8 framebuffer of the most recently completed frame.
    fn framebuffer(&self, source: FrameSource) -> &[u8];

    /// Latch the currently pressed key code (0 = no key).
    fn put_key(&mut self, code: u8);

    /// Make a module type available for insertion (KC85 only).
    fn register_module(&mut self, spec: &ModuleSpec);

    /// Whether a module is seated in `slot` (KC85 only).
    fn slot_occupied(&self, slot: u8) -> bool;

    /// Seat a module in `slot` (KC85 only).
    fn insert_module(&mut self, slot: u8, module: ModuleKind);

    /// Copy a program into memory and, if it has a start address, run it.
    fn load_program(&mut self, image: &KccImage);
}
