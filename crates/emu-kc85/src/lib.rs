//! Frame pacing and power control for KC85-family emulators.
//!
//! Covers the KC85/2, /3 and /4, the Z9001 and KC87, and the Z1013 range.
//! The emulation core itself sits behind [`EmulationCore`]; this crate
//! decides when it runs and for how long. Each host frame the
//! [`FrameDriver`] steps the core into a cycle window kept 10-40 ms ahead
//! of the audio output's playback position, fires the automatic power-on
//! and deferred program loads, and uploads the family's framebuffer to the
//! display.

pub mod audio;
pub mod capture;
pub mod catalog;
mod config;
mod core;
mod device;
mod driver;
mod error;
pub mod expansion;
pub mod headless;
pub mod keyboard;
mod power;
mod sync;
pub mod video;

pub use audio::{AudioConsumer, AudioPump, SampleConsumer, default_capacity, sample_ring};
pub use catalog::{CatalogEntry, FileCatalog, ProgramLoader};
pub use config::{
    DEFAULT_BOOT_FRAMES, DEFAULT_SAMPLE_RATE, DEFAULT_SWITCH_ON_DELAY_FRAMES, DriverConfig,
    NOMINAL_FRAME_RATE,
};
pub use crate::core::{EmulationCore, FrameSource, SampleSink};
pub use device::{Device, DeviceFamily, DeviceMask, RomVariant};
pub use driver::FrameDriver;
pub use error::{Error, Result};
pub use headless::HeadlessCore;
pub use keyboard::{InputEvent, InputQueue, KcKey, Keyboard};
pub use power::{PendingGame, PowerState, Schedule};
pub use sync::CycleBudget;
pub use video::{FamilyVideo, RenderMode, SurfaceId, SurfaceUpdater, VideoDispatcher};

#[cfg(feature = "native")]
pub use audio::AudioOutput;
