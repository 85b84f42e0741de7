//! Driver configuration.

use std::path::Path;

use serde::Deserialize;

use crate::device::{Device, RomVariant};
use crate::error::{Error, Result};

/// Nominal display refresh the frame-count constants are expressed in.
pub const NOMINAL_FRAME_RATE: u64 = 60;

/// Frames a freshly powered machine needs before it accepts a program.
pub const DEFAULT_BOOT_FRAMES: u64 = 5 * NOMINAL_FRAME_RATE;

/// Frame at which the machine switches itself on after startup.
pub const DEFAULT_SWITCH_ON_DELAY_FRAMES: u64 = 5;

/// Default audio output sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Configuration for constructing a driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub device: Device,
    /// OS ROM; `None` picks the model's default.
    pub rom: Option<RomVariant>,
    /// Frame index at which the machine powers on by itself.
    /// `None` leaves it off until toggled.
    pub switch_on_delay_frames: Option<u64>,
    /// Frames between a game-start power-on and the program load.
    pub boot_frames: u64,
    pub sample_rate: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device: Device::Kc85_4,
            rom: None,
            switch_on_delay_frames: Some(DEFAULT_SWITCH_ON_DELAY_FRAMES),
            boot_frames: DEFAULT_BOOT_FRAMES,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl DriverConfig {
    /// Default configuration for a given model.
    #[must_use]
    pub fn for_device(device: Device) -> Self {
        Self {
            device,
            ..Self::default()
        }
    }

    /// The ROM to boot, resolving the model default.
    #[must_use]
    pub fn rom(&self) -> RomVariant {
        self.rom.unwrap_or_else(|| self.device.default_rom())
    }

    /// Parse a TOML config document.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML, unknown keys, or a ROM that
    /// cannot boot the selected model.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a TOML config file.
    ///
    /// # Errors
    ///
    /// See [`DriverConfig::from_toml`]; also fails if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Check the model/ROM pairing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RomMismatch`] if the ROM cannot boot the model.
    pub fn validate(&self) -> Result<()> {
        let rom = self.rom();
        if self.device.accepts_rom(rom) {
            Ok(())
        } else {
            Err(Error::RomMismatch {
                device: self.device,
                rom,
            })
        }
    }
}
