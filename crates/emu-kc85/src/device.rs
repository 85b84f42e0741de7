//! Emulated machine identity: model, family, OS ROM and base clock.

use bitflags::bitflags;
use clap::ValueEnum;
use emu_core::MasterClock;
use serde::Deserialize;

/// Emulated machine model.
///
/// Fixed for the lifetime of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
pub enum Device {
    #[serde(rename = "kc85_2")]
    #[value(name = "kc85_2")]
    Kc85_2,
    #[serde(rename = "kc85_3")]
    #[value(name = "kc85_3")]
    Kc85_3,
    #[serde(rename = "kc85_4")]
    #[value(name = "kc85_4")]
    Kc85_4,
    #[serde(rename = "z9001")]
    #[value(name = "z9001")]
    Z9001,
    #[serde(rename = "kc87")]
    #[value(name = "kc87")]
    Kc87,
    #[serde(rename = "z1013_01")]
    #[value(name = "z1013_01")]
    Z1013_01,
    #[serde(rename = "z1013_16")]
    #[value(name = "z1013_16")]
    Z1013_16,
    #[serde(rename = "z1013_64")]
    #[value(name = "z1013_64")]
    Z1013_64,
}

/// Mutually exclusive hardware families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFamily {
    /// Mühlhausen KC85/2, /3, /4.
    Kc85,
    /// Robotron Z9001 and KC87.
    Z9001,
    /// Riesa Z1013.
    Z1013,
}

bitflags! {
    /// Set of models a program runs on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceMask: u16 {
        const KC85_2 = 1 << 0;
        const KC85_3 = 1 << 1;
        const KC85_4 = 1 << 2;
        const Z9001 = 1 << 3;
        const KC87 = 1 << 4;
        const Z1013_01 = 1 << 5;
        const Z1013_16 = 1 << 6;
        const Z1013_64 = 1 << 7;

        const ANY_KC85 = Self::KC85_2.bits() | Self::KC85_3.bits() | Self::KC85_4.bits();
        const ANY_Z9001 = Self::Z9001.bits() | Self::KC87.bits();
        const ANY_Z1013 = Self::Z1013_01.bits() | Self::Z1013_16.bits() | Self::Z1013_64.bits();
    }
}

/// Operating system ROM images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RomVariant {
    /// HC-900 CAOS (KC85/2).
    Hc900,
    /// CAOS 2.2 (KC85/2).
    Caos22,
    /// CAOS 3.1 (KC85/3).
    Caos31,
    /// CAOS 4.2 (KC85/4).
    Caos42,
    /// Z9001 OS 1.2.
    Z9001Os,
    /// KC87 OS 2.0.
    Kc87Os,
    /// Z1013 monitor 2.02.
    Z1013Mon202,
    /// Z1013 monitor A.2.
    Z1013MonA2,
}

impl Device {
    /// Hardware family of this model.
    #[must_use]
    pub const fn family(self) -> DeviceFamily {
        match self {
            Self::Kc85_2 | Self::Kc85_3 | Self::Kc85_4 => DeviceFamily::Kc85,
            Self::Z9001 | Self::Kc87 => DeviceFamily::Z9001,
            Self::Z1013_01 | Self::Z1013_16 | Self::Z1013_64 => DeviceFamily::Z1013,
        }
    }

    /// This model's bit in a compatibility mask.
    #[must_use]
    pub const fn mask(self) -> DeviceMask {
        match self {
            Self::Kc85_2 => DeviceMask::KC85_2,
            Self::Kc85_3 => DeviceMask::KC85_3,
            Self::Kc85_4 => DeviceMask::KC85_4,
            Self::Z9001 => DeviceMask::Z9001,
            Self::Kc87 => DeviceMask::KC87,
            Self::Z1013_01 => DeviceMask::Z1013_01,
            Self::Z1013_16 => DeviceMask::Z1013_16,
            Self::Z1013_64 => DeviceMask::Z1013_64,
        }
    }

    /// CPU base clock.
    #[must_use]
    pub const fn clock(self) -> MasterClock {
        match self {
            Self::Kc85_2 | Self::Kc85_3 => MasterClock::new(1_750_000),
            Self::Kc85_4 => MasterClock::new(1_773_447),
            Self::Z9001 | Self::Kc87 => MasterClock::new(2_457_600),
            Self::Z1013_01 => MasterClock::new(1_000_000),
            Self::Z1013_16 | Self::Z1013_64 => MasterClock::new(2_000_000),
        }
    }

    /// The ROM a model boots with unless told otherwise.
    #[must_use]
    pub const fn default_rom(self) -> RomVariant {
        match self {
            Self::Kc85_2 => RomVariant::Caos22,
            Self::Kc85_3 => RomVariant::Caos31,
            Self::Kc85_4 => RomVariant::Caos42,
            Self::Z9001 => RomVariant::Z9001Os,
            Self::Kc87 => RomVariant::Kc87Os,
            Self::Z1013_01 => RomVariant::Z1013Mon202,
            Self::Z1013_16 | Self::Z1013_64 => RomVariant::Z1013MonA2,
        }
    }

    /// Whether `rom` can boot this model.
    #[must_use]
    pub const fn accepts_rom(self, rom: RomVariant) -> bool {
        matches!(
            (self, rom),
            (Self::Kc85_2, RomVariant::Hc900 | RomVariant::Caos22)
                | (Self::Kc85_3, RomVariant::Caos31)
                | (Self::Kc85_4, RomVariant::Caos42)
                | (Self::Z9001, RomVariant::Z9001Os)
                | (Self::Kc87, RomVariant::Kc87Os)
                | (Self::Z1013_01, RomVariant::Z1013Mon202)
                | (Self::Z1013_16 | Self::Z1013_64, RomVariant::Z1013MonA2)
        )
    }

    /// Human-readable model name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Kc85_2 => "KC85/2",
            Self::Kc85_3 => "KC85/3",
            Self::Kc85_4 => "KC85/4",
            Self::Z9001 => "Z9001",
            Self::Kc87 => "KC87",
            Self::Z1013_01 => "Z1013.01",
            Self::Z1013_16 => "Z1013.16",
            Self::Z1013_64 => "Z1013.64",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&[Device]> for DeviceMask {
    fn from(devices: &[Device]) -> Self {
        devices
            .iter()
            .fold(DeviceMask::empty(), |mask, d| mask | d.mask())
    }
}
