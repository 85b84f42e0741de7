//! Errors from the setup, audio start-up and capture paths.
//!
//! Nothing on the per-frame path returns these: a frame always completes.

use std::path::PathBuf;

use format_kcc::KccError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid program catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{path}: {source}")]
    Program {
        path: PathBuf,
        #[source]
        source: KccError,
    },

    #[cfg(feature = "native")]
    #[error("no audio output device")]
    NoAudioDevice,

    #[cfg(feature = "native")]
    #[error("audio output {device} rejected the stream: {source}")]
    AudioStream {
        device: String,
        #[source]
        source: cpal::BuildStreamError,
    },

    #[cfg(feature = "native")]
    #[error("audio output {device} failed to start: {source}")]
    AudioPlay {
        device: String,
        #[source]
        source: cpal::PlayStreamError,
    },

    #[error("{rom:?} cannot boot {device}")]
    RomMismatch {
        device: crate::Device,
        rom: crate::RomVariant,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
