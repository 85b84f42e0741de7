//! KC85-family front-end binary.
//!
//! Runs the frame driver against the headless core at a simulated 60 Hz
//! host refresh. Audio is drained at real-time rate so the cycle-sync
//! window behaves as it would behind a sound card; `--realtime` plays it
//! through the host audio device instead.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
#[cfg(feature = "native")]
use std::time::Instant;

use anyhow::{Context, anyhow};
use clap::Parser;
use emu_core::Observable;
use emu_kc85::{
    AudioPump, Device, DriverConfig, FileCatalog, FrameDriver, HeadlessCore, RenderMode,
    RomVariant, SampleConsumer,
    capture::{self, CaptureSurfaces},
    default_capacity, sample_ring,
};
use tracing::{error, info};
#[cfg(feature = "native")]
use tracing::warn;

/// Host refresh the binary simulates.
const HOST_HZ: u32 = 60;

#[derive(Parser)]
#[command(name = "emu-kc85", version, about = "KC85/Z9001/Z1013 emulator front-end")]
struct Cli {
    /// Machine model.
    #[arg(long, value_enum)]
    device: Option<Device>,

    /// OS ROM (defaults to the model's standard ROM).
    #[arg(long, value_enum)]
    rom: Option<RomVariant>,

    /// TOML driver config; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// TOML program catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Power-cycle and start this catalog program once booted.
    #[arg(long)]
    start_game: Option<String>,

    /// Host frames to run.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Save the last displayed frame as PNG.
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Save the played audio as WAV.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Type text into the machine (use \n for Enter).
    #[arg(long = "type")]
    type_text: Option<String>,

    /// Host frame at which typing starts.
    #[arg(long, default_value_t = 400)]
    type_at: u64,

    /// Pace frames in real time and play audio on the host device.
    #[arg(long)]
    realtime: bool,
}

impl Cli {
    fn driver_config(&self) -> anyhow::Result<DriverConfig> {
        let mut config = match &self.config {
            Some(path) => DriverConfig::load(path)?,
            None => DriverConfig::default(),
        };
        if let Some(device) = self.device {
            if device != config.device {
                config.rom = None;
            }
            config.device = device;
        }
        if self.rom.is_some() {
            config.rom = self.rom;
        }
        config.validate()?;
        Ok(config)
    }

    fn catalog(&self) -> anyhow::Result<FileCatalog> {
        Ok(match &self.catalog {
            Some(path) => FileCatalog::load(path)?,
            None => FileCatalog::default(),
        })
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("emu_kc85=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.driver_config()?;
    let catalog = cli.catalog()?;
    let clock = config.device.clock();

    let (pump, mut consumer) = sample_ring(
        clock,
        config.sample_rate,
        default_capacity(config.sample_rate),
    );
    let core = HeadlessCore::new(config.device, config.sample_rate);
    let mut driver = FrameDriver::new(&config, core, pump, catalog);
    info!(device = %config.device, rom = ?config.rom(), clock_hz = clock.frequency_hz, "driver ready");

    if let Some(name) = &cli.start_game {
        driver.start_game(name);
    }
    if let Some(text) = &cli.type_text {
        let text = text.replace("\\n", "\n");
        driver.keyboard().queue().enqueue_text(&text, cli.type_at);
    }

    let frame_time = Duration::from_secs(1) / HOST_HZ;

    if cli.realtime {
        return run_realtime(cli, driver, consumer, frame_time);
    }

    // Drain exactly one host frame of audio per frame, as a sound card would.
    let samples_per_frame = (config.sample_rate / HOST_HZ) as usize;
    let mut out = vec![0.0f32; samples_per_frame];
    let mut played = Vec::new();
    let mut surfaces = CaptureSurfaces::new();
    for _ in 0..cli.frames {
        driver.update(frame_time);
        driver.render(&mut surfaces, RenderMode::Draw);
        let n = consumer.fill(&mut out);
        played.extend_from_slice(&out[..n]);
    }

    if let Some(path) = &cli.audio {
        capture::save_audio(&played, config.sample_rate, path)
            .map_err(|e| anyhow!("audio {}: {e}", path.display()))?;
        info!(path = %path.display(), samples = played.len(), "audio saved");
    }
    finish(cli, &driver, &surfaces)
}

type HeadlessDriver = FrameDriver<HeadlessCore, AudioPump, FileCatalog>;

#[cfg(feature = "native")]
fn run_realtime(
    cli: &Cli,
    mut driver: HeadlessDriver,
    consumer: SampleConsumer,
    frame_time: Duration,
) -> anyhow::Result<()> {
    let _output = emu_kc85::AudioOutput::start(consumer)?;
    if cli.audio.is_some() {
        warn!("--audio is ignored with --realtime");
    }

    let mut surfaces = CaptureSurfaces::new();
    for _ in 0..cli.frames {
        let started = Instant::now();
        driver.update(frame_time);
        driver.render(&mut surfaces, RenderMode::Draw);
        std::thread::sleep(frame_time.saturating_sub(started.elapsed()));
    }
    finish(cli, &driver, &surfaces)
}

#[cfg(not(feature = "native"))]
fn run_realtime(
    _cli: &Cli,
    _driver: HeadlessDriver,
    _consumer: SampleConsumer,
    _frame_time: Duration,
) -> anyhow::Result<()> {
    Err(anyhow!("built without host audio support"))
}

fn finish(cli: &Cli, driver: &HeadlessDriver, surfaces: &CaptureSurfaces) -> anyhow::Result<()> {
    for path in driver.query_paths() {
        if let Some(value) = driver.query(path) {
            info!("{path} = {value}");
        }
    }

    if let Some(path) = &cli.screenshot {
        let surface = surfaces
            .latest()
            .context("no frame was displayed; is the machine switched on?")?;
        capture::save_screenshot(surface, path)
            .map_err(|e| anyhow!("screenshot {}: {e}", path.display()))?;
        info!(path = %path.display(), "screenshot saved");
    }
    Ok(())
}
