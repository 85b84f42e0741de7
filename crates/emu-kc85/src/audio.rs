//! Audio hand-off between the frame loop and the playback thread.
//!
//! The core pushes samples into a staging buffer while it steps; once per
//! frame `pump` moves them into a lock-free ring. The playback side pops
//! from the ring and publishes how many emulated cycles' worth of audio it
//! has played. That position is the input of the cycle-sync scheduler.
//!
//! A core counts cycles from its last power-on, so the pump reports the
//! playback position relative to an origin that `restart` moves to the end
//! of the queued audio whenever the machine is switched on.

use emu_core::{CycleCounter, CycleReader, CycleWriter, MasterClock, Ticks};
use ringbuf::{
    HeapCons, HeapProd, HeapRb,
    traits::{Consumer, Observer, Producer, Split},
};
use tracing::trace;

use crate::core::SampleSink;

/// Output level used on underrun.
const REST_LEVEL: f32 = 0.0;

/// The audio collaborator of the frame driver.
pub trait AudioConsumer {
    /// Emulated cycles already played. Monotonic; zero before playback starts.
    fn processed_cycles(&self) -> Ticks;

    /// Where the core delivers samples during a step.
    fn sink(&mut self) -> &mut dyn SampleSink;

    /// Hand this frame's samples to the playback side.
    fn pump(&mut self, clock: MasterClock);

    /// Start a new timeline at the core's power-on.
    ///
    /// Afterwards `processed_cycles()` counts only audio generated from now
    /// on; whatever is still queued plays out first and does not count.
    fn restart(&mut self, clock: MasterClock);
}

/// Frame-loop side of a sample ring.
pub struct AudioPump {
    producer: HeapProd<f32>,
    staged: Vec<f32>,
    processed: CycleReader,
    /// Playback position at which the current timeline starts.
    origin: Ticks,
    sample_rate: u32,
    dropped: u64,
}

/// Playback side of a sample ring. Runs on the audio thread.
pub struct SampleConsumer {
    consumer: HeapCons<f32>,
    processed: CycleWriter,
    clock: MasterClock,
    sample_rate: u32,
    played: u64,
}

/// Create a connected pump/consumer pair.
///
/// `capacity` is the ring size in samples; anything the pump cannot fit is
/// dropped rather than blocking the frame loop.
#[must_use]
pub fn sample_ring(
    clock: MasterClock,
    sample_rate: u32,
    capacity: usize,
) -> (AudioPump, SampleConsumer) {
    let (producer, consumer) = HeapRb::<f32>::new(capacity.max(1)).split();
    let (writer, reader) = CycleCounter::new();
    (
        AudioPump {
            producer,
            staged: Vec::with_capacity(capacity),
            processed: reader,
            origin: Ticks::ZERO,
            sample_rate,
            dropped: 0,
        },
        SampleConsumer {
            consumer,
            processed: writer,
            clock,
            sample_rate,
            played: 0,
        },
    )
}

/// Default ring size: 200 ms of audio, well above the 40 ms maximum lead.
#[must_use]
pub const fn default_capacity(sample_rate: u32) -> usize {
    (sample_rate / 5) as usize
}

impl AudioPump {
    /// Samples lost to a full ring since creation.
    #[must_use]
    pub fn dropped_samples(&self) -> u64 {
        self.dropped
    }

    /// Samples waiting in the ring.
    #[must_use]
    pub fn queued_samples(&self) -> usize {
        self.producer.occupied_len()
    }

    /// Samples staged by the core but not yet pumped.
    #[must_use]
    pub fn staged_samples(&self) -> &[f32] {
        &self.staged
    }
}

impl AudioConsumer for AudioPump {
    fn processed_cycles(&self) -> Ticks {
        self.processed.get().since(self.origin)
    }

    fn sink(&mut self) -> &mut dyn SampleSink {
        &mut self.staged
    }

    fn restart(&mut self, clock: MasterClock) {
        self.staged.clear();
        let queued = self.producer.occupied_len() as u64;
        self.origin = self.processed.get() + clock.ticks_for_samples(queued, self.sample_rate);
        trace!(queued, origin = %self.origin, "audio timeline restarted");
    }

    fn pump(&mut self, clock: MasterClock) {
        let pushed = self.producer.push_slice(&self.staged);
        let overflow = self.staged.len() - pushed;
        if overflow > 0 {
            self.dropped += overflow as u64;
            trace!(overflow, "audio ring full, samples dropped");
        }
        self.staged.clear();

        let queued = self.producer.occupied_len() as u64;
        trace!(
            queued,
            lead = ?clock.duration_of(clock.ticks_for_samples(queued, self.sample_rate)),
            "audio pumped"
        );
    }
}

impl SampleConsumer {
    /// Fill an output buffer, padding with silence on underrun.
    ///
    /// Returns the number of real samples played. Only those advance the
    /// processed cycle count.
    pub fn fill(&mut self, out: &mut [f32]) -> usize {
        let played = self.consumer.pop_slice(out);
        out[played..].fill(REST_LEVEL);
        if played > 0 {
            self.played += played as u64;
            self.processed
                .advance_to(self.clock.ticks_for_samples(self.played, self.sample_rate));
        }
        played
    }

    /// Total samples played since creation.
    #[must_use]
    pub fn played_samples(&self) -> u64 {
        self.played
    }

    /// A reader for the processed cycle count.
    #[must_use]
    pub fn processed(&self) -> CycleReader {
        self.processed.reader()
    }
}

/// Host audio output driving a [`SampleConsumer`] from the device callback.
#[cfg(feature = "native")]
pub struct AudioOutput {
    _stream: cpal::Stream,
}

#[cfg(feature = "native")]
impl AudioOutput {
    /// Open the default output device and start mono `f32` playback at the
    /// consumer's sample rate.
    ///
    /// The rate is not negotiated: the processed-cycle count depends on it.
    /// If the device rejects the stream, its preferred configuration is
    /// logged and the cpal error returned.
    pub fn start(mut consumer: SampleConsumer) -> crate::Result<Self> {
        use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(crate::Error::NoAudioDevice)?;
        let name = device.name().unwrap_or_else(|_| "default".to_string());

        let sample_rate = consumer.sample_rate;
        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    consumer.fill(data);
                },
                |err| tracing::error!("audio stream error: {err}"),
                None,
            )
            .map_err(|source| {
                if let Ok(preferred) = device.default_output_config() {
                    tracing::warn!(
                        device = %name,
                        channels = preferred.channels(),
                        rate = preferred.sample_rate().0,
                        format = ?preferred.sample_format(),
                        "device rejected mono f32 at {sample_rate} Hz"
                    );
                }
                crate::Error::AudioStream {
                    device: name.clone(),
                    source,
                }
            })?;

        stream.play().map_err(|source| crate::Error::AudioPlay {
            device: name.clone(),
            source,
        })?;
        tracing::info!(device = %name, sample_rate, "audio output started");

        Ok(Self { _stream: stream })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> (AudioPump, SampleConsumer) {
        // 1 sample = 40 cycles keeps the arithmetic exact.
        sample_ring(MasterClock::new(1_764_000), 44_100, 64)
    }

    #[test]
    fn nothing_processed_before_playback() {
        let (mut pump, _consumer) = ring();
        pump.sink().push_sample(0.5);
        pump.pump(MasterClock::new(1_764_000));
        assert_eq!(pump.processed_cycles(), Ticks::ZERO);
        assert_eq!(pump.queued_samples(), 1);
    }

    #[test]
    fn played_samples_advance_processed_cycles() {
        let (mut pump, mut consumer) = ring();
        for _ in 0..10 {
            pump.sink().push_sample(0.25);
        }
        pump.pump(MasterClock::new(1_764_000));

        let mut out = [1.0f32; 4];
        assert_eq!(consumer.fill(&mut out), 4);
        assert_eq!(out, [0.25; 4]);
        assert_eq!(pump.processed_cycles(), Ticks(160));
    }

    #[test]
    fn underrun_pads_with_silence_and_does_not_count() {
        let (mut pump, mut consumer) = ring();
        pump.sink().push_sample(0.75);
        pump.pump(MasterClock::new(1_764_000));

        let mut out = [1.0f32; 3];
        assert_eq!(consumer.fill(&mut out), 1);
        assert_eq!(out, [0.75, 0.0, 0.0]);
        assert_eq!(consumer.played_samples(), 1);
        assert_eq!(pump.processed_cycles(), Ticks(40));

        // Fully starved: still no movement.
        assert_eq!(consumer.fill(&mut out), 0);
        assert_eq!(pump.processed_cycles(), Ticks(40));
    }

    #[test]
    fn overflow_is_dropped_not_blocking() {
        let (mut pump, _consumer) = ring();
        for _ in 0..100 {
            pump.sink().push_sample(0.0);
        }
        pump.pump(MasterClock::new(1_764_000));
        assert_eq!(pump.queued_samples(), 64);
        assert_eq!(pump.dropped_samples(), 36);
        assert!(pump.staged_samples().is_empty());
    }

    #[test]
    fn restart_moves_origin_past_queued_audio() {
        let clock = MasterClock::new(1_764_000);
        let (mut pump, mut consumer) = ring();
        for _ in 0..10 {
            pump.sink().push_sample(0.5);
        }
        pump.pump(clock);
        let mut out = [0.0f32; 4];
        consumer.fill(&mut out);
        assert_eq!(pump.processed_cycles(), Ticks(160));

        // Power-on with 6 samples still queued and 2 staged.
        pump.sink().push_sample(0.1);
        pump.sink().push_sample(0.1);
        pump.restart(clock);
        assert!(pump.staged_samples().is_empty());
        assert_eq!(pump.processed_cycles(), Ticks::ZERO);

        // The old session plays out without moving the new timeline.
        let mut out = [0.0f32; 6];
        assert_eq!(consumer.fill(&mut out), 6);
        assert_eq!(pump.processed_cycles(), Ticks::ZERO);

        pump.sink().push_sample(0.2);
        pump.pump(clock);
        let mut out = [0.0f32; 1];
        consumer.fill(&mut out);
        assert_eq!(out, [0.2]);
        assert_eq!(pump.processed_cycles(), Ticks(40));
    }

    #[test]
    fn default_capacity_covers_max_lead() {
        // 200 ms at 44.1 kHz.
        assert_eq!(default_capacity(44_100), 8_820);
    }
}
