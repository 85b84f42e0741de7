//! Headless capture: an in-memory display and PNG/WAV dumps.

use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::video::{SurfaceId, SurfaceUpdater};

/// One captured surface.
#[derive(Debug, Clone, Default)]
pub struct CapturedSurface {
    pub width: u32,
    pub height: u32,
    /// Last uploaded RGBA8 pixels.
    pub pixels: Vec<u8>,
    pub uploads: u64,
    pub draws: u64,
}

/// A display that keeps surfaces in memory instead of showing them.
#[derive(Debug, Default)]
pub struct CaptureSurfaces {
    surfaces: HashMap<SurfaceId, CapturedSurface>,
    next_id: u32,
}

impl CaptureSurfaces {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: SurfaceId) -> Option<&CapturedSurface> {
        self.surfaces.get(&id)
    }

    /// Number of surfaces created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// The surface created most recently.
    #[must_use]
    pub fn latest(&self) -> Option<&CapturedSurface> {
        self.next_id
            .checked_sub(1)
            .and_then(|id| self.surfaces.get(&SurfaceId(id)))
    }
}

impl SurfaceUpdater for CaptureSurfaces {
    fn create_surface(&mut self, width: u32, height: u32) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.insert(
            id,
            CapturedSurface {
                width,
                height,
                pixels: vec![0; width as usize * height as usize * 4],
                ..CapturedSurface::default()
            },
        );
        id
    }

    fn update(&mut self, surface: SurfaceId, pixels: &[u8]) {
        if let Some(captured) = self.surfaces.get_mut(&surface) {
            captured.pixels.clear();
            captured.pixels.extend_from_slice(pixels);
            captured.uploads += 1;
        }
    }

    fn draw(&mut self, surface: SurfaceId) {
        if let Some(captured) = self.surfaces.get_mut(&surface) {
            captured.draws += 1;
        }
    }
}

/// Save a captured surface as a PNG file.
pub fn save_screenshot(surface: &CapturedSurface, path: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    let w = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, surface.width, surface.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&surface.pixels)?;
    Ok(())
}

/// Save audio samples as a mono 16-bit WAV file.
///
/// Input samples are f32 in the range -1.0 to +1.0.
pub fn save_audio(samples: &[f32], sample_rate: u32, path: &Path) -> Result<(), Box<dyn Error>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let scaled = (clamped * f32::from(i16::MAX)) as i16;
        writer.write_sample(scaled)?;
    }
    writer.finalize()?;
    Ok(())
}
