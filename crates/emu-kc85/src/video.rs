//! Framebuffer dispatch to the display surface.
//!
//! Each device family has one fixed resolution and one source buffer in the
//! core. The dispatcher picks both from the family, uploads the RGBA8
//! pixels and optionally draws the surface.

use tracing::warn;

use crate::core::{EmulationCore, FrameSource};
use crate::device::DeviceFamily;

/// Bytes per RGBA8 pixel.
const BYTES_PER_PIXEL: usize = 4;

/// Handle to a display surface created by a [`SurfaceUpdater`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// The display side the dispatcher uploads to.
pub trait SurfaceUpdater {
    /// Create an RGBA8 surface of the given size.
    fn create_surface(&mut self, width: u32, height: u32) -> SurfaceId;

    /// Replace the surface contents with `pixels` (`width * height * 4` bytes).
    fn update(&mut self, surface: SurfaceId, pixels: &[u8]);

    /// Draw the surface into the current scene.
    fn draw(&mut self, surface: SurfaceId);
}

/// Whether rendering ends with a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Upload and draw.
    #[default]
    Draw,
    /// Upload only; the caller composites the surface itself.
    TextureOnly,
}

/// Display geometry and source buffer of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyVideo {
    pub width: u32,
    pub height: u32,
    pub source: FrameSource,
}

impl FamilyVideo {
    /// Size of one RGBA8 frame in bytes.
    #[must_use]
    pub const fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }
}

impl DeviceFamily {
    /// Fixed display geometry and framebuffer source.
    #[must_use]
    pub const fn video(self) -> FamilyVideo {
        match self {
            Self::Kc85 => FamilyVideo {
                width: 320,
                height: 256,
                source: FrameSource::Kc85Linear,
            },
            Self::Z9001 => FamilyVideo {
                width: 320,
                height: 192,
                source: FrameSource::Z9001Rgba,
            },
            Self::Z1013 => FamilyVideo {
                width: 256,
                height: 256,
                source: FrameSource::Z1013Rgba,
            },
        }
    }
}

/// Uploads the core's framebuffer to the family's surface.
#[derive(Debug)]
pub struct VideoDispatcher {
    video: FamilyVideo,
    surface: SurfaceId,
}

impl VideoDispatcher {
    /// Create the family's surface.
    pub fn new(family: DeviceFamily, surfaces: &mut dyn SurfaceUpdater) -> Self {
        let video = family.video();
        let surface = surfaces.create_surface(video.width, video.height);
        Self { video, surface }
    }

    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    #[must_use]
    pub fn video(&self) -> FamilyVideo {
        self.video
    }

    /// Upload the latest frame, then draw unless `mode` is texture-only.
    pub fn dispatch(
        &self,
        core: &dyn EmulationCore,
        surfaces: &mut dyn SurfaceUpdater,
        mode: RenderMode,
    ) {
        let size = self.video.frame_bytes();
        let framebuffer = core.framebuffer(self.video.source);
        let Some(pixels) = framebuffer.get(..size) else {
            warn!(
                source = ?self.video.source,
                have = framebuffer.len(),
                need = size,
                "framebuffer too small, frame skipped"
            );
            return;
        };

        surfaces.update(self.surface, pixels);
        if mode == RenderMode::Draw {
            surfaces.draw(self.surface);
        }
    }
}
