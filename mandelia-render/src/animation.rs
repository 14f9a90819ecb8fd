//! Zoom-in animation from the fully zoomed-out view down to the current one.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::buffer::RenderBuffer;
use crate::error::RenderError;
use crate::surface::Surface;

/// Container used for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Gif,
}

impl ExportFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Whether this format stores the zoom animation rather than a still.
    pub fn is_animated(self) -> bool {
        matches!(self, Self::Gif)
    }
}

/// Output settings for a still or animated export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSpec {
    pub width: u32,
    pub height: u32,
    /// Frames per second of the animation.
    pub fps: u32,
    /// Zoom speed; 10 doubles the magnification roughly every `fps` frames.
    pub speed: u32,
    pub format: ExportFormat,
    /// JPEG quality, `1..=100`.
    pub quality: u8,
}

impl Default for ExportSpec {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 24,
            speed: 10,
            format: ExportFormat::Png,
            quality: 85,
        }
    }
}

impl ExportSpec {
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |reason: String| Err(RenderError::InvalidExport { reason });
        if self.width == 0 || self.height == 0 {
            return invalid(format!(
                "dimensions must be > 0, got {}×{}",
                self.width, self.height
            ));
        }
        if self.fps == 0 {
            return invalid("fps must be > 0".into());
        }
        if self.speed == 0 {
            return invalid("speed must be > 0".into());
        }
        if !(1..=100).contains(&self.quality) {
            return invalid(format!("quality must be in 1..=100, got {}", self.quality));
        }
        Ok(())
    }

    /// Per-frame zoom factor: `1 + (speed / 10) / fps`.
    pub fn zoom_multiplier(&self) -> f64 {
        1.0 + (self.speed as f64 / 10.0) / self.fps as f64
    }

    /// Display time of one frame in milliseconds.
    pub fn frame_delay_ms(&self) -> u32 {
        1000 / self.fps.max(1)
    }
}

/// One rendered animation frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: usize,
    /// Logarithmic progress toward the target zoom, in `[0, 1]`.
    pub progress: f64,
    pub image: RenderBuffer,
    delay_ms: u32,
}

impl Frame {
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }
}

/// Iterator over the frames of a zoom-in animation.
///
/// Borrows the surface mutably for its whole life. Dimensions and state
/// captured at creation are restored when the iterator is dropped, whether
/// it ran to completion or was abandoned early.
pub struct ZoomAnimation<'a> {
    surface: &'a mut dyn Surface,
    snapshot: Vec<u8>,
    original_size: (u32, u32),
    multiplier: f64,
    delay_ms: u32,
    start: f64,
    target: f64,
    index: usize,
    finished: bool,
}

impl<'a> ZoomAnimation<'a> {
    pub fn new(surface: &'a mut dyn Surface, spec: &ExportSpec) -> crate::Result<Self> {
        spec.validate()?;
        let snapshot = surface.to_bytes();
        let original_size = (surface.width(), surface.height());

        let mut animation = Self {
            surface,
            snapshot,
            original_size,
            multiplier: spec.zoom_multiplier(),
            delay_ms: spec.frame_delay_ms(),
            start: 0.0,
            target: 0.0,
            index: 0,
            finished: false,
        };

        // Any failure from here on drops `animation`, which restores.
        animation.target = animation.surface.pixel_size();
        animation.surface.resize(spec.width, spec.height)?;
        animation.surface.top();
        animation.start = animation.surface.pixel_size();

        info!(
            kind = %animation.surface.kind(),
            width = spec.width,
            height = spec.height,
            fps = spec.fps,
            multiplier = animation.multiplier,
            frames = animation.estimated_frames(),
            "Starting zoom animation"
        );
        Ok(animation)
    }

    /// Number of frames the animation will yield, from the zoom ratio.
    pub fn estimated_frames(&self) -> usize {
        if self.target >= self.start {
            return 1;
        }
        let steps = (self.start / self.target).ln() / self.multiplier.ln();
        steps.ceil() as usize + 1
    }

    fn progress(&self) -> f64 {
        let span = self.target.ln() - self.start.ln();
        if span == 0.0 {
            return 0.0;
        }
        ((self.surface.pixel_size().ln() - self.start.ln()) / span).clamp(0.0, 1.0)
    }

    fn restore(&mut self) -> crate::Result<()> {
        let (width, height) = self.original_size;
        self.surface.resize(width, height)?;
        self.surface.from_bytes(&self.snapshot)
    }
}

impl Iterator for ZoomAnimation<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }
        if self.index > 0 {
            if self.surface.pixel_size() <= self.target {
                self.finished = true;
                return None;
            }
            if let Err(err) = self.surface.zoom_center(self.multiplier) {
                error!(%err, index = self.index, "Zoom step failed, ending animation");
                self.finished = true;
                return None;
            }
        }

        let image = self.surface.image();
        let frame = Frame {
            index: self.index,
            progress: self.progress(),
            image,
            delay_ms: self.delay_ms,
        };
        debug!(index = frame.index, progress = frame.progress, "Animation frame");
        self.index += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let remaining = self.estimated_frames().saturating_sub(self.index);
        (0, Some(remaining + 1))
    }
}

impl Drop for ZoomAnimation<'_> {
    fn drop(&mut self) {
        match self.restore() {
            Ok(()) => debug!(frames = self.index, "Animation state restored"),
            Err(err) => error!(%err, "Failed to restore state after animation"),
        }
    }
}
