use std::fs;
use std::io::ErrorKind;
use std::ops::ControlFlow;
use std::path::Path;

use tracing::{debug, info, warn};

use mandelia_core::{record_len, CoreError, FractalKind, FractalParams, Julia, Mandelbrot};

use crate::animation::{ExportFormat, ExportSpec, Frame, ZoomAnimation};
use crate::buffer::RenderBuffer;
use crate::coloration::{ModuloColoration, SharedColoration};
use crate::error::RenderError;
use crate::export::{export_jpeg, export_png, ExportMetadata, GifWriter};
use crate::surface::{FractalSurface, Surface};

/// Size ratio between the large and the small panel.
pub const RATIO: u32 = 3;

fn small(side: u32) -> u32 {
    (side / RATIO).max(1)
}

/// What an export produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub format: ExportFormat,
    pub frames: usize,
}

/// A Mandelbrot and a Julia surface sharing one coloration.
///
/// The "first" surface is the large interactive one; the "second" is shown
/// at a third of its size. Navigation applies to the first. Pointer motion
/// over the Mandelbrot surface drives the Julia seed.
pub struct FractaleManager {
    mandelbrot: FractalSurface<Mandelbrot>,
    julia: FractalSurface<Julia>,
    coloration: SharedColoration,
    first: FractalKind,
}

impl FractaleManager {
    /// Mandelbrot first at `width × height`, Julia at a third of that.
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        Self::with_coloration(width, height, ModuloColoration::default())
    }

    pub fn with_coloration(
        width: u32,
        height: u32,
        coloration: ModuloColoration,
    ) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        let coloration = SharedColoration::new(coloration);
        let mandelbrot =
            FractalSurface::new(Mandelbrot::default(), coloration.clone(), width, height)?;
        let julia = FractalSurface::new(
            Julia::default(),
            coloration.clone(),
            small(width),
            small(height),
        )?;
        Ok(Self {
            mandelbrot,
            julia,
            coloration,
            first: FractalKind::Mandelbrot,
        })
    }

    pub fn is_mandelbrot_first(&self) -> bool {
        self.first == FractalKind::Mandelbrot
    }

    pub fn first_kind(&self) -> FractalKind {
        self.first
    }

    pub fn first(&self) -> &dyn Surface {
        match self.first {
            FractalKind::Mandelbrot => &self.mandelbrot,
            FractalKind::Julia => &self.julia,
        }
    }

    pub fn first_mut(&mut self) -> &mut dyn Surface {
        match self.first {
            FractalKind::Mandelbrot => &mut self.mandelbrot,
            FractalKind::Julia => &mut self.julia,
        }
    }

    pub fn second(&self) -> &dyn Surface {
        match self.first {
            FractalKind::Mandelbrot => &self.julia,
            FractalKind::Julia => &self.mandelbrot,
        }
    }

    pub fn second_mut(&mut self) -> &mut dyn Surface {
        match self.first {
            FractalKind::Mandelbrot => &mut self.julia,
            FractalKind::Julia => &mut self.mandelbrot,
        }
    }

    pub fn mandelbrot(&self) -> &FractalSurface<Mandelbrot> {
        &self.mandelbrot
    }

    pub fn julia(&self) -> &FractalSurface<Julia> {
        &self.julia
    }

    /// Resize the first surface to `width × height` and the second to a
    /// third of that.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        self.first_mut().resize(width, height)?;
        self.second_mut().resize(small(width), small(height))?;
        Ok(())
    }

    /// Exchange the roles of the two surfaces, swapping their dimensions.
    pub fn swap(&mut self) -> crate::Result<()> {
        let large = (self.first().width(), self.first().height());
        let compact = (self.second().width(), self.second().height());
        self.first_mut().resize(compact.0, compact.1)?;
        self.second_mut().resize(large.0, large.1)?;
        self.first = self.first.other();
        debug!(first = %self.first, "Swapped surfaces");
        Ok(())
    }

    /// Render both surfaces: `(first, second)`.
    pub fn images(&mut self) -> (RenderBuffer, RenderBuffer) {
        let first = self.first_mut().image();
        let second = self.second_mut().image();
        (first, second)
    }

    /// Pointer motion over the first surface. When it is the Mandelbrot
    /// one, the point under the pointer becomes the Julia seed.
    pub fn motion(&mut self, x: f64, y: f64) {
        if !self.is_mandelbrot_first() {
            return;
        }
        let re = self.mandelbrot.real_at_x(x);
        let im = self.mandelbrot.imaginary_at_y(y);
        self.julia.set_c_r(re);
        self.julia.set_c_i(im);
    }

    pub fn zoom(&mut self, x: f64, y: f64, factor: f64) -> crate::Result<()> {
        self.first_mut().zoom(x, y, factor)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> crate::Result<()> {
        self.first_mut().pan(dx, dy)
    }

    pub fn select(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> crate::Result<()> {
        self.first_mut().select(x0, y0, x1, y1)
    }

    /// Replace the coloration of both surfaces.
    pub fn color(&mut self, r: u32, g: u32, b: u32) {
        self.coloration.set(ModuloColoration::new(r, g, b));
    }

    pub fn rgb(&self) -> (u32, u32, u32) {
        self.coloration.get().rgb()
    }

    /// Pick random coefficients and return them.
    pub fn random_color(&mut self) -> ModuloColoration {
        let coloration = ModuloColoration::random();
        self.coloration.set(coloration);
        debug!(?coloration, "Random coloration");
        coloration
    }

    pub fn coloration(&self) -> ModuloColoration {
        self.coloration.get()
    }

    pub fn iterations(&self) -> u32 {
        self.first().iterations()
    }

    /// Set the iteration budget of both surfaces. Nothing changes if the
    /// value is out of range.
    pub fn set_iterations(&mut self, iterations: u32) -> crate::Result<()> {
        FractalParams::validate(iterations)?;
        self.mandelbrot.set_iterations(iterations)?;
        self.julia.set_iterations(iterations)?;
        Ok(())
    }

    pub fn pixel_size(&self) -> f64 {
        self.first().pixel_size()
    }

    /// Real part of the Mandelbrot view centre.
    pub fn real(&self) -> f64 {
        self.mandelbrot.real()
    }

    /// Imaginary part of the Mandelbrot view centre.
    pub fn imaginary(&self) -> f64 {
        self.mandelbrot.imaginary()
    }

    pub fn iter_sum(&mut self) -> u64 {
        self.first_mut().iterations_sum()
    }

    pub fn iter_pixel(&mut self) -> f64 {
        self.first_mut().iterations_per_pixel()
    }

    /// Default view and iterations for both surfaces.
    pub fn reset(&mut self) {
        self.mandelbrot.reset();
        self.julia.reset();
    }

    /// Length of a saved state: flag byte, Mandelbrot record, Julia record.
    pub const fn save_size() -> usize {
        1 + record_len::<Mandelbrot>() + record_len::<Julia>()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::save_size());
        out.push(u8::from(self.is_mandelbrot_first()));
        out.extend_from_slice(&self.mandelbrot.to_bytes());
        out.extend_from_slice(&self.julia.to_bytes());
        out
    }

    /// Load a saved state. On any failure the previous state is kept.
    pub fn from_bytes(&mut self, data: &[u8]) -> crate::Result<()> {
        let expected = Self::save_size();
        if data.len() != expected {
            return Err(CoreError::Format {
                expected,
                actual: data.len(),
            }
            .into());
        }
        let snapshot = self.to_bytes();
        if let Err(err) = self.apply_bytes(data) {
            warn!(%err, "Invalid state, restoring previous one");
            self.apply_bytes(&snapshot)?;
            return Err(err);
        }
        info!(first = %self.first, "State loaded");
        Ok(())
    }

    fn apply_bytes(&mut self, data: &[u8]) -> crate::Result<()> {
        let mandelbrot_first = match data[0] {
            0 => false,
            1 => true,
            flag => {
                return Err(CoreError::InvalidRecord {
                    reason: format!("unknown layout flag {flag}"),
                }
                .into())
            }
        };
        if mandelbrot_first != self.is_mandelbrot_first() {
            self.swap()?;
        }
        let split = 1 + record_len::<Mandelbrot>();
        self.julia.from_bytes(&data[split..])?;
        self.mandelbrot.from_bytes(&data[1..split])?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> crate::Result<()> {
        fs::write(path, self.to_bytes())?;
        info!(path = %path.display(), "State saved");
        Ok(())
    }

    pub fn load(&mut self, path: &Path) -> crate::Result<()> {
        let data = fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RenderError::NotFound {
                path: path.to_path_buf(),
            },
            _ => RenderError::Io(err),
        })?;
        self.from_bytes(&data)
    }

    /// Zoom animation of the first surface. State is restored when the
    /// returned iterator is dropped.
    pub fn zoom_animation(&mut self, spec: &ExportSpec) -> crate::Result<ZoomAnimation<'_>> {
        ZoomAnimation::new(self.first_mut(), spec)
    }

    /// Drive the zoom animation, handing every frame to `on_frame`.
    ///
    /// Returning `ControlFlow::Break` stops the animation; state is
    /// restored and `RenderError::Cancelled` returned. Otherwise returns the
    /// number of frames produced.
    pub fn drop_animation<C>(&mut self, spec: &ExportSpec, mut on_frame: C) -> crate::Result<usize>
    where
        C: FnMut(f64, &Frame) -> ControlFlow<()>,
    {
        let mut frames = 0;
        for frame in self.zoom_animation(spec)? {
            frames += 1;
            if on_frame(frame.progress, &frame).is_break() {
                info!(frames, "Animation cancelled");
                return Err(RenderError::Cancelled);
            }
        }
        info!(frames, "Animation finished");
        Ok(frames)
    }

    /// Metadata for the first surface rendered at `width × height`.
    fn metadata(&self, width: u32, height: u32) -> crate::Result<ExportMetadata> {
        let first = self.first();
        let mut viewport = *first.viewport();
        viewport.resize(width, height)?;
        Ok(ExportMetadata {
            kind: self.first,
            top_left: viewport.top_left,
            bottom_right: viewport.bottom_right,
            max_iterations: first.iterations(),
            julia_c: (self.first == FractalKind::Julia).then(|| self.julia.c()),
            coloration: self.coloration.get(),
        })
    }

    /// Export the first surface to `path`: a still for PNG and JPEG, the
    /// zoom animation for GIF.
    ///
    /// `on_progress` sees every produced image; `Break` cancels. A
    /// cancelled animation leaves no partial file behind.
    pub fn export<C>(
        &mut self,
        spec: &ExportSpec,
        path: &Path,
        mut on_progress: C,
    ) -> crate::Result<ExportSummary>
    where
        C: FnMut(f64, &RenderBuffer) -> ControlFlow<()>,
    {
        spec.validate()?;
        let summary = ExportSummary {
            format: spec.format,
            frames: 1,
        };
        match spec.format {
            ExportFormat::Png | ExportFormat::Jpeg => {
                let image = self.first().image_at_size(spec.width, spec.height)?;
                if on_progress(1.0, &image).is_break() {
                    return Err(RenderError::Cancelled);
                }
                if spec.format == ExportFormat::Png {
                    export_png(&image, path, &self.metadata(spec.width, spec.height)?)?;
                } else {
                    export_jpeg(&image, path, spec.quality)?;
                }
                info!(format = ?spec.format, path = %path.display(), "Exported still");
                Ok(summary)
            }
            ExportFormat::Gif => {
                let mut writer = GifWriter::create(path)?;
                let mut failure = None;
                let outcome = self.drop_animation(spec, |progress, frame| {
                    if let Err(err) = writer.push(frame) {
                        failure = Some(err);
                        return ControlFlow::Break(());
                    }
                    on_progress(progress, &frame.image)
                });
                let result = match (outcome, failure) {
                    (_, Some(err)) => Err(err),
                    (Err(err), None) => Err(err),
                    (Ok(frames), None) => Ok(frames),
                };
                match result {
                    Ok(frames) => {
                        info!(frames, path = %path.display(), "Exported GIF");
                        Ok(ExportSummary { frames, ..summary })
                    }
                    Err(err) => {
                        drop(writer);
                        if let Err(remove_err) = fs::remove_file(path) {
                            warn!(%remove_err, "Could not remove partial GIF");
                        }
                        Err(err)
                    }
                }
            }
        }
    }
}
