use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// The rectangle of the complex plane mapped onto a pixel grid.
///
/// Pixel `(0, 0)` maps to `top_left` and pixel `(width, height)` to
/// `bottom_right`. The default views put the larger imaginary value on the
/// top edge, so increasing pixel-y moves down the imaginary axis.
///
/// The plane aspect ratio always tracks the pixel aspect ratio: resizing
/// scales each axis by its own pixel ratio, and zooming divides both
/// extents by the same factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub top_left: Complex,
    pub bottom_right: Complex,

    /// Viewport width in pixels.
    pub width: u32,

    /// Viewport height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Classic Mandelbrot framing: real `[-2, 1]`, imaginary `[-1, 1]`,
    /// widened on one axis to match the pixel aspect ratio.
    pub fn default_mandelbrot(width: u32, height: u32) -> Self {
        Self::fit(Complex::new(-0.5, 0.0), 3.0, 2.0, width, height)
    }

    /// Julia framing: `[-2, 2]` on both axes, widened the same way.
    pub fn default_julia(width: u32, height: u32) -> Self {
        Self::fit(Complex::ZERO, 4.0, 4.0, width, height)
    }

    /// Smallest view centred on `center` containing `re_span × im_span`
    /// with square pixels.
    ///
    /// Zero dimensions are treated as one pixel so the result is always a
    /// usable rectangle.
    pub fn fit(center: Complex, re_span: f64, im_span: f64, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let scale = (re_span / width as f64).max(im_span / height as f64);
        let half = Complex::new(scale * width as f64 / 2.0, -scale * height as f64 / 2.0);
        Self {
            top_left: center - half,
            bottom_right: center + half,
            width,
            height,
        }
    }

    /// Create a viewport with explicit corners.
    pub fn new(
        top_left: Complex,
        bottom_right: Complex,
        width: u32,
        height: u32,
    ) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {width}×{height}"),
            });
        }
        validate_corners(top_left, bottom_right)?;
        Ok(Self {
            top_left,
            bottom_right,
            width,
            height,
        })
    }

    /// Same pixel grid, different corners.
    pub fn with_corners(&self, top_left: Complex, bottom_right: Complex) -> crate::Result<Self> {
        Self::new(top_left, bottom_right, self.width, self.height)
    }

    /// Signed extents `bottom_right - top_left`.
    #[inline]
    pub fn span(&self) -> Complex {
        self.bottom_right - self.top_left
    }

    pub fn center(&self) -> Complex {
        (self.top_left + self.bottom_right) * 0.5
    }

    /// Map (possibly fractional) pixel coordinates to the complex plane.
    #[inline]
    pub fn pixel_to_complex(&self, px: f64, py: f64) -> Complex {
        Complex::new(self.real_at_x(px), self.imaginary_at_y(py))
    }

    #[inline]
    pub fn real_at_x(&self, px: f64) -> f64 {
        self.top_left.re + (px / self.width as f64) * (self.bottom_right.re - self.top_left.re)
    }

    #[inline]
    pub fn imaginary_at_y(&self, py: f64) -> f64 {
        self.top_left.im + (py / self.height as f64) * (self.bottom_right.im - self.top_left.im)
    }

    /// Inverse of [`real_at_x`](Self::real_at_x).
    pub fn x_at_real(&self, re: f64) -> f64 {
        (re - self.top_left.re) / self.span().re * self.width as f64
    }

    /// Inverse of [`imaginary_at_y`](Self::imaginary_at_y).
    pub fn y_at_imaginary(&self, im: f64) -> f64 {
        (im - self.top_left.im) / self.span().im * self.height as f64
    }

    /// Complex-plane width covered by one pixel.
    pub fn pixel_size(&self) -> f64 {
        self.span().re.abs() / self.width as f64
    }

    /// The aspect ratio of the viewport (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Change the pixel dimensions, keeping the centre and the pixel size.
    ///
    /// Each plane extent scales by the pixel ratio of its own axis, so
    /// resizing back to the original dimensions restores the original
    /// bounds.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {width}×{height}"),
            });
        }
        let center = self.center();
        let span = self.span();
        let half = Complex::new(
            span.re * width as f64 / self.width as f64,
            span.im * height as f64 / self.height as f64,
        ) * 0.5;
        self.top_left = center - half;
        self.bottom_right = center + half;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Anchor-preserving zoom: the point under `(px, py)` stays under it.
    ///
    /// `factor > 1` zooms in, `0 < factor < 1` zooms out.
    pub fn zoom(&mut self, px: f64, py: f64, factor: f64) -> crate::Result<()> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("zoom factor must be positive and finite, got {factor}"),
            });
        }
        let anchor = self.pixel_to_complex(px, py);
        let span = self.span() * (1.0 / factor);
        let top_left = anchor
            - Complex::new(
                px / self.width as f64 * span.re,
                py / self.height as f64 * span.im,
            );
        let bottom_right = top_left + span;
        validate_corners(top_left, bottom_right)?;
        self.top_left = top_left;
        self.bottom_right = bottom_right;
        Ok(())
    }

    /// Zoom anchored at the centre of the image.
    pub fn zoom_center(&mut self, factor: f64) -> crate::Result<()> {
        self.zoom(self.width as f64 / 2.0, self.height as f64 / 2.0, factor)
    }

    /// Translate the view so the content follows a drag of `(dx, dy)` pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) -> crate::Result<()> {
        let span = self.span();
        let shift = Complex::new(
            -dx / self.width as f64 * span.re,
            -dy / self.height as f64 * span.im,
        );
        let top_left = self.top_left + shift;
        let bottom_right = self.bottom_right + shift;
        validate_corners(top_left, bottom_right)?;
        self.top_left = top_left;
        self.bottom_right = bottom_right;
        Ok(())
    }

    /// Frame the pixel rectangle spanned by two drag corners.
    ///
    /// The larger relative side of the selection decides the new extents, so
    /// the whole selection stays visible and the aspect ratio is unchanged.
    pub fn select(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> crate::Result<()> {
        let fx = (x1 - x0).abs() / self.width as f64;
        let fy = (y1 - y0).abs() / self.height as f64;
        let fraction = fx.max(fy);
        if fraction <= 0.0 || !fraction.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("empty selection ({x0}, {y0}) → ({x1}, {y1})"),
            });
        }
        let center = self.pixel_to_complex((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        let half = self.span() * (fraction / 2.0);
        let top_left = center - half;
        let bottom_right = center + half;
        validate_corners(top_left, bottom_right)?;
        self.top_left = top_left;
        self.bottom_right = bottom_right;
        Ok(())
    }
}

fn validate_corners(top_left: Complex, bottom_right: Complex) -> crate::Result<()> {
    if !top_left.is_finite() || !bottom_right.is_finite() {
        return Err(CoreError::InvalidViewport {
            reason: format!("corners must be finite, got {top_left} / {bottom_right}"),
        });
    }
    let span = bottom_right - top_left;
    if span.re == 0.0 || span.im == 0.0 {
        return Err(CoreError::InvalidViewport {
            reason: format!("degenerate rectangle {top_left} / {bottom_right}"),
        });
    }
    Ok(())
}
