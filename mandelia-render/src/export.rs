//! Still and animated image export.
//!
//! PNG goes through the `png` crate directly so custom tEXt chunks can be
//! embedded; JPEG and GIF go through `image`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::{Delay, ExtendedColorType, RgbaImage};
use tracing::debug;

use mandelia_core::{Complex, FractalKind};

use crate::animation::Frame;
use crate::buffer::RenderBuffer;
use crate::coloration::ModuloColoration;
use crate::error::RenderError;

const SOFTWARE: &str = "Mandelia";

/// Fractal state embedded in an exported PNG as tEXt chunks.
#[derive(Debug, Clone)]
pub struct ExportMetadata {
    pub kind: FractalKind,
    pub top_left: Complex,
    pub bottom_right: Complex,
    pub max_iterations: u32,
    pub julia_c: Option<Complex>,
    pub coloration: ModuloColoration,
}

impl ExportMetadata {
    fn description(&self) -> String {
        let mut desc = format!(
            "{} - From {} to {}, Iterations: {}",
            self.kind, self.top_left, self.bottom_right, self.max_iterations,
        );
        if let Some(c) = self.julia_c {
            desc.push_str(&format!(", Julia C: {c}"));
        }
        desc
    }

    fn pairs(&self, width: u32, height: u32) -> Vec<(String, String)> {
        let (r, g, b) = self.coloration.rgb();
        let mut pairs = vec![
            ("Mandelia.FractalType".into(), self.kind.to_string()),
            ("Mandelia.TopLeft".into(), self.top_left.to_string()),
            ("Mandelia.BottomRight".into(), self.bottom_right.to_string()),
            ("Mandelia.MaxIterations".into(), self.max_iterations.to_string()),
            ("Mandelia.Coloration".into(), format!("{r},{g},{b}")),
            ("Mandelia.Resolution".into(), format!("{width}x{height}")),
        ];
        if let Some(c) = self.julia_c {
            pairs.push(("Mandelia.JuliaC_Re".into(), c.re.to_string()));
            pairs.push(("Mandelia.JuliaC_Im".into(), c.im.to_string()));
        }
        pairs
    }
}

/// Write an RGB buffer as a PNG file with embedded fractal metadata.
pub fn export_png(
    buffer: &RenderBuffer,
    path: &Path,
    metadata: &ExportMetadata,
) -> crate::Result<()> {
    let writer = BufWriter::new(File::create(path)?);

    let mut encoder = png::Encoder::new(writer, buffer.width, buffer.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), SOFTWARE.to_string())?;
    encoder.add_text_chunk("Description".to_string(), metadata.description())?;
    for (key, value) in metadata.pairs(buffer.width, buffer.height) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&buffer.pixels)?;
    png_writer.finish()?;

    debug!(
        width = buffer.width,
        height = buffer.height,
        path = %path.display(),
        "Exported PNG"
    );
    Ok(())
}

/// Write an RGB buffer as a JPEG file; `quality` is `1..=100`.
pub fn export_jpeg(buffer: &RenderBuffer, path: &Path, quality: u8) -> crate::Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = JpegEncoder::new_with_quality(writer, quality);
    encoder.encode(
        &buffer.pixels,
        buffer.width,
        buffer.height,
        ExtendedColorType::Rgb8,
    )?;
    debug!(
        width = buffer.width,
        height = buffer.height,
        quality,
        path = %path.display(),
        "Exported JPEG"
    );
    Ok(())
}

/// Incremental GIF writer: frames are encoded as they arrive and the
/// animation loops forever.
pub struct GifWriter {
    encoder: GifEncoder<BufWriter<File>>,
    frames: usize,
}

impl GifWriter {
    pub fn create(path: &Path) -> crate::Result<Self> {
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = GifEncoder::new(writer);
        encoder.set_repeat(Repeat::Infinite)?;
        Ok(Self { encoder, frames: 0 })
    }

    pub fn push(&mut self, frame: &Frame) -> crate::Result<()> {
        let image = &frame.image;
        let rgba = RgbaImage::from_raw(image.width, image.height, image.to_rgba()).ok_or(
            RenderError::InvalidDimensions {
                width: image.width,
                height: image.height,
            },
        )?;
        let delay = Delay::from_numer_denom_ms(frame.delay_ms(), 1);
        self.encoder
            .encode_frame(image::Frame::from_parts(rgba, 0, 0, delay))?;
        self.frames += 1;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn metadata(kind: FractalKind, julia_c: Option<Complex>) -> ExportMetadata {
        ExportMetadata {
            kind,
            top_left: Complex::new(-2.0, 1.0),
            bottom_right: Complex::new(1.0, -1.0),
            max_iterations: 256,
            julia_c,
            coloration: ModuloColoration::default(),
        }
    }

    fn gradient(width: u32, height: u32) -> RenderBuffer {
        let mut buf = RenderBuffer::new(width, height);
        for (i, px) in buf.pixels.iter_mut().enumerate() {
            *px = (i % 251) as u8;
        }
        buf
    }

    #[test]
    fn png_has_signature_and_size() {
        let dir = std::env::temp_dir().join("mandelia_test_export_png");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("still.png");
        export_png(&gradient(4, 3), &path, &metadata(FractalKind::Mandelbrot, None))
            .expect("export should succeed");

        let mut header = [0u8; 8];
        File::open(&path)
            .expect("file should exist")
            .read_exact(&mut header)
            .expect("should read header");
        assert_eq!(&header, b"\x89PNG\r\n\x1a\n");

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let reader = decoder.read_info().unwrap();
        assert_eq!((reader.info().width, reader.info().height), (4, 3));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn png_embeds_text_chunks() {
        let dir = std::env::temp_dir().join("mandelia_test_export_meta");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("julia.png");
        let meta = metadata(FractalKind::Julia, Some(Complex::new(-0.7, 0.27015)));
        export_png(&gradient(2, 2), &path, &meta).expect("export should succeed");

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let reader = decoder.read_info().unwrap();
        let texts = &reader.info().uncompressed_latin1_text;
        assert!(texts
            .iter()
            .any(|t| t.keyword == "Software" && t.text == "Mandelia"));
        assert!(texts
            .iter()
            .any(|t| t.keyword == "Mandelia.FractalType" && t.text == "Julia"));
        assert!(texts
            .iter()
            .any(|t| t.keyword == "Mandelia.JuliaC_Re" && t.text == "-0.7"));
        assert!(texts
            .iter()
            .any(|t| t.keyword == "Mandelia.Coloration" && t.text == "3,1,10"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn mandelbrot_png_has_no_seed_chunk() {
        let pairs = metadata(FractalKind::Mandelbrot, None).pairs(8, 8);
        assert!(pairs.iter().all(|(k, _)| !k.starts_with("Mandelia.JuliaC")));
        assert!(pairs
            .iter()
            .any(|(k, v)| k == "Mandelia.Resolution" && v == "8x8"));
    }

    #[test]
    fn jpeg_decodes_with_same_size() {
        let dir = std::env::temp_dir().join("mandelia_test_export_jpeg");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("still.jpg");
        export_jpeg(&gradient(16, 8), &path, 90).expect("export should succeed");

        let decoded = image::open(&path).expect("valid jpeg");
        assert_eq!((decoded.width(), decoded.height()), (16, 8));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
