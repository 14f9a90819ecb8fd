pub mod animation;
pub mod buffer;
pub mod coloration;
pub mod error;
pub mod export;
pub mod iteration_buffer;
pub mod manager;
pub mod renderer;
pub mod surface;
pub mod tile;

pub use animation::{ExportFormat, ExportSpec, Frame, ZoomAnimation};
pub use buffer::RenderBuffer;
pub use coloration::{ModuloColoration, SharedColoration};
pub use error::RenderError;
pub use export::{export_jpeg, export_png, ExportMetadata, GifWriter};
pub use iteration_buffer::IterationBuffer;
pub use manager::{ExportSummary, FractaleManager, RATIO};
pub use renderer::{compute, RenderResult};
pub use surface::{FractalSurface, Surface};
pub use tile::TILE_SIZE;

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
