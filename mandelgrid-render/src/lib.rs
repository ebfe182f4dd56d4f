pub mod error;
pub mod export;
pub mod ramp;
pub mod renderer;

pub use error::RenderError;
pub use export::{export_jpeg, export_png, save_image, ExportMetadata, JPEG_QUALITY};
pub use ramp::{default_stops, make_ramp, parse_hex, read_stops, to_hex, write_stops, Ramp, Stop};
pub use renderer::render_image;

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
