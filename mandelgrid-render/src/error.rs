use thiserror::Error;

/// Errors originating from coloring and image export.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid color {0:?} (expected RRGGBB hex)")]
    InvalidColor(String),

    #[error("invalid color stops: {0}")]
    InvalidStops(String),

    #[error("color ramp has no colors")]
    EmptyRamp,

    #[error("sample pixel ({x}, {y}) outside {width}×{height} image")]
    PixelOutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("two samples map to pixel ({x}, {y})")]
    DuplicatePixel { x: u32, y: u32 },

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid ramp file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] mandelgrid_core::CoreError),
}
