//! Image export: PNG with embedded metadata (tEXt chunks) and JPEG.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::debug;

/// Quality used for JPEG frames and images.
pub const JPEG_QUALITY: u8 = 98;

/// Description of a rendered grid, embedded in exported PNGs.
#[derive(Debug, Clone, Default)]
pub struct ExportMetadata {
    pub fractal_type: String,
    pub center_re: String,
    pub center_im: String,
    pub plot_width: String,
    pub plot_height: String,
    pub max_iterations: u32,
    pub julia_c_re: Option<String>,
    pub julia_c_im: Option<String>,
    /// `"fixed"` or the arbitrary bit-width, e.g. `"1024 bits"`.
    pub precision: String,
}

/// Write `image` to `path`, choosing the format from the extension.
///
/// `.png` files carry `metadata` as text chunks; `.jpg`/`.jpeg` files are
/// written at [`JPEG_QUALITY`]. Any other extension is handed to `image`.
pub fn save_image(image: &RgbImage, path: &Path, metadata: &ExportMetadata) -> crate::Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => export_png(image, path, metadata),
        Some("jpg" | "jpeg") => export_jpeg(image, path, JPEG_QUALITY),
        _ => {
            image.save(path)?;
            debug!(path = %path.display(), "exported image");
            Ok(())
        }
    }
}

/// Write an RGB image as a PNG file with embedded grid metadata.
///
/// Uses the `png` crate directly (rather than `image`) to inject custom tEXt
/// chunks readable by exiftool and most image viewers.
pub fn export_png(image: &RgbImage, path: &Path, metadata: &ExportMetadata) -> crate::Result<()> {
    let (width, height) = image.dimensions();
    let writer = BufWriter::new(File::create(path)?);

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "Mandelgrid".to_string())?;
    encoder.add_text_chunk("Description".to_string(), build_description(metadata))?;
    for (key, value) in build_metadata_pairs(metadata, width, height) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(image.as_raw())?;
    png_writer.finish()?;

    debug!("Exported PNG {}x{} to {}", width, height, path.display());
    Ok(())
}

pub fn export_jpeg(image: &RgbImage, path: &Path, quality: u8) -> crate::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    image.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))?;
    writer.flush()?;
    debug!(quality, "Exported JPEG {}x{} to {}", image.width(), image.height(), path.display());
    Ok(())
}

fn build_description(meta: &ExportMetadata) -> String {
    let mut desc = format!(
        "{} - Center: {} {}i, Plot: {} x {}, Iterations: {}",
        meta.fractal_type,
        meta.center_re,
        meta.center_im,
        meta.plot_width,
        meta.plot_height,
        meta.max_iterations,
    );
    if let (Some(re), Some(im)) = (&meta.julia_c_re, &meta.julia_c_im) {
        desc.push_str(&format!(", Julia C: {re} {im}i"));
    }
    desc
}

fn build_metadata_pairs(meta: &ExportMetadata, width: u32, height: u32) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("Mandelgrid.FractalType".into(), meta.fractal_type.clone()),
        ("Mandelgrid.CenterRe".into(), meta.center_re.clone()),
        ("Mandelgrid.CenterIm".into(), meta.center_im.clone()),
        ("Mandelgrid.PlotWidth".into(), meta.plot_width.clone()),
        ("Mandelgrid.PlotHeight".into(), meta.plot_height.clone()),
        ("Mandelgrid.MaxIterations".into(), meta.max_iterations.to_string()),
        ("Mandelgrid.Precision".into(), meta.precision.clone()),
        ("Mandelgrid.Resolution".into(), format!("{width}x{height}")),
    ];
    if let Some(re) = &meta.julia_c_re {
        pairs.push(("Mandelgrid.JuliaC_Re".into(), re.clone()));
    }
    if let Some(im) = &meta.julia_c_im {
        pairs.push(("Mandelgrid.JuliaC_Im".into(), im.clone()));
    }
    pairs
}
