//! Zoom sequences: a run of frames that narrows from a wide starting plot
//! down to the configured one, written as numbered JPEGs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use mandelgrid_core::Pool;

use crate::commands;
use crate::config::Config;
use crate::error::{AppError, Result};

/// Zoom parameters from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomOptions {
    /// Plot width of the first frame.
    pub start_width: f64,
    /// Width ratio between consecutive frames. Must be `> 1`.
    pub zoom: f64,
    /// Iterations double every `1 / iter_factor` frames.
    pub iter_factor: f64,
    /// Print the schedule and stop.
    pub info_only: bool,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self {
            start_width: 4.0,
            zoom: 1.1,
            iter_factor: 0.02,
            info_only: false,
        }
    }
}

impl ZoomOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.zoom > 1.0 && self.zoom.is_finite()) {
            return Err(AppError::InvalidArgument(format!(
                "zoom factor must be greater than 1, got {}",
                self.zoom
            )));
        }
        if !(self.start_width > 0.0 && self.start_width.is_finite()) {
            return Err(AppError::InvalidArgument(format!(
                "start width must be positive, got {}",
                self.start_width
            )));
        }
        if !(self.iter_factor >= 0.0 && self.iter_factor.is_finite()) {
            return Err(AppError::InvalidArgument(format!(
                "iteration factor must be non-negative, got {}",
                self.iter_factor
            )));
        }
        Ok(())
    }
}

/// Parameters of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub index: u32,
    pub plot_width: f64,
    pub plot_height: f64,
    pub iterations: u32,
}

/// Frame widths `start · zoom^-i`, up to and including the first one that
/// is narrower than `final_width`.
fn frame_widths(start_width: f64, zoom: f64, final_width: f64) -> impl Iterator<Item = f64> {
    (0u32..)
        .map(move |i| start_width * zoom.powf(-(i as f64)))
        .scan(true, move |more, width| {
            if !*more {
                return None;
            }
            *more = width >= final_width;
            Some(width)
        })
}

/// Number of frames needed to narrow from `start_width` past `final_width`.
/// `zoom` must be greater than one.
pub fn total_frames(start_width: f64, zoom: f64, final_width: f64) -> usize {
    frame_widths(start_width, zoom, final_width).count()
}

/// `base << floor(index · iter_factor)`, saturating at `u32::MAX`.
pub fn frame_iterations(base: u32, index: u32, iter_factor: f64) -> u32 {
    let shift = (index as f64 * iter_factor).floor() as u32;
    if base == 0 {
        return 0;
    }
    if shift >= base.leading_zeros() + 1 {
        return u32::MAX;
    }
    base << shift
}

/// The full frame schedule for `config`.
pub fn schedule(config: &Config, opts: &ZoomOptions) -> Result<Vec<Frame>> {
    opts.validate()?;
    config.viewport()?;
    let aspect = config.y_res as f64 / config.x_res as f64;
    Ok(frame_widths(opts.start_width, opts.zoom, config.plot_width)
        .enumerate()
        .map(|(i, plot_width)| {
            let index = i as u32;
            Frame {
                index,
                plot_width,
                plot_height: plot_width * aspect,
                iterations: frame_iterations(config.iterations, index, opts.iter_factor),
            }
        })
        .collect())
}

/// `<dir>/<name>_zoom` for an image file `<dir>/<name>.<ext>`.
pub fn output_dir(image_file: &Path) -> PathBuf {
    let name = image_file
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or("output");
    image_file
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{name}_zoom"))
}

pub fn frame_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("{index:010}.jpg"))
}

/// Render every frame of the sequence, one after another.
pub fn run(config: &Config, pool: &Pool, opts: &ZoomOptions) -> Result<()> {
    let frames = schedule(config, opts)?;
    let dir = output_dir(&config.image_file);

    if opts.info_only {
        println!("Config info:\n------------\n{config}\n----------");
        println!(
            "Start width:\t{:.5e}\nZoom factor:\t{:.2}\nIter. factor:\t{:.2}",
            opts.start_width, opts.zoom, opts.iter_factor
        );
        println!("{} frames will be created in '{}'.", frames.len(), dir.display());
        return Ok(());
    }

    fs::create_dir_all(&dir).map_err(|e| AppError::io(&dir, e))?;
    let total = frames.len();
    let start = Instant::now();

    for frame in frames {
        let frame_start = Instant::now();
        info!(
            frame = frame.index + 1,
            total,
            iterations = frame.iterations,
            plot_width = frame.plot_width,
            "rendering frame"
        );

        let frame_config = Config {
            plot_width: frame.plot_width,
            plot_height: frame.plot_height,
            iterations: frame.iterations,
            image_file: frame_path(&dir, frame.index),
            ..config.clone()
        };
        let grid = commands::evaluate(&frame_config, pool)?;
        commands::write_image(&frame_config, &grid, pool)?;

        info!(
            elapsed_ms = frame_start.elapsed().as_millis() as u64,
            "frame {} done",
            frame.index + 1
        );
    }

    let elapsed = start.elapsed().as_secs_f64();
    info!(
        "Total time: {:.1} seconds, average {:.1} seconds per frame",
        elapsed,
        elapsed / total.max(1) as f64
    );
    Ok(())
}
