use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use mandelgrid_core::{evaluate_grid, persist, FractalKind, Pool, SampleGrid};
use mandelgrid_render::{default_stops, render_image, save_image, write_stops};

use crate::config::Config;
use crate::error::Result;
use crate::progress::LogProgress;

/// Build and evaluate the grid described by `config`.
pub fn evaluate(config: &Config, pool: &Pool) -> Result<SampleGrid> {
    config.validate()?;
    let params = config.params()?;
    let fractal = FractalKind::from_params(&params);
    let mut grid = config.grid()?;

    info!(
        fractal = fractal.label(),
        x_res = config.x_res,
        y_res = config.y_res,
        iterations = params.max_iterations,
        precision = ?params.precision,
        "computing grid"
    );
    let mut progress = LogProgress::new(fractal.label());
    evaluate_grid(&mut grid, &fractal, pool, Some(&mut progress))?;
    Ok(grid)
}

/// Color `grid` with the configured ramp and write it to the image file.
pub fn write_image(config: &Config, grid: &SampleGrid, pool: &Pool) -> Result<()> {
    let ramp = config.ramp()?;
    let image = render_image(grid, &ramp, config.set_color()?, pool)?;
    save_image(&image, &config.image_file, &config.export_metadata())?;
    info!("Wrote image to {}", config.image_file.display());
    Ok(())
}

/// Evaluate and save the grid data, optionally rendering the image as well.
pub fn compute(config: &Config, pool: &Pool, with_image: bool) -> Result<()> {
    let start = Instant::now();
    let grid = evaluate(config, pool)?;
    persist::save_grid(&grid, &config.data_file)?;
    info!("Wrote grid data to {}", config.data_file.display());
    if with_image {
        write_image(config, &grid, pool)?;
    }
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "compute finished");
    Ok(())
}

/// Render an image from previously saved grid data.
pub fn colorize(config: &Config, pool: &Pool) -> Result<()> {
    let start = Instant::now();
    let grid = persist::load_grid(&config.data_file)?;
    if (grid.x_res, grid.y_res) != (config.x_res, config.y_res) {
        warn!(
            "grid data is {}x{} but the config asks for {}x{}; using the grid's size",
            grid.x_res, grid.y_res, config.x_res, config.y_res
        );
    }
    write_image(config, &grid, pool)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "colorize finished");
    Ok(())
}

/// Evaluate and render without keeping the grid data.
pub fn render(config: &Config, pool: &Pool) -> Result<()> {
    let start = Instant::now();
    let grid = evaluate(config, pool)?;
    write_image(config, &grid, pool)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "render finished");
    Ok(())
}

/// Write the default config to `output`, plus the default ramp if the file it
/// names does not exist yet.
pub fn default_config(output: &Path) -> Result<()> {
    Config::write_default(output)?;
    info!("Wrote default config to {}", output.display());

    let ramp_file = Config::default().ramp_file;
    if !ramp_file.exists() {
        write_stops(&default_stops(), &ramp_file)?;
        info!("Wrote default color ramp to {}", ramp_file.display());
    }
    Ok(())
}
