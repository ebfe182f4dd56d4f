use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::Rgb;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mandelgrid_core::{BigViewport, Complex, FractalParams, Precision, SampleGrid, Viewport};
use mandelgrid_render::{parse_hex, ExportMetadata, Ramp};

use crate::error::{AppError, Result};

/// Everything a run needs, loaded from a JSON file.
///
/// Missing fields take their defaults, so a config file only needs to list
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub center_real: f64,
    #[serde(default)]
    pub center_imag: f64,
    #[serde(default = "default_plot_size")]
    pub plot_width: f64,
    #[serde(default = "default_plot_size")]
    pub plot_height: f64,
    #[serde(default = "default_resolution")]
    pub x_res: u32,
    #[serde(default = "default_resolution")]
    pub y_res: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_ramp_file")]
    pub ramp_file: PathBuf,
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_image_file")]
    pub image_file: PathBuf,
    #[serde(default = "default_set_color")]
    pub set_color: String,
    #[serde(default)]
    pub julia_real: f64,
    #[serde(default)]
    pub julia_imag: f64,

    /// Mantissa bits for arbitrary-precision evaluation; absent means `f64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision_bits: Option<u32>,

    /// Decimal center coordinates beyond `f64`, used with `precision_bits`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_real_exact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_imag_exact: Option<String>,
}

fn default_plot_size() -> f64 {
    4.0
}
fn default_resolution() -> u32 {
    1000
}
fn default_iterations() -> u32 {
    FractalParams::DEFAULT_MAX_ITERATIONS
}
fn default_ramp_file() -> PathBuf {
    PathBuf::from("ramp.json")
}
fn default_data_file() -> PathBuf {
    PathBuf::from("default.grid.json")
}
fn default_image_file() -> PathBuf {
    PathBuf::from("output.jpg")
}
fn default_set_color() -> String {
    "000000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            center_real: 0.0,
            center_imag: 0.0,
            plot_width: default_plot_size(),
            plot_height: default_plot_size(),
            x_res: default_resolution(),
            y_res: default_resolution(),
            iterations: default_iterations(),
            ramp_file: default_ramp_file(),
            data_file: default_data_file(),
            image_file: default_image_file(),
            set_color: default_set_color(),
            julia_real: 0.0,
            julia_imag: 0.0,
            precision_bits: None,
            center_real_exact: None,
            center_imag_exact: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        let config = serde_json::from_str(&json).map_err(|source| AppError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| AppError::io(path, e))?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Write the default configuration to `path`.
    pub fn write_default(path: &Path) -> Result<()> {
        Self::default().save(path)
    }

    /// Julia mode is on when either component of the constant is non-zero.
    pub fn is_julia(&self) -> bool {
        self.julia_real != 0.0 || self.julia_imag != 0.0
    }

    pub fn julia(&self) -> Option<Complex> {
        self.is_julia()
            .then(|| Complex::new(self.julia_real, self.julia_imag))
    }

    pub fn precision(&self) -> Result<Precision> {
        Ok(match self.precision_bits {
            Some(bits) => Precision::arbitrary(bits)?,
            None => Precision::Fixed,
        })
    }

    pub fn params(&self) -> Result<FractalParams> {
        Ok(FractalParams::new(self.iterations, self.julia(), self.precision()?)?)
    }

    pub fn viewport(&self) -> Result<Viewport> {
        Ok(Viewport::new(
            Complex::new(self.center_real, self.center_imag),
            self.plot_width,
            self.plot_height,
            self.x_res,
            self.y_res,
        )?)
    }

    /// The viewport at `prec` bits, with the exact center strings (when set)
    /// replacing the `f64` center.
    pub fn big_viewport(&self, prec: u32) -> Result<BigViewport> {
        let viewport = BigViewport::from_viewport(&self.viewport()?, prec)?;
        if self.center_real_exact.is_none() && self.center_imag_exact.is_none() {
            return Ok(viewport);
        }
        let re = exact_or_f64(&self.center_real_exact, self.center_real);
        let im = exact_or_f64(&self.center_imag_exact, self.center_imag);
        Ok(viewport.with_center(&re, &im)?)
    }

    /// Lay out the sample grid in the configured precision.
    pub fn grid(&self) -> Result<SampleGrid> {
        Ok(match self.precision()? {
            Precision::Fixed => SampleGrid::build(&self.viewport()?),
            Precision::Arbitrary { bits } => SampleGrid::build_big(&self.big_viewport(bits)?),
        })
    }

    pub fn ramp(&self) -> Result<Ramp> {
        Ok(Ramp::load(&self.ramp_file)?)
    }

    pub fn set_color(&self) -> Result<Rgb<u8>> {
        Ok(parse_hex(&self.set_color)?)
    }

    /// Check every field that can be rejected without touching the disk.
    pub fn validate(&self) -> Result<()> {
        self.params()?;
        self.viewport()?;
        self.set_color()?;
        if let Some(bits) = self.precision_bits {
            self.big_viewport(bits)?;
        }
        Ok(())
    }

    pub fn export_metadata(&self) -> ExportMetadata {
        let precision = match self.precision_bits {
            Some(bits) => format!("{bits} bits"),
            None => "fixed".to_string(),
        };
        let julia = self.julia();
        ExportMetadata {
            fractal_type: if julia.is_some() { "Julia" } else { "Mandelbrot" }.to_string(),
            center_re: exact_or_f64(&self.center_real_exact, self.center_real),
            center_im: exact_or_f64(&self.center_imag_exact, self.center_imag),
            plot_width: self.plot_width.to_string(),
            plot_height: self.plot_height.to_string(),
            max_iterations: self.iterations,
            julia_c_re: julia.map(|c| c.re.to_string()),
            julia_c_im: julia.map(|c| c.im.to_string()),
            precision,
        }
    }
}

fn exact_or_f64(exact: &Option<String>, fallback: f64) -> String {
    exact.clone().unwrap_or_else(|| fallback.to_string())
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plot center:\t{:.5}, {:.5}", self.center_real, self.center_imag)?;
        writeln!(f, "Plot W, H:\t{:.5}, {:.5}", self.plot_width, self.plot_height)?;
        writeln!(f, "Image size:\t{}x{}", self.x_res, self.y_res)?;
        writeln!(f, "Iterations:\t{}", self.iterations)?;
        match self.precision_bits {
            Some(bits) => writeln!(f, "Precision:\t{bits} bits")?,
            None => writeln!(f, "Precision:\tfixed")?,
        }
        writeln!(f, "Julia c =\t{:.5} + {:.5}i", self.julia_real, self.julia_imag)?;
        writeln!(f, "Ramp file:\t{}", self.ramp_file.display())?;
        writeln!(f, "Data file:\t{}", self.data_file.display())?;
        write!(f, "Image file:\t{}", self.image_file.display())
    }
}
