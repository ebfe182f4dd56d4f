use rug::Float;
use serde::{Deserialize, Serialize};

use crate::big_complex::{check_precision, BigComplex};
use crate::complex::Complex;
use crate::error::CoreError;

/// The sampled region of the complex plane and the pixel resolution it maps to.
///
/// `center` is the middle of the plot; `plot_width × plot_height` is its
/// extent in complex-plane units. Pixel `(0, 0)` is the top-left corner, so
/// pixel rows run toward decreasing imaginary part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Complex,
    pub plot_width: f64,
    pub plot_height: f64,
    pub x_res: u32,
    pub y_res: u32,
}

/// Edges of a plot in complex-plane coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

fn check_center(center: &BigComplex) -> crate::Result<()> {
    if !center.re.is_finite() || !center.im.is_finite() {
        return Err(CoreError::InvalidPlotSize {
            reason: format!("center must be finite, got {center}"),
        });
    }
    Ok(())
}

fn check_resolution(x_res: u32, y_res: u32) -> crate::Result<()> {
    if x_res == 0 || y_res == 0 {
        return Err(CoreError::InvalidResolution { x_res, y_res });
    }
    Ok(())
}

impl Viewport {
    /// The classic full view: centred on the origin, 4 × 4 units.
    pub fn default_view(x_res: u32, y_res: u32) -> crate::Result<Self> {
        Self::new(Complex::ZERO, 4.0, 4.0, x_res, y_res)
    }

    /// Create a viewport, rejecting empty resolutions and non-positive or
    /// non-finite plot sizes.
    pub fn new(
        center: Complex,
        plot_width: f64,
        plot_height: f64,
        x_res: u32,
        y_res: u32,
    ) -> crate::Result<Self> {
        check_resolution(x_res, y_res)?;
        for (name, value) in [("width", plot_width), ("height", plot_height)] {
            if value <= 0.0 || !value.is_finite() {
                return Err(CoreError::InvalidPlotSize {
                    reason: format!("plot {name} must be positive and finite, got {value}"),
                });
            }
        }
        if !center.re.is_finite() || !center.im.is_finite() {
            return Err(CoreError::InvalidPlotSize {
                reason: format!("center must be finite, got {center}"),
            });
        }
        Ok(Self {
            center,
            plot_width,
            plot_height,
            x_res,
            y_res,
        })
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            left: self.center.re - self.plot_width / 2.0,
            right: self.center.re + self.plot_width / 2.0,
            top: self.center.im + self.plot_height / 2.0,
            bottom: self.center.im - self.plot_height / 2.0,
        }
    }

    /// Complex-plane distance between neighbouring samples, `(x_step, y_step)`.
    pub fn steps(&self) -> (f64, f64) {
        let b = self.bounds();
        (
            (b.right - b.left) / self.x_res as f64,
            (b.top - b.bottom) / self.y_res as f64,
        )
    }

    pub fn point_count(&self) -> usize {
        self.x_res as usize * self.y_res as usize
    }

    /// Width / height in pixels.
    pub fn aspect_ratio(&self) -> f64 {
        self.x_res as f64 / self.y_res as f64
    }
}

/// [`Viewport`] with every coordinate in arbitrary precision.
///
/// Deep zooms need plot widths far below what `f64` steps can resolve, so the
/// center and extent are kept as `rug::Float` and the grid is constructed
/// entirely in that precision.
#[derive(Debug, Clone, PartialEq)]
pub struct BigViewport {
    pub center: BigComplex,
    pub plot_width: Float,
    pub plot_height: Float,
    pub x_res: u32,
    pub y_res: u32,
    prec: u32,
}

impl BigViewport {
    /// Widen a fixed-precision viewport to `prec` bits.
    pub fn from_viewport(viewport: &Viewport, prec: u32) -> crate::Result<Self> {
        let prec = check_precision(prec)?;
        Ok(Self {
            center: BigComplex::from_complex(viewport.center, prec),
            plot_width: Float::with_val(prec, viewport.plot_width),
            plot_height: Float::with_val(prec, viewport.plot_height),
            x_res: viewport.x_res,
            y_res: viewport.y_res,
            prec,
        })
    }

    /// Build from decimal strings, for centers and sizes that `f64` cannot hold.
    pub fn parse(
        center_re: &str,
        center_im: &str,
        plot_width: &str,
        plot_height: &str,
        x_res: u32,
        y_res: u32,
        prec: u32,
    ) -> crate::Result<Self> {
        check_resolution(x_res, y_res)?;
        let center = BigComplex::parse(center_re, center_im, prec)?;
        check_center(&center)?;
        let mut size = BigComplex::with_prec(prec);
        size.set_str(plot_width, plot_height)?;
        if size.re <= 0 || size.im <= 0 || !size.re.is_finite() || !size.im.is_finite() {
            return Err(CoreError::InvalidPlotSize {
                reason: format!("plot size must be positive and finite, got {plot_width} × {plot_height}"),
            });
        }
        Ok(Self {
            center,
            plot_width: size.re,
            plot_height: size.im,
            x_res,
            y_res,
            prec,
        })
    }

    /// Replace the center, parsed from decimal strings at this viewport's
    /// precision. Non-finite values are rejected.
    pub fn with_center(mut self, center_re: &str, center_im: &str) -> crate::Result<Self> {
        let center = BigComplex::parse(center_re, center_im, self.prec)?;
        check_center(&center)?;
        self.center = center;
        Ok(self)
    }

    pub fn prec(&self) -> u32 {
        self.prec
    }

    /// `(left, right, top, bottom)` at full precision.
    fn edges(&self) -> (Float, Float, Float, Float) {
        let prec = self.prec;
        let half_w = Float::with_val(prec, &self.plot_width / 2u32);
        let half_h = Float::with_val(prec, &self.plot_height / 2u32);
        (
            Float::with_val(prec, &self.center.re - &half_w),
            Float::with_val(prec, &self.center.re + &half_w),
            Float::with_val(prec, &self.center.im + &half_h),
            Float::with_val(prec, &self.center.im - &half_h),
        )
    }

    /// `(left, top)`: the complex coordinate of pixel `(0, 0)`.
    pub fn top_left(&self) -> BigComplex {
        let (left, _, top, _) = self.edges();
        BigComplex { re: left, im: top }
    }

    /// `(x_step, y_step)` at full precision.
    ///
    /// Computed as `(right − left) / x_res` like the fixed form, so both
    /// constructions agree whenever `f64` is exact.
    pub fn steps(&self) -> (Float, Float) {
        let (left, right, top, bottom) = self.edges();
        let mut x_step = right - &left;
        x_step /= self.x_res;
        let mut y_step = top - &bottom;
        y_step /= self.y_res;
        (x_step, y_step)
    }

    pub fn point_count(&self) -> usize {
        self.x_res as usize * self.y_res as usize
    }

    /// Round to a fixed-precision viewport (lossy).
    pub fn to_viewport(&self) -> Viewport {
        Viewport {
            center: self.center.to_complex(),
            plot_width: self.plot_width.to_f64(),
            plot_height: self.plot_height.to_f64(),
            x_res: self.x_res,
            y_res: self.y_res,
        }
    }
}
