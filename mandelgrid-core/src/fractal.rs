use serde::{Deserialize, Serialize};

use crate::big_complex::{check_precision, BigComplex, DEFAULT_PRECISION};
use crate::complex::Complex;
use crate::escape::Escape;
use crate::julia::Julia;
use crate::mandelbrot::Mandelbrot;

/// Numeric representation used to build and evaluate a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Precision {
    /// `f64` coordinates and arithmetic.
    #[default]
    Fixed,
    /// `rug::Float` coordinates and arithmetic at `bits` of mantissa.
    Arbitrary { bits: u32 },
}

impl Precision {
    pub fn arbitrary(bits: u32) -> crate::Result<Self> {
        Ok(Self::Arbitrary {
            bits: check_precision(bits)?,
        })
    }

    /// The configured bit-width, if arbitrary.
    pub fn bits(&self) -> Option<u32> {
        match self {
            Self::Fixed => None,
            Self::Arbitrary { bits } => Some(*bits),
        }
    }

    pub fn is_arbitrary(&self) -> bool {
        matches!(self, Self::Arbitrary { .. })
    }
}

/// Parameters controlling evaluation of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractalParams {
    /// Iteration cap. Zero is legal: every point is then a member.
    pub max_iterations: u32,

    /// Julia constant. `None` selects Mandelbrot mode.
    pub julia: Option<Complex>,

    pub precision: Precision,
}

impl FractalParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 512;

    /// A zero Julia constant is treated as absent (Mandelbrot mode).
    pub fn new(
        max_iterations: u32,
        julia: Option<Complex>,
        precision: Precision,
    ) -> crate::Result<Self> {
        if let Some(bits) = precision.bits() {
            check_precision(bits)?;
        }
        Ok(Self {
            max_iterations,
            julia: julia.filter(|c| *c != Complex::ZERO),
            precision,
        })
    }

    pub fn is_julia(&self) -> bool {
        self.julia.is_some()
    }

    /// Bit-width for arbitrary-precision work, falling back to
    /// [`DEFAULT_PRECISION`] when the params are fixed.
    pub fn big_precision(&self) -> u32 {
        self.precision.bits().unwrap_or(DEFAULT_PRECISION)
    }

    /// Return a copy with a different `max_iterations` value.
    pub fn with_max_iterations(self, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            julia: None,
            precision: Precision::Fixed,
        }
    }
}

/// An escape-time fractal that can classify a single point.
///
/// Grid evaluation is generic over `F: Fractal` so the iteration loop is
/// statically dispatched. Each point is evaluated in the representation it
/// was built with: `iterate` for fixed-precision points, `iterate_big` for
/// arbitrary-precision ones.
pub trait Fractal {
    fn iterate(&self, point: Complex) -> Escape;

    fn iterate_big(&self, point: &BigComplex) -> Escape;

    fn max_iterations(&self) -> u32;
}

/// Either fractal, chosen at runtime from [`FractalParams`].
#[derive(Debug, Clone)]
pub enum FractalKind {
    Mandelbrot(Mandelbrot),
    Julia(Julia),
}

impl FractalKind {
    pub fn from_params(params: &FractalParams) -> Self {
        match params.julia {
            Some(c) => Self::Julia(Julia::new(c, params)),
            None => Self::Mandelbrot(Mandelbrot::new(params)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mandelbrot(_) => "Mandelbrot",
            Self::Julia(_) => "Julia",
        }
    }
}

impl Fractal for FractalKind {
    #[inline]
    fn iterate(&self, point: Complex) -> Escape {
        match self {
            Self::Mandelbrot(m) => m.iterate(point),
            Self::Julia(j) => j.iterate(point),
        }
    }

    #[inline]
    fn iterate_big(&self, point: &BigComplex) -> Escape {
        match self {
            Self::Mandelbrot(m) => m.iterate_big(point),
            Self::Julia(j) => j.iterate_big(point),
        }
    }

    fn max_iterations(&self) -> u32 {
        match self {
            Self::Mandelbrot(m) => m.max_iterations(),
            Self::Julia(j) => j.max_iterations(),
        }
    }
}
