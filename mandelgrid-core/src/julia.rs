use crate::big_complex::BigComplex;
use crate::complex::Complex;
use crate::escape::{self, Escape};
use crate::fractal::{Fractal, FractalParams};

/// A Julia set: `z_{n+1} = z_n² + c`, where `c` is a fixed constant
/// and `z₀` is the sample point.
#[derive(Debug, Clone)]
pub struct Julia {
    max_iterations: u32,

    /// The constant `c` defining this Julia set.
    c: Complex,

    /// `c` widened for arbitrary-precision points.
    c_big: BigComplex,
}

impl Julia {
    /// The arbitrary-precision constant is widened to the params' bit-width
    /// (or the default width when the params are fixed).
    pub fn new(c: Complex, params: &FractalParams) -> Self {
        Self {
            max_iterations: params.max_iterations,
            c,
            c_big: BigComplex::from_complex(c, params.big_precision()),
        }
    }

    /// Use a constant given beyond `f64` precision.
    pub fn with_big_constant(c_big: BigComplex, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            c: c_big.to_complex(),
            c_big,
        }
    }

    /// A visually interesting default: `c = -0.7 + 0.27015i`.
    pub fn default_c() -> Complex {
        Complex::new(-0.7, 0.27015)
    }

    pub fn c(&self) -> Complex {
        self.c
    }

    pub fn c_big(&self) -> &BigComplex {
        &self.c_big
    }
}

impl Default for Julia {
    fn default() -> Self {
        Self::new(Self::default_c(), &FractalParams::default())
    }
}

impl Fractal for Julia {
    #[inline]
    fn iterate(&self, point: Complex) -> Escape {
        escape::julia(point, self.c, self.max_iterations)
    }

    #[inline]
    fn iterate_big(&self, point: &BigComplex) -> Escape {
        escape::julia_big(point, &self.c_big, self.max_iterations)
    }

    fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}
