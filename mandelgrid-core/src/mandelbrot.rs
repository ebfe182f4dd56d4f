use crate::big_complex::BigComplex;
use crate::complex::Complex;
use crate::escape::{self, Escape};
use crate::fractal::{Fractal, FractalParams};

/// The Mandelbrot set: `z_{n+1} = z_n² + c` where `c` is the sample point
/// and the orbit starts from that same point.
#[derive(Debug, Clone)]
pub struct Mandelbrot {
    max_iterations: u32,
}

impl Mandelbrot {
    pub fn new(params: &FractalParams) -> Self {
        Self::with_max_iterations(params.max_iterations)
    }

    pub fn with_max_iterations(max_iterations: u32) -> Self {
        Self { max_iterations }
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self::new(&FractalParams::default())
    }
}

impl Fractal for Mandelbrot {
    #[inline]
    fn iterate(&self, c: Complex) -> Escape {
        escape::mandelbrot(c, self.max_iterations)
    }

    #[inline]
    fn iterate_big(&self, c: &BigComplex) -> Escape {
        escape::mandelbrot_big(c, self.max_iterations)
    }

    fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}
