pub mod big_complex;
pub mod complex;
pub mod engine;
pub mod error;
pub mod escape;
pub mod fractal;
pub mod grid;
pub mod julia;
pub mod mandelbrot;
pub mod persist;
pub mod viewport;

// Re-export primary types for convenience.
pub use big_complex::BigComplex;
pub use complex::Complex;
pub use engine::{evaluate_grid, Pool, ProgressCell, ProgressSink};
pub use error::CoreError;
pub use escape::Escape;
pub use fractal::{Fractal, FractalKind, FractalParams, Precision};
pub use grid::{Position, SampleGrid, SamplePoint};
pub use julia::Julia;
pub use mandelbrot::Mandelbrot;
pub use viewport::{BigViewport, Bounds, Viewport};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
