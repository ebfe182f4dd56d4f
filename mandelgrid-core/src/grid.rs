use rug::Float;
use serde::{Deserialize, Serialize};

use crate::big_complex::BigComplex;
use crate::complex::Complex;
use crate::escape::Escape;
use crate::fractal::Fractal;
use crate::viewport::{BigViewport, Viewport};

/// Where a sample sits in the complex plane, in the representation it was
/// built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Fixed(Complex),
    Arbitrary(BigComplex),
}

impl Position {
    /// Lossy `f64` view of the coordinate.
    pub fn to_complex(&self) -> Complex {
        match self {
            Self::Fixed(c) => *c,
            Self::Arbitrary(c) => c.to_complex(),
        }
    }

    pub fn is_arbitrary(&self) -> bool {
        matches!(self, Self::Arbitrary(_))
    }
}

/// One grid cell: a coordinate, its pixel, and (once evaluated) its
/// escape result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub position: Position,
    pub is_member: bool,
    pub iterations: u32,
    pub pixel_x: u32,
    pub pixel_y: u32,
}

impl SamplePoint {
    pub fn new(position: Position, pixel_x: u32, pixel_y: u32) -> Self {
        Self {
            position,
            is_member: false,
            iterations: 0,
            pixel_x,
            pixel_y,
        }
    }

    /// Classify this point and store the result.
    #[inline]
    pub fn evaluate<F: Fractal>(&mut self, fractal: &F) {
        let escape = match &self.position {
            Position::Fixed(c) => fractal.iterate(*c),
            Position::Arbitrary(c) => fractal.iterate_big(c),
        };
        self.is_member = escape.is_member;
        self.iterations = escape.iterations;
    }

    pub fn escape(&self) -> Escape {
        Escape {
            is_member: self.is_member,
            iterations: self.iterations,
        }
    }

    pub fn pixel(&self) -> (u32, u32) {
        (self.pixel_x, self.pixel_y)
    }
}

/// A row-major grid of sample points, one per output pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleGrid {
    pub x_res: u32,
    pub y_res: u32,

    /// Iteration cap of the last evaluation, `None` until evaluated.
    #[serde(default)]
    pub max_iterations: Option<u32>,

    pub points: Vec<SamplePoint>,
}

impl SampleGrid {
    /// Lay out `f64` sample points over `viewport`.
    ///
    /// Rows start at the top edge and step downward by `y_step`; columns start
    /// at the left edge and step right by `x_step`. Coordinates are
    /// accumulated, not recomputed per pixel.
    pub fn build(viewport: &Viewport) -> Self {
        let bounds = viewport.bounds();
        let (x_step, y_step) = viewport.steps();
        let mut points = Vec::with_capacity(viewport.point_count());

        let mut y = bounds.top;
        for py in 0..viewport.y_res {
            let mut x = bounds.left;
            for px in 0..viewport.x_res {
                points.push(SamplePoint::new(Position::Fixed(Complex::new(x, y)), px, py));
                x += x_step;
            }
            y -= y_step;
        }

        Self {
            x_res: viewport.x_res,
            y_res: viewport.y_res,
            max_iterations: None,
            points,
        }
    }

    /// Same layout as [`SampleGrid::build`], with every coordinate and step
    /// held at the viewport's precision.
    pub fn build_big(viewport: &BigViewport) -> Self {
        let prec = viewport.prec();
        let top_left = viewport.top_left();
        let (x_step, y_step) = viewport.steps();
        let mut points = Vec::with_capacity(viewport.point_count());

        let mut y = top_left.im;
        for py in 0..viewport.y_res {
            let mut x = Float::with_val(prec, &top_left.re);
            for px in 0..viewport.x_res {
                let position = BigComplex {
                    re: x.clone(),
                    im: y.clone(),
                };
                points.push(SamplePoint::new(Position::Arbitrary(position), px, py));
                x += &x_step;
            }
            y -= &y_step;
        }

        Self {
            x_res: viewport.x_res,
            y_res: viewport.y_res,
            max_iterations: None,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_evaluated(&self) -> bool {
        self.max_iterations.is_some()
    }

    pub fn member_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_member).count()
    }

    /// Look up a point by pixel, relying on row-major order.
    pub fn get(&self, pixel_x: u32, pixel_y: u32) -> Option<&SamplePoint> {
        if pixel_x >= self.x_res || pixel_y >= self.y_res {
            return None;
        }
        self.points
            .get(pixel_y as usize * self.x_res as usize + pixel_x as usize)
    }
}
