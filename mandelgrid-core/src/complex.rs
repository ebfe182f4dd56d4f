use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// A fixed-precision complex number made of two `f64` components.
///
/// `Copy` and allocation-free, so the fixed-precision evaluator can keep its
/// whole orbit in registers. The arbitrary-precision counterpart is
/// [`BigComplex`](crate::BigComplex).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Build a value from polar coordinates.
    #[inline]
    pub fn from_polar(r: f64, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self::new(r * cos, r * sin)
    }

    /// Returns `re² + im²` without taking the square root.
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Returns `|z| = √(re² + im²)`.
    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// The argument (phase angle) in `(-π, π]`.
    #[inline]
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }

    /// `self * self`, written out so the compiler does not need to see
    /// through the generic multiply.
    #[inline]
    pub fn square(self) -> Self {
        Self::new(
            self.re * self.re - self.im * self.im,
            2.0 * self.re * self.im,
        )
    }

    /// Raise to a complex power, `self^exp = exp(exp · ln self)`.
    ///
    /// `0^exp` is `0` for any exponent with a positive real part and `1` for
    /// a zero exponent. Other zero-base cases produce infinities/NaN.
    pub fn powc(self, exp: Complex) -> Self {
        if self == Self::ZERO {
            if exp == Self::ZERO {
                return Self::new(1.0, 0.0);
            }
            if exp.re > 0.0 {
                return Self::ZERO;
            }
        }
        let ln_r = self.norm().ln();
        let theta = self.arg();
        let r = (exp.re * ln_r - exp.im * theta).exp();
        let phi = exp.im * ln_r + exp.re * theta;
        Self::from_polar(r, phi)
    }
}

// -- Arithmetic operators --

impl Add for Complex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl std::fmt::Display for Complex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}{:+}i)", self.re, self.im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn multiplication() {
        // (1 + 2i)(3 + 4i) = 3 + 4i + 6i + 8i² = -5 + 10i
        let c = Complex::new(1.0, 2.0) * Complex::new(3.0, 4.0);
        assert!(approx_eq(c.re, -5.0));
        assert!(approx_eq(c.im, 10.0));
    }

    #[test]
    fn square_matches_multiplication() {
        let z = Complex::new(-0.75, 0.3);
        assert_eq!(z.square(), z * z);
    }

    #[test]
    fn norms() {
        let a = Complex::new(3.0, 4.0);
        assert!(approx_eq(a.norm_sq(), 25.0));
        assert!(approx_eq(a.norm(), 5.0));
    }

    #[test]
    fn powc_two_is_square() {
        let z = Complex::new(1.0, 1.0);
        let p = z.powc(Complex::new(2.0, 0.0));
        assert!(approx_eq(p.re, 0.0));
        assert!(approx_eq(p.im, 2.0));
    }

    #[test]
    fn powc_of_zero() {
        assert_eq!(Complex::ZERO.powc(Complex::new(2.0, 0.0)), Complex::ZERO);
        assert_eq!(Complex::ZERO.powc(Complex::ZERO), Complex::new(1.0, 0.0));
    }

    #[test]
    fn display_keeps_sign() {
        assert_eq!(Complex::new(1.5, -2.75).to_string(), "(1.5-2.75i)");
        assert_eq!(Complex::new(1.5, 2.0).to_string(), "(1.5+2i)");
    }
}
