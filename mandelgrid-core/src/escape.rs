//! Escape-time iteration of `z_{n+1} = z_n² + c`.
//!
//! The orbit starts at the sample point itself, so Mandelbrot mode is Julia
//! mode with `c` equal to that point. After each step the new value is tested
//! against the escape radius; escaping at step `n` (zero-based) reports
//! `n` iterations. An orbit that survives the whole cap is a member and
//! reports the cap. The comparison is strict: a value of magnitude exactly
//! `2` is still bounded.

use rug::{Assign, Float};
use serde::{Deserialize, Serialize};

use crate::big_complex::BigComplex;
use crate::complex::Complex;

/// Bailout radius for the fixed-precision test `|z| > 2`.
pub const ESCAPE_RADIUS: f64 = 2.0;

/// Bailout for the arbitrary-precision test `|z|² > 4`.
pub const ESCAPE_RADIUS_SQ: u32 = 4;

/// Outcome of iterating one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Escape {
    pub is_member: bool,
    /// Completed iterations before escaping, or the cap for members.
    pub iterations: u32,
}

impl Escape {
    #[inline]
    pub fn member(max_iterations: u32) -> Self {
        Self {
            is_member: true,
            iterations: max_iterations,
        }
    }

    #[inline]
    pub fn escaped(iterations: u32) -> Self {
        Self {
            is_member: false,
            iterations,
        }
    }
}

/// The general step `z^exp + c`.
///
/// The evaluators below always use `exp = 2`, for which this takes the exact
/// `z·z` path rather than the polar power.
pub fn recurrence(z: Complex, c: Complex, exp: Complex) -> Complex {
    if exp == Complex::new(2.0, 0.0) {
        z.square() + c
    } else {
        z.powc(exp) + c
    }
}

// ---------------------------------------------------------------------------
// Fixed precision
// ---------------------------------------------------------------------------

/// Iterate from `z0` with constant `c`.
pub fn julia(z0: Complex, c: Complex, max_iterations: u32) -> Escape {
    let mut z = z0;
    for n in 0..max_iterations {
        z = z.square() + c;
        if z.norm() > ESCAPE_RADIUS {
            return Escape::escaped(n);
        }
    }
    Escape::member(max_iterations)
}

/// Same as `julia(c, c, max_iterations)`.
#[inline]
pub fn mandelbrot(c: Complex, max_iterations: u32) -> Escape {
    julia(c, c, max_iterations)
}

// ---------------------------------------------------------------------------
// Arbitrary precision
// ---------------------------------------------------------------------------

/// Arbitrary-precision iteration at the precision of `z0`.
///
/// Keeps `re²` and `im²` from the escape test and reuses them for the next
/// step (`re' = re² − im² + c.re`, `im' = 2·re·im + c.im`), so each step
/// costs three multiplications. Rounding is identical to
/// [`julia_big_naive`].
pub fn julia_big(z0: &BigComplex, c: &BigComplex, max_iterations: u32) -> Escape {
    let prec = z0.prec();
    let mut re = Float::with_val(prec, &z0.re);
    let mut im = Float::with_val(prec, &z0.im);
    let mut re_sq = Float::with_val(prec, re.square_ref());
    let mut im_sq = Float::with_val(prec, im.square_ref());
    let mut norm_sq = Float::new(prec);

    for n in 0..max_iterations {
        im *= &re;
        im *= 2;
        im += &c.im;

        re.assign(&re_sq - &im_sq);
        re += &c.re;

        re_sq.assign(re.square_ref());
        im_sq.assign(im.square_ref());
        norm_sq.assign(&re_sq + &im_sq);
        if norm_sq > ESCAPE_RADIUS_SQ {
            return Escape::escaped(n);
        }
    }
    Escape::member(max_iterations)
}

/// Straightforward square-then-add form of [`julia_big`].
pub fn julia_big_naive(z0: &BigComplex, c: &BigComplex, max_iterations: u32) -> Escape {
    let mut z = z0.clone();
    z.set_prec(z0.prec());
    for n in 0..max_iterations {
        z.square_mut();
        z += c;
        if z.abs_sq() > ESCAPE_RADIUS_SQ {
            return Escape::escaped(n);
        }
    }
    Escape::member(max_iterations)
}

/// Same as `julia_big(c, c, max_iterations)`.
#[inline]
pub fn mandelbrot_big(c: &BigComplex, max_iterations: u32) -> Escape {
    julia_big(c, c, max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREC: u32 = 256;

    fn big(c: Complex) -> BigComplex {
        BigComplex::from_complex(c, PREC)
    }

    fn sample_points() -> Vec<Complex> {
        let mut points = vec![
            Complex::ZERO,
            Complex::new(-1.0, 0.0),
            Complex::new(0.25, 0.0),
            Complex::new(-0.75, 0.1),
            Complex::new(0.3, 0.5),
            Complex::new(-2.0, 0.0),
            Complex::new(1.0, 1.0),
            Complex::new(3.0, 0.0),
        ];
        for i in 0..8 {
            for j in 0..8 {
                points.push(Complex::new(-2.0 + i as f64 * 0.375, -1.25 + j as f64 * 0.3125));
            }
        }
        points
    }

    #[test]
    fn origin_is_member() {
        assert_eq!(mandelbrot(Complex::ZERO, 100), Escape::member(100));
        assert_eq!(mandelbrot_big(&big(Complex::ZERO), 100), Escape::member(100));
    }

    #[test]
    fn three_escapes_on_first_step() {
        let c = Complex::new(3.0, 0.0);
        assert_eq!(mandelbrot(c, 100), Escape::escaped(0));
        assert_eq!(mandelbrot_big(&big(c), 100), Escape::escaped(0));
    }

    #[test]
    fn magnitude_exactly_two_is_bounded() {
        // z₀ = 0, c = 2: z₁ = 2 (not > 2), z₂ = 6.
        let c = Complex::new(2.0, 0.0);
        assert_eq!(julia(Complex::ZERO, c, 1), Escape::member(1));
        assert_eq!(julia(Complex::ZERO, c, 5), Escape::escaped(1));
        assert_eq!(julia_big(&big(Complex::ZERO), &big(c), 1), Escape::member(1));
        assert_eq!(julia_big(&big(Complex::ZERO), &big(c), 5), Escape::escaped(1));
    }

    #[test]
    fn minus_two_stays_on_fixed_point() {
        // -2 → 2 → 2 → … never exceeds the radius.
        let c = Complex::new(-2.0, 0.0);
        assert_eq!(mandelbrot(c, 50), Escape::member(50));
        assert_eq!(mandelbrot_big(&big(c), 50), Escape::member(50));
    }

    #[test]
    fn zero_cap_is_always_member() {
        for c in sample_points() {
            assert_eq!(mandelbrot(c, 0), Escape::member(0));
            assert_eq!(mandelbrot_big(&big(c), 0), Escape::member(0));
        }
    }

    #[test]
    fn iteration_bounds_hold() {
        for cap in [1, 2, 7, 64] {
            for c in sample_points() {
                let e = mandelbrot(c, cap);
                if e.is_member {
                    assert_eq!(e.iterations, cap);
                } else {
                    assert!(e.iterations < cap, "{c} at cap {cap}: {e:?}");
                }
            }
        }
    }

    #[test]
    fn mandelbrot_is_julia_at_the_point() {
        for c in sample_points() {
            assert_eq!(mandelbrot(c, 64), julia(c, c, 64));
            assert_eq!(mandelbrot_big(&big(c), 64), julia_big(&big(c), &big(c), 64));
        }
    }

    #[test]
    fn fixed_and_arbitrary_agree() {
        for c in sample_points() {
            assert_eq!(mandelbrot(c, 16), mandelbrot_big(&big(c), 16), "at {c}");
        }
    }

    #[test]
    fn optimized_matches_naive() {
        let julia_c = big(Complex::new(-0.7, 0.27015));
        for p in sample_points() {
            let z0 = big(p);
            assert_eq!(julia_big(&z0, &z0, 80), julia_big_naive(&z0, &z0, 80));
            assert_eq!(julia_big(&z0, &julia_c, 80), julia_big_naive(&z0, &julia_c, 80));
        }
    }

    #[test]
    fn deep_point_uses_full_precision() {
        // c = -2 sits on the set's tip: the orbit lands on 2 and stays there.
        // Nudging it left by less than f64 can resolve makes z1 = 2 + 3e,
        // which escapes straight away at full width.
        let tip = BigComplex::parse("-2", "0", 512).unwrap();
        let past = BigComplex::parse("-2.0000000000000000000000000001", "0", 512).unwrap();
        assert_ne!(tip, past);
        assert_eq!(tip.to_complex(), past.to_complex());

        assert_eq!(mandelbrot_big(&tip, 200), Escape::member(200));
        assert_eq!(mandelbrot_big(&past, 200), Escape::escaped(0));
        assert_eq!(julia_big_naive(&past, &past, 200), Escape::escaped(0));
        // Rounded to f64 the two points are indistinguishable.
        assert_eq!(mandelbrot(past.to_complex(), 200), Escape::member(200));
    }

    #[test]
    fn recurrence_general_form() {
        let z = Complex::new(0.5, 0.5);
        let c = Complex::new(-0.75, 0.1);
        // z² + c = (0, 0.5) + c
        let two = recurrence(z, c, Complex::new(2.0, 0.0));
        assert_eq!(two, Complex::new(-0.75, 0.6));

        let three = recurrence(z, c, Complex::new(3.0, 0.0));
        let expected = z * z * z + c;
        assert!((three.re - expected.re).abs() < 1e-12);
        assert!((three.im - expected.im).abs() < 1e-12);
    }
}
