use std::fmt;
use std::ops::{AddAssign, DivAssign, MulAssign, Neg, SubAssign};

use rug::ops::NegAssign;
use rug::{Assign, Float};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::complex::Complex;
use crate::error::CoreError;

/// Bit-width used for arbitrary-precision evaluation when none is configured.
pub const DEFAULT_PRECISION: u32 = 1024;

/// Bit-width of an `f64` mantissa. Also the precision of [`BigComplex::default`].
pub const NATIVE_PRECISION: u32 = 53;

/// Rough minimum number of bits needed to hold an `digits`-digit decimal number.
pub fn precision_for_digits(digits: u32) -> u32 {
    (f64::from(digits) * std::f64::consts::LOG2_10).ceil() as u32
}

/// Reject bit-widths `rug` cannot represent.
pub fn check_precision(prec: u32) -> crate::Result<u32> {
    if (rug::float::prec_min()..=rug::float::prec_max()).contains(&prec) {
        Ok(prec)
    } else {
        Err(CoreError::InvalidPrecision(prec))
    }
}

/// A complex number with arbitrary-precision real and imaginary parts.
///
/// Each component is a [`rug::Float`] carrying its own precision. They are
/// normally kept equal, but setting them independently is legal; [`prec`]
/// then reports the lower of the two.
///
/// The `set_*` operations write `a op b` into the receiver and give the
/// result the lower of the operands' precisions. The compound-assignment
/// operators (`+=`, `-=`, `*=`, `/=`) and [`square_mut`] are the in-place
/// forms: they keep the receiver's precision and compute every component into
/// temporaries before overwriting it, so an operand equal to the receiver is
/// always read in its original state.
///
/// The textual form always puts `+` between the parts, so a negative
/// imaginary part renders as `(1.5+-2.75i)`.
///
/// [`prec`]: Self::prec
/// [`square_mut`]: Self::square_mut
#[derive(Debug, Clone, PartialEq)]
pub struct BigComplex {
    pub re: Float,
    pub im: Float,
}

impl BigComplex {
    /// Both parts set from native floats at `prec` bits.
    ///
    /// # Panics
    ///
    /// Panics if `prec` is outside `rug`'s supported range; see [`check_precision`].
    pub fn new(re: f64, im: f64, prec: u32) -> Self {
        Self {
            re: Float::with_val(prec, re),
            im: Float::with_val(prec, im),
        }
    }

    /// Zero at `prec` bits.
    pub fn with_prec(prec: u32) -> Self {
        Self {
            re: Float::new(prec),
            im: Float::new(prec),
        }
    }

    /// Convert a fixed-precision value, widening it to `prec` bits.
    pub fn from_complex(c: Complex, prec: u32) -> Self {
        Self::new(c.re, c.im, prec)
    }

    /// Parse two decimal literals at `prec` bits.
    pub fn parse(re: &str, im: &str, prec: u32) -> crate::Result<Self> {
        let mut z = Self::with_prec(check_precision(prec)?);
        z.set_str(re, im)?;
        Ok(z)
    }

    /// Deep copy of `src`, values and precisions both.
    pub fn copy_from(&mut self, src: &BigComplex) {
        self.re.set_prec(src.re.prec());
        self.re.assign(&src.re);
        self.im.set_prec(src.im.prec());
        self.im.assign(&src.im);
    }

    // -- Binary operations into the receiver --

    /// `self = a + b`
    pub fn set_add(&mut self, a: &BigComplex, b: &BigComplex) -> &mut Self {
        let prec = a.prec().min(b.prec());
        self.re = Float::with_val(prec, &a.re + &b.re);
        self.im = Float::with_val(prec, &a.im + &b.im);
        self
    }

    /// `self = a - b`
    pub fn set_sub(&mut self, a: &BigComplex, b: &BigComplex) -> &mut Self {
        let prec = a.prec().min(b.prec());
        self.re = Float::with_val(prec, &a.re - &b.re);
        self.im = Float::with_val(prec, &a.im - &b.im);
        self
    }

    /// `self = a * b`
    pub fn set_mul(&mut self, a: &BigComplex, b: &BigComplex) -> &mut Self {
        let prec = a.prec().min(b.prec());
        let (re, im) = mul_parts(a, b, prec, prec);
        self.re = re;
        self.im = im;
        self
    }

    /// `self = a / b`, computed as `a · conj(b) / |b|²`.
    ///
    /// A zero divisor is not special-cased: the parts become infinite or NaN
    /// according to MPFR.
    pub fn set_div(&mut self, a: &BigComplex, b: &BigComplex) -> &mut Self {
        let prec = a.prec().min(b.prec());
        let (re, im) = div_parts(a, b, prec, prec);
        self.re = re;
        self.im = im;
        self
    }

    /// `self = a²`
    pub fn set_square(&mut self, a: &BigComplex) -> &mut Self {
        self.set_mul(a, a)
    }

    /// `self = self²` at the receiver's precision.
    pub fn square_mut(&mut self) -> &mut Self {
        let mut im = Float::with_val(self.im.prec(), &self.re * &self.im);
        im *= 2;
        let im_sq = Float::with_val(self.re.prec(), self.im.square_ref());
        self.re.square_mut();
        self.re -= &im_sq;
        self.im = im;
        self
    }

    /// `|z|²` as an arbitrary-precision float. This is the escape test used in
    /// hot loops since it needs no square root.
    pub fn abs_sq(&self) -> Float {
        let prec = self.prec();
        let mut norm = Float::with_val(prec, self.re.square_ref());
        norm += Float::with_val(prec, self.im.square_ref());
        norm
    }

    /// `|z|` through `f64`. Loses precision; for display only.
    pub fn abs(&self) -> f64 {
        self.abs_sq().to_f64().sqrt()
    }

    /// Negate both parts in place.
    pub fn neg_mut(&mut self) -> &mut Self {
        self.re.neg_assign();
        self.im.neg_assign();
        self
    }

    // -- Setters --

    /// Assign native floats, rounded to the current precision.
    pub fn set_f64(&mut self, re: f64, im: f64) -> &mut Self {
        self.re.assign(re);
        self.im.assign(im);
        self
    }

    pub fn set_complex(&mut self, c: Complex) -> &mut Self {
        self.set_f64(c.re, c.im)
    }

    /// Parse decimal literals into the parts, rounded to the current precision.
    ///
    /// Both strings are parsed before either part is written, so on error the
    /// receiver is unchanged.
    pub fn set_str(&mut self, re: &str, im: &str) -> crate::Result<&mut Self> {
        let re_parsed = Float::parse(re).map_err(|source| parse_error(re, source))?;
        let im_parsed = Float::parse(im).map_err(|source| parse_error(im, source))?;
        self.re.assign(re_parsed);
        self.im.assign(im_parsed);
        Ok(self)
    }

    /// The lower of the two parts' precisions.
    pub fn prec(&self) -> u32 {
        self.re.prec().min(self.im.prec())
    }

    /// Set both parts to `prec` bits, rounding the current values.
    pub fn set_prec(&mut self, prec: u32) -> &mut Self {
        self.re.set_prec(prec);
        self.im.set_prec(prec);
        self
    }

    /// Round to the nearest `f64` pair.
    pub fn to_complex(&self) -> Complex {
        Complex::new(self.re.to_f64(), self.im.to_f64())
    }
}

// `Float::parse` returns a type rug does not export, so callers parse inline
// and only the error mapping is shared.
fn parse_error(input: &str, source: rug::float::ParseFloatError) -> CoreError {
    CoreError::Parse {
        input: input.to_owned(),
        source,
    }
}

fn mul_parts(a: &BigComplex, b: &BigComplex, re_prec: u32, im_prec: u32) -> (Float, Float) {
    let mut re = Float::with_val(re_prec, &a.re * &b.re);
    re -= Float::with_val(re_prec, &a.im * &b.im);
    let mut im = Float::with_val(im_prec, &a.re * &b.im);
    im += Float::with_val(im_prec, &a.im * &b.re);
    (re, im)
}

fn div_parts(a: &BigComplex, b: &BigComplex, re_prec: u32, im_prec: u32) -> (Float, Float) {
    let denom = b.abs_sq();
    let mut re = Float::with_val(re_prec, &a.re * &b.re);
    re += Float::with_val(re_prec, &a.im * &b.im);
    re /= &denom;
    let mut im = Float::with_val(im_prec, &a.im * &b.re);
    im -= Float::with_val(im_prec, &a.re * &b.im);
    im /= &denom;
    (re, im)
}

impl Default for BigComplex {
    fn default() -> Self {
        Self::with_prec(NATIVE_PRECISION)
    }
}

// -- In-place operators --

impl AddAssign<&BigComplex> for BigComplex {
    fn add_assign(&mut self, rhs: &BigComplex) {
        self.re += &rhs.re;
        self.im += &rhs.im;
    }
}

impl SubAssign<&BigComplex> for BigComplex {
    fn sub_assign(&mut self, rhs: &BigComplex) {
        self.re -= &rhs.re;
        self.im -= &rhs.im;
    }
}

impl MulAssign<&BigComplex> for BigComplex {
    fn mul_assign(&mut self, rhs: &BigComplex) {
        let (re, im) = mul_parts(self, rhs, self.re.prec(), self.im.prec());
        self.re = re;
        self.im = im;
    }
}

impl DivAssign<&BigComplex> for BigComplex {
    fn div_assign(&mut self, rhs: &BigComplex) {
        let (re, im) = div_parts(self, rhs, self.re.prec(), self.im.prec());
        self.re = re;
        self.im = im;
    }
}

impl Neg for BigComplex {
    type Output = Self;

    fn neg(mut self) -> Self {
        self.neg_mut();
        self
    }
}

impl fmt::Display for BigComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}+{}i)", self.re, self.im)
    }
}

// -- Serialization --

/// Exact on-disk form: precision plus the hexadecimal mantissa, which
/// `rug` prints with enough digits to read back bit-for-bit.
#[derive(Serialize, Deserialize)]
struct RawFloat {
    prec: u32,
    value: String,
}

impl RawFloat {
    fn from_float(f: &Float) -> Self {
        Self {
            prec: f.prec(),
            value: f.to_string_radix(16, None),
        }
    }

    fn into_float<E: serde::de::Error>(self) -> Result<Float, E> {
        let prec = check_precision(self.prec).map_err(E::custom)?;
        let parsed = Float::parse_radix(&self.value, 16).map_err(E::custom)?;
        Ok(Float::with_val(prec, parsed))
    }
}

#[derive(Serialize, Deserialize)]
struct RawBigComplex {
    re: RawFloat,
    im: RawFloat,
}

impl Serialize for BigComplex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawBigComplex {
            re: RawFloat::from_float(&self.re),
            im: RawFloat::from_float(&self.im),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigComplex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawBigComplex::deserialize(deserializer)?;
        Ok(Self {
            re: raw.re.into_float()?,
            im: raw.im.into_float()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREC: u32 = 256;

    fn big(re: f64, im: f64) -> BigComplex {
        BigComplex::new(re, im, PREC)
    }

    fn assert_parts(z: &BigComplex, re: f64, im: f64) {
        assert_eq!(z.re.to_f64(), re, "real part of {z}");
        assert_eq!(z.im.to_f64(), im, "imaginary part of {z}");
    }

    #[test]
    fn new_sets_both_precisions() {
        let z = BigComplex::new(1.0, -10.25, 128);
        assert_eq!(z.re.prec(), 128);
        assert_eq!(z.im.prec(), 128);
        assert_parts(&z, 1.0, -10.25);
    }

    #[test]
    fn default_has_native_precision() {
        let z = BigComplex::default();
        assert_eq!(z.prec(), NATIVE_PRECISION);
        assert_parts(&z, 0.0, 0.0);
    }

    #[test]
    fn copy_from_takes_value_and_precision() {
        let src = BigComplex::new(2.5, -1.0, 512);
        let mut dst = BigComplex::with_prec(64);
        dst.copy_from(&src);
        assert_eq!(dst.prec(), 512);
        assert_eq!(dst, src);
    }

    #[test]
    fn binary_operations() {
        let a = big(1.0, 2.0);
        let b = big(3.0, 4.0);
        let mut z = BigComplex::with_prec(PREC);

        assert_parts(z.set_add(&a, &b), 4.0, 6.0);
        assert_parts(z.set_sub(&a, &b), -2.0, -2.0);
        // (1 + 2i)(3 + 4i) = -5 + 10i
        assert_parts(z.set_mul(&a, &b), -5.0, 10.0);
        // (-5 + 10i) / (3 + 4i) = 1 + 2i
        let product = z.clone();
        assert_parts(z.set_div(&product, &b), 1.0, 2.0);
    }

    #[test]
    fn result_takes_lower_operand_precision() {
        let a = BigComplex::new(1.0, 1.0, 64);
        let b = BigComplex::new(1.0, 1.0, 300);
        let mut z = BigComplex::with_prec(1000);
        z.set_mul(&a, &b);
        assert_eq!(z.prec(), 64);
    }

    #[test]
    fn square_mut_matches_fresh_multiply() {
        let mut z = BigComplex::parse("-0.7499999999999999999999999913", "0.1000000000000000000000000071", PREC)
            .unwrap();
        let mut fresh = BigComplex::with_prec(PREC);
        fresh.set_mul(&z, &z);
        z.square_mut();
        assert_eq!(z, fresh);

        let mut via_set = BigComplex::with_prec(PREC);
        via_set.set_square(&fresh);
        fresh.square_mut();
        assert_eq!(via_set, fresh);
    }

    #[test]
    fn in_place_operators_read_original_receiver() {
        let base = BigComplex::parse("1.25", "-0.5", PREC).unwrap();
        let other = big(0.5, 3.0);

        let mut expected = BigComplex::with_prec(PREC);
        let mut z = base.clone();

        z += &base.clone();
        expected.set_add(&base, &base);
        assert_eq!(z, expected);

        z = base.clone();
        z *= &base.clone();
        expected.set_mul(&base, &base);
        assert_eq!(z, expected);

        z = base.clone();
        z *= &other;
        expected.set_mul(&base, &other);
        assert_eq!(z, expected);

        z = base.clone();
        z -= &other;
        expected.set_sub(&base, &other);
        assert_eq!(z, expected);

        z = base.clone();
        z /= &other;
        expected.set_div(&base, &other);
        assert_eq!(z, expected);
    }

    #[test]
    fn division_by_zero_follows_float_semantics() {
        let mut z = BigComplex::with_prec(PREC);
        z.set_div(&big(1.0, 1.0), &big(0.0, 0.0));
        assert!(z.re.is_nan());
        assert!(z.im.is_nan());

        let mut w = big(1.0, 0.0);
        w /= &big(0.0, 0.0);
        assert!(w.re.is_nan());
    }

    #[test]
    fn abs_sq_and_abs() {
        let z = big(3.0, 4.0);
        assert_eq!(z.abs_sq(), 25);
        assert_eq!(z.abs(), 5.0);
    }

    #[test]
    fn negation() {
        let mut z = big(1.0, -2.0);
        z.neg_mut();
        assert_parts(&z, -1.0, 2.0);
        let back = -z;
        assert_parts(&back, 1.0, -2.0);
    }

    #[test]
    fn setters_keep_precision() {
        let mut z = BigComplex::with_prec(200);
        z.set_f64(0.5, -0.25);
        assert_eq!(z.prec(), 200);
        assert_parts(&z, 0.5, -0.25);

        z.set_complex(Complex::new(-3.0, 7.0));
        assert_eq!(z.prec(), 200);
        assert_eq!(z.to_complex(), Complex::new(-3.0, 7.0));
    }

    #[test]
    fn set_str_parses_beyond_f64() {
        let mut z = BigComplex::with_prec(PREC);
        z.set_str("0.1", "-1e-400").unwrap();
        // 0.1 at 256 bits is a closer approximation than the f64 literal.
        assert_ne!(z.re, Float::with_val(PREC, 0.1f64));
        assert!(z.im < 0);
        assert_eq!(z.im.to_f64(), -0.0);
    }

    #[test]
    fn set_str_failure_leaves_receiver_unchanged() {
        let mut z = big(1.0, 2.0);
        let err = z.set_str("1.5", "not-a-number").unwrap_err();
        assert!(matches!(err, CoreError::Parse { ref input, .. } if input == "not-a-number"));
        assert_parts(&z, 1.0, 2.0);
    }

    #[test]
    fn prec_reports_lower_part() {
        let mut z = big(1.0, 1.0);
        z.im.set_prec(90);
        assert_eq!(z.prec(), 90);
        z.set_prec(300);
        assert_eq!(z.re.prec(), 300);
        assert_eq!(z.im.prec(), 300);
    }

    #[test]
    fn display_never_elides_plus() {
        let s = BigComplex::new(1.5, -2.75, 64).to_string();
        assert!(s.starts_with('('), "{s}");
        assert!(s.ends_with("i)"), "{s}");
        assert!(s.contains("+-"), "{s}");
    }

    #[test]
    fn precision_for_digits_rounds_up() {
        assert_eq!(precision_for_digits(1), 4);
        assert_eq!(precision_for_digits(100), 333);
    }

    #[test]
    fn check_precision_bounds() {
        assert!(check_precision(0).is_err());
        assert_eq!(check_precision(DEFAULT_PRECISION).unwrap(), DEFAULT_PRECISION);
    }

    #[test]
    fn serde_roundtrip_is_exact() {
        let z = BigComplex::parse("-1.768610493014677074503352", "0.001266613503868717702066", 300)
            .unwrap();
        let json = serde_json::to_string(&z).unwrap();
        let back: BigComplex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, z);
        assert_eq!(back.prec(), 300);
    }

    #[test]
    fn serde_rejects_bad_precision() {
        let json = r#"{"re":{"prec":0,"value":"1"},"im":{"prec":64,"value":"0"}}"#;
        assert!(serde_json::from_str::<BigComplex>(json).is_err());
    }
}
