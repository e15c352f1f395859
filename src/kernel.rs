//! Scalar kinds the rest of the crate is generic over.
//!
//! Floating point kinds (`f32`, `f64`) compare with an absolute and a
//! relative tolerance, so that sums like `0.1 + 0.2` still count as equal
//! to `0.3`. The rational kind (`Rat`) compares exactly; it is the one to
//! use when checking that a mechanism satisfies its constraint exactly.
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use float_cmp::approx_eq;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

/// Exact arbitrary precision rational.
pub type Rat = BigRational;

/// Arithmetic and tolerant comparison required by channels, distributions
/// and measures.
pub trait Scalar:
    Clone + PartialOrd + fmt::Debug + fmt::Display + Zero + One
    + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
    + Div<Output = Self> + Neg<Output = Self> + Send + Sync + 'static
{
    /// Default absolute tolerance.
    fn def_max_diff() -> Self;
    /// Default relative tolerance.
    fn def_max_rel_diff() -> Self;
    /// True if arithmetic on this kind is exact.
    fn is_exact() -> bool;

    /// Equality within `max_diff` (absolute) or `max_rel_diff` (relative
    /// to the larger magnitude). Exact kinds ignore both.
    fn approx_eq(&self, other: &Self, max_diff: &Self, max_rel_diff: &Self) -> bool;

    /// Converts from `f64`. Rationals are converted exactly; NaN and
    /// infinities have no rational representation and become zero.
    fn from_f64(x: f64) -> Self;
    fn as_f64(&self) -> f64;
    fn from_usize(n: usize) -> Self;

    /// Parses a single scalar. Rationals also accept `a/b` and decimals.
    fn parse_scalar(s: &str) -> Option<Self>;

    /// Base-2 logarithm. Goes through `f64` for exact kinds.
    fn log2(&self) -> Self;
    /// `e^self`, also through `f64` for exact kinds.
    fn exp(&self) -> Self;

    fn abs(&self) -> Self {
        if *self < Self::zero() {
            -self.clone()
        } else {
            self.clone()
        }
    }
}

impl Scalar for f64 {
    fn def_max_diff() -> f64 { 1e-7 }
    fn def_max_rel_diff() -> f64 { 1e-7 }
    fn is_exact() -> bool { false }

    fn approx_eq(&self, other: &f64, max_diff: &f64, max_rel_diff: &f64) -> bool {
        if approx_eq!(f64, *self, *other, epsilon = *max_diff) {
            return true;
        }
        let largest = f64::abs(*self).max(f64::abs(*other));
        f64::abs(self - other) <= largest * max_rel_diff
    }

    fn from_f64(x: f64) -> f64 { x }
    fn as_f64(&self) -> f64 { *self }
    fn from_usize(n: usize) -> f64 { n as f64 }

    fn parse_scalar(s: &str) -> Option<f64> {
        s.trim().parse().ok()
    }

    fn log2(&self) -> f64 {
        f64::log2(*self)
    }

    fn exp(&self) -> f64 {
        f64::exp(*self)
    }

    fn abs(&self) -> f64 {
        f64::abs(*self)
    }
}

impl Scalar for f32 {
    fn def_max_diff() -> f32 { 1e-4 }
    fn def_max_rel_diff() -> f32 { 1e-4 }
    fn is_exact() -> bool { false }

    fn approx_eq(&self, other: &f32, max_diff: &f32, max_rel_diff: &f32) -> bool {
        if approx_eq!(f32, *self, *other, epsilon = *max_diff) {
            return true;
        }
        let largest = f32::abs(*self).max(f32::abs(*other));
        f32::abs(self - other) <= largest * max_rel_diff
    }

    fn from_f64(x: f64) -> f32 { x as f32 }
    fn as_f64(&self) -> f64 { f64::from(*self) }
    fn from_usize(n: usize) -> f32 { n as f32 }

    fn parse_scalar(s: &str) -> Option<f32> {
        s.trim().parse().ok()
    }

    fn log2(&self) -> f32 {
        f32::log2(*self)
    }

    fn exp(&self) -> f32 {
        f32::exp(*self)
    }

    fn abs(&self) -> f32 {
        f32::abs(*self)
    }
}

impl Scalar for Rat {
    fn def_max_diff() -> Rat { Rat::zero() }
    fn def_max_rel_diff() -> Rat { Rat::zero() }
    fn is_exact() -> bool { true }

    fn approx_eq(&self, other: &Rat, _: &Rat, _: &Rat) -> bool {
        self == other
    }

    fn from_f64(x: f64) -> Rat {
        Rat::from_float(x).unwrap_or_else(Rat::zero)
    }

    fn as_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(f64::NAN)
    }

    fn from_usize(n: usize) -> Rat {
        Rat::from_integer(BigInt::from(n))
    }

    fn parse_scalar(s: &str) -> Option<Rat> {
        let s = s.trim();
        if s.contains('.') {
            parse_decimal(s)
        } else {
            s.parse().ok()
        }
    }

    fn log2(&self) -> Rat {
        Rat::from_f64(self.as_f64().log2())
    }

    fn exp(&self) -> Rat {
        Rat::from_f64(self.as_f64().exp())
    }
}

/// Parses `[-+]int.frac` into the exact fraction `intfrac / 10^len(frac)`.
fn parse_decimal(s: &str) -> Option<Rat> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (int, frac) = digits.split_once('.')?;
    if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let numer: BigInt = format!("{}{}", int, frac).parse().ok()?;
    let denom = num_traits::pow(BigInt::from(10), frac.len());
    let r = Rat::new(numer, denom);

    Some(if negative { -r } else { r })
}

/// An absolute/relative tolerance pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Tolerance<S> {
    pub max_diff: S,
    pub max_rel_diff: S,
}

impl<S: Scalar> Tolerance<S> {
    pub fn new(max_diff: S, max_rel_diff: S) -> Tolerance<S> {
        Tolerance { max_diff, max_rel_diff }
    }

    pub fn equal(&self, x: &S, y: &S) -> bool {
        x.approx_eq(y, &self.max_diff, &self.max_rel_diff)
    }

    pub fn less_than_or_eq(&self, x: &S, y: &S) -> bool {
        x < y || self.equal(x, y)
    }
}

impl<S: Scalar> Default for Tolerance<S> {
    fn default() -> Tolerance<S> {
        Tolerance::new(S::def_max_diff(), S::def_max_rel_diff())
    }
}

/// Equality with the kind's default tolerance.
pub fn equal<S: Scalar>(x: &S, y: &S) -> bool {
    x.approx_eq(y, &S::def_max_diff(), &S::def_max_rel_diff())
}

pub fn equal_within<S: Scalar>(x: &S, y: &S, max_diff: &S, max_rel_diff: &S) -> bool {
    x.approx_eq(y, max_diff, max_rel_diff)
}

pub fn less_than_or_eq<S: Scalar>(x: &S, y: &S) -> bool {
    x < y || equal(x, y)
}

/// Strictly less, and not equal within tolerance.
pub fn less_than<S: Scalar>(x: &S, y: &S) -> bool {
    x < y && !equal(x, y)
}

/// Maps values that are negative only because of floating noise to zero.
///
/// The `f64` tolerance is used for every kind: exact kinds only pick up
/// noise through logarithms, which are computed in `f64`.
pub fn clamp_negligible<S: Scalar>(x: S) -> S {
    if x < S::zero() && equal(&x.as_f64(), &0.) {
        S::zero()
    } else {
        x
    }
}

/// Largest element, or `None` for an empty sequence.
pub fn max_of<'a, S, I>(values: I) -> Option<S>
where S: Scalar, I: IntoIterator<Item = &'a S> {
    values.into_iter().fold(None, |best: Option<&S>, x| match best {
        Some(b) if b >= x => Some(b),
        _ => Some(x),
    }).cloned()
}

/// Sum of a sequence. Floating kinds are accumulated in `f64` with
/// compensated (Neumaier) summation, so that rounding does not build up
/// over long distributions; exact kinds are summed exactly.
pub fn sum_of<'a, S, I>(values: I) -> S
where S: Scalar, I: IntoIterator<Item = &'a S> {
    if S::is_exact() {
        return values.into_iter().fold(S::zero(), |acc, x| acc + x.clone());
    }

    let (mut sum, mut compensation) = (0f64, 0f64);
    for x in values.into_iter().map(|x| x.as_f64()) {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            compensation += (sum - t) + x;
        } else {
            compensation += (x - t) + sum;
        }
        sum = t;
    }
    S::from_f64(sum + compensation)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_equality_tolerates_drift() {
        assert!(equal(&(0.1 + 0.2), &0.3));
        assert!(!equal(&0.3, &0.3001));
        assert!(equal(&1e9, &(1e9 + 1.)));
        assert!(less_than_or_eq(&(0.1 + 0.2), &0.3));
        assert!(!less_than(&(0.1 + 0.2), &0.3));
    }

    #[test]
    fn rational_equality_is_exact() {
        let third = Rat::new(BigInt::from(1), BigInt::from(3));
        let sum = third.clone() + third.clone() + third;
        assert!(equal(&sum, &Rat::one()));
        assert!(!equal(&Rat::from_f64(0.1), &Rat::parse_scalar("0.1").unwrap()));
    }

    #[test]
    fn parse_rationals() {
        let half = Rat::new(BigInt::from(1), BigInt::from(2));
        assert_eq!(Rat::parse_scalar("1/2"), Some(half.clone()));
        assert_eq!(Rat::parse_scalar("0.5"), Some(half.clone()));
        assert_eq!(Rat::parse_scalar("-0.5"), Some(-half));
        assert_eq!(Rat::parse_scalar("1.25"),
                   Some(Rat::new(BigInt::from(5), BigInt::from(4))));
        assert_eq!(Rat::parse_scalar("3"), Some(Rat::from_usize(3)));
        assert_eq!(Rat::parse_scalar("0.x"), None);
        assert_eq!(Rat::parse_scalar("."), None);
        assert_eq!(f64::parse_scalar(" 0.25 "), Some(0.25));
    }

    #[test]
    fn clamp_and_max() {
        assert_eq!(clamp_negligible(-1e-12), 0.);
        assert_eq!(clamp_negligible(-0.1), -0.1);
        assert_eq!(clamp_negligible(Rat::from_f64(-1e-15)), Rat::zero());
        assert_eq!(max_of(&[0.2, 0.7, 0.1]), Some(0.7));
        assert_eq!(max_of::<f64, _>(&[]), None);
        assert_eq!(sum_of(&[0.25f32, 0.5, 0.25]), 1.);
    }

    #[test]
    fn long_sums_do_not_drift() {
        let n = 20_000;
        let parts = vec![1. / n as f32; n];
        assert!(equal(&sum_of(&parts), &1f32));
        let tiny = vec![0.1f64; 1_000_000];
        assert!(approx_eq!(f64, sum_of(&tiny), 100_000., epsilon = 1e-9));
        let third = Rat::new(BigInt::from(1), BigInt::from(3));
        assert_eq!(sum_of(&vec![third; 3]), Rat::one());
    }

    #[test]
    fn custom_tolerance() {
        let tol = Tolerance::new(0.01, 0.);
        assert!(tol.equal(&0.5, &0.505));
        assert!(tol.less_than_or_eq(&0.505, &0.5));
        assert!(!Tolerance::<f64>::default().equal(&0.5, &0.505));
    }
}
