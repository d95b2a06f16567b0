// Arbitrary-precision rational numbers.
//
// `Fraction` wraps `num_rational::BigRational` and is the exact scalar used
// everywhere in the engine: prime exponents, residuals, time exponents, and
// the entries of every integer-linear-algebra matrix that needs division.
// Numerators and denominators routinely exceed 64-bit range (huge residuals,
// deep exponent towers), so nothing in this module touches fixed-width
// integers except as convenience constructors.
//
// The wire form is a tagged JSON object with decimal-string numerator and
// denominator: `{"type":"Fraction","n":"-81","d":"80"}`. Strings rather than
// JSON numbers keep values beyond 2^53 faithful through any JSON parser.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NumberError, Result};

/// An exact rational number with arbitrary-precision numerator and
/// denominator. Always kept in lowest terms with the sign on the numerator
/// (both maintained by `BigRational` itself).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fraction(BigRational);

impl Fraction {
    pub fn zero() -> Self {
        Fraction(BigRational::zero())
    }

    pub fn one() -> Self {
        Fraction(BigRational::one())
    }

    /// Build `numer / denom` from machine integers.
    /// Zero denominators are a construction error, never a panic.
    pub fn new(numer: i64, denom: i64) -> Result<Self> {
        Self::from_bigints(BigInt::from(numer), BigInt::from(denom))
    }

    /// Build `numer / denom` from big integers.
    pub fn from_bigints(numer: BigInt, denom: BigInt) -> Result<Self> {
        if denom.is_zero() {
            return Err(NumberError::ZeroDenominator);
        }
        Ok(Fraction(BigRational::new(numer, denom)))
    }

    pub fn from_integer(n: i64) -> Self {
        Fraction(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn from_bigint(n: BigInt) -> Self {
        Fraction(BigRational::from_integer(n))
    }

    /// Best rational approximation of an `f64` with the denominator bounded
    /// by `max_denominator`, found by walking the continued fraction.
    /// Returns an error for NaN or infinite input.
    pub fn approximate(x: f64, max_denominator: u64) -> Result<Self> {
        if !x.is_finite() {
            return Err(NumberError::NotRepresentable(format!(
                "cannot approximate {x} as a fraction"
            )));
        }
        let negative = x < 0.0;
        let mut x = x.abs();
        // Convergent recurrence: h_n = a_n h_{n-1} + h_{n-2}.
        let mut h = (BigInt::one(), BigInt::zero());
        let mut k = (BigInt::zero(), BigInt::one());
        let bound = BigInt::from(max_denominator);
        for _ in 0..64 {
            let a = BigInt::from(x.floor() as i64);
            let next_k = &a * &k.0 + &k.1;
            if next_k > bound {
                break;
            }
            let next_h = &a * &h.0 + &h.1;
            h = (next_h, h.0);
            k = (next_k, k.0);
            let frac = x - x.floor();
            if frac < 1e-12 {
                break;
            }
            x = 1.0 / frac;
        }
        let numer = if negative { -h.0 } else { h.0 };
        Self::from_bigints(numer, k.0)
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn abs(&self) -> Self {
        Fraction(self.0.abs())
    }

    /// Reciprocal. Zero has none.
    pub fn recip(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        Ok(Fraction(self.0.recip()))
    }

    /// Division that surfaces a zero divisor as an error instead of a panic.
    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        if other.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        Ok(Fraction(&self.0 / &other.0))
    }

    /// Raise to an integer power. Negative exponents require a nonzero base.
    pub fn pow_i32(&self, exponent: i32) -> Result<Self> {
        if exponent < 0 && self.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        Ok(Fraction(self.0.pow(exponent)))
    }

    /// Raise to a rational power, exactly. Returns `None` when the result is
    /// irrational: a non-perfect root of the numerator or denominator, or an
    /// even root of a negative value. The zero base accepts only positive
    /// exponents.
    pub fn pow_fraction(&self, exponent: &Fraction) -> Option<Self> {
        if self.is_zero() {
            return if exponent.is_negative() || exponent.is_zero() {
                None
            } else {
                Some(Fraction::zero())
            };
        }
        let root = exponent
            .denom()
            .to_u32()
            .filter(|d| *d > 0)
            .and_then(|d| self.exact_root(d))?;
        let power = exponent.numer().to_i32()?;
        root.pow_i32(power).ok()
    }

    /// Exact `degree`-th root, or `None` when no exact rational root exists.
    fn exact_root(&self, degree: u32) -> Option<Self> {
        if degree == 1 {
            return Some(self.clone());
        }
        if self.is_negative() && degree % 2 == 0 {
            return None;
        }
        let n = exact_int_root(&self.numer().abs(), degree)?;
        let d = exact_int_root(self.denom(), degree)?;
        let n = if self.is_negative() { -n } else { n };
        Some(Fraction(BigRational::new(n, d)))
    }

    /// Floor as a big integer (rounds toward negative infinity).
    pub fn floor_bigint(&self) -> BigInt {
        self.0.floor().to_integer()
    }

    /// Round half away from zero to the nearest big integer.
    pub fn round_bigint(&self) -> BigInt {
        self.0.round().to_integer()
    }

    /// Round half away from zero to the nearest `i64`, when it fits.
    pub fn round_i64(&self) -> Option<i64> {
        self.round_bigint().to_i64()
    }

    /// Exact integer value, or an error when the fraction is not integral.
    pub fn to_bigint(&self) -> Result<BigInt> {
        if !self.is_integer() {
            return Err(NumberError::NotRepresentable(format!(
                "{self} is not an integer"
            )));
        }
        Ok(self.0.to_integer())
    }

    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        self.0.to_integer().to_i64()
    }

    /// Closest `f64`. Falls back to a logarithmic reconstruction when the
    /// numerator or denominator individually overflow `f64` range.
    pub fn to_f64(&self) -> f64 {
        if let Some(x) = self.0.to_f64() {
            return x;
        }
        let sign = if self.is_negative() { -1.0 } else { 1.0 };
        let bits = log2_bigint(&self.numer().abs()) - log2_bigint(self.denom());
        sign * bits.exp2()
    }

    /// Floored modulo: the result has the sign of `other`.
    pub fn mmod(&self, other: &Self) -> Result<Self> {
        if other.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        let quotient = Fraction((&self.0 / &other.0).floor());
        Ok(self - &(other * &quotient))
    }
}

/// Exact integer `degree`-th root of a non-negative big integer.
fn exact_int_root(n: &BigInt, degree: u32) -> Option<BigInt> {
    let root = n.nth_root(degree);
    if num_traits::pow(root.clone(), degree as usize) == *n {
        Some(root)
    } else {
        None
    }
}

/// Base-2 logarithm of a positive big integer, accurate enough for
/// magnitude comparisons of values far beyond `f64` range.
pub(crate) fn log2_bigint(n: &BigInt) -> f64 {
    let bits = n.bits();
    if bits <= 52 {
        return n.to_f64().unwrap_or(f64::NAN).log2();
    }
    // Keep the top 52 bits as a mantissa and account for the shift.
    let shift = bits - 52;
    let top = (n >> shift).to_f64().unwrap_or(f64::NAN);
    top.log2() + shift as f64
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Fraction {
            type Output = Fraction;
            fn $method(self, rhs: Fraction) -> Fraction {
                Fraction(self.0 $op rhs.0)
            }
        }

        impl $trait<&Fraction> for &Fraction {
            type Output = Fraction;
            fn $method(self, rhs: &Fraction) -> Fraction {
                Fraction(&self.0 $op &rhs.0)
            }
        }
    };
}

forward_binop!(Add, add, +);
forward_binop!(Sub, sub, -);
forward_binop!(Mul, mul, *);

impl Div for Fraction {
    type Output = Fraction;

    /// Panics on a zero divisor; use `checked_div` where the divisor is not
    /// already known to be nonzero.
    fn div(self, rhs: Fraction) -> Fraction {
        Fraction(self.0 / rhs.0)
    }
}

impl Div<&Fraction> for &Fraction {
    type Output = Fraction;

    fn div(self, rhs: &Fraction) -> Fraction {
        Fraction(&self.0 / &rhs.0)
    }
}

impl Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        Fraction(-self.0)
    }
}

impl Neg for &Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        Fraction(-&self.0)
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numer())
        } else {
            write!(f, "{}/{}", self.numer(), self.denom())
        }
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Fraction::from_integer(n)
    }
}

impl From<BigInt> for Fraction {
    fn from(n: BigInt) -> Self {
        Fraction::from_bigint(n)
    }
}

/// JSON wire form for `Fraction`.
#[derive(Serialize, Deserialize)]
struct FractionWire {
    #[serde(rename = "type")]
    tag: String,
    n: String,
    d: String,
}

impl Serialize for Fraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        FractionWire {
            tag: "Fraction".to_string(),
            n: self.numer().to_string(),
            d: self.denom().to_string(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Fraction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = FractionWire::deserialize(deserializer)?;
        if wire.tag != "Fraction" {
            return Err(D::Error::custom(format!(
                "expected type \"Fraction\", got {:?}",
                wire.tag
            )));
        }
        let n: BigInt = wire
            .n
            .parse()
            .map_err(|_| D::Error::custom("bad numerator"))?;
        let d: BigInt = wire
            .d
            .parse()
            .map_err(|_| D::Error::custom("bad denominator"))?;
        Fraction::from_bigints(n, d).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d).unwrap()
    }

    #[test]
    fn arithmetic_stays_reduced() {
        let a = frac(3, 4);
        let b = frac(1, 4);
        assert_eq!(&a + &b, Fraction::one());
        assert_eq!(&a - &b, frac(1, 2));
        assert_eq!(&a * &b, frac(3, 16));
        assert_eq!(a.checked_div(&b).unwrap(), frac(3, 1));
    }

    #[test]
    fn zero_denominator_is_an_error() {
        assert!(matches!(
            Fraction::new(1, 0),
            Err(NumberError::ZeroDenominator)
        ));
    }

    #[test]
    fn exact_rational_roots() {
        let x = frac(8, 27);
        let cbrt = x.pow_fraction(&frac(1, 3)).unwrap();
        assert_eq!(cbrt, frac(2, 3));
        // 2 has no exact square root.
        assert!(frac(2, 1).pow_fraction(&frac(1, 2)).is_none());
        // Odd roots of negatives are exact, even roots are not.
        assert_eq!(frac(-8, 1).pow_fraction(&frac(1, 3)).unwrap(), frac(-2, 1));
        assert!(frac(-4, 1).pow_fraction(&frac(1, 2)).is_none());
    }

    #[test]
    fn huge_values_survive_json() {
        let huge = Fraction::from_bigints(
            "4522822787109375000000001".parse().unwrap(),
            "4294967296".parse().unwrap(),
        )
        .unwrap();
        let json = serde_json::to_string(&huge).unwrap();
        let back: Fraction = serde_json::from_str(&json).unwrap();
        assert_eq!(huge, back);
    }

    #[test]
    fn approximation_walks_convergents() {
        let pi = Fraction::approximate(std::f64::consts::PI, 1000).unwrap();
        assert_eq!(pi, frac(355, 113));
        let neg = Fraction::approximate(-0.5, 10).unwrap();
        assert_eq!(neg, frac(-1, 2));
    }

    #[test]
    fn floored_modulo_sign() {
        assert_eq!(frac(7, 2).mmod(&frac(2, 1)).unwrap(), frac(3, 2));
        assert_eq!(frac(-1, 2).mmod(&frac(2, 1)).unwrap(), frac(3, 2));
    }

    #[test]
    fn log2_of_wide_integers() {
        let n: BigInt = BigInt::from(1) << 200;
        assert!((log2_bigint(&n) - 200.0).abs() < 1e-9);
    }
}
