// The exact/inexact sum type.
//
// Nearly every operation in the engine must handle both the exact
// (`TimeMonzo`) and inexact (`TimeReal`) representations, and several exact
// operations can only stay exact for some inputs. `TimeQuantity` makes the
// dispatch a closed, exhaustively-matched enum: a new operation cannot
// forget one of the two variants without the compiler objecting.
//
// Promotion policy: Monzo-Monzo operations stay exact when the operation is
// rational-closed and promote to Real otherwise; any operation touching a
// Real stays Real. Demotion never happens implicitly.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{NumberError, Result};
use crate::fraction::Fraction;
use crate::monzo::TimeMonzo;
use crate::real::TimeReal;

/// A musical quantity: exactly represented when possible, floating point
/// when not.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeQuantity {
    Monzo(TimeMonzo),
    Real(TimeReal),
}

impl TimeQuantity {
    pub fn one(num_components: usize) -> Self {
        TimeQuantity::Monzo(TimeMonzo::one(num_components))
    }

    pub fn from_fraction(value: &Fraction, num_components: usize) -> Self {
        TimeQuantity::Monzo(TimeMonzo::from_fraction(value, num_components))
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, TimeQuantity::Monzo(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            TimeQuantity::Monzo(m) => m.is_zero(),
            TimeQuantity::Real(r) => r.is_zero(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        match self {
            TimeQuantity::Monzo(m) => m.is_scalar(),
            TimeQuantity::Real(r) => r.is_scalar(),
        }
    }

    /// Linear magnitude as a float.
    pub fn value(&self) -> f64 {
        match self {
            TimeQuantity::Monzo(m) => m.value(),
            TimeQuantity::Real(r) => r.value,
        }
    }

    /// Logarithmic magnitude in cents of the absolute value.
    pub fn total_cents(&self) -> f64 {
        match self {
            TimeQuantity::Monzo(m) => m.total_cents(),
            TimeQuantity::Real(r) => r.total_cents(),
        }
    }

    pub fn time_exponent(&self) -> f64 {
        match self {
            TimeQuantity::Monzo(m) => m.time_exponent.to_f64(),
            TimeQuantity::Real(r) => r.time_exponent,
        }
    }

    /// The exact variant, if this is one.
    pub fn as_monzo(&self) -> Option<&TimeMonzo> {
        match self {
            TimeQuantity::Monzo(m) => Some(m),
            TimeQuantity::Real(_) => None,
        }
    }

    /// Exact fraction conversion; errors for Real or irrational-exact input.
    pub fn to_fraction(&self) -> Result<Fraction> {
        match self {
            TimeQuantity::Monzo(m) => m.to_fraction(),
            TimeQuantity::Real(_) => Err(NumberError::IrrationalExact),
        }
    }

    /// Inexact view, demoting an exact value on purpose.
    pub fn to_real(&self) -> TimeReal {
        match self {
            TimeQuantity::Monzo(m) => m.to_real(),
            TimeQuantity::Real(r) => *r,
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) => TimeQuantity::Monzo(a.mul(b)),
            _ => TimeQuantity::Real(self.to_real().mul(&other.to_real())),
        }
    }

    pub fn div(&self, other: &Self) -> Result<Self> {
        match (self, other) {
            (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) => {
                Ok(TimeQuantity::Monzo(a.div(b)?))
            }
            _ => Ok(TimeQuantity::Real(self.to_real().div(&other.to_real()))),
        }
    }

    pub fn recip(&self) -> Result<Self> {
        match self {
            TimeQuantity::Monzo(m) => Ok(TimeQuantity::Monzo(m.recip()?)),
            TimeQuantity::Real(r) => Ok(TimeQuantity::Real(r.recip())),
        }
    }

    pub fn neg(&self) -> Self {
        match self {
            TimeQuantity::Monzo(m) => TimeQuantity::Monzo(m.neg()),
            TimeQuantity::Real(r) => TimeQuantity::Real(r.neg()),
        }
    }

    pub fn abs(&self) -> Self {
        match self {
            TimeQuantity::Monzo(m) => TimeQuantity::Monzo(m.abs()),
            TimeQuantity::Real(r) => TimeQuantity::Real(r.abs()),
        }
    }

    /// Raise to a scalar power. Exact when both the base and the exponent
    /// are exact and the power has an exact result; Real otherwise.
    pub fn pow(&self, exponent: &Self) -> Result<Self> {
        if !exponent.is_scalar() {
            return Err(NumberError::NotRepresentable(
                "exponents cannot carry a time dimension".to_string(),
            ));
        }
        match (self, exponent.to_fraction()) {
            (TimeQuantity::Monzo(base), Ok(e)) => Ok(base.pow(&e)),
            _ => Ok(TimeQuantity::Real(self.to_real().pow(exponent.value()))),
        }
    }

    /// Logarithm of `self` in base `other`: the linear scalar `x` with
    /// `other^x == self`. Exact when the operands are commensurate monzos;
    /// floating point (with IEEE NaN for invalid input) otherwise.
    pub fn log(&self, other: &Self) -> Self {
        if let (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) = (self, other) {
            if a.cents == 0.0 && b.cents == 0.0 {
                let norm = b.dot(b);
                if !norm.is_zero() {
                    let candidate = a.dot(b).checked_div(&norm);
                    if let Ok(exponent) = candidate {
                        if let Ok(check) = b.pow_exact(&exponent) {
                            if check.strict_equals(a) {
                                return TimeQuantity::Monzo(TimeMonzo::from_fraction(
                                    &exponent,
                                    a.num_components(),
                                ));
                            }
                        }
                    }
                }
            }
        }
        TimeQuantity::Real(TimeReal::scalar(
            self.total_cents() / other.total_cents(),
        ))
    }

    /// Reduce into `[1, equave)`. Exact path errors on a unison-equivalent
    /// equave; the Real path yields NaN instead.
    pub fn reduce(&self, equave: &Self) -> Result<Self> {
        match (self, equave) {
            (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) => {
                Ok(TimeQuantity::Monzo(a.reduce(b)?))
            }
            _ => Ok(TimeQuantity::Real(self.to_real().reduce(&equave.to_real()))),
        }
    }

    /// Floored modulo with the exact/inexact promotion policy of `mul`.
    pub fn mmod(&self, other: &Self) -> Result<Self> {
        match (self, other) {
            (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) => a.mmod(b),
            _ => Ok(TimeQuantity::Real(self.to_real().mmod(&other.to_real()))),
        }
    }

    /// Linear addition; operands must share a time dimension.
    pub fn add(&self, other: &Self) -> Result<Self> {
        match (self, other) {
            (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) => a.add(b),
            _ => {
                self.check_time_match(other)?;
                Ok(TimeQuantity::Real(self.to_real().add(&other.to_real())))
            }
        }
    }

    /// Linear subtraction; operands must share a time dimension.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        match (self, other) {
            (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) => a.sub(b),
            _ => {
                self.check_time_match(other)?;
                Ok(TimeQuantity::Real(self.to_real().sub(&other.to_real())))
            }
        }
    }

    fn check_time_match(&self, other: &Self) -> Result<()> {
        if self.time_exponent() != other.time_exponent() {
            return Err(NumberError::NotRepresentable(
                "addition of incompatible time dimensions".to_string(),
            ));
        }
        Ok(())
    }

    /// Numeric comparison, valid across the exact/inexact divide.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) => a.compare(b),
            _ => self
                .value()
                .partial_cmp(&other.value())
                .unwrap_or(Ordering::Equal),
        }
    }

    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) => a.equals(b),
            _ => {
                self.time_exponent() == other.time_exponent() && self.value() == other.value()
            }
        }
    }

    /// Representation-level equality; never true across variants.
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (TimeQuantity::Monzo(a), TimeQuantity::Monzo(b)) => a.strict_equals(b),
            (TimeQuantity::Real(a), TimeQuantity::Real(b)) => a.strict_equals(b),
            _ => false,
        }
    }
}

impl From<TimeMonzo> for TimeQuantity {
    fn from(monzo: TimeMonzo) -> Self {
        TimeQuantity::Monzo(monzo)
    }
}

impl From<TimeReal> for TimeQuantity {
    fn from(real: TimeReal) -> Self {
        TimeQuantity::Real(real)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monzo(n: i64, d: i64) -> TimeQuantity {
        TimeQuantity::from_fraction(&Fraction::new(n, d).unwrap(), 3)
    }

    #[test]
    fn mixed_arithmetic_stays_real() {
        let exact = monzo(3, 2);
        let inexact = TimeQuantity::Real(TimeReal::scalar(1.5));
        assert!(matches!(exact.mul(&inexact), TimeQuantity::Real(_)));
        assert!((exact.mul(&inexact).value() - 2.25).abs() < 1e-12);
    }

    #[test]
    fn exact_log_of_commensurate_values() {
        let eight = monzo(8, 1);
        let two = monzo(2, 1);
        match eight.log(&two) {
            TimeQuantity::Monzo(m) => {
                assert_eq!(m.to_fraction().unwrap(), Fraction::from_integer(3));
            }
            TimeQuantity::Real(_) => panic!("log_2(8) is exactly 3"),
        }
    }

    #[test]
    fn inexact_log_of_incommensurate_values() {
        let three = monzo(3, 1);
        let two = monzo(2, 1);
        match three.log(&two) {
            TimeQuantity::Real(r) => assert!((r.value - 3f64.log2()).abs() < 1e-12),
            TimeQuantity::Monzo(_) => panic!("log_2(3) is irrational"),
        }
    }

    #[test]
    fn reduce_asymmetry_between_variants() {
        let octave = monzo(2, 1);
        let unison = monzo(1, 1);
        assert!(octave.reduce(&unison).is_err());

        let octave = TimeQuantity::Real(TimeReal::scalar(2.0));
        let unison = TimeQuantity::Real(TimeReal::scalar(1.0));
        let reduced = octave.reduce(&unison).unwrap();
        assert!(reduced.value().is_nan());
    }

    #[test]
    fn strict_equality_never_crosses_variants() {
        // 2/1 is exactly representable on both sides, so `equals` can hold
        // while `strict_equals` still refuses to cross variants.
        let exact = monzo(2, 1);
        let inexact = TimeQuantity::Real(TimeReal::scalar(2.0));
        assert!(!exact.strict_equals(&inexact));
        assert!(exact.equals(&inexact));
    }

    #[test]
    fn untagged_json_dispatches_on_inner_tag() {
        let exact = monzo(81, 80);
        let json = serde_json::to_string(&exact).unwrap();
        let back: TimeQuantity = serde_json::from_str(&json).unwrap();
        assert!(exact.strict_equals(&back));

        let inexact = TimeQuantity::Real(TimeReal::scalar(1.5));
        let json = serde_json::to_string(&inexact).unwrap();
        let back: TimeQuantity = serde_json::from_str(&json).unwrap();
        assert!(inexact.strict_equals(&back));
    }
}
