// Domain-tagged intervals.
//
// An interval wraps a quantity with the algebraic domain it lives in.
// Linear intervals behave like plain numbers: addition adds, multiplication
// multiplies. Logarithmic intervals are pitch distances: "adding" two of
// them stacks them, which multiplies the underlying frequency ratios, and
// multiplying one by a linear scalar raises the ratio to that power. Every
// operator here dispatches on the domain pair and rejects the combinations
// that have no musical meaning.
//
// Alongside the value an interval carries an integer step count for
// abstract tuning steps (kept exact: any operation that would make it
// fractional fails), an optional cached display literal, and cosmetic
// provenance (color, label, tracking ids).

use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use tessera_number::fraction::Fraction;
use tessera_number::monzo::TimeMonzo;
use tessera_number::quantity::TimeQuantity;

use crate::basis::ValBasis;
use crate::context::RootContext;
use crate::error::{Result, TemperError};
use crate::literal::IntervalLiteral;
use crate::val::Val;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Linear,
    Logarithmic,
}

/// Result of `Interval::inverse`: linear intervals invert to intervals,
/// logarithmic intervals invert to the val that measures them.
#[derive(Debug, Clone)]
pub enum Inverse {
    Interval(Interval),
    Val(Val),
}

#[derive(Debug, Clone)]
pub struct Interval {
    value: TimeQuantity,
    domain: Domain,
    steps: i64,
    node: Option<IntervalLiteral>,
    color: Option<String>,
    label: String,
    tracking_ids: BTreeSet<u32>,
}

impl Interval {
    pub fn new(value: TimeQuantity, domain: Domain) -> Self {
        Interval {
            value,
            domain,
            steps: 0,
            node: None,
            color: None,
            label: String::new(),
            tracking_ids: BTreeSet::new(),
        }
    }

    pub fn with_node(value: TimeQuantity, domain: Domain, node: IntervalLiteral) -> Self {
        let mut interval = Self::new(value, domain);
        interval.node = Some(node);
        interval
    }

    /// A pure abstract step count with no acoustic size.
    pub fn from_steps(steps: i64, num_components: usize) -> Self {
        let mut interval = Self::new(TimeQuantity::one(num_components), Domain::Logarithmic);
        interval.steps = steps;
        interval
    }

    pub fn from_fraction(value: &Fraction, num_components: usize) -> Self {
        Self::with_node(
            TimeQuantity::from_fraction(value, num_components),
            Domain::Linear,
            IntervalLiteral::from_fraction(value),
        )
    }

    pub fn from_cents(cents: f64, num_components: usize) -> Self {
        Self::with_node(
            TimeQuantity::Monzo(TimeMonzo::from_cents(cents, num_components)),
            Domain::Logarithmic,
            IntervalLiteral::from_cents(cents),
        )
    }

    pub fn value(&self) -> &TimeQuantity {
        &self.value
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn steps(&self) -> i64 {
        self.steps
    }

    pub fn node(&self) -> Option<&IntervalLiteral> {
        self.node.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = Some(color.into());
    }

    /// Register an external tracking id; ids survive arithmetic so the
    /// interpreter can follow an interval through a program.
    pub fn track(&mut self, id: u32) {
        self.tracking_ids.insert(id);
    }

    pub fn tracking_ids(&self) -> &BTreeSet<u32> {
        &self.tracking_ids
    }

    /// Same metadata, new value; the cached spelling is dropped because it
    /// no longer describes the value.
    pub fn with_value(&self, value: TimeQuantity) -> Self {
        Interval {
            value,
            domain: self.domain,
            steps: self.steps,
            node: None,
            color: self.color.clone(),
            label: self.label.clone(),
            tracking_ids: self.tracking_ids.clone(),
        }
    }

    /// Attach a subgroup-monzo spelling without touching the value.
    pub fn with_subgroup_node(&self, coordinates: &[num_bigint::BigInt], basis: &ValBasis) -> Self {
        let mut result = self.clone();
        let names: Option<Vec<String>> = basis
            .value()
            .iter()
            .map(|g| g.to_fraction().ok().map(|f| f.to_string()))
            .collect();
        result.node = names.map(|names| IntervalLiteral::Monzo {
            components: coordinates.iter().map(|c| c.to_string()).collect(),
            basis: names,
        });
        result
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_domain(other)?;
        match self.domain {
            Domain::Linear => {
                self.check_unstepped(other)?;
                let value = self.value.add(&other.value)?;
                Ok(self.combine(other, value, 0))
            }
            Domain::Logarithmic => {
                let value = self.value.mul(&other.value);
                Ok(self.combine(other, value, self.steps + other.steps))
            }
        }
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.check_domain(other)?;
        match self.domain {
            Domain::Linear => {
                self.check_unstepped(other)?;
                let value = self.value.sub(&other.value)?;
                Ok(self.combine(other, value, 0))
            }
            Domain::Logarithmic => {
                let value = self.value.div(&other.value)?;
                Ok(self.combine(other, value, self.steps - other.steps))
            }
        }
    }

    /// Multiplication requires at least one linear operand. A logarithmic
    /// interval times a linear scalar is the interval stacked that many
    /// times (a power of the underlying ratio).
    pub fn mul(&self, other: &Self) -> Result<Self> {
        match (self.domain, other.domain) {
            (Domain::Linear, Domain::Linear) => {
                self.check_unstepped(other)?;
                Ok(self.combine(other, self.value.mul(&other.value), 0))
            }
            (Domain::Logarithmic, Domain::Linear) => self.scale(other),
            (Domain::Linear, Domain::Logarithmic) => other.scale(self),
            (Domain::Logarithmic, Domain::Logarithmic) => Err(TemperError::DomainMismatch(
                "cannot multiply two logarithmic intervals".to_string(),
            )),
        }
    }

    /// Division of two logarithmic intervals is a logarithm: how many of
    /// `other` fit in `self`, as a linear scalar.
    pub fn div(&self, other: &Self) -> Result<Self> {
        match (self.domain, other.domain) {
            (Domain::Linear, Domain::Linear) => {
                self.check_unstepped(other)?;
                Ok(self.combine(other, self.value.div(&other.value)?, 0))
            }
            (Domain::Logarithmic, Domain::Linear) => {
                let factor = other
                    .value
                    .recip()?;
                self.scale_by(&factor, other)
            }
            (Domain::Logarithmic, Domain::Logarithmic) => {
                // Pure step counts divide as exact step ratios.
                if self.value.is_scalar()
                    && other.value.is_scalar()
                    && self.value.equals(&TimeQuantity::one(1))
                    && other.value.equals(&TimeQuantity::one(1))
                    && other.steps != 0
                {
                    let ratio = Fraction::new(self.steps, other.steps)
                        .map_err(TemperError::from)?;
                    let mut result = self.combine(other, TimeQuantity::from_fraction(&ratio, 1), 0);
                    result.domain = Domain::Linear;
                    return Ok(result);
                }
                let mut result = self.combine(other, self.value.log(&other.value), 0);
                result.domain = Domain::Linear;
                Ok(result)
            }
            (Domain::Linear, Domain::Logarithmic) => Err(TemperError::DomainMismatch(
                "cannot divide a linear value by a logarithmic interval".to_string(),
            )),
        }
    }

    /// Exponentiation of a linear value by a scalar, step-free exponent.
    pub fn pow(&self, exponent: &Self) -> Result<Self> {
        self.check_linear("pow")?;
        exponent.check_exponent()?;
        let value = self.value.pow(&exponent.value)?;
        let steps = scale_steps(self.steps, &exponent.value)?;
        Ok(self.combine(exponent, value, steps))
    }

    /// Like `pow` but the exponent must be an integer.
    pub fn ipow(&self, exponent: &Self) -> Result<Self> {
        let integral = exponent
            .value
            .to_fraction()
            .map(|f| f.is_integer())
            .unwrap_or(false);
        if !integral {
            return Err(TemperError::DomainMismatch(
                "ipow requires an integer exponent".to_string(),
            ));
        }
        self.pow(exponent)
    }

    /// Logarithm of a linear value in a linear base.
    pub fn log(&self, base: &Self) -> Result<Self> {
        self.check_linear("log")?;
        base.check_linear("log")?;
        self.check_unstepped(base)?;
        Ok(self.combine(base, self.value.log(&base.value), 0))
    }

    /// Reduction: linear values take a numeric modulo, logarithmic
    /// intervals reduce into one equave (repeated un-stacking).
    pub fn reduce(&self, equave: &Self) -> Result<Self> {
        self.check_domain(equave)?;
        let value = match self.domain {
            Domain::Linear => self.value.mmod(&equave.value)?,
            Domain::Logarithmic => self.value.reduce(&equave.value)?,
        };
        Ok(self.combine(equave, value, 0))
    }

    /// Alias dispatching the same way `reduce` does; the language's `mod`
    /// operator lands here.
    pub fn mmod(&self, equave: &Self) -> Result<Self> {
        self.reduce(equave)
    }

    /// Linear intervals invert to their reciprocal. A logarithmic interval
    /// inverts to the val that measures it: the geometric inverse of an
    /// octave is 1 step per octave. Fails for irrational values, which have
    /// no exact ruler.
    pub fn inverse(&self) -> Result<Inverse> {
        match self.domain {
            Domain::Linear => {
                let mut result = self.clone();
                result.value = self.value.recip()?;
                result.node = None;
                Ok(Inverse::Interval(result))
            }
            Domain::Logarithmic => {
                let monzo = self
                    .value
                    .as_monzo()
                    .ok_or(tessera_number::NumberError::IrrationalExact)?;
                let inverse = monzo.geometric_inverse().map_err(TemperError::from)?;
                let basis = ValBasis::standard(monzo.num_components().max(1))?;
                Ok(Inverse::Val(Val::from_parts(inverse, basis)))
            }
        }
    }

    pub fn neg(&self) -> Result<Self> {
        let mut result = self.clone();
        result.node = None;
        match self.domain {
            Domain::Linear => {
                result.value = self.value.neg();
            }
            Domain::Logarithmic => {
                result.value = self.value.recip()?;
                result.steps = -self.steps;
            }
        }
        Ok(result)
    }

    pub fn abs(&self) -> Result<Self> {
        let mut result = self.clone();
        result.node = None;
        match self.domain {
            Domain::Linear => {
                result.value = self.value.abs();
            }
            Domain::Logarithmic => {
                if self.value.total_cents() < 0.0 {
                    result.value = self.value.recip()?;
                }
                result.steps = self.steps.abs();
            }
        }
        Ok(result)
    }

    /// Absolute value in pitch space: a downward interval flips upward by
    /// reciprocation whatever the domain, unlike `abs` which negates
    /// linear values numerically.
    pub fn pitch_abs(&self) -> Result<Self> {
        let mut result = self.clone();
        result.node = None;
        if self.value.total_cents() < 0.0 {
            result.value = self.value.recip()?;
        }
        result.steps = self.steps.abs();
        Ok(result)
    }

    /// The exact fraction behind the value, when there is one. Exporters
    /// prefer this and fall back to `as_cents`.
    pub fn as_fraction(&self) -> Option<Fraction> {
        self.value.to_fraction().ok()
    }

    pub fn as_cents(&self) -> f64 {
        self.value.total_cents()
    }

    pub fn compare(&self, other: &Self) -> std::cmp::Ordering {
        self.value.compare(&other.value)
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.value.equals(&other.value)
    }

    pub fn strict_equals(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.steps == other.steps
            && self.value.strict_equals(&other.value)
    }

    /// A concrete display literal for the current value, re-derived when
    /// the cached one is missing or aspiring. Absolute (time-carrying)
    /// values are resolved against the context's reference pitch; `None`
    /// means the caller should fall back to a context-free rendering.
    pub fn realize_node(&self, context: &RootContext) -> Option<IntervalLiteral> {
        if let Some(node) = &self.node {
            if !node.is_aspiring() {
                return Some(node.clone());
            }
        }
        let scalar = if self.value.is_scalar() {
            self.value.clone()
        } else {
            self.value
                .div(&TimeQuantity::Monzo(context.c4.clone()))
                .ok()
                .filter(TimeQuantity::is_scalar)?
        };
        match &scalar {
            TimeQuantity::Monzo(monzo) => {
                if let Ok(f) = monzo.to_fraction() {
                    return Some(IntervalLiteral::from_fraction(&f));
                }
                if monzo.is_fraction() {
                    let mut padded = monzo.clone();
                    padded.pad_components(context.number_of_components);
                    return Some(IntervalLiteral::monzo(&padded.prime_exponents, Vec::new()));
                }
                Some(IntervalLiteral::from_cents(monzo.total_cents()))
            }
            TimeQuantity::Real(real) => Some(IntervalLiteral::from_cents(real.total_cents())),
        }
    }

    /// Drop the cached spelling after a context change that may have
    /// invalidated it.
    pub fn break_node(&mut self) {
        self.node = None;
    }

    fn scale(&self, scalar: &Self) -> Result<Self> {
        self.scale_by(&scalar.value, scalar)
    }

    fn scale_by(&self, factor: &TimeQuantity, provenance: &Self) -> Result<Self> {
        if !factor.is_scalar() {
            return Err(TemperError::DomainMismatch(
                "interval scaling factor must be a scalar".to_string(),
            ));
        }
        if provenance.steps != 0 {
            return Err(TemperError::DomainMismatch(
                "cannot scale by a stepped value".to_string(),
            ));
        }
        let value = self.value.pow(factor)?;
        let steps = scale_steps(self.steps, factor)?;
        Ok(self.combine(provenance, value, steps))
    }

    fn combine(&self, other: &Self, value: TimeQuantity, steps: i64) -> Self {
        Interval {
            value,
            domain: self.domain,
            steps,
            node: None,
            color: self.color.clone().or_else(|| other.color.clone()),
            label: if self.label.is_empty() {
                other.label.clone()
            } else {
                self.label.clone()
            },
            tracking_ids: self.tracking_ids.union(&other.tracking_ids).copied().collect(),
        }
    }

    fn check_domain(&self, other: &Self) -> Result<()> {
        if self.domain == other.domain {
            Ok(())
        } else {
            Err(TemperError::DomainMismatch(
                "operands must share a domain".to_string(),
            ))
        }
    }

    fn check_linear(&self, operation: &str) -> Result<()> {
        if self.domain == Domain::Linear {
            Ok(())
        } else {
            Err(TemperError::DomainMismatch(format!(
                "{operation} is only defined in the linear domain"
            )))
        }
    }

    fn check_unstepped(&self, other: &Self) -> Result<()> {
        if self.steps == 0 && other.steps == 0 {
            Ok(())
        } else {
            Err(TemperError::DomainMismatch(
                "operation does not support stepped values".to_string(),
            ))
        }
    }

    fn check_exponent(&self) -> Result<()> {
        if self.domain != Domain::Linear {
            return Err(TemperError::DomainMismatch(
                "exponent must be linear".to_string(),
            ));
        }
        if self.steps != 0 {
            return Err(TemperError::DomainMismatch(
                "exponent cannot carry steps".to_string(),
            ));
        }
        if !self.value.is_scalar() {
            return Err(TemperError::DomainMismatch(
                "exponent must be a scalar".to_string(),
            ));
        }
        Ok(())
    }
}

/// Steps scale linearly under exponentiation and must stay integral.
fn scale_steps(steps: i64, factor: &TimeQuantity) -> Result<i64> {
    if steps == 0 {
        return Ok(0);
    }
    let factor = factor
        .to_fraction()
        .map_err(|_| TemperError::NonIntegralSteps)?;
    (&Fraction::from_integer(steps) * &factor)
        .to_i64()
        .ok_or(TemperError::NonIntegralSteps)
}

#[derive(Serialize, Deserialize)]
struct IntervalWire {
    #[serde(rename = "type")]
    tag: String,
    domain: Domain,
    steps: i64,
    value: TimeQuantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    node: Option<IntervalLiteral>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(
        rename = "trackingIds",
        default,
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    tracking_ids: BTreeSet<u32>,
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        IntervalWire {
            tag: "Interval".to_string(),
            domain: self.domain,
            steps: self.steps,
            value: self.value.clone(),
            node: self.node.clone(),
            label: self.label.clone(),
            color: self.color.clone(),
            tracking_ids: self.tracking_ids.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = IntervalWire::deserialize(deserializer)?;
        if wire.tag != "Interval" {
            return Err(D::Error::custom(format!(
                "expected type \"Interval\", got {:?}",
                wire.tag
            )));
        }
        Ok(Interval {
            value: wire.value,
            domain: wire.domain,
            steps: wire.steps,
            node: wire.node,
            color: wire.color,
            label: wire.label,
            tracking_ids: wire.tracking_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(n: i64, d: i64) -> Interval {
        let mut interval = Interval::from_fraction(&Fraction::new(n, d).unwrap(), 3);
        interval.domain = Domain::Logarithmic;
        interval
    }

    fn linear(n: i64, d: i64) -> Interval {
        Interval::from_fraction(&Fraction::new(n, d).unwrap(), 3)
    }

    #[test]
    fn stacking_logarithmic_intervals_multiplies_ratios() {
        let fifth = ratio(3, 2);
        let fourth = ratio(4, 3);
        let octave = fifth.add(&fourth).unwrap();
        assert_eq!(
            octave.value().to_fraction().unwrap(),
            Fraction::from_integer(2)
        );
        let tone = fifth.sub(&fourth).unwrap();
        assert_eq!(
            tone.value().to_fraction().unwrap(),
            Fraction::new(9, 8).unwrap()
        );
    }

    #[test]
    fn linear_addition_adds_values() {
        let sum = linear(3, 2).add(&linear(1, 2)).unwrap();
        assert_eq!(
            sum.value().to_fraction().unwrap(),
            Fraction::from_integer(2)
        );
    }

    #[test]
    fn mixing_domains_in_add_fails() {
        assert!(matches!(
            linear(3, 2).add(&ratio(3, 2)),
            Err(TemperError::DomainMismatch(_))
        ));
    }

    #[test]
    fn scaling_a_logarithmic_interval_takes_powers() {
        let fifth = ratio(3, 2);
        let doubled = fifth.mul(&linear(2, 1)).unwrap();
        assert_eq!(
            doubled.value().to_fraction().unwrap(),
            Fraction::new(9, 4).unwrap()
        );
        // Two logarithmic operands have no meaningful product.
        assert!(fifth.mul(&ratio(2, 1)).is_err());
    }

    #[test]
    fn log_division_measures_intervals() {
        let two_octaves = ratio(4, 1);
        let octave = ratio(2, 1);
        let count = two_octaves.div(&octave).unwrap();
        assert_eq!(count.domain(), Domain::Linear);
        assert_eq!(
            count.value().to_fraction().unwrap(),
            Fraction::from_integer(2)
        );
    }

    #[test]
    fn step_counts_follow_log_arithmetic() {
        let up = Interval::from_steps(1, 3);
        let five_up = Interval::from_steps(5, 3);
        let sum = up.add(&five_up).unwrap();
        assert_eq!(sum.steps(), 6);
        let ratio = five_up.div(&up).unwrap();
        assert_eq!(
            ratio.value().to_fraction().unwrap(),
            Fraction::from_integer(5)
        );
    }

    #[test]
    fn fractional_steps_are_rejected() {
        let stepped = Interval::from_steps(3, 3);
        let half = linear(1, 2);
        assert!(matches!(
            stepped.mul(&half),
            Err(TemperError::NonIntegralSteps)
        ));
        let third = linear(1, 3);
        let scaled = stepped.mul(&third).unwrap();
        assert_eq!(scaled.steps(), 1);
    }

    #[test]
    fn pow_requires_linear_scalar_exponent() {
        let base = linear(3, 2);
        let squared = base.pow(&linear(2, 1)).unwrap();
        assert_eq!(
            squared.value().to_fraction().unwrap(),
            Fraction::new(9, 4).unwrap()
        );
        assert!(base.pow(&ratio(2, 1)).is_err());
        assert!(base
            .ipow(&linear(1, 2))
            .is_err());
    }

    #[test]
    fn octave_reduction() {
        let ninth = ratio(9, 2);
        let octave = ratio(2, 1);
        let second = ninth.reduce(&octave).unwrap();
        assert_eq!(
            second.value().to_fraction().unwrap(),
            Fraction::new(9, 8).unwrap()
        );
    }

    #[test]
    fn inverse_of_an_octave_is_an_octave_ruler() {
        let octave = ratio(2, 1);
        let Inverse::Val(val) = octave.inverse().unwrap() else {
            panic!("logarithmic inverse should be a val");
        };
        assert_eq!(val.divisions(), Fraction::one());
        let Inverse::Interval(recip) = linear(3, 2).inverse().unwrap() else {
            panic!("linear inverse should be an interval");
        };
        assert_eq!(
            recip.value().to_fraction().unwrap(),
            Fraction::new(2, 3).unwrap()
        );
    }

    #[test]
    fn realize_node_prefers_cached_spelling() {
        let context = RootContext::new(3);
        let fifth = ratio(3, 2);
        let node = fifth.realize_node(&context).unwrap();
        assert_eq!(node.to_string(), "3/2");
        let mut broken = fifth.clone();
        broken.break_node();
        let rederived = broken.realize_node(&context).unwrap();
        assert_eq!(rederived.to_string(), "3/2");
    }

    #[test]
    fn pitch_abs_flips_downward_intervals() {
        let down = ratio(2, 3);
        let up = down.pitch_abs().unwrap();
        assert_eq!(up.as_fraction().unwrap(), Fraction::new(3, 2).unwrap());
        assert!((ratio(3, 2).as_cents() - 701.955).abs() < 1e-3);
    }

    #[test]
    fn tracking_ids_survive_arithmetic() {
        let mut fifth = ratio(3, 2);
        fifth.track(7);
        let mut fourth = ratio(4, 3);
        fourth.track(9);
        let octave = fifth.add(&fourth).unwrap();
        assert!(octave.tracking_ids().contains(&7));
        assert!(octave.tracking_ids().contains(&9));
    }

    #[test]
    fn json_round_trip() {
        let mut fifth = ratio(3, 2);
        fifth.set_label("P5");
        fifth.set_color("#ff0000");
        let json = serde_json::to_string(&fifth).unwrap();
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert!(fifth.strict_equals(&back));
        assert_eq!(back.label(), "P5");
        assert_eq!(back.color(), Some("#ff0000"));
    }
}
