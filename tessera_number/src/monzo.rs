// TimeMonzo: the exact musical quantity.
//
// A `TimeMonzo` represents a musical value as a prime factorization with
// rational exponents, times a rational residual for any factor outside the
// tracked primes, times an inexact cents offset, times a power of one second
// for absolute quantities:
//
//   value = prod(prime_i ^ prime_exponents[i]) * residual
//           * 2^(cents / 1200) * (1 s)^time_exponent
//
// The component count (how many primes are tracked) is fixed per instance
// and padded up when two monzos of different widths meet. The residual keeps
// every rational exact without unbounded vectors: factoring 23/16 at three
// components yields exponents [-4, 0, 0] and residual 23, never a silent
// loss. A zero residual means the value zero regardless of the other fields.
//
// Exactness discipline: operations closed over the rationals stay on
// `TimeMonzo`; anything that would leave them (irrational powers) promotes
// the result to `TimeReal` through the `TimeQuantity` sum type rather than
// failing, except where exactness is structural (`pow_exact`,
// `geometric_inverse`), which error instead.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NumberError, Result};
use crate::fraction::{Fraction, log2_bigint};
use crate::primes::{self, prime};
use crate::quantity::TimeQuantity;
use crate::real::TimeReal;

/// An exact musical quantity: prime-exponent vector, residual, cents offset,
/// and time exponent (0 = ratio, -1 = frequency, +1 = duration).
#[derive(Clone, Debug)]
pub struct TimeMonzo {
    pub time_exponent: Fraction,
    pub prime_exponents: Vec<Fraction>,
    pub residual: Fraction,
    pub cents: f64,
}

impl TimeMonzo {
    /// The scalar unison (exactly 1) with `num_components` tracked primes.
    pub fn one(num_components: usize) -> Self {
        TimeMonzo {
            time_exponent: Fraction::zero(),
            prime_exponents: vec![Fraction::zero(); num_components],
            residual: Fraction::one(),
            cents: 0.0,
        }
    }

    /// The scalar zero. Encoded as a zero residual.
    pub fn zero(num_components: usize) -> Self {
        TimeMonzo {
            time_exponent: Fraction::zero(),
            prime_exponents: vec![Fraction::zero(); num_components],
            residual: Fraction::zero(),
            cents: 0.0,
        }
    }

    /// One second: the unit duration.
    pub fn one_second(num_components: usize) -> Self {
        let mut result = Self::one(num_components);
        result.time_exponent = Fraction::one();
        result
    }

    /// One hertz: the unit frequency.
    pub fn one_hertz(num_components: usize) -> Self {
        let mut result = Self::one(num_components);
        result.time_exponent = -Fraction::one();
        result
    }

    pub fn from_i64(n: i64, num_components: usize) -> Self {
        Self::from_bigint(&BigInt::from(n), num_components)
    }

    /// Factor an integer against the first `num_components` primes; whatever
    /// does not divide out (including the sign) lands in the residual.
    pub fn from_bigint(n: &BigInt, num_components: usize) -> Self {
        Self::from_fraction(&Fraction::from_bigint(n.clone()), num_components)
    }

    /// Factor a fraction against the first `num_components` primes.
    pub fn from_fraction(value: &Fraction, num_components: usize) -> Self {
        if value.is_zero() {
            return Self::zero(num_components);
        }
        let mut exponents = vec![Fraction::zero(); num_components];
        let numer_left = factor_out(&mut exponents, &value.numer().abs(), 1);
        let denom_left = factor_out(&mut exponents, value.denom(), -1);
        let numer_left = if value.is_negative() {
            -numer_left
        } else {
            numer_left
        };
        let residual = Fraction::from_bigints(numer_left, denom_left)
            .expect("leftover denominator is a positive integer");
        TimeMonzo {
            time_exponent: Fraction::zero(),
            prime_exponents: exponents,
            residual,
            cents: 0.0,
        }
    }

    /// A pure cents offset: `2^(cents/1200)` with no exact part.
    pub fn from_cents(cents: f64, num_components: usize) -> Self {
        let mut result = Self::one(num_components);
        result.cents = cents;
        result
    }

    /// `fraction_of_equave` steps of an equally divided `equave`, e.g.
    /// 7\12 of 2 is the 12-tone fifth. The equave must factor completely
    /// inside the tracked primes so the result stays exact.
    pub fn from_equal_temperament(
        fraction_of_equave: &Fraction,
        equave: &Fraction,
        num_components: usize,
    ) -> Result<Self> {
        let base = Self::from_fraction(equave, num_components);
        if !base.residual.is_one() {
            return Err(NumberError::NotRepresentable(format!(
                "equave {equave} does not factor within {num_components} components"
            )));
        }
        base.pow_exact(fraction_of_equave)
    }

    pub fn num_components(&self) -> usize {
        self.prime_exponents.len()
    }

    /// Grow the exponent vector to at least `num_components` entries.
    pub fn pad_components(&mut self, num_components: usize) {
        while self.prime_exponents.len() < num_components {
            self.prime_exponents.push(Fraction::zero());
        }
    }

    /// Re-factor at a new component count: residual factors that fit inside
    /// the first `num_components` primes move into the exponent vector, the
    /// rest stays residual. Never loses exactness.
    pub fn with_components(&self, num_components: usize) -> Self {
        let mut base = self.clone();
        base.residual = Fraction::one();
        base.pad_components(num_components);
        if self.is_zero() {
            base.residual = Fraction::zero();
            return base;
        }
        let refactored = Self::from_fraction(&self.residual, num_components);
        base.mul(&refactored)
    }

    /// Minimal component count covering every prime in the value, or `None`
    /// when the residual contains a prime beyond the static table. Trailing
    /// zero exponents do not count.
    pub fn prime_span(&self) -> Option<usize> {
        let mut span = 0usize;
        for (i, exponent) in self.prime_exponents.iter().enumerate() {
            if !exponent.is_zero() {
                span = span.max(i + 1);
            }
        }
        if !self.is_zero() {
            let numer = self.residual.numer().abs();
            if numer > num_bigint::BigInt::from(1) {
                span = span.max(primes::max_prime_index(&numer)? + 1);
            }
            let denom = self.residual.denom();
            if denom > &num_bigint::BigInt::from(1) {
                span = span.max(primes::max_prime_index(denom)? + 1);
            }
        }
        Some(span)
    }

    /// True when the value is zero (encoded as a zero residual).
    pub fn is_zero(&self) -> bool {
        self.residual.is_zero()
    }

    /// True for plain ratios: no time dimension attached.
    pub fn is_scalar(&self) -> bool {
        self.time_exponent.is_zero()
    }

    /// True when the value is exactly one.
    pub fn is_unity(&self) -> bool {
        self.residual.is_one()
            && self.cents == 0.0
            && self.time_exponent.is_zero()
            && self.prime_exponents.iter().all(Fraction::is_zero)
    }

    /// True when every prime exponent is an integer and there is no cents
    /// offset, i.e. the scalar part converts to an exact fraction.
    pub fn is_fraction(&self) -> bool {
        self.cents == 0.0 && self.prime_exponents.iter().all(Fraction::is_integer)
    }

    /// True when the value is a positive or negative integer.
    pub fn is_integral(&self) -> bool {
        self.is_fraction()
            && self.residual.is_integer()
            && self
                .prime_exponents
                .iter()
                .all(|e| !e.is_negative() || e.is_zero())
    }

    pub fn is_negative(&self) -> bool {
        self.residual.is_negative()
    }

    /// Exact conversion to a fraction. Requires integral prime exponents and
    /// no cents offset; time exponents are rejected since a frequency is not
    /// a number. Built entirely on big integers: exponents beyond 2^53 work,
    /// though astronomically large powers are refused rather than computed.
    pub fn to_fraction(&self) -> Result<Fraction> {
        if !self.is_scalar() {
            return Err(NumberError::NotRepresentable(
                "value has a time dimension".to_string(),
            ));
        }
        if self.cents != 0.0 {
            return Err(NumberError::IrrationalExact);
        }
        if self.is_zero() {
            return Ok(Fraction::zero());
        }
        let mut result = self.residual.clone();
        for (i, exponent) in self.prime_exponents.iter().enumerate() {
            if exponent.is_zero() {
                continue;
            }
            let power = exponent
                .to_i64()
                .and_then(|e| i32::try_from(e).ok())
                .ok_or(NumberError::IrrationalExact)?;
            let base = Fraction::from_integer(prime(i) as i64);
            result = &result * &base.pow_i32(power)?;
        }
        Ok(result)
    }

    /// Exact conversion to a big integer.
    pub fn to_bigint(&self) -> Result<BigInt> {
        self.to_fraction()?.to_bigint()
    }

    /// Logarithmic magnitude in cents of the absolute value, the inexact
    /// cents offset included. The time exponent does not contribute.
    pub fn total_cents(&self) -> f64 {
        if self.is_zero() {
            return f64::NEG_INFINITY;
        }
        let mut log2 = 0.0;
        for (i, exponent) in self.prime_exponents.iter().enumerate() {
            if !exponent.is_zero() {
                log2 += exponent.to_f64() * (prime(i) as f64).log2();
            }
        }
        log2 += log2_bigint(&self.residual.numer().abs());
        log2 -= log2_bigint(self.residual.denom());
        log2 * 1200.0 + self.cents
    }

    /// Linear magnitude as a float, sign included.
    pub fn value(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let magnitude = (self.total_cents() / 1200.0).exp2();
        if self.is_negative() { -magnitude } else { magnitude }
    }

    /// Inexact view of this quantity.
    pub fn to_real(&self) -> TimeReal {
        TimeReal {
            time_exponent: self.time_exponent.to_f64(),
            value: self.value(),
        }
    }

    /// Exact product.
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            let mut zero = Self::zero(self.num_components().max(other.num_components()));
            zero.time_exponent = &self.time_exponent + &other.time_exponent;
            return zero;
        }
        let size = self.num_components().max(other.num_components());
        let mut exponents = Vec::with_capacity(size);
        for i in 0..size {
            let a = self.prime_exponents.get(i).cloned().unwrap_or_else(Fraction::zero);
            let b = other.prime_exponents.get(i).cloned().unwrap_or_else(Fraction::zero);
            exponents.push(&a + &b);
        }
        TimeMonzo {
            time_exponent: &self.time_exponent + &other.time_exponent,
            prime_exponents: exponents,
            residual: &self.residual * &other.residual,
            cents: self.cents + other.cents,
        }
    }

    /// Exact reciprocal. Zero has none.
    pub fn recip(&self) -> Result<Self> {
        Ok(TimeMonzo {
            time_exponent: -&self.time_exponent,
            prime_exponents: self.prime_exponents.iter().map(|e| -e).collect(),
            residual: self.residual.recip()?,
            cents: -self.cents,
        })
    }

    /// Exact quotient. Errors on a zero divisor.
    pub fn div(&self, other: &Self) -> Result<Self> {
        Ok(self.mul(&other.recip()?))
    }

    /// Linear negation: the sign lives in the residual.
    pub fn neg(&self) -> Self {
        let mut result = self.clone();
        result.residual = -&result.residual;
        result
    }

    pub fn abs(&self) -> Self {
        let mut result = self.clone();
        result.residual = result.residual.abs();
        result
    }

    /// Raise to a rational power. Stays exact when the residual has an exact
    /// rational root; otherwise the result promotes to `TimeReal`.
    pub fn pow(&self, exponent: &Fraction) -> TimeQuantity {
        match self.pow_exact(exponent) {
            Ok(monzo) => TimeQuantity::Monzo(monzo),
            Err(_) => TimeQuantity::Real(self.to_real().pow(exponent.to_f64())),
        }
    }

    /// Raise to a rational power, requiring the result to stay exact.
    /// Errors when the residual has no exact rational root, for contexts
    /// where exactness is structural rather than cosmetic.
    pub fn pow_exact(&self, exponent: &Fraction) -> Result<Self> {
        if self.is_zero() {
            if exponent.is_zero() {
                return Ok(Self::one(self.num_components()));
            }
            if exponent.is_negative() {
                return Err(NumberError::DivisionByZero);
            }
            return Ok(Self::zero(self.num_components()));
        }
        let residual = self
            .residual
            .pow_fraction(exponent)
            .ok_or(NumberError::IrrationalExact)?;
        Ok(TimeMonzo {
            time_exponent: &self.time_exponent * exponent,
            prime_exponents: self.prime_exponents.iter().map(|e| e * exponent).collect(),
            residual,
            cents: self.cents * exponent.to_f64(),
        })
    }

    /// Numeric comparison. Exact through fractions when both sides convert;
    /// otherwise falls back to logarithmic magnitudes in floating point.
    pub fn compare(&self, other: &Self) -> Ordering {
        if let (Ok(a), Ok(b)) = (self.to_fraction(), other.to_fraction()) {
            return a.cmp(&b);
        }
        match (self.is_negative(), other.is_negative()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (true, true) => {
                return compare_cents(self.total_cents(), other.total_cents()).reverse();
            }
            (false, false) => {}
        }
        if self.is_zero() || other.is_zero() {
            return self
                .value()
                .partial_cmp(&other.value())
                .unwrap_or(Ordering::Equal);
        }
        compare_cents(self.total_cents(), other.total_cents())
    }

    /// Numeric equality (value-level, tolerant of representation).
    pub fn equals(&self, other: &Self) -> bool {
        self.time_exponent == other.time_exponent && self.compare(other) == Ordering::Equal
    }

    /// Representation-level equality: same exact fields, trailing zero
    /// exponents ignored. Used where formatting fidelity matters.
    pub fn strict_equals(&self, other: &Self) -> bool {
        self.time_exponent == other.time_exponent
            && self.residual == other.residual
            && self.cents == other.cents
            && padded_eq(&self.prime_exponents, &other.prime_exponents)
    }

    /// Unweighted rational inner product over the full prime factorization:
    /// tracked exponents plus the factored residuals. Residual signs do not
    /// contribute. This is the pairing behind duals, vals, and respelling.
    pub fn dot(&self, other: &Self) -> Fraction {
        let a = self.full_exponent_map();
        let b = other.full_exponent_map();
        let mut sum = Fraction::zero();
        for (p, ea) in &a {
            if let Some(eb) = b.get(p) {
                sum = &sum + &(ea * eb);
            }
        }
        sum
    }

    /// Tenney-weighted float inner product: each prime's exponent pair is
    /// scaled by the squared natural log of the prime. Used by weighted
    /// lattice reduction and respelling.
    pub fn weighted_dot(&self, other: &Self) -> f64 {
        let a = self.full_exponent_map();
        let b = other.full_exponent_map();
        let mut sum = 0.0;
        for (p, ea) in &a {
            if let Some(eb) = b.get(p) {
                let w = log2_bigint(p) * std::f64::consts::LN_2;
                sum += ea.to_f64() * eb.to_f64() * w * w;
            }
        }
        sum
    }

    /// Exponents of every prime in the value, residual factored in.
    fn full_exponent_map(&self) -> BTreeMap<BigInt, Fraction> {
        let mut map = BTreeMap::new();
        for (i, exponent) in self.prime_exponents.iter().enumerate() {
            if !exponent.is_zero() {
                map.insert(BigInt::from(prime(i)), exponent.clone());
            }
        }
        if !self.is_zero() {
            for (p, e) in primes::factorize(&self.residual.numer().abs()) {
                add_exponent(&mut map, p, Fraction::from_integer(e as i64));
            }
            for (p, e) in primes::factorize(self.residual.denom()) {
                add_exponent(&mut map, p, Fraction::from_integer(-(e as i64)));
            }
        }
        map
    }

    /// The monzo `g` with `g.dot(self) == 1`, obtained as
    /// `self^(1 / self.dot(self))`. This is how a logarithmic quantity turns
    /// into the cologarithmic ruler that measures it. Must stay exact:
    /// irrational input (a cents offset) or a zero norm are errors.
    pub fn geometric_inverse(&self) -> Result<Self> {
        if self.cents != 0.0 {
            return Err(NumberError::IrrationalExact);
        }
        let norm = self.dot(self);
        if norm.is_zero() {
            return Err(NumberError::NotRepresentable(
                "geometric inverse of a unison-equivalent value".to_string(),
            ));
        }
        self.pow_exact(&norm.recip()?)
    }

    /// Reduce into `[1, equave)` by repeated exact division. Reducing by a
    /// unison-equivalent equave is a hard error on this exact path (the
    /// inexact `TimeReal` path yields NaN instead; both behaviors are
    /// intentional and pinned by tests).
    pub fn reduce(&self, equave: &Self) -> Result<Self> {
        if equave.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        let equave_cents = equave.total_cents();
        if equave_cents == 0.0 {
            return Err(NumberError::DegenerateReduction);
        }
        if self.is_zero() {
            return Ok(self.clone());
        }
        // Reduction works modulo the equave's magnitude: drop its sign and
        // flip sub-unity equaves upward, as the inexact path does.
        let equave = equave.abs();
        let equave = if equave_cents < 0.0 {
            equave.recip()?
        } else {
            equave
        };
        // Estimate the exponent in floats, then correct exactly.
        let steps = (self.total_cents() / equave.total_cents()).floor();
        let steps = Fraction::from_integer(steps as i64);
        let mut result = self.div(&equave.pow_exact(&steps)?)?;
        let one = Self::one(result.num_components());
        while result.abs().compare(&one) == Ordering::Less {
            result = result.mul(&equave);
        }
        while result.abs().compare(&equave) != Ordering::Less {
            result = result.div(&equave)?;
        }
        Ok(result)
    }

    /// Floored modulo. Exact through fractions; promotes to `TimeReal` when
    /// either operand does not convert.
    pub fn mmod(&self, other: &Self) -> Result<TimeQuantity> {
        if self.time_exponent != other.time_exponent {
            return Err(NumberError::NotRepresentable(
                "modulo of incompatible time dimensions".to_string(),
            ));
        }
        match (self.to_scalar_fraction(), other.to_scalar_fraction()) {
            (Ok(a), Ok(b)) => {
                let mut result = Self::from_fraction(
                    &a.mmod(&b)?,
                    self.num_components().max(other.num_components()),
                );
                result.time_exponent = self.time_exponent.clone();
                Ok(TimeQuantity::Monzo(result))
            }
            _ => Ok(TimeQuantity::Real(self.to_real().mmod(&other.to_real()))),
        }
    }

    /// Linear addition. Exact through fractions; promotes to `TimeReal`
    /// otherwise. Operands must share a time dimension.
    pub fn add(&self, other: &Self) -> Result<TimeQuantity> {
        if self.time_exponent != other.time_exponent {
            return Err(NumberError::NotRepresentable(
                "addition of incompatible time dimensions".to_string(),
            ));
        }
        match (self.to_scalar_fraction(), other.to_scalar_fraction()) {
            (Ok(a), Ok(b)) => {
                let mut result = Self::from_fraction(
                    &(&a + &b),
                    self.num_components().max(other.num_components()),
                );
                result.time_exponent = self.time_exponent.clone();
                Ok(TimeQuantity::Monzo(result))
            }
            _ => Ok(TimeQuantity::Real(TimeReal {
                time_exponent: self.time_exponent.to_f64(),
                value: self.value() + other.value(),
            })),
        }
    }

    /// Linear subtraction; see `add`.
    pub fn sub(&self, other: &Self) -> Result<TimeQuantity> {
        self.add(&other.neg())
    }

    /// The scalar part as a fraction, ignoring the time dimension.
    fn to_scalar_fraction(&self) -> Result<Fraction> {
        let mut scalar = self.clone();
        scalar.time_exponent = Fraction::zero();
        scalar.to_fraction()
    }

    /// The `n`-th continued-fraction convergent of the value (0-based:
    /// convergent 0 is the nearest-below integer). Exact input walks the
    /// continued fraction in big integers.
    pub fn get_convergent(&self, n: usize) -> Result<Self> {
        let target = match self.to_scalar_fraction() {
            Ok(f) => f,
            Err(_) => Fraction::approximate(self.value(), u64::MAX)?,
        };
        let mut x = target.abs();
        let mut h = (BigInt::from(1), BigInt::from(0));
        let mut k = (BigInt::from(0), BigInt::from(1));
        for _ in 0..=n {
            let a = x.floor_bigint();
            h = (&a * &h.0 + &h.1, h.0);
            k = (&a * &k.0 + &k.1, k.0);
            let rest = &x - &Fraction::from_bigint(a);
            if rest.is_zero() {
                break;
            }
            x = rest.recip()?;
        }
        let mut convergent = Fraction::from_bigints(h.0, k.0)?;
        if target.is_negative() {
            convergent = -convergent;
        }
        Ok(Self::from_fraction(&convergent, self.num_components()))
    }

    /// Round to the nearest harmonic `p / limit`.
    pub fn approximate_harmonic(&self, limit: u64) -> Result<Self> {
        if limit == 0 {
            return Err(NumberError::DivisionByZero);
        }
        let p = (self.value() * limit as f64).round().max(1.0);
        let fraction = Fraction::from_bigints(BigInt::from(p as i64), BigInt::from(limit))?;
        Ok(Self::from_fraction(&fraction, self.num_components()))
    }

    /// Round to the nearest subharmonic `limit / p`.
    pub fn approximate_subharmonic(&self, limit: u64) -> Result<Self> {
        if limit == 0 {
            return Err(NumberError::DivisionByZero);
        }
        let value = self.value();
        if value <= 0.0 {
            return Err(NumberError::NotRepresentable(
                "subharmonic approximation of a non-positive value".to_string(),
            ));
        }
        let p = (limit as f64 / value).round().max(1.0);
        let fraction = Fraction::from_bigints(BigInt::from(limit), BigInt::from(p as i64))?;
        Ok(Self::from_fraction(&fraction, self.num_components()))
    }

    /// Every positive divisor of an integral value, as monzos of the same
    /// width. Errors when the value is not a positive integer.
    pub fn divisors(&self) -> Result<Vec<Self>> {
        let n = self.to_bigint()?;
        if !n.is_positive() {
            return Err(NumberError::NotRepresentable(
                "divisors of a non-positive value".to_string(),
            ));
        }
        Ok(primes::divisors(&n)
            .iter()
            .map(|d| Self::from_bigint(d, self.num_components()))
            .collect())
    }
}

/// Divide out the first `len(exponents)` primes from `n`, adding
/// `sign * count` to each exponent slot. Returns the unfactored leftover.
fn factor_out(exponents: &mut [Fraction], n: &BigInt, sign: i64) -> BigInt {
    let mut remaining = n.clone();
    for (i, slot) in exponents.iter_mut().enumerate() {
        let p = BigInt::from(prime(i));
        let mut count = 0i64;
        while (&remaining % &p).to_i64() == Some(0) && !remaining.is_zero() {
            remaining /= &p;
            count += 1;
        }
        if count != 0 {
            *slot = &*slot + &Fraction::from_integer(sign * count);
        }
    }
    remaining
}

fn add_exponent(map: &mut BTreeMap<BigInt, Fraction>, p: BigInt, e: Fraction) {
    let entry = map.entry(p.clone()).or_insert_with(Fraction::zero);
    *entry = &*entry + &e;
    if entry.is_zero() {
        map.remove(&p);
    }
}

fn padded_eq(a: &[Fraction], b: &[Fraction]) -> bool {
    let len = a.len().max(b.len());
    (0..len).all(|i| {
        let zero = Fraction::zero();
        let x = a.get(i).unwrap_or(&zero);
        let y = b.get(i).unwrap_or(&zero);
        x == y
    })
}

fn compare_cents(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// JSON wire form. Nested fractions carry their own type tags.
#[derive(Serialize, Deserialize)]
struct TimeMonzoWire {
    #[serde(rename = "type")]
    tag: String,
    #[serde(rename = "timeExponent")]
    time_exponent: Fraction,
    #[serde(rename = "primeExponents")]
    prime_exponents: Vec<Fraction>,
    residual: Fraction,
    cents: f64,
}

impl Serialize for TimeMonzo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        TimeMonzoWire {
            tag: "TimeMonzo".to_string(),
            time_exponent: self.time_exponent.clone(),
            prime_exponents: self.prime_exponents.clone(),
            residual: self.residual.clone(),
            cents: self.cents,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TimeMonzo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = TimeMonzoWire::deserialize(deserializer)?;
        if wire.tag != "TimeMonzo" {
            return Err(D::Error::custom(format!(
                "expected type \"TimeMonzo\", got {:?}",
                wire.tag
            )));
        }
        Ok(TimeMonzo {
            time_exponent: wire.time_exponent,
            prime_exponents: wire.prime_exponents,
            residual: wire.residual,
            cents: wire.cents,
        })
    }
}
