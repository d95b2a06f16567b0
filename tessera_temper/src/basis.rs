// Just-intonation subgroup bases.
//
// A `ValBasis` is an ordered list of positive rational generators (the
// subgroup a program is working in, e.g. 2.3.7 or 2.9.5/3) together with two
// derived bases computed once at construction:
//
// - `ortho`: the Gram-Schmidt orthogonalization of the generators in
//   exponent space, computed with exact rational arithmetic;
// - `dual`: the geometric inverse of each ortho vector, so that
//   `dual[i].dot(ortho[j])` is 1 exactly when `i == j` and 0 otherwise.
//
// That biorthogonality is what makes coordinate conversion a sequence of
// dot products: reading subgroup coordinates off a monzo walks the basis
// from last to first, projecting out one generator at a time. The same walk
// with rounding instead of exactness checking gives the approximate
// nearest-vector machinery (`respell`) that keeps comma bases and
// representative spellings Tenney-simple.
//
// Lattice reduction comes in two deterministic flavors selected by the
// caller: exact rational LLL on the raw exponent vectors, and float LLL on
// Tenney-weighted (log-prime-scaled) vectors with every unimodular step
// mirrored onto the exact generators.

use num_bigint::BigInt;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use tessera_number::fraction::Fraction;
use tessera_number::monzo::TimeMonzo;
use tessera_number::primes;

use crate::error::{Result, TemperError};
use crate::interval::Interval;
use crate::val::Val;

/// Weighting scheme for lattice reduction and respelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weighting {
    /// Raw exponent vectors, exact rational arithmetic.
    None,
    /// Exponents scaled by the natural log of their primes.
    Tenney,
}

/// An ordered just-intonation subgroup basis with its Gram-Schmidt ortho
/// and dual bases. All elements share one component count derived from the
/// widest generator.
#[derive(Debug, Clone)]
pub struct ValBasis {
    value: Vec<TimeMonzo>,
    ortho: Vec<TimeMonzo>,
    dual: Vec<TimeMonzo>,
    num_components: usize,
}

impl ValBasis {
    /// Build a basis from positive rational generators. Construction
    /// validates every generator (scalar, exact, positive, non-unison,
    /// factorable) and establishes biorthogonality via Gram-Schmidt.
    pub fn new(generators: Vec<TimeMonzo>) -> Result<Self> {
        if generators.is_empty() {
            return Err(TemperError::InvalidBasisElement(
                "basis needs at least one generator".to_string(),
            ));
        }
        let mut num_components = 1usize;
        for g in &generators {
            if !g.is_scalar() {
                return Err(TemperError::InvalidBasisElement(
                    "basis elements cannot carry a time dimension".to_string(),
                ));
            }
            if g.cents != 0.0 {
                return Err(TemperError::InvalidBasisElement(
                    "basis elements must be exact".to_string(),
                ));
            }
            if g.is_zero() || g.is_negative() {
                return Err(TemperError::InvalidBasisElement(
                    "basis elements must be positive".to_string(),
                ));
            }
            if g.is_unity() {
                return Err(TemperError::InvalidBasisElement(
                    "the unison generates nothing".to_string(),
                ));
            }
            let span = g.prime_span().ok_or_else(|| {
                TemperError::InvalidBasisElement(
                    "generator contains a prime beyond the supported table".to_string(),
                )
            })?;
            num_components = num_components.max(span);
        }
        let value: Vec<TimeMonzo> = generators
            .iter()
            .map(|g| g.with_components(num_components))
            .collect();

        let mut ortho: Vec<TimeMonzo> = Vec::with_capacity(value.len());
        let mut dual: Vec<TimeMonzo> = Vec::with_capacity(value.len());
        for g in &value {
            let mut o = g.clone();
            for (j, d) in dual.iter().enumerate() {
                let coefficient = d.dot(&o);
                if !coefficient.is_zero() {
                    o = o.div(&ortho[j].pow_exact(&coefficient)?)?;
                }
            }
            let d = o.geometric_inverse().map_err(|_| {
                TemperError::InvalidBasisElement(
                    "generators are linearly dependent".to_string(),
                )
            })?;
            ortho.push(o);
            dual.push(d);
        }
        Ok(ValBasis {
            value,
            ortho,
            dual,
            num_components,
        })
    }

    /// The standard basis of the first `count` primes.
    pub fn standard(count: usize) -> Result<Self> {
        let generators = primes::nth_primes(count)
            .iter()
            .map(|&p| TimeMonzo::from_i64(p as i64, count))
            .collect();
        Self::new(generators)
    }

    pub fn size(&self) -> usize {
        self.value.len()
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    pub fn value(&self) -> &[TimeMonzo] {
        &self.value
    }

    pub fn ortho(&self) -> &[TimeMonzo] {
        &self.ortho
    }

    pub fn dual(&self) -> &[TimeMonzo] {
        &self.dual
    }

    /// True when every generator is itself a prime number.
    pub fn is_primewise(&self) -> bool {
        self.value.iter().all(|g| {
            g.to_bigint()
                .ok()
                .and_then(|n| u64::try_from(n).ok())
                .and_then(primes::prime_index)
                .is_some()
        })
    }

    /// Representation-level equality of the generator lists.
    pub fn strict_equals(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self
                .value
                .iter()
                .zip(other.value.iter())
                .all(|(a, b)| a.strict_equals(b))
    }

    /// Express a standard-basis monzo in exact integer subgroup
    /// coordinates. Walks the basis last to first, reading the coordinate
    /// off the dual and dividing the generator back out; anything left at
    /// the end means the monzo was never in the subgroup.
    pub fn to_subgroup_monzo(&self, monzo: &TimeMonzo) -> Result<Vec<BigInt>> {
        if !monzo.is_scalar() || monzo.cents != 0.0 {
            return Err(TemperError::OutsideSubgroup);
        }
        let mut m = monzo.clone();
        let mut coordinates = vec![BigInt::from(0); self.size()];
        for i in (0..self.size()).rev() {
            let c = self.dual[i].dot(&m);
            if !c.is_integer() {
                return Err(TemperError::FractionalInSubgroup);
            }
            m = m.div(&self.value[i].pow_exact(&c)?)?;
            coordinates[i] = c.to_bigint().map_err(TemperError::from)?;
        }
        if !m.is_unity() {
            return Err(TemperError::OutsideSubgroup);
        }
        Ok(coordinates)
    }

    /// Tolerant projection: round each coordinate to the nearest integer
    /// and return whatever standard-basis residual is left over instead of
    /// failing. The residual multiplied back through the coordinates
    /// reproduces the input exactly.
    pub fn to_smonzo_and_residual(&self, monzo: &TimeMonzo) -> Result<(Vec<BigInt>, TimeMonzo)> {
        let mut m = monzo.clone();
        let mut coordinates = vec![BigInt::from(0); self.size()];
        for i in (0..self.size()).rev() {
            let c = self.dual[i].dot(&m).round_bigint();
            if c != BigInt::from(0) {
                m = m.div(&self.value[i].pow_exact(&Fraction::from_bigint(c.clone()))?)?;
            }
            coordinates[i] = c;
        }
        Ok((coordinates, m))
    }

    /// Combine integer subgroup coordinates back into a standard-basis
    /// monzo.
    pub fn from_subgroup_monzo(&self, coordinates: &[BigInt]) -> Result<TimeMonzo> {
        if coordinates.len() != self.size() {
            return Err(TemperError::BasisMismatch(format!(
                "expected {} coordinates, got {}",
                self.size(),
                coordinates.len()
            )));
        }
        let mut result = TimeMonzo::one(self.num_components);
        for (c, g) in coordinates.iter().zip(self.value.iter()) {
            if *c != BigInt::from(0) {
                result = result.mul(&g.pow_exact(&Fraction::from_bigint(c.clone()))?);
            }
        }
        Ok(result)
    }

    /// Lattice-reduce the generators. `Weighting::None` runs exact rational
    /// LLL on the raw exponent vectors; `Weighting::Tenney` runs float LLL
    /// on log-prime-scaled vectors, mirroring each unimodular step onto the
    /// exact generators. The choice is deterministic on the argument alone.
    pub fn lll(&self, weighting: Weighting) -> Result<Self> {
        let mut vectors: Vec<Vec<Fraction>> = self
            .value
            .iter()
            .map(|m| {
                let mut v = m.clone();
                v.pad_components(self.num_components);
                v.prime_exponents
            })
            .collect();
        match weighting {
            Weighting::None => lll_exact(&mut vectors)?,
            Weighting::Tenney => {
                let weights: Vec<f64> = primes::ln_primes(self.num_components);
                lll_weighted(&mut vectors, &weights)?;
            }
        }
        let generators = vectors
            .into_iter()
            .map(|exponents| TimeMonzo {
                time_exponent: Fraction::zero(),
                prime_exponents: exponents,
                residual: Fraction::one(),
                cents: 0.0,
            })
            .map(|m| normalize_sign(&m))
            .collect::<Result<Vec<_>>>()?;
        Self::new(generators)
    }

    /// Approximate closest-vector pass: walk the generators last to first,
    /// subtracting the rounded projection onto each. The result is
    /// congruent to `monzo` modulo the lattice and usually much simpler.
    pub fn respell(&self, monzo: &TimeMonzo, weighting: Weighting) -> Result<TimeMonzo> {
        let mut m = monzo.clone();
        for i in (0..self.size()).rev() {
            let g = &self.value[i];
            let k = match weighting {
                Weighting::None => {
                    let norm = g.dot(g);
                    if norm.is_zero() {
                        return Err(TemperError::RankDeficient);
                    }
                    m.dot(g).checked_div(&norm).map_err(TemperError::from)?.round_bigint()
                }
                Weighting::Tenney => {
                    let norm = g.weighted_dot(g);
                    if norm == 0.0 {
                        return Err(TemperError::RankDeficient);
                    }
                    BigInt::from((m.weighted_dot(g) / norm).round() as i64)
                }
            };
            if k != BigInt::from(0) {
                m = m.div(&g.pow_exact(&Fraction::from_bigint(k))?)?;
            }
        }
        Ok(m)
    }

    /// Rebase an interval from the standard basis into this one: the value
    /// is unchanged, but its display node becomes a monzo literal in
    /// subgroup coordinates. This is what calling a basis on an interval
    /// means in the surrounding language.
    pub fn rebase_interval(&self, interval: &Interval) -> Result<Interval> {
        let monzo = interval
            .value()
            .as_monzo()
            .ok_or(TemperError::OutsideSubgroup)?;
        let coordinates = self.to_subgroup_monzo(monzo)?;
        Ok(interval.with_subgroup_node(&coordinates, self))
    }

    /// Re-express a val from a foreign basis in this one by reading off its
    /// action on each of our generators.
    pub fn rebase_val(&self, val: &Val) -> Result<Val> {
        let map: Vec<Fraction> = self
            .value
            .iter()
            .map(|g| val.value().dot(g))
            .collect();
        Val::from_basis_map(&map, self.clone())
    }
}

/// Flip a reconstructed lattice vector so it sizes upward (non-negative
/// cents); reduction works modulo signs and upward generators read better.
fn normalize_sign(monzo: &TimeMonzo) -> Result<TimeMonzo> {
    if monzo.total_cents() < 0.0 {
        Ok(monzo.recip()?)
    } else {
        Ok(monzo.clone())
    }
}

/// Exact rational LLL (delta = 3/4) on exponent vectors.
fn lll_exact(vectors: &mut [Vec<Fraction>]) -> Result<()> {
    let n = vectors.len();
    if n <= 1 {
        return Ok(());
    }
    let delta = Fraction::new(3, 4).map_err(TemperError::from)?;
    let mut k = 1usize;
    let mut guard = 0usize;
    while k < n {
        // Size-reduce b_k against b_{k-1}..b_0.
        for j in (0..k).rev() {
            let (_, mu, _) = gram_schmidt_exact(vectors)?;
            let q = mu[k][j].round_bigint();
            if q != BigInt::from(0) {
                let q = Fraction::from_bigint(q);
                let source = vectors[j].clone();
                for (slot, other) in vectors[k].iter_mut().zip(source.iter()) {
                    *slot = &*slot - &(&q * other);
                }
            }
        }
        let (_, mu, norms) = gram_schmidt_exact(vectors)?;
        let threshold = &(&delta - &(&mu[k][k - 1] * &mu[k][k - 1])) * &norms[k - 1];
        if norms[k] >= threshold {
            k += 1;
        } else {
            vectors.swap(k, k - 1);
            k = k.max(2) - 1;
        }
        guard += 1;
        if guard > 10_000 {
            return Err(TemperError::RankDeficient);
        }
    }
    Ok(())
}

/// Exact Gram-Schmidt: returns (b*, mu, squared norms of b*).
#[allow(clippy::type_complexity)]
fn gram_schmidt_exact(
    vectors: &[Vec<Fraction>],
) -> Result<(Vec<Vec<Fraction>>, Vec<Vec<Fraction>>, Vec<Fraction>)> {
    let n = vectors.len();
    let mut bstar: Vec<Vec<Fraction>> = Vec::with_capacity(n);
    let mut mu = vec![vec![Fraction::zero(); n]; n];
    let mut norms = Vec::with_capacity(n);
    for i in 0..n {
        let mut v = vectors[i].clone();
        for j in 0..i {
            let coefficient = dot_exact(&vectors[i], &bstar[j])
                .checked_div(&norms[j])
                .map_err(TemperError::from)?;
            for (slot, other) in v.iter_mut().zip(bstar[j].iter()) {
                *slot = &*slot - &(&coefficient * other);
            }
            mu[i][j] = coefficient;
        }
        let norm = dot_exact(&v, &v);
        if norm.is_zero() {
            return Err(TemperError::RankDeficient);
        }
        norms.push(norm);
        bstar.push(v);
    }
    Ok((bstar, mu, norms))
}

fn dot_exact(a: &[Fraction], b: &[Fraction]) -> Fraction {
    let mut sum = Fraction::zero();
    for (x, y) in a.iter().zip(b.iter()) {
        if !x.is_zero() && !y.is_zero() {
            sum = &sum + &(x * y);
        }
    }
    sum
}

/// Float LLL (delta = 0.99) on weighted views of the exponent vectors,
/// integer steps mirrored onto the exact vectors.
fn lll_weighted(vectors: &mut [Vec<Fraction>], weights: &[f64]) -> Result<()> {
    let n = vectors.len();
    if n <= 1 {
        return Ok(());
    }
    let delta = 0.99f64;
    let mut k = 1usize;
    let mut guard = 0usize;
    while k < n {
        for j in (0..k).rev() {
            let (mu, _) = gram_schmidt_weighted(vectors, weights)?;
            let q = mu[k][j].round();
            if q != 0.0 && q.is_finite() {
                let q = Fraction::from_integer(q as i64);
                let source = vectors[j].clone();
                for (slot, other) in vectors[k].iter_mut().zip(source.iter()) {
                    *slot = &*slot - &(&q * other);
                }
            }
        }
        let (mu, norms) = gram_schmidt_weighted(vectors, weights)?;
        if norms[k] >= (delta - mu[k][k - 1] * mu[k][k - 1]) * norms[k - 1] {
            k += 1;
        } else {
            vectors.swap(k, k - 1);
            k = k.max(2) - 1;
        }
        guard += 1;
        if guard > 10_000 {
            return Err(TemperError::RankDeficient);
        }
    }
    Ok(())
}

/// Weighted Gram-Schmidt in floats: returns (mu, squared norms of b*).
fn gram_schmidt_weighted(
    vectors: &[Vec<Fraction>],
    weights: &[f64],
) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let n = vectors.len();
    let view: Vec<Vec<f64>> = vectors
        .iter()
        .map(|v| {
            v.iter()
                .zip(weights.iter())
                .map(|(e, w)| e.to_f64() * w)
                .collect()
        })
        .collect();
    let mut bstar: Vec<Vec<f64>> = Vec::with_capacity(n);
    let mut mu = vec![vec![0.0; n]; n];
    let mut norms = Vec::with_capacity(n);
    for i in 0..n {
        let mut v = view[i].clone();
        for j in 0..i {
            let coefficient = dot_f64(&view[i], &bstar[j]) / norms[j];
            for (slot, other) in v.iter_mut().zip(bstar[j].iter()) {
                *slot -= coefficient * other;
            }
            mu[i][j] = coefficient;
        }
        let norm = dot_f64(&v, &v);
        if norm == 0.0 || !norm.is_finite() {
            return Err(TemperError::RankDeficient);
        }
        norms.push(norm);
        bstar.push(v);
    }
    Ok((mu, norms))
}

fn dot_f64(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[derive(Serialize, Deserialize)]
struct ValBasisWire {
    #[serde(rename = "type")]
    tag: String,
    value: Vec<TimeMonzo>,
}

impl Serialize for ValBasis {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ValBasisWire {
            tag: "ValBasis".to_string(),
            value: self.value.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValBasis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = ValBasisWire::deserialize(deserializer)?;
        if wire.tag != "ValBasis" {
            return Err(D::Error::custom(format!(
                "expected type \"ValBasis\", got {:?}",
                wire.tag
            )));
        }
        ValBasis::new(wire.value).map_err(D::Error::custom)
    }
}
