// Regular temperaments.
//
// A temperament is an equivalence class of tunings sharing one mapping
// matrix: every comma in the mapping's kernel is declared equal to unison.
// Construction canonicalizes through integer linear algebra. Vals are
// stacked and Hermite-reduced to strip contorsion; comma lists go the other
// way, taking the cokernel of the transposed comma matrix to recover the
// largest mapping annihilating every comma. Either entry point then derives the
// comma basis (kernel of the mapping, Tenney-reduced), the generator
// preimage (rational solutions of `M x = e_j`, respelled simple), and a
// lazily cached least-squares tuning in cents per basis element.
//
// The tuning row always lives in the row space of the mapping, so tempered
// commas come out at zero cents to float precision by construction.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use tessera_number::fraction::Fraction;
use tessera_number::monzo::TimeMonzo;
use tessera_number::primes;
use tessera_number::quantity::TimeQuantity;
use tessera_number::real::TimeReal;

use crate::basis::{ValBasis, Weighting};
use crate::error::{Result, TemperError};
use crate::interval::Interval;
use crate::linalg::{self, Matrix};
use crate::val::Val;

/// How just-intonation targets are weighted during tuning optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TuningMetric {
    /// Optimize over the minimal enclosing prime supergroup when the basis
    /// is not primewise; identical to `Inharmonic` when it is.
    #[default]
    Subgroup,
    /// Weigh each basis element by its literal logarithmic size.
    Inharmonic,
    /// Weigh each basis element by its Tenney height (log of numerator
    /// times denominator).
    TenneyPakkanen,
}

/// Tuning options shared by both temperament constructors.
#[derive(Debug, Clone, Default)]
pub struct TemperamentOptions {
    /// Extra per-basis-element weights multiplied into the metric weights.
    /// Empty means uniform.
    pub weights: Vec<f64>,
    /// Rescale the tuning so the first basis element stays exactly pure.
    pub pure_equaves: bool,
    pub metric: TuningMetric,
}

/// A rank-limited approximation of just intonation over a subgroup basis.
#[derive(Debug)]
pub struct Temperament {
    canonical_mapping: Matrix,
    basis: ValBasis,
    options: TemperamentOptions,
    comma_basis: Option<ValBasis>,
    preimage: ValBasis,
    preimage_coords: Vec<Vec<Fraction>>,
    source_vals: Vec<Val>,
    tuning: OnceLock<(Vec<f64>, f64)>,
}

impl Temperament {
    /// Stack vals over a shared basis, Hermite-reduce, and prune zero rows.
    /// Redundant or contorted val sets collapse to their true rank.
    pub fn from_vals(vals: &[Val], options: TemperamentOptions) -> Result<Self> {
        let Some(first) = vals.first() else {
            return Err(TemperError::RankDeficient);
        };
        let basis = first.basis().clone();
        for val in &vals[1..] {
            if !val.basis().strict_equals(&basis) {
                return Err(TemperError::BasisMismatch(
                    "vals live on different subgroup bases".to_string(),
                ));
            }
        }
        let mut rows: Matrix = Vec::with_capacity(vals.len());
        for val in vals {
            let mut row = Vec::with_capacity(basis.size());
            for coordinate in val.sval() {
                row.push(coordinate.to_bigint().map_err(TemperError::from)?);
            }
            rows.push(row);
        }
        let canonical = linalg::prune_zero_rows(linalg::hnf(rows));
        if canonical.is_empty() {
            return Err(TemperError::RankDeficient);
        }
        Self::derive(canonical, basis, options, vals.to_vec())
    }

    /// The largest temperament sending every given comma to unison. With no
    /// explicit basis the subgroup is inferred from the commas' prime
    /// factorizations; `full_prime_limit` widens it to every prime below
    /// the largest one touched.
    pub fn from_commas(
        commas: &[TimeMonzo],
        basis: Option<ValBasis>,
        full_prime_limit: bool,
        options: TemperamentOptions,
    ) -> Result<Self> {
        if commas.is_empty() {
            return Err(TemperError::RankDeficient);
        }
        let basis = match basis {
            Some(basis) => basis,
            None => infer_basis(commas, full_prime_limit)?,
        };
        let mut rows: Matrix = Vec::with_capacity(commas.len());
        for comma in commas {
            rows.push(basis.to_subgroup_monzo(comma)?);
        }
        let comma_matrix = linalg::prune_zero_rows(linalg::hnf(rows));
        if comma_matrix.is_empty() {
            return Err(TemperError::RankDeficient);
        }
        let mapping = linalg::prune_zero_rows(linalg::hnf(linalg::cokernel(
            &linalg::transpose(&comma_matrix),
        )));
        if mapping.is_empty() {
            return Err(TemperError::RankDeficient);
        }
        let mut temperament = Self::derive(mapping, basis, options, Vec::new())?;
        temperament.source_vals = temperament.supporting_vals(commas);
        Ok(temperament)
    }

    fn derive(
        canonical_mapping: Matrix,
        basis: ValBasis,
        options: TemperamentOptions,
        source_vals: Vec<Val>,
    ) -> Result<Self> {
        if !options.weights.is_empty() && options.weights.len() != basis.size() {
            return Err(TemperError::BasisMismatch(format!(
                "expected {} weights, got {}",
                basis.size(),
                options.weights.len()
            )));
        }
        let kernel_rows = linalg::kernel(&canonical_mapping);
        let comma_basis = if kernel_rows.is_empty() {
            None
        } else {
            let mut generators = Vec::with_capacity(kernel_rows.len());
            for row in &kernel_rows {
                let mut comma = basis.from_subgroup_monzo(row)?;
                if comma.total_cents() < 0.0 {
                    comma = comma.recip().map_err(TemperError::from)?;
                }
                generators.push(comma);
            }
            Some(ValBasis::new(generators)?.lll(Weighting::Tenney)?)
        };

        let mut mapping = canonical_mapping;
        let mut preimage_coords = linalg::preimage(&mapping)?;
        let mut generators = Vec::with_capacity(preimage_coords.len());
        for (j, coords) in preimage_coords.iter_mut().enumerate() {
            let mut generator = combine_coords(&basis, coords)?;
            if let Some(commas) = &comma_basis {
                generator = commas.respell(&generator, Weighting::Tenney)?;
                *coords = fraction_coords(&basis, &generator)?;
            }
            if generator.total_cents() < 0.0 {
                generator = generator.recip().map_err(TemperError::from)?;
                for c in coords.iter_mut() {
                    *c = -&*c;
                }
                for entry in &mut mapping[j] {
                    *entry = -entry.clone();
                }
            }
            generators.push(generator);
        }
        let preimage = ValBasis::new(generators)?;

        Ok(Temperament {
            canonical_mapping: mapping,
            basis,
            options,
            comma_basis,
            preimage,
            preimage_coords,
            source_vals,
            tuning: OnceLock::new(),
        })
    }

    pub fn rank(&self) -> usize {
        self.canonical_mapping.len()
    }

    pub fn mapping(&self) -> &[Vec<BigInt>] {
        &self.canonical_mapping
    }

    pub fn basis(&self) -> &ValBasis {
        &self.basis
    }

    /// Tenney-reduced basis of tempered-out commas; `None` when the
    /// mapping has full rank and tempers nothing out.
    pub fn comma_basis(&self) -> Option<&ValBasis> {
        self.comma_basis.as_ref()
    }

    /// Generator directions, one per mapping row, sign-normalized upward.
    pub fn preimage(&self) -> &ValBasis {
        &self.preimage
    }

    /// The optimized tuning in cents per basis element, computed once.
    pub fn subgroup_mapping(&self) -> &[f64] {
        &self.tuning_and_error().0
    }

    /// Weighted RMS deviation of the optimal tuning from just intonation,
    /// in cents.
    pub fn error_te(&self) -> f64 {
        self.tuning_and_error().1
    }

    /// Tuned generator sizes in cents, one per mapping row.
    pub fn generators(&self) -> Vec<f64> {
        let tuning = self.subgroup_mapping();
        self.preimage_coords
            .iter()
            .map(|coords| {
                coords
                    .iter()
                    .zip(tuning.iter())
                    .map(|(c, s)| c.to_f64() * s)
                    .sum()
            })
            .collect()
    }

    /// Sum of the vals this temperament was built from (derived by a
    /// patent-val walk when it was built from commas): the equal division
    /// that supports the whole temperament, e.g. 12 + 19 giving 31 for
    /// meantone.
    pub fn tune(&self) -> Result<Val> {
        let mut vals = self.source_vals.iter();
        let Some(first) = vals.next() else {
            return Err(TemperError::RankDeficient);
        };
        let mut total = first.clone();
        for val in vals {
            total = total.add(val)?;
        }
        Ok(total)
    }

    /// Replace an exact quantity with its tempered size in cents. Parts
    /// outside the subgroup pass through additively untempered; reals pass
    /// through untouched because they cannot be retuned exactly.
    pub fn temper(&self, quantity: &TimeQuantity) -> Result<TimeQuantity> {
        match quantity {
            TimeQuantity::Real(real) => Ok(TimeQuantity::Real(*real)),
            TimeQuantity::Monzo(monzo) => {
                if !monzo.is_scalar() {
                    return Ok(quantity.clone());
                }
                let (coords, leftover) = self.basis.to_smonzo_and_residual(monzo)?;
                let tuning = self.subgroup_mapping();
                let mut cents = leftover.total_cents();
                for (c, s) in coords.iter().zip(tuning.iter()) {
                    if !c.is_zero() {
                        cents += c.to_f64().unwrap_or(f64::NAN) * s;
                    }
                }
                Ok(TimeQuantity::Real(TimeReal::from_cents(cents)))
            }
        }
    }

    /// Batch entry point for applying the temperament to a scale: each
    /// interval's value is replaced by its tempered equivalent and any
    /// cached spelling is dropped.
    pub fn temper_all(&self, intervals: &[Interval]) -> Result<Vec<Interval>> {
        intervals
            .iter()
            .map(|interval| Ok(interval.with_value(self.temper(interval.value())?)))
            .collect()
    }

    /// Rewrite a monzo as the Tenney-simplest spelling equivalent to it
    /// modulo the tempered-out commas. The result maps to the same steps
    /// under the canonical mapping.
    pub fn respell(&self, monzo: &TimeMonzo) -> Result<TimeMonzo> {
        let (coords, leftover) = self.basis.to_smonzo_and_residual(monzo)?;
        let mut result = TimeMonzo::one(self.basis.num_components());
        for (row, generator) in self
            .canonical_mapping
            .iter()
            .zip(self.preimage.value().iter())
        {
            let steps: BigInt = row
                .iter()
                .zip(coords.iter())
                .map(|(m, c)| m * c)
                .sum();
            if !steps.is_zero() {
                result = result.mul(&generator.pow_exact(&Fraction::from_bigint(steps))?);
            }
        }
        if let Some(commas) = &self.comma_basis {
            result = commas.respell(&result, Weighting::Tenney)?;
        }
        Ok(result.mul(&leftover))
    }

    /// Steps each generator contributes to a monzo: the mapping rows
    /// applied to its rounded subgroup coordinates.
    pub fn mapped_steps(&self, monzo: &TimeMonzo) -> Result<Vec<BigInt>> {
        let (coords, _) = self.basis.to_smonzo_and_residual(monzo)?;
        Ok(self
            .canonical_mapping
            .iter()
            .map(|row| row.iter().zip(coords.iter()).map(|(m, c)| m * c).sum())
            .collect())
    }

    fn tuning_and_error(&self) -> &(Vec<f64>, f64) {
        self.tuning.get_or_init(|| self.optimize())
    }

    /// Weighted least squares against the just-intonation point. The
    /// mapping rows and the target are divided by the metric weights,
    /// combined into one optimal row, then un-weighted back to cents.
    fn optimize(&self) -> (Vec<f64>, f64) {
        let size = self.basis.size();
        let logs: Vec<f64> = self
            .basis
            .value()
            .iter()
            .map(|g| g.total_cents() / 1200.0)
            .collect();

        let (mut tuning, error) = if self.options.metric == TuningMetric::Subgroup
            && !self.basis.is_primewise()
        {
            self.optimize_over_primes(&logs)
        } else {
            let mut weights = Vec::with_capacity(size);
            for (j, log) in logs.iter().enumerate() {
                let mut w = match self.options.metric {
                    TuningMetric::Subgroup | TuningMetric::Inharmonic => *log,
                    TuningMetric::TenneyPakkanen => tenney_height(&self.basis.value()[j], *log),
                };
                if !self.options.weights.is_empty() {
                    w *= self.options.weights[j];
                }
                weights.push(w);
            }
            let maps: Vec<Vec<f64>> = self
                .canonical_mapping
                .iter()
                .map(|row| {
                    row.iter()
                        .zip(weights.iter())
                        .map(|(m, w)| m.to_f64().unwrap_or(f64::NAN) / w)
                        .collect()
                })
                .collect();
            let jip: Vec<f64> = logs
                .iter()
                .zip(weights.iter())
                .map(|(log, w)| 1200.0 * log / w)
                .collect();
            let combined = linalg::combine_tuning_maps(&jip, &maps);
            let error = rms_deviation(&combined, &jip);
            let tuning = combined
                .iter()
                .zip(weights.iter())
                .map(|(t, w)| t * w)
                .collect();
            (tuning, error)
        };

        if self.options.pure_equaves {
            let target = 1200.0 * logs[0];
            if tuning[0] != 0.0 {
                let scale = target / tuning[0];
                for s in &mut tuning {
                    *s *= scale;
                }
            }
        }
        (tuning, error)
    }

    /// Composite or fractional basis elements skew per-element weighting,
    /// so re-derive the optimization over the minimal enclosing prime
    /// supergroup and read the basis tuning off the per-prime result.
    fn optimize_over_primes(&self, logs: &[f64]) -> (Vec<f64>, f64) {
        let count = self.basis.num_components();
        let prime_logs: Vec<f64> = primes::nth_primes(count)
            .iter()
            .map(|&p| (p as f64).log2())
            .collect();
        let mut maps = Vec::with_capacity(self.canonical_mapping.len());
        for row in &self.canonical_mapping {
            let map: Vec<Fraction> = row.iter().map(|m| Fraction::from_bigint(m.clone())).collect();
            let Ok(val) = Val::from_basis_map(&map, self.basis.clone()) else {
                return (vec![f64::NAN; logs.len()], f64::NAN);
            };
            let value = val.value().with_components(count);
            maps.push(
                value
                    .prime_exponents
                    .iter()
                    .zip(prime_logs.iter())
                    .map(|(e, w)| e.to_f64() / w)
                    .collect::<Vec<f64>>(),
            );
        }
        let jip = vec![1200.0; count];
        let combined = linalg::combine_tuning_maps(&jip, &maps);
        let error = rms_deviation(&combined, &jip);
        let prime_tuning: Vec<f64> = combined
            .iter()
            .zip(prime_logs.iter())
            .map(|(t, w)| t * w)
            .collect();
        let tuning = self
            .basis
            .value()
            .iter()
            .map(|g| {
                let padded = g.with_components(count);
                padded
                    .prime_exponents
                    .iter()
                    .zip(prime_tuning.iter())
                    .map(|(e, t)| e.to_f64() * t)
                    .sum()
            })
            .collect();
        (tuning, error)
    }

    /// Walk the generalized-patent-val sequence from zero, collecting vals
    /// that annihilate every comma, until they span the mapping's rank.
    /// The walk is bounded; exotic temperaments supported only by very
    /// large divisions may come back short.
    fn supporting_vals(&self, commas: &[TimeMonzo]) -> Vec<Val> {
        let zero = vec![0i64; self.basis.size()];
        let Ok(mut val) = Val::from_array(&zero, self.basis.clone()) else {
            return Vec::new();
        };
        let mut collected: Vec<Val> = Vec::new();
        let mut rows: Matrix = Vec::new();
        for _ in 0..500 {
            val = match val.next_gpv() {
                Ok(next) => next,
                Err(_) => break,
            };
            if !commas.iter().all(|comma| val.dot(comma).is_zero()) {
                continue;
            }
            let row: Vec<BigInt> = val.sval().iter().map(Fraction::round_bigint).collect();
            let mut candidate = rows.clone();
            candidate.push(row);
            let reduced = linalg::prune_zero_rows(linalg::hnf(candidate));
            if reduced.len() > rows.len() {
                rows = reduced;
                collected.push(val.clone());
            }
            if collected.len() == self.rank() {
                break;
            }
        }
        collected
    }
}

/// The smallest prime subgroup containing every comma.
fn infer_basis(commas: &[TimeMonzo], full_prime_limit: bool) -> Result<ValBasis> {
    let mut used: BTreeSet<usize> = BTreeSet::new();
    for comma in commas {
        if !comma.is_scalar() || comma.cents != 0.0 {
            return Err(TemperError::InvalidBasisElement(
                "commas must be exact scalar ratios".to_string(),
            ));
        }
        let span = comma.prime_span().ok_or_else(|| {
            TemperError::InvalidBasisElement(
                "comma contains a prime beyond the supported table".to_string(),
            )
        })?;
        let padded = comma.with_components(span.max(1));
        for (i, e) in padded.prime_exponents.iter().enumerate() {
            if !e.is_zero() {
                used.insert(i);
            }
        }
    }
    let Some(&widest) = used.iter().next_back() else {
        return Err(TemperError::InvalidBasisElement(
            "commas are all unison".to_string(),
        ));
    };
    if full_prime_limit {
        return ValBasis::standard(widest + 1);
    }
    let generators = used
        .iter()
        .map(|&i| TimeMonzo::from_i64(primes::prime(i) as i64, widest + 1))
        .collect();
    ValBasis::new(generators)
}

/// Multiply out fractional subgroup coordinates into a standard-basis
/// monzo.
fn combine_coords(basis: &ValBasis, coords: &[Fraction]) -> Result<TimeMonzo> {
    let mut result = TimeMonzo::one(basis.num_components());
    for (c, g) in coords.iter().zip(basis.value().iter()) {
        if !c.is_zero() {
            result = result.mul(&g.pow_exact(c)?);
        }
    }
    Ok(result)
}

/// Exact fractional subgroup coordinates of a monzo in the basis's span.
fn fraction_coords(basis: &ValBasis, monzo: &TimeMonzo) -> Result<Vec<Fraction>> {
    let mut m = monzo.clone();
    let mut coords = vec![Fraction::zero(); basis.size()];
    for i in (0..basis.size()).rev() {
        let c = basis.dual()[i].dot(&m);
        if !c.is_zero() {
            m = m.div(&basis.value()[i].pow_exact(&c)?)?;
        }
        coords[i] = c;
    }
    if !m.is_unity() {
        return Err(TemperError::OutsideSubgroup);
    }
    Ok(coords)
}

/// Tenney height in bits; falls back to the literal size for elements
/// without a plain fraction form.
fn tenney_height(monzo: &TimeMonzo, log: f64) -> f64 {
    match monzo.to_fraction() {
        Ok(f) => Fraction::from_bigint(f.numer() * f.denom()).to_f64().log2(),
        Err(_) => log,
    }
}

fn rms_deviation(a: &[f64], b: &[f64]) -> f64 {
    let mean: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        / a.len() as f64;
    mean.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_limit() -> ValBasis {
        ValBasis::standard(3).unwrap()
    }

    fn comma(n: i64, d: i64) -> TimeMonzo {
        TimeMonzo::from_fraction(&Fraction::new(n, d).unwrap(), 3)
    }

    fn meantone_from_vals() -> Temperament {
        let twelve = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        let nineteen = Val::from_array(&[19, 30, 44], five_limit()).unwrap();
        Temperament::from_vals(&[twelve, nineteen], TemperamentOptions::default()).unwrap()
    }

    #[test]
    fn meantone_canonical_mapping() {
        let meantone = meantone_from_vals();
        assert_eq!(meantone.rank(), 2);
        let expected: Matrix = vec![
            vec![BigInt::from(1), BigInt::from(0), BigInt::from(-4)],
            vec![BigInt::from(0), BigInt::from(1), BigInt::from(4)],
        ];
        assert_eq!(meantone.mapping(), expected.as_slice());
    }

    #[test]
    fn combined_vals_tune_to_meantone() {
        let meantone = meantone_from_vals();
        let total = meantone.tune().unwrap();
        assert_eq!(
            total.sval(),
            vec![
                Fraction::from_integer(31),
                Fraction::from_integer(49),
                Fraction::from_integer(72)
            ]
        );
    }

    #[test]
    fn redundant_vals_do_not_inflate_rank() {
        let twelve = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        let doubled = Val::from_array(&[24, 38, 56], five_limit()).unwrap();
        let t = Temperament::from_vals(&[twelve, doubled], TemperamentOptions::default()).unwrap();
        assert_eq!(t.rank(), 1);
    }

    #[test]
    fn commas_and_vals_agree_on_meantone() {
        let from_commas = Temperament::from_commas(
            &[comma(81, 80)],
            Some(five_limit()),
            false,
            TemperamentOptions::default(),
        )
        .unwrap();
        let from_vals = meantone_from_vals();
        assert_eq!(from_commas.mapping(), from_vals.mapping());
    }

    #[test]
    fn comma_basis_recovers_the_comma() {
        let meantone = meantone_from_vals();
        let commas = meantone.comma_basis().unwrap();
        assert_eq!(commas.size(), 1);
        assert!(commas.value()[0].equals(&comma(81, 80).with_components(3)));
    }

    #[test]
    fn tempered_comma_vanishes() {
        let meantone = meantone_from_vals();
        let tempered = meantone
            .temper(&TimeQuantity::Monzo(comma(81, 80)))
            .unwrap();
        assert!(tempered.total_cents().abs() < 1e-6);
    }

    #[test]
    fn te_error_of_meantone() {
        let meantone = meantone_from_vals();
        assert!((meantone.error_te() - 1.58).abs() < 0.05);
    }

    #[test]
    fn optimal_tuning_flattens_the_fifth() {
        let meantone = meantone_from_vals();
        let tuning = meantone.subgroup_mapping();
        assert!((tuning[0] - 1201.4).abs() < 0.1);
        assert!((tuning[1] - 1898.4).abs() < 0.1);
        assert!((tuning[2] - 2788.2).abs() < 0.1);
        let generators = meantone.generators();
        assert_eq!(generators.len(), 2);
        assert!((generators[0] - tuning[0]).abs() < 1e-9);
        assert!((generators[1] - tuning[1]).abs() < 1e-9);
    }

    #[test]
    fn pure_equaves_pin_the_octave() {
        let twelve = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        let options = TemperamentOptions {
            pure_equaves: true,
            ..TemperamentOptions::default()
        };
        let t = Temperament::from_vals(&[twelve], options).unwrap();
        assert!((t.subgroup_mapping()[0] - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn meantone_preimage_generators() {
        let meantone = meantone_from_vals();
        let generators = meantone.preimage().value();
        assert_eq!(generators[0].to_fraction().unwrap(), Fraction::from_integer(2));
        assert_eq!(generators[1].to_fraction().unwrap(), Fraction::from_integer(3));
    }

    #[test]
    fn respell_simplifies_modulo_commas() {
        let meantone = meantone_from_vals();
        let wolf = TimeMonzo::from_fraction(&Fraction::new(8192, 6561).unwrap(), 3);
        let simple = meantone.respell(&wolf).unwrap();
        assert_eq!(simple.to_fraction().unwrap(), Fraction::new(32, 25).unwrap());
        // Already-simple intervals are left alone.
        let fifth = comma(3, 2);
        assert!(meantone.respell(&fifth).unwrap().equals(&fifth.with_components(3)));
    }

    #[test]
    fn comma_construction_derives_supporting_vals() {
        let meantone = Temperament::from_commas(
            &[comma(81, 80)],
            None,
            false,
            TemperamentOptions::default(),
        )
        .unwrap();
        let total = meantone.tune().unwrap();
        assert!(total.dot(&comma(81, 80)).is_zero());
        assert!(total.divisions() > Fraction::zero());
    }

    #[test]
    fn inferred_subgroup_skips_unused_primes() {
        // 64/63 only touches 2, 3, and 7.
        let archy = Temperament::from_commas(
            &[TimeMonzo::from_fraction(&Fraction::new(64, 63).unwrap(), 4)],
            None,
            false,
            TemperamentOptions::default(),
        )
        .unwrap();
        assert_eq!(archy.basis().size(), 3);
        let widened = Temperament::from_commas(
            &[TimeMonzo::from_fraction(&Fraction::new(64, 63).unwrap(), 4)],
            None,
            true,
            TemperamentOptions::default(),
        )
        .unwrap();
        assert_eq!(widened.basis().size(), 4);
    }

    #[test]
    fn composite_subgroup_uses_the_prime_supergroup() {
        let basis = ValBasis::new(vec![
            TimeMonzo::from_i64(2, 3),
            TimeMonzo::from_i64(9, 3),
            TimeMonzo::from_i64(5, 3),
        ])
        .unwrap();
        let val = Val::from_array(&[12, 38, 28], basis).unwrap();
        let t = Temperament::from_vals(&[val], TemperamentOptions::default()).unwrap();
        let tuning = t.subgroup_mapping();
        assert!((tuning[0] - 1200.0).abs() < 10.0);
        // A rank-1 tuning is a single scaled row, so ratios are exact.
        assert!((tuning[1] / tuning[0] - 38.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn mapped_steps_count_generators() {
        let meantone = meantone_from_vals();
        // A fifth is one octave down, one twelfth up.
        let steps = meantone.mapped_steps(&comma(3, 2)).unwrap();
        assert_eq!(steps, vec![BigInt::from(-1), BigInt::from(1)]);
        // The comma maps to zero steps everywhere.
        let vanished = meantone.mapped_steps(&comma(81, 80)).unwrap();
        assert!(vanished.iter().all(|s| s == &BigInt::from(0)));
    }

    #[test]
    fn reals_pass_through_untempered() {
        let meantone = meantone_from_vals();
        let real = TimeQuantity::Real(TimeReal::from_cents(701.955));
        let out = meantone.temper(&real).unwrap();
        assert!(out.strict_equals(&real));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(matches!(
            Temperament::from_vals(&[], TemperamentOptions::default()),
            Err(TemperError::RankDeficient)
        ));
        assert!(matches!(
            Temperament::from_commas(&[], None, false, TemperamentOptions::default()),
            Err(TemperError::RankDeficient)
        ));
    }
}
