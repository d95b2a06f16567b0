// Vals: linear maps from a subgroup to equal-temperament steps.
//
// A val assigns a (usually integer) step count to each generator of a
// subgroup basis; extended linearly it maps every interval of the subgroup
// to a number of steps. We store the val as a formal monzo in the dual
// space, so applying it to an interval is a plain `dot` and vals over
// fractional subgroups come out exact with no special casing.
//
// The stored monzo is recovered from a step map by walking the basis in
// ascending order and correcting with dual vectors. Each correction is
// exact because `dual[i]` annihilates every earlier generator.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use tessera_number::fraction::Fraction;
use tessera_number::monzo::TimeMonzo;

use crate::basis::ValBasis;
use crate::error::{Result, TemperError};

/// A step mapping over a subgroup basis.
#[derive(Debug, Clone)]
pub struct Val {
    value: TimeMonzo,
    basis: ValBasis,
}

impl Val {
    /// Build a val from integer steps per basis element.
    pub fn from_array(map: &[i64], basis: ValBasis) -> Result<Self> {
        let map: Vec<Fraction> = map.iter().map(|&n| Fraction::from_integer(n)).collect();
        Self::from_basis_map(&map, basis)
    }

    /// Build a val from (possibly fractional) steps per basis element.
    pub fn from_basis_map(map: &[Fraction], basis: ValBasis) -> Result<Self> {
        if map.len() != basis.size() {
            return Err(TemperError::BasisMismatch(format!(
                "expected {} map entries, got {}",
                basis.size(),
                map.len()
            )));
        }
        let mut value = TimeMonzo::one(basis.num_components());
        for (i, target) in map.iter().enumerate() {
            let delta = target - &value.dot(&basis.value()[i]);
            if !delta.is_zero() {
                value = value.mul(&basis.dual()[i].pow_exact(&delta)?);
            }
        }
        Ok(Val { value, basis })
    }

    /// Wrap an already-built cologarithmic monzo, e.g. the geometric
    /// inverse of a logarithmic interval.
    pub fn from_parts(value: TimeMonzo, basis: ValBasis) -> Self {
        Val { value, basis }
    }

    /// The patent val of `divisions` equal steps per first basis element:
    /// every generator maps to its nearest step count.
    pub fn patent(divisions: i64, basis: ValBasis) -> Result<Self> {
        let equave_log = basis.value()[0].total_cents() / 1200.0;
        let map: Vec<i64> = basis
            .value()
            .iter()
            .map(|g| {
                (divisions as f64 * (g.total_cents() / 1200.0) / equave_log).round() as i64
            })
            .collect();
        Self::from_array(&map, basis)
    }

    pub fn value(&self) -> &TimeMonzo {
        &self.value
    }

    pub fn basis(&self) -> &ValBasis {
        &self.basis
    }

    /// Steps assigned to each basis element.
    pub fn sval(&self) -> Vec<Fraction> {
        self.basis
            .value()
            .iter()
            .map(|g| self.value.dot(g))
            .collect()
    }

    /// Steps to the first basis element, conventionally the equave.
    pub fn divisions(&self) -> Fraction {
        self.value.dot(&self.basis.value()[0])
    }

    /// Steps this val assigns to a monzo.
    pub fn dot(&self, monzo: &TimeMonzo) -> Fraction {
        self.value.dot(monzo)
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_basis(other)?;
        Ok(Val {
            value: self.value.mul(&other.value),
            basis: self.basis.clone(),
        })
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.check_basis(other)?;
        Ok(Val {
            value: self.value.div(&other.value).map_err(TemperError::from)?,
            basis: self.basis.clone(),
        })
    }

    /// Scale the val by a rational factor.
    pub fn scale(&self, factor: &Fraction) -> Result<Self> {
        Ok(Val {
            value: self.value.pow_exact(factor)?,
            basis: self.basis.clone(),
        })
    }

    /// Divide the val by a rational factor.
    pub fn divide(&self, factor: &Fraction) -> Result<Self> {
        self.scale(&factor.recip().map_err(TemperError::from)?)
    }

    /// Alignment of two vals: the inner product of their step maps.
    pub fn dot_val(&self, other: &Self) -> Result<Fraction> {
        self.check_basis(other)?;
        let mut sum = Fraction::zero();
        for (a, b) in self.sval().iter().zip(other.sval().iter()) {
            sum = &sum + &(a * b);
        }
        Ok(sum)
    }

    /// The val-vector literal for display, e.g. `<12 19 28]`. The subgroup
    /// tail is omitted for standard prime bases.
    pub fn to_literal(&self) -> crate::literal::IntervalLiteral {
        let standard = ValBasis::standard(self.basis.size())
            .map(|s| s.strict_equals(&self.basis))
            .unwrap_or(false);
        let basis = if standard {
            Vec::new()
        } else {
            self.basis
                .value()
                .iter()
                .filter_map(|g| g.to_fraction().ok())
                .map(|f| f.to_string())
                .collect()
        };
        crate::literal::IntervalLiteral::Val {
            components: self.sval().iter().map(|c| c.to_string()).collect(),
            basis,
        }
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.basis.strict_equals(&other.basis) && self.value.equals(&other.value)
    }

    pub fn strict_equals(&self, other: &Self) -> bool {
        self.basis.strict_equals(&other.basis) && self.value.strict_equals(&other.value)
    }

    /// Tenney-Euclid error of this val against just intonation, in cents.
    /// The optimal stretch is applied first, so a pure-octaves val is not
    /// penalized for its overall scale.
    pub fn error_te(&self) -> f64 {
        let map = self.sval();
        let mut x = Vec::with_capacity(map.len());
        for (steps, g) in map.iter().zip(self.basis.value().iter()) {
            let log = g.total_cents() / 1200.0;
            x.push(steps.to_f64() / log);
        }
        let sum: f64 = x.iter().sum();
        let sum_sq: f64 = x.iter().map(|v| v * v).sum();
        if sum_sq == 0.0 {
            return f64::INFINITY;
        }
        let stretch = sum / sum_sq;
        let mean_sq: f64 = x
            .iter()
            .map(|v| {
                let deviation = stretch * v - 1.0;
                deviation * deviation
            })
            .sum::<f64>()
            / x.len() as f64;
        1200.0 * mean_sq.sqrt()
    }

    /// The next val in the generalized-patent-val sequence: of all unit
    /// increments to a single coordinate, the one with the least TE error.
    pub fn next_gpv(&self) -> Result<Self> {
        let map = self.sval();
        if map.iter().all(|c| c.is_zero()) {
            let mut incremented = map;
            incremented[0] = Fraction::one();
            return Self::from_basis_map(&incremented, self.basis.clone());
        }
        let mut best: Option<(f64, Val)> = None;
        for i in 0..map.len() {
            let mut candidate = map.clone();
            candidate[i] = &candidate[i] + &Fraction::one();
            let val = Self::from_basis_map(&candidate, self.basis.clone())?;
            let error = val.error_te();
            if best.as_ref().is_none_or(|(e, _)| error < *e) {
                best = Some((error, val));
            }
        }
        // The basis is non-empty, so at least one candidate exists.
        best.map(|(_, v)| v).ok_or(TemperError::RankDeficient)
    }

    fn check_basis(&self, other: &Self) -> Result<()> {
        if self.basis.strict_equals(&other.basis) {
            Ok(())
        } else {
            Err(TemperError::BasisMismatch(
                "vals live on different subgroup bases".to_string(),
            ))
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ValWire {
    #[serde(rename = "type")]
    tag: String,
    value: TimeMonzo,
    basis: ValBasis,
}

impl Serialize for Val {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ValWire {
            tag: "Val".to_string(),
            value: self.value.clone(),
            basis: self.basis.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Val {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = ValWire::deserialize(deserializer)?;
        if wire.tag != "Val" {
            return Err(D::Error::custom(format!(
                "expected type \"Val\", got {:?}",
                wire.tag
            )));
        }
        Ok(Val {
            value: wire.value,
            basis: wire.basis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_limit() -> ValBasis {
        ValBasis::standard(3).unwrap()
    }

    fn frac(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d).unwrap()
    }

    #[test]
    fn from_array_round_trips_through_sval() {
        let val = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        let sval = val.sval();
        assert_eq!(sval[0], Fraction::from_integer(12));
        assert_eq!(sval[1], Fraction::from_integer(19));
        assert_eq!(sval[2], Fraction::from_integer(28));
        assert_eq!(val.divisions(), Fraction::from_integer(12));
    }

    #[test]
    fn twelve_tempers_out_the_syntonic_comma() {
        let val = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        let comma = TimeMonzo::from_fraction(&frac(81, 80), 3);
        assert!(val.dot(&comma).is_zero());
        let fifth = TimeMonzo::from_fraction(&frac(3, 2), 3);
        assert_eq!(val.dot(&fifth), Fraction::from_integer(7));
    }

    #[test]
    fn patent_val_of_31() {
        let val = Val::patent(31, five_limit()).unwrap();
        assert_eq!(
            val.sval(),
            vec![
                Fraction::from_integer(31),
                Fraction::from_integer(49),
                Fraction::from_integer(72)
            ]
        );
    }

    #[test]
    fn fractional_map_on_composite_subgroup() {
        // 2.9.5 subgroup: 12edo maps 9 to 38 steps (twice the 19 of 3).
        let basis = ValBasis::new(vec![
            TimeMonzo::from_i64(2, 3),
            TimeMonzo::from_i64(9, 3),
            TimeMonzo::from_i64(5, 3),
        ])
        .unwrap();
        let val = Val::from_array(&[12, 38, 28], basis).unwrap();
        // The induced action on the bare prime 3 is fractional but exact.
        let three = TimeMonzo::from_i64(3, 3);
        assert_eq!(val.dot(&three), Fraction::from_integer(19));
        let half_octave = Val::from_basis_map(
            &[frac(25, 2), frac(39, 1), frac(29, 1)],
            ValBasis::new(vec![
                TimeMonzo::from_i64(2, 3),
                TimeMonzo::from_i64(9, 3),
                TimeMonzo::from_i64(5, 3),
            ])
            .unwrap(),
        )
        .unwrap();
        assert_eq!(half_octave.divisions(), frac(25, 2));
    }

    #[test]
    fn val_arithmetic_adds_componentwise() {
        let a = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        let b = Val::from_array(&[19, 30, 44], five_limit()).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(
            sum.sval(),
            vec![
                Fraction::from_integer(31),
                Fraction::from_integer(49),
                Fraction::from_integer(72)
            ]
        );
        let diff = sum.sub(&b).unwrap();
        assert!(diff.strict_equals(&a));
        let doubled = a.scale(&Fraction::from_integer(2)).unwrap();
        assert_eq!(doubled.divisions(), Fraction::from_integer(24));
        let halved = doubled.divide(&Fraction::from_integer(2)).unwrap();
        assert!(halved.strict_equals(&a));
        assert_eq!(
            a.dot_val(&b).unwrap(),
            Fraction::from_integer(12 * 19 + 19 * 30 + 28 * 44)
        );
    }

    #[test]
    fn literal_display() {
        let val = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        assert_eq!(val.to_literal().to_string(), "<12 19 28]");
        let basis = ValBasis::new(vec![
            TimeMonzo::from_i64(2, 3),
            TimeMonzo::from_i64(9, 3),
        ])
        .unwrap();
        let composite = Val::from_array(&[12, 38], basis).unwrap();
        assert_eq!(composite.to_literal().to_string(), "<12 38]@2.9");
    }

    #[test]
    fn te_error_ranks_twelve_above_thirteen() {
        let twelve = Val::patent(12, five_limit()).unwrap();
        let thirteen = Val::patent(13, five_limit()).unwrap();
        assert!(twelve.error_te() < thirteen.error_te());
        assert!(twelve.error_te() > 0.0);
    }

    #[test]
    fn gpv_walk_passes_through_known_vals() {
        // Walking from <12 19 28] the next generalized patent val raises
        // the mapping of 5 first.
        let twelve = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        let next = twelve.next_gpv().unwrap();
        assert_eq!(
            next.sval(),
            vec![
                Fraction::from_integer(12),
                Fraction::from_integer(19),
                Fraction::from_integer(29)
            ]
        );
        let zero = Val::from_array(&[0, 0, 0], five_limit()).unwrap();
        let first = zero.next_gpv().unwrap();
        assert_eq!(first.divisions(), Fraction::one());
    }

    #[test]
    fn mismatched_bases_are_rejected() {
        let a = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        let b = Val::from_array(&[12, 19], ValBasis::standard(2).unwrap()).unwrap();
        assert!(matches!(a.add(&b), Err(TemperError::BasisMismatch(_))));
    }

    #[test]
    fn json_round_trip() {
        let val = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
        let json = serde_json::to_string(&val).unwrap();
        let back: Val = serde_json::from_str(&json).unwrap();
        assert!(val.strict_equals(&back));
    }
}
