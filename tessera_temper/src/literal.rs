// Literal AST nodes.
//
// The surrounding language parses source text into these tagged shapes and
// hands them to the core; the core converts them to quantities and renders
// them back to text for display. Numbers travel as decimal strings so
// literals beyond 64-bit range survive the trip. FJS spellings are carried
// opaquely: the notation layer owns their meaning, the core only caches and
// invalidates them.

use std::fmt;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use tessera_number::fraction::Fraction;
use tessera_number::monzo::TimeMonzo;
use tessera_number::quantity::TimeQuantity;

/// One parsed literal. `Aspiring` variants are placeholders whose concrete
/// spelling depends on a context the core does not own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntervalLiteral {
    Integer {
        value: String,
    },
    Fraction {
        numerator: String,
        denominator: String,
    },
    Decimal {
        value: String,
    },
    Cents {
        value: f64,
    },
    Nedji {
        steps: i64,
        divisions: i64,
        equave_numerator: Option<i64>,
        equave_denominator: Option<i64>,
    },
    Monzo {
        components: Vec<String>,
        basis: Vec<String>,
    },
    Val {
        components: Vec<String>,
        basis: Vec<String>,
    },
    AspiringFjs {
        flavor: String,
    },
    AspiringAbsoluteFjs {
        flavor: String,
    },
}

impl IntervalLiteral {
    pub fn from_bigint(value: &BigInt) -> Self {
        IntervalLiteral::Integer {
            value: value.to_string(),
        }
    }

    /// Integer literal when the denominator is one, fraction otherwise.
    pub fn from_fraction(value: &Fraction) -> Self {
        if value.is_integer() {
            Self::from_bigint(value.numer())
        } else {
            IntervalLiteral::Fraction {
                numerator: value.numer().to_string(),
                denominator: value.denom().to_string(),
            }
        }
    }

    pub fn from_cents(value: f64) -> Self {
        IntervalLiteral::Cents { value }
    }

    pub fn nedji(steps: i64, divisions: i64, equave: Option<&Fraction>) -> Self {
        IntervalLiteral::Nedji {
            steps,
            divisions,
            equave_numerator: equave.and_then(|e| Fraction::from_bigint(e.numer().clone()).to_i64()),
            equave_denominator: equave.and_then(|e| Fraction::from_bigint(e.denom().clone()).to_i64()),
        }
    }

    pub fn monzo(components: &[Fraction], basis: Vec<String>) -> Self {
        IntervalLiteral::Monzo {
            components: components.iter().map(|c| c.to_string()).collect(),
            basis,
        }
    }

    /// True for spellings that need a context to realize.
    pub fn is_aspiring(&self) -> bool {
        matches!(
            self,
            IntervalLiteral::AspiringFjs { .. } | IntervalLiteral::AspiringAbsoluteFjs { .. }
        )
    }

    /// The quantity a literal denotes, if it denotes one on its own.
    /// Val vectors and aspiring spellings return `None`: the former build
    /// vals, the latter need a context.
    pub fn to_quantity(&self, num_components: usize) -> Option<TimeQuantity> {
        match self {
            IntervalLiteral::Integer { value } => {
                let n: BigInt = value.parse().ok()?;
                Some(TimeQuantity::Monzo(TimeMonzo::from_bigint(&n, num_components)))
            }
            IntervalLiteral::Fraction {
                numerator,
                denominator,
            } => {
                let n: BigInt = numerator.parse().ok()?;
                let d: BigInt = denominator.parse().ok()?;
                let f = Fraction::from_bigints(n, d).ok()?;
                Some(TimeQuantity::Monzo(TimeMonzo::from_fraction(&f, num_components)))
            }
            IntervalLiteral::Decimal { value } => {
                let f = parse_decimal(value)?;
                Some(TimeQuantity::Monzo(TimeMonzo::from_fraction(&f, num_components)))
            }
            IntervalLiteral::Cents { value } => {
                Some(TimeQuantity::Monzo(TimeMonzo::from_cents(*value, num_components)))
            }
            IntervalLiteral::Nedji {
                steps,
                divisions,
                equave_numerator,
                equave_denominator,
            } => {
                let fraction = Fraction::new(*steps, *divisions).ok()?;
                let equave = Fraction::new(
                    equave_numerator.unwrap_or(2),
                    equave_denominator.unwrap_or(1),
                )
                .ok()?;
                TimeMonzo::from_equal_temperament(&fraction, &equave, num_components)
                    .ok()
                    .map(TimeQuantity::Monzo)
            }
            IntervalLiteral::Monzo { components, basis } => {
                let exponents: Option<Vec<Fraction>> =
                    components.iter().map(|c| parse_fraction(c)).collect();
                let exponents = exponents?;
                if basis.is_empty() {
                    let mut monzo = TimeMonzo::one(num_components.max(exponents.len()));
                    for (slot, e) in monzo.prime_exponents.iter_mut().zip(exponents.iter()) {
                        *slot = e.clone();
                    }
                    return Some(TimeQuantity::Monzo(monzo));
                }
                let mut result = TimeMonzo::one(num_components);
                for (name, e) in basis.iter().zip(exponents.iter()) {
                    let generator =
                        TimeMonzo::from_fraction(&parse_fraction(name)?, num_components);
                    result = result.mul(&generator.pow_exact(e).ok()?);
                }
                Some(TimeQuantity::Monzo(result))
            }
            IntervalLiteral::Val { .. }
            | IntervalLiteral::AspiringFjs { .. }
            | IntervalLiteral::AspiringAbsoluteFjs { .. } => None,
        }
    }
}

/// "81", "-4", "1/2".
fn parse_fraction(text: &str) -> Option<Fraction> {
    match text.split_once('/') {
        Some((n, d)) => {
            let n: BigInt = n.trim().parse().ok()?;
            let d: BigInt = d.trim().parse().ok()?;
            Fraction::from_bigints(n, d).ok()
        }
        None => {
            let n: BigInt = text.trim().parse().ok()?;
            Some(Fraction::from_bigint(n))
        }
    }
}

/// "1.5" as the exact fraction 3/2.
fn parse_decimal(text: &str) -> Option<Fraction> {
    let negative = text.starts_with('-');
    let digits = text.trim_start_matches('-');
    let (whole, fractional) = digits.split_once('.').unwrap_or((digits, ""));
    let scale = BigInt::from(10).pow(fractional.len() as u32);
    let mut numer: BigInt = format!("{whole}{fractional}").parse().ok()?;
    if negative {
        numer = -numer;
    }
    Fraction::from_bigints(numer, scale).ok()
}

impl fmt::Display for IntervalLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalLiteral::Integer { value } => write!(f, "{value}"),
            IntervalLiteral::Fraction {
                numerator,
                denominator,
            } => write!(f, "{numerator}/{denominator}"),
            IntervalLiteral::Decimal { value } => write!(f, "{value}"),
            IntervalLiteral::Cents { value } => write!(f, "{value}c"),
            IntervalLiteral::Nedji {
                steps,
                divisions,
                equave_numerator,
                equave_denominator,
            } => match (equave_numerator, equave_denominator) {
                (Some(n), Some(d)) if *d != 1 => write!(f, "{steps}\\{divisions}<{n}/{d}>"),
                (Some(n), _) => write!(f, "{steps}\\{divisions}<{n}>"),
                _ => write!(f, "{steps}\\{divisions}"),
            },
            IntervalLiteral::Monzo { components, basis } => {
                write!(f, "[{}>", components.join(" "))?;
                if !basis.is_empty() {
                    write!(f, "@{}", basis.join("."))?;
                }
                Ok(())
            }
            IntervalLiteral::Val { components, basis } => {
                write!(f, "<{}]", components.join(" "))?;
                if !basis.is_empty() {
                    write!(f, "@{}", basis.join("."))?;
                }
                Ok(())
            }
            IntervalLiteral::AspiringFjs { flavor }
            | IntervalLiteral::AspiringAbsoluteFjs { flavor } => write!(f, "{flavor}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_fraction_literals_round_trip() {
        let literal = IntervalLiteral::from_fraction(&Fraction::new(81, 80).unwrap());
        assert_eq!(literal.to_string(), "81/80");
        let q = literal.to_quantity(3).unwrap();
        assert_eq!(q.to_fraction().unwrap(), Fraction::new(81, 80).unwrap());
        let whole = IntervalLiteral::from_fraction(&Fraction::from_integer(12));
        assert_eq!(whole.to_string(), "12");
    }

    #[test]
    fn huge_integer_literal_survives() {
        let literal = IntervalLiteral::Integer {
            value: "4522822787109375".to_string(),
        };
        let q = literal.to_quantity(4).unwrap();
        assert_eq!(
            q.to_fraction().unwrap().to_string(),
            "4522822787109375"
        );
    }

    #[test]
    fn decimal_literal_is_exact() {
        let literal = IntervalLiteral::Decimal {
            value: "1.5".to_string(),
        };
        let q = literal.to_quantity(3).unwrap();
        assert_eq!(q.to_fraction().unwrap(), Fraction::new(3, 2).unwrap());
    }

    #[test]
    fn nedji_literal_builds_equal_steps() {
        let literal = IntervalLiteral::Nedji {
            steps: 7,
            divisions: 12,
            equave_numerator: None,
            equave_denominator: None,
        };
        assert_eq!(literal.to_string(), "7\\12");
        let q = literal.to_quantity(3).unwrap();
        assert!((q.total_cents() - 700.0).abs() < 1e-9);
    }

    #[test]
    fn subgroup_monzo_literal_multiplies_out() {
        let literal = IntervalLiteral::Monzo {
            components: vec!["1".to_string(), "-1".to_string()],
            basis: vec!["81".to_string(), "80".to_string()],
        };
        assert_eq!(literal.to_string(), "[1 -1>@81.80");
        let q = literal.to_quantity(3).unwrap();
        assert_eq!(q.to_fraction().unwrap(), Fraction::new(81, 80).unwrap());
    }

    #[test]
    fn aspiring_literals_defer() {
        let literal = IntervalLiteral::AspiringFjs {
            flavor: "M3^5".to_string(),
        };
        assert!(literal.is_aspiring());
        assert!(literal.to_quantity(3).is_none());
    }

    #[test]
    fn json_keeps_the_tag() {
        let literal = IntervalLiteral::Cents { value: 701.955 };
        let json = serde_json::to_string(&literal).unwrap();
        assert!(json.contains("\"type\":\"Cents\""));
        let back: IntervalLiteral = serde_json::from_str(&json).unwrap();
        assert_eq!(literal, back);
    }
}
