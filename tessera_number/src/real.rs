// TimeReal: the inexact musical quantity.
//
// Mirror of `TimeMonzo` in plain floating point, used for irrational results
// (non-rational powers, logarithms of incommensurate intervals), NaN, and
// infinities. Where the exact path raises errors, this path follows IEEE
// semantics and lets NaN/infinity propagate: the asymmetry is deliberate and
// pinned by tests (see `reduce`).

use std::cmp::Ordering;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An inexact musical quantity: a linear magnitude and a time exponent
/// (0 = ratio, -1 = frequency, +1 = duration).
#[derive(Clone, Copy, Debug)]
pub struct TimeReal {
    pub time_exponent: f64,
    pub value: f64,
}

impl TimeReal {
    pub fn scalar(value: f64) -> Self {
        TimeReal {
            time_exponent: 0.0,
            value,
        }
    }

    /// A pure logarithmic offset: `2^(cents/1200)`.
    pub fn from_cents(cents: f64) -> Self {
        Self::scalar((cents / 1200.0).exp2())
    }

    pub fn is_scalar(&self) -> bool {
        self.time_exponent == 0.0
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    /// Logarithmic magnitude in cents of the absolute value.
    /// NaN for NaN input, -inf for zero, NaN for negative values' logs are
    /// avoided by taking the absolute value first.
    pub fn total_cents(&self) -> f64 {
        self.value.abs().log2() * 1200.0
    }

    pub fn mul(&self, other: &Self) -> Self {
        TimeReal {
            time_exponent: self.time_exponent + other.time_exponent,
            value: self.value * other.value,
        }
    }

    pub fn div(&self, other: &Self) -> Self {
        TimeReal {
            time_exponent: self.time_exponent - other.time_exponent,
            value: self.value / other.value,
        }
    }

    pub fn recip(&self) -> Self {
        TimeReal {
            time_exponent: -self.time_exponent,
            value: self.value.recip(),
        }
    }

    pub fn neg(&self) -> Self {
        TimeReal {
            time_exponent: self.time_exponent,
            value: -self.value,
        }
    }

    pub fn abs(&self) -> Self {
        TimeReal {
            time_exponent: self.time_exponent,
            value: self.value.abs(),
        }
    }

    pub fn pow(&self, exponent: f64) -> Self {
        TimeReal {
            time_exponent: self.time_exponent * exponent,
            value: self.value.powf(exponent),
        }
    }

    /// Reduce into `[1, equave)`. A unison-equivalent or otherwise degenerate
    /// equave yields NaN rather than an error — the inexact counterpart of
    /// `TimeMonzo::reduce` throwing.
    pub fn reduce(&self, equave: &Self) -> Self {
        let mut e = equave.value.abs();
        if e == 1.0 || e == 0.0 || !e.is_finite() {
            return TimeReal {
                time_exponent: self.time_exponent,
                value: f64::NAN,
            };
        }
        if e < 1.0 {
            e = e.recip();
        }
        let steps = (self.value.abs().ln() / e.ln()).floor();
        let mut value = self.value / e.powf(steps);
        // Correct float drift at the boundaries. NaN skips both loops.
        while value.abs() < 1.0 {
            value *= e;
        }
        while value.abs() >= e {
            value /= e;
        }
        TimeReal {
            time_exponent: self.time_exponent,
            value,
        }
    }

    /// Floored modulo: the result follows the sign of `other`.
    /// A zero modulus yields NaN per IEEE arithmetic.
    pub fn mmod(&self, other: &Self) -> Self {
        TimeReal {
            time_exponent: self.time_exponent,
            value: self.value - other.value * (self.value / other.value).floor(),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        TimeReal {
            time_exponent: self.time_exponent,
            value: self.value + other.value,
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        TimeReal {
            time_exponent: self.time_exponent,
            value: self.value - other.value,
        }
    }

    /// Numeric comparison; NaN compares as equal (no ordering exists).
    pub fn compare(&self, other: &Self) -> Ordering {
        self.value
            .partial_cmp(&other.value)
            .unwrap_or(Ordering::Equal)
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.time_exponent == other.time_exponent && self.value == other.value
    }

    /// Representation-level equality: same fields bit-for-bit sign and all.
    /// NaN never strictly equals anything, itself included.
    pub fn strict_equals(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

#[derive(Serialize, Deserialize)]
struct TimeRealWire {
    #[serde(rename = "type")]
    tag: String,
    #[serde(rename = "timeExponent")]
    time_exponent: f64,
    value: f64,
}

impl Serialize for TimeReal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        TimeRealWire {
            tag: "TimeReal".to_string(),
            time_exponent: self.time_exponent,
            value: self.value,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TimeReal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = TimeRealWire::deserialize(deserializer)?;
        if wire.tag != "TimeReal" {
            return Err(D::Error::custom(format!(
                "expected type \"TimeReal\", got {:?}",
                wire.tag
            )));
        }
        Ok(TimeReal {
            time_exponent: wire.time_exponent,
            value: wire.value,
        })
    }
}
