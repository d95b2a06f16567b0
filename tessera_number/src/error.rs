// Error types for exact quantity arithmetic.
//
// Every failure in this crate is a synchronous, message-carrying error with
// no recovery path: a failed operation leaves both operands untouched. The
// inexact (`TimeReal`) code paths deliberately do not use these — they follow
// IEEE semantics and propagate NaN/infinity instead of erroring.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberError {
    #[error("Fraction denominator is zero")]
    ZeroDenominator,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Can't reduce by a unison-equivalent equave")]
    DegenerateReduction,

    #[error("Result is irrational where an exact value is required")]
    IrrationalExact,

    #[error("Value is not representable: {0}")]
    NotRepresentable(String),
}

pub type Result<T> = std::result::Result<T, NumberError>;
