// Error types for the algebraic layer.
//
// Wraps the numeric crate's errors and adds the failure modes introduced by
// domains, subgroups, and integer linear algebra. As in `tessera_number`,
// every error is synchronous, carries a human-readable message, and leaves
// its operands untouched.

use thiserror::Error;

use tessera_number::NumberError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemperError {
    #[error(transparent)]
    Number(#[from] NumberError),

    #[error("Domain mismatch: {0}")]
    DomainMismatch(String),

    #[error("Step count would become fractional")]
    NonIntegralSteps,

    #[error("Monzo is fractional inside subgroup")]
    FractionalInSubgroup,

    #[error("Monzo outside subgroup")]
    OutsideSubgroup,

    #[error("Basis mismatch: {0}")]
    BasisMismatch(String),

    #[error("Invalid basis element: {0}")]
    InvalidBasisElement(String),

    #[error("Mapping is rank deficient")]
    RankDeficient,
}

pub type Result<T> = std::result::Result<T, TemperError>;
