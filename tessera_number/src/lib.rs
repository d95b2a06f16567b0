// Tessera exact/inexact musical quantities.
//
// This crate is the numeric foundation of the Tessera tuning engine: the
// dual representation of a musical value as either an exact prime-factorized
// rational (`TimeMonzo`) or an inexact float (`TimeReal`), unified in the
// `TimeQuantity` sum type. The temperament layer (`tessera_temper`) is built
// entirely on top of these types.
//
// Module overview:
// - `fraction.rs`: Arbitrary-precision rational newtype over `BigRational`,
//                  exact roots, continued-fraction approximation, wire form.
// - `primes.rs`:   Prime tables, trial-division factorization, divisors.
// - `monzo.rs`:    `TimeMonzo` — the exact quantity: rational prime
//                  exponents, a residual for untracked factors, a cents
//                  offset, and a time exponent.
// - `real.rs`:     `TimeReal` — the inexact mirror with IEEE semantics.
// - `quantity.rs`: `TimeQuantity` — the closed exact/inexact sum type with
//                  exhaustive dispatch and the promotion policy.
// - `error.rs`:    `NumberError` and the crate `Result` alias.
//
// Design decisions:
// - **Arbitrary precision everywhere.** Exponents and residuals exceed
//   64-bit range by construction; `num-bigint`/`num-rational` back every
//   exact field.
// - **Promotion, not failure.** Operations that cannot stay rational
//   promote to `TimeReal` instead of erroring, except where exactness is
//   structural (`pow_exact`, `geometric_inverse`).
// - **Immutable by convention.** Every operation returns a new value;
//   mutation happens only through an explicit `clone`.

pub mod error;
pub mod fraction;
pub mod monzo;
pub mod primes;
pub mod quantity;
pub mod real;

pub use error::{NumberError, Result};
pub use fraction::Fraction;
pub use monzo::TimeMonzo;
pub use quantity::TimeQuantity;
pub use real::TimeReal;
