// Tessera temperament algebra.
//
// The algebraic layer of the Tessera tuning engine, built on the quantities
// in `tessera_number`: domain-tagged intervals, just-intonation subgroup
// bases, vals, and regular temperaments with optimized tunings.
//
// Module overview:
// - `interval.rs`:    `Interval` — linear/logarithmic domain dispatch,
//                     integer step tracking, cached display literals.
// - `literal.rs`:     The closed set of literal AST shapes exchanged with
//                     the surrounding language.
// - `context.rs`:     `RootContext` — interpreter-owned reference pitch and
//                     step sizes the core reads during node realization.
// - `basis.rs`:       `ValBasis` — subgroup bases with Gram-Schmidt duals,
//                     coordinate conversion, LLL reduction, respelling.
// - `val.rs`:         `Val` — step mappings over a basis, patent vals, TE
//                     error, the generalized-patent-val walk.
// - `temperament.rs`: `Temperament` — HNF-canonicalized mappings, comma
//                     bases, generator preimages, least-squares tunings.
// - `linalg.rs`:      Integer/rational matrix primitives: HNF, kernel,
//                     cokernel, preimage, weighted least squares.
// - `error.rs`:       `TemperError` and the crate `Result` alias.
//
// Design decisions:
// - **Exact until the last step.** Coordinates, duals, and preimages stay
//   in big rationals; floats appear only in tuning optimization and
//   Tenney-weighted heuristics.
// - **Canonical forms.** Mappings are Hermite-reduced on construction, so
//   equal temperaments compare equal whatever vals or commas built them.
// - **Deterministic algorithm choice.** Lattice reduction runs the exact
//   path or the Tenney-weighted float path strictly by the caller's
//   weighting argument; there is no silent fallback between them.

pub mod basis;
pub mod context;
pub mod error;
pub mod interval;
pub mod linalg;
pub mod literal;
pub mod temperament;
pub mod val;

pub use basis::{ValBasis, Weighting};
pub use context::RootContext;
pub use error::{Result, TemperError};
pub use interval::{Domain, Interval, Inverse};
pub use literal::IntervalLiteral;
pub use temperament::{Temperament, TemperamentOptions, TuningMetric};
pub use val::Val;
