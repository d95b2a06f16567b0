// Integer and floating-point linear algebra for temperament arithmetic.
//
// Everything exact runs over `BigInt` matrices: mapping coefficients from
// stacked vals routinely leave 64-bit range once a few large equal divisions
// are combined, and Hermite reduction multiplies entries together freely.
//
// Provided passes:
// - `hnf`: row-style Hermite Normal Form (positive pivots, entries above a
//   pivot reduced), the canonical form that strips redundancy from mappings.
// - `kernel` / `cokernel`: integer nullspace bases via HNF of an adjoined
//   identity block.
// - `preimage`: rational solutions of `A x = e_j` per mapping row, via a
//   transform-tracking HNF of the transpose and forward substitution.
// - `combine_tuning_maps`: the weighted-least-squares primitive behind
//   optimal tunings — normal equations solved by small Gaussian elimination.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use tessera_number::Fraction;

use crate::error::{Result, TemperError};

pub type Matrix = Vec<Vec<BigInt>>;

pub fn identity(n: usize) -> Matrix {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { BigInt::one() } else { BigInt::zero() })
                .collect()
        })
        .collect()
}

pub fn transpose(a: &Matrix) -> Matrix {
    if a.is_empty() {
        return Vec::new();
    }
    let cols = a[0].len();
    (0..cols)
        .map(|j| a.iter().map(|row| row[j].clone()).collect())
        .collect()
}

pub fn prune_zero_rows(a: Matrix) -> Matrix {
    a.into_iter()
        .filter(|row| row.iter().any(|x| !x.is_zero()))
        .collect()
}

/// Row-style Hermite Normal Form: pivots positive and strictly right of the
/// pivots above them, entries above each pivot reduced into `[0, pivot)`.
pub fn hnf(mut a: Matrix) -> Matrix {
    hnf_in_place(&mut a, None);
    a
}

/// HNF plus the unimodular row transform `u` with `u * input == output`.
pub fn hnf_with_transform(mut a: Matrix) -> (Matrix, Matrix) {
    let mut u = identity(a.len());
    hnf_in_place(&mut a, Some(&mut u));
    (a, u)
}

fn hnf_in_place(a: &mut Matrix, mut u: Option<&mut Matrix>) {
    let rows = a.len();
    if rows == 0 {
        return;
    }
    let cols = a[0].len();
    let mut pivot = 0usize;
    for col in 0..cols {
        if pivot >= rows {
            break;
        }
        // Euclidean reduction below the pivot: repeatedly move the smallest
        // nonzero entry up and subtract floored multiples until the column
        // below the pivot is clear.
        loop {
            let best = (pivot..rows)
                .filter(|&r| !a[r][col].is_zero())
                .min_by_key(|&r| a[r][col].abs());
            let Some(best) = best else {
                break;
            };
            a.swap(pivot, best);
            if let Some(u) = u.as_deref_mut() {
                u.swap(pivot, best);
            }
            let mut clear = true;
            for r in pivot + 1..rows {
                if a[r][col].is_zero() {
                    continue;
                }
                let q = a[r][col].div_floor(&a[pivot][col]);
                row_subtract(a, r, pivot, &q);
                if let Some(u) = u.as_deref_mut() {
                    row_subtract(u, r, pivot, &q);
                }
                if !a[r][col].is_zero() {
                    clear = false;
                }
            }
            if clear {
                break;
            }
        }
        if a[pivot][col].is_zero() {
            continue;
        }
        if a[pivot][col].is_negative() {
            negate_row(a, pivot);
            if let Some(u) = u.as_deref_mut() {
                negate_row(u, pivot);
            }
        }
        for r in 0..pivot {
            let q = a[r][col].div_floor(&a[pivot][col]);
            if !q.is_zero() {
                row_subtract(a, r, pivot, &q);
                if let Some(u) = u.as_deref_mut() {
                    row_subtract(u, r, pivot, &q);
                }
            }
        }
        pivot += 1;
    }
}

fn row_subtract(a: &mut Matrix, target: usize, source: usize, q: &BigInt) {
    if q.is_zero() {
        return;
    }
    let source_row = a[source].clone();
    for (t, s) in a[target].iter_mut().zip(source_row.iter()) {
        *t -= q * s;
    }
}

fn negate_row(a: &mut Matrix, row: usize) {
    for x in &mut a[row] {
        *x = -x.clone();
    }
}

/// Basis of the integer kernel `{x : A x = 0}` of an `r x n` matrix, one
/// kernel vector per returned row. Works by Hermite-reducing the columns of
/// `A` adjoined with an identity block: combinations that zero the column
/// part read off their recipe in the identity part.
pub fn kernel(a: &Matrix) -> Matrix {
    if a.is_empty() {
        return Vec::new();
    }
    let r = a.len();
    let n = a[0].len();
    let adjoined: Matrix = (0..n)
        .map(|i| {
            let mut row: Vec<BigInt> = (0..r).map(|k| a[k][i].clone()).collect();
            row.extend((0..n).map(|j| if i == j { BigInt::one() } else { BigInt::zero() }));
            row
        })
        .collect();
    hnf(adjoined)
        .into_iter()
        .filter(|row| row[..r].iter().all(Zero::is_zero))
        .map(|row| row[r..].to_vec())
        .filter(|v| v.iter().any(|x| !x.is_zero()))
        .collect()
}

/// Basis of the integer cokernel: the kernel of the transpose.
pub fn cokernel(a: &Matrix) -> Matrix {
    kernel(&transpose(a))
}

/// Rational preimage columns of an `r x n` full-row-rank mapping: column `j`
/// of the result solves `A x = e_j`. Entries are fractions — generators of
/// a temperament legitimately live at fractional monzo coordinates (a
/// half-octave generator is `2^(1/2)`).
pub fn preimage(a: &Matrix) -> Result<Vec<Vec<Fraction>>> {
    if a.is_empty() || a[0].is_empty() {
        return Err(TemperError::RankDeficient);
    }
    let r = a.len();
    let n = a[0].len();
    if r > n {
        return Err(TemperError::RankDeficient);
    }
    let (h, u) = hnf_with_transform(transpose(a));
    // With full row rank the HNF of the transpose has its pivots on the
    // diagonal of the leading r x r block; `A * U^T` is that block
    // transposed, lower triangular.
    for (i, row) in h.iter().enumerate().take(r) {
        if row[i].is_zero() {
            return Err(TemperError::RankDeficient);
        }
    }
    let mut columns = Vec::with_capacity(r);
    for j in 0..r {
        // Forward substitution on L z = e_j, where L[x][y] = h[y][x].
        let mut z: Vec<Fraction> = Vec::with_capacity(r);
        for x in 0..r {
            let mut acc = if x == j {
                Fraction::one()
            } else {
                Fraction::zero()
            };
            for (y, zy) in z.iter().enumerate() {
                let l = Fraction::from_bigint(h[y][x].clone());
                acc = &acc - &(&l * zy);
            }
            let pivot = Fraction::from_bigint(h[x][x].clone());
            z.push(acc.checked_div(&pivot).map_err(TemperError::from)?);
        }
        // x_j = sum_k z_k * (row k of U).
        let mut column = vec![Fraction::zero(); n];
        for (k, zk) in z.iter().enumerate() {
            if zk.is_zero() {
                continue;
            }
            for (slot, entry) in column.iter_mut().zip(u[k].iter()) {
                *slot = &*slot + &(zk * &Fraction::from_bigint(entry.clone()));
            }
        }
        columns.push(column);
    }
    Ok(columns)
}

/// Weighted-least-squares combination of mapping rows: returns the single
/// row `g * maps` (same length as `jip`) minimizing `||g * maps - jip||`.
/// Inputs are already weighted by the caller; this is plain least squares
/// via normal equations and Gaussian elimination with partial pivoting.
pub fn combine_tuning_maps(jip: &[f64], maps: &[Vec<f64>]) -> Vec<f64> {
    let r = maps.len();
    if r == 0 {
        return vec![0.0; jip.len()];
    }
    // Augmented normal equations [G | b].
    let mut system: Vec<Vec<f64>> = (0..r)
        .map(|i| {
            let mut row: Vec<f64> = (0..r)
                .map(|j| dot_f64(&maps[i], &maps[j]))
                .collect();
            row.push(dot_f64(&maps[i], jip));
            row
        })
        .collect();
    for col in 0..r {
        let pivot_row = (col..r)
            .max_by(|&a, &b| {
                system[a][col]
                    .abs()
                    .partial_cmp(&system[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        system.swap(col, pivot_row);
        let pivot = system[col][col];
        if pivot.abs() < f64::EPSILON {
            continue;
        }
        for row in 0..r {
            if row == col {
                continue;
            }
            let factor = system[row][col] / pivot;
            for k in col..=r {
                let value = system[col][k];
                system[row][k] -= factor * value;
            }
        }
    }
    let coefficients: Vec<f64> = (0..r)
        .map(|i| {
            let pivot = system[i][i];
            if pivot.abs() < f64::EPSILON {
                0.0
            } else {
                system[i][r] / pivot
            }
        })
        .collect();
    let mut result = vec![0.0; jip.len()];
    for (c, map) in coefficients.iter().zip(maps.iter()) {
        for (slot, entry) in result.iter_mut().zip(map.iter()) {
            *slot += c * entry;
        }
    }
    result
}

fn dot_f64(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
