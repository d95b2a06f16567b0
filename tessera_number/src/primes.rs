// Prime tables and trial-division factorization.
//
// Monzo construction and residual handling both reduce to the same primitive:
// pull factors of the first k primes out of a big integer and keep whatever
// is left. The table below covers the first 64 primes, which is far more
// components than any practical subgroup uses; `nth_primes` extends past it
// by trial division when a caller genuinely asks for more.
//
// Factorization here is plain trial division. Inputs are musical ratios and
// residuals, which are small by construction; callers that feed enormous
// semiprimes get the polynomial cost they asked for (the engine never bounds
// work on the caller's behalf, matching the surrounding interpreter's
// external gas model).

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// The first 64 primes. Index i is the (i+1)-th prime.
pub const PRIMES: [u64; 64] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293,
    307, 311,
];

/// First `k` primes, extending past the static table if needed.
pub fn nth_primes(k: usize) -> Vec<u64> {
    if k <= PRIMES.len() {
        return PRIMES[..k].to_vec();
    }
    let mut primes = PRIMES.to_vec();
    let mut candidate = *PRIMES.last().expect("table is non-empty") + 2;
    while primes.len() < k {
        if primes
            .iter()
            .take_while(|p| *p * *p <= candidate)
            .all(|p| candidate % p != 0)
        {
            primes.push(candidate);
        }
        candidate += 2;
    }
    primes
}

/// The `index`-th prime (zero-based).
pub fn prime(index: usize) -> u64 {
    if index < PRIMES.len() {
        PRIMES[index]
    } else {
        nth_primes(index + 1)[index]
    }
}

/// Natural logarithms of the first `k` primes, used for Tenney weighting.
pub fn ln_primes(k: usize) -> Vec<f64> {
    nth_primes(k).iter().map(|&p| (p as f64).ln()).collect()
}

/// Zero-based index of `p` in the prime sequence, or `None` if `p` is not
/// prime or lies beyond the static table.
pub fn prime_index(p: u64) -> Option<usize> {
    PRIMES.iter().position(|&q| q == p)
}

/// Full prime factorization of a positive big integer by trial division.
/// Returns `(prime, exponent)` pairs in increasing prime order. Any cofactor
/// surviving division past its own square root is itself prime and is pushed
/// as a final factor, so the product of the result always equals the input.
pub fn factorize(n: &BigInt) -> Vec<(BigInt, u64)> {
    assert!(n.is_positive(), "factorize requires a positive integer");
    let mut remaining = n.clone();
    let mut factors = Vec::new();
    let mut index = 0usize;
    loop {
        let p = BigInt::from(prime(index));
        if &p * &p > remaining {
            break;
        }
        let mut exponent = 0u64;
        while (&remaining % &p).is_zero() {
            remaining /= &p;
            exponent += 1;
        }
        if exponent > 0 {
            factors.push((p, exponent));
        }
        index += 1;
    }
    if !remaining.is_one() {
        factors.push((remaining, 1));
    }
    factors
}

/// All positive divisors of `n`, ascending.
pub fn divisors(n: &BigInt) -> Vec<BigInt> {
    let factors = factorize(n);
    let mut result = vec![BigInt::one()];
    for (p, e) in &factors {
        let mut next = Vec::with_capacity(result.len() * (*e as usize + 1));
        for d in &result {
            let mut power = BigInt::one();
            for _ in 0..=*e {
                next.push(d * &power);
                power *= p;
            }
        }
        result = next;
    }
    result.sort();
    result
}

/// Largest prime index touched by the factorization of `n`, if every factor
/// sits inside the static table. Used for auto-inferring subgroup widths.
pub fn max_prime_index(n: &BigInt) -> Option<usize> {
    factorize(n)
        .iter()
        .map(|(p, _)| p.to_u64().and_then(prime_index))
        .try_fold(0usize, |acc, idx| idx.map(|i| acc.max(i)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_extension_is_consistent() {
        let primes = nth_primes(70);
        assert_eq!(&primes[..64], &PRIMES);
        assert_eq!(primes[64], 313);
        assert_eq!(primes[69], 349);
    }

    #[test]
    fn factorize_small_composite() {
        let factors = factorize(&BigInt::from(360));
        assert_eq!(
            factors,
            vec![
                (BigInt::from(2), 3),
                (BigInt::from(3), 2),
                (BigInt::from(5), 1)
            ]
        );
    }

    #[test]
    fn factorize_keeps_large_prime_cofactor() {
        // 2 * 1000003, where 1000003 is prime.
        let factors = factorize(&BigInt::from(2000006));
        assert_eq!(
            factors,
            vec![(BigInt::from(2), 1), (BigInt::from(1000003), 1)]
        );
    }

    #[test]
    fn divisors_of_twelve() {
        let d: Vec<i64> = divisors(&BigInt::from(12))
            .iter()
            .map(|x| x.to_i64().unwrap())
            .collect();
        assert_eq!(d, vec![1, 2, 3, 4, 6, 12]);
    }

    #[test]
    fn max_prime_index_of_75() {
        // 75 = 3 * 5^2, widest prime is 5 at index 2.
        assert_eq!(max_prime_index(&BigInt::from(75)), Some(2));
    }
}
