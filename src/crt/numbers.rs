//! CRT number system (C1): residue decompose/recombine and the
//! arbitrary-precision helpers (`gcd`, `extended_gcd`, `modular_inverse`)
//! used only at configuration time to derive `lambda`, `q`, `b`, `B`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Extended Euclidean algorithm: returns `(g, x, y)` such that `a*x + b*y = g`.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if a.is_zero() {
        (b.clone(), BigInt::zero(), BigInt::one())
    } else {
        let (q, r) = b.div_rem(a);
        let (g, x, y) = extended_gcd(&r, a);
        (g, y - &q * &x, x)
    }
}

pub fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    extended_gcd(a, b).0
}

/// `a^-1 mod m`, canonicalized into `[0, m)`.
pub fn modular_inverse(a: &BigInt, m: &BigInt) -> BigInt {
    let (_, x, _) = extended_gcd(a, m);
    x.mod_floor(m)
}

/// `x mod m_i` for every small modulus, in order.
pub fn decompose(x: &BigInt, m: &[i64]) -> Vec<i64> {
    m.iter()
        .map(|&mi| {
            let r = x.mod_floor(&BigInt::from(mi));
            // r is in [0, mi) and mi fits comfortably in i64, so this never truncates.
            r.to_string().parse::<i64>().expect("residue out of i64 range")
        })
        .collect()
}

/// `(sum x_i * lambda_i) mod M`, the canonical representative in `[0, M)`.
pub fn recombine(xs: &[i64], lambdas: &[BigInt], modulus: &BigInt) -> BigInt {
    let mut acc = BigInt::zero();
    for (xi, li) in xs.iter().zip(lambdas.iter()) {
        acc += BigInt::from(*xi) * li;
    }
    acc.mod_floor(modulus)
}
