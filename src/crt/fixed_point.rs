//! Fixed-point codec (C2): rational <-> ring-element encoding at precision `f`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

/// `encode(r, f) = floor(r * 2^f) mod M`.
pub fn encode(rational: f64, fractional_bits: u32, modulus: &BigInt) -> BigInt {
    let scaled = rational * (1u64 << fractional_bits) as f64;
    let truncated = BigInt::from(scaled.floor() as i128);
    truncated.mod_floor(modulus)
}

/// Decode a ring element back to a rational using the signed-range
/// convention: `v` represents `v` if `v <= M/2`, else `v - M`, divided by `2^f`.
pub fn decode(v: &BigInt, fractional_bits: u32, modulus: &BigInt) -> f64 {
    let half = modulus / 2;
    let signed = if *v <= half { v.clone() } else { v - modulus };
    let signed: f64 = signed.to_f64().expect("ring element too large to decode");
    signed / (1u64 << fractional_bits) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip_within_precision() {
        let f = 16u32;
        let modulus = BigInt::from(1_000_000_007i64) * BigInt::from(1_000_000_009i64);
        for r in [0.0, 1.5, -2.25, 3.0001, -100.75] {
            let encoded = encode(r, f, &modulus);
            let decoded = decode(&encoded, f, &modulus);
            assert!((decoded - r).abs() < 2f64.powi(-(f as i32)) + 1e-9, "{decoded} vs {r}");
        }
    }

    #[test]
    fn decode_uses_signed_convention_near_half_modulus() {
        let f = 0u32;
        let modulus = BigInt::from(101);
        // modulus/2 == 50; 50 decodes as +50, 51 decodes as 51-101 = -50.
        assert_eq!(decode(&BigInt::from(50), f, &modulus), 50.0);
        assert_eq!(decode(&BigInt::from(51), f, &modulus), -50.0);
    }
}
