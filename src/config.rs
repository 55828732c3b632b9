//! Engine configuration: CRT constants, fixed-point precision, and the
//! role-to-device address map. Mirrors the teacher's `PublicParameters`
//! (`mpc/public_params.rs`) — a plain data struct built once via a
//! validating constructor — but loadable from TOML as well, the way
//! `network/participant.rs::load_config` reads `ParticipantConfig`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::crt::numbers::{decompose, gcd, modular_inverse};
use crate::error::{EngineError, Result};
use crate::role::Role;

fn log2(x: f64) -> f64 {
    x.ln() / std::f64::consts::LN_2
}

/// CRT + fixed-point parameters, and the role -> device-address map from
/// spec.md §6's configuration table.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Small, pairwise-coprime moduli `m_1, ..., m_k`.
    pub m: Vec<i64>,
    /// `M = prod(m)`.
    pub modulus: BigInt,
    /// `lambda_i = (M/m_i) * ((M/m_i)^-1 mod m_i)`, used by `recombine`.
    pub lambda: Vec<BigInt>,
    /// `q_i = (M/m_i)^-1 mod m_i`, used by `crt_mod`.
    pub q: Vec<i64>,
    /// `b_i = (M/m_i) mod K`, used by `crt_mod`.
    pub b: Vec<i64>,
    /// `B = M mod K`, used by `crt_mod`.
    pub big_b: i64,
    /// Decomposition of `K^-1 mod M`, used by truncation.
    pub k_inv: Vec<i64>,
    /// Decomposition of `M`, used by the S1 side of truncation.
    pub m_wrap: Vec<i64>,

    /// Integral bits `I`.
    pub integral_bits: u32,
    /// Fractional bits `f`.
    pub fractional_bits: u32,
    /// Truncation gap `g`.
    pub gap: u32,
    /// `K = 2^f`.
    pub big_k: i64,

    /// Upper bound on any single elementwise/matmul reduction length.
    pub batch_bound: usize,

    /// Device address for each logical role (opaque to this crate; a real
    /// deployment's transport layer interprets these).
    pub role_addresses: HashMap<Role, String>,
}

/// TOML-deserializable mirror of [`EngineConfig`]'s scalar fields, used by
/// [`EngineConfig::from_toml_str`]. Derived CRT constants are recomputed
/// rather than trusted from the file.
#[derive(Debug, Deserialize, Serialize)]
struct EngineConfigFile {
    m: Vec<i64>,
    integral_bits: u32,
    fractional_bits: u32,
    gap: u32,
    batch_bound: usize,
    role_addresses: HashMap<Role, String>,
}

impl EngineConfig {
    /// Derive all CRT/truncation constants from a modulus set and precision
    /// parameters, validating every invariant from spec.md §3 and the
    /// float-assisted-arithmetic invariant from the Design Notes.
    pub fn new(
        m: Vec<i64>,
        integral_bits: u32,
        fractional_bits: u32,
        gap: u32,
        batch_bound: usize,
        role_addresses: HashMap<Role, String>,
    ) -> Result<EngineConfig> {
        if m.is_empty() {
            return Err(EngineError::ParameterInvariantViolation {
                detail: "modulus set `m` must be non-empty".into(),
            });
        }

        for (i, &mi) in m.iter().enumerate() {
            for &mj in &m[i + 1..] {
                if gcd(&BigInt::from(mi), &BigInt::from(mj)) != BigInt::one() {
                    return Err(EngineError::ParameterInvariantViolation {
                        detail: format!("moduli {mi} and {mj} are not coprime"),
                    });
                }
            }
        }

        let modulus: BigInt = m.iter().fold(BigInt::one(), |acc, &mi| acc * mi);

        let word_max_bits = log2(i64::MAX as f64);
        for &mi in &m {
            let bound = 2.0 * log2(mi as f64) + log2(batch_bound as f64);
            if bound >= word_max_bits {
                return Err(EngineError::ParameterInvariantViolation {
                    detail: format!(
                        "modulus {mi} fails word-width invariant: 2*log2(m_i) + log2(batch_bound) = {bound} >= {word_max_bits}"
                    ),
                });
            }
        }

        let required_bits = 2.0 * (integral_bits + fractional_bits) as f64
            + log2(batch_bound as f64)
            + gap as f64;
        // `bits()` is the bit length of the canonical (non-negative) value, so
        // log2(M) is one less than it for a power-of-two-free estimate.
        let modulus_log2 = modulus.bits() as f64 - 1.0;
        if modulus_log2 < required_bits {
            return Err(EngineError::ParameterInvariantViolation {
                detail: format!(
                    "log2(M) = {modulus_log2} is below the required {required_bits} bits \
                     (2*(I+f) + log2(batch_bound) + g)"
                ),
            });
        }

        let mantissa_bits = 52.0; // f64 mantissa
        let float_bound = log2(m.len() as f64 * (*m.iter().max().unwrap()) as f64);
        if float_bound >= mantissa_bits {
            return Err(EngineError::ParameterInvariantViolation {
                detail: format!(
                    "crt_mod's float accumulation needs {float_bound} mantissa bits, f64 only has {mantissa_bits}"
                ),
            });
        }

        let big_k = 1i64
            .checked_shl(fractional_bits)
            .ok_or_else(|| EngineError::ParameterInvariantViolation {
                detail: "fractional_bits too large for i64 K = 2^f".into(),
            })?;
        let big_k_bi = BigInt::from(big_k);

        if gcd(&big_k_bi, &modulus) != BigInt::one() {
            return Err(EngineError::ParameterInvariantViolation {
                detail: "gcd(K, M) != 1, truncation's K^-1 mod M would not exist".into(),
            });
        }

        let mut lambda = Vec::with_capacity(m.len());
        let mut q = Vec::with_capacity(m.len());
        let mut b = Vec::with_capacity(m.len());
        for &mi in &m {
            let mi_bi = BigInt::from(mi);
            let m_over_mi = &modulus / &mi_bi;
            let inv = modular_inverse(&m_over_mi.mod_floor(&mi_bi), &mi_bi);
            lambda.push(&m_over_mi * &inv);
            q.push(inv.to_string().parse::<i64>().expect("q_i out of range"));
            b.push(
                m_over_mi
                    .mod_floor(&big_k_bi)
                    .to_string()
                    .parse::<i64>()
                    .expect("b_i out of range"),
            );
        }
        let big_b = modulus
            .mod_floor(&big_k_bi)
            .to_string()
            .parse::<i64>()
            .expect("B out of range");

        let k_inv_value = modular_inverse(&big_k_bi, &modulus);
        let k_inv = decompose(&k_inv_value, &m);
        let m_wrap = decompose(&modulus, &m);

        Ok(EngineConfig {
            m,
            modulus,
            lambda,
            q,
            b,
            big_b,
            k_inv,
            m_wrap,
            integral_bits,
            fractional_bits,
            gap,
            big_k,
            batch_bound,
            role_addresses,
        })
    }

    /// The 32-bit, 10-component CRT modulus from the original
    /// `fl/crypto_tensor/spdz.py` source (its in-use configuration, not the
    /// commented-out 64-bit one): `I=16, f=16, g=20, batch_bound=1024`.
    pub fn spdz_default(role_addresses: HashMap<Role, String>) -> EngineConfig {
        let m = vec![1201, 1433, 1217, 1237, 1321, 1103, 1129, 1367, 1093, 1039];
        EngineConfig::new(m, 16, 16, 20, 1024, role_addresses)
            .expect("spdz_default parameters must satisfy the engine invariants")
    }

    pub fn from_toml_str(contents: &str) -> Result<EngineConfig> {
        let file: EngineConfigFile = toml::from_str(contents).map_err(|e| EngineError::TypeMismatch {
            op: "EngineConfig::from_toml_str",
            detail: e.to_string(),
        })?;
        EngineConfig::new(
            file.m,
            file.integral_bits,
            file.fractional_bits,
            file.gap,
            file.batch_bound,
            file.role_addresses,
        )
    }

    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<EngineConfig> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| EngineError::TypeMismatch {
            op: "EngineConfig::from_toml_path",
            detail: format!("{}: {e}", path.as_ref().display()),
        })?;
        EngineConfig::from_toml_str(&contents)
    }

    pub fn num_components(&self) -> usize {
        self.m.len()
    }
}
