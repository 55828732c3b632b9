//! Modulus-K reduction (C4): recovers `v mod K` from the residues of some
//! `v in [0, M)` without ever materializing `v` as a big integer, using
//! float-assisted rounding as in the original `gen_crt_mod` (`spdz.py`).

use nalgebra::DMatrix;

use crate::config::EngineConfig;
use crate::tensor::residue::ResidueTensor;

/// `crt_mod(x)`: given residues of `v`, return residues of `v mod K`.
///
/// `t_i = x_i * q_i mod m_i`; by CRT, `v = (sum t_i * M/m_i) - alpha*M` for
/// some non-negative integer `alpha`, recovered by rounding
/// `sum(t_i / m_i)` in floating point (exact given spec.md §3's truncation
/// gap `g`). Then `v mod K = (sum(t_i * b_i) - B*alpha) mod K`.
pub fn crt_mod(x: &ResidueTensor, config: &EngineConfig) -> ResidueTensor {
    let (rows, cols) = x.shape();
    let k = x.num_components();
    let big_k = config.big_k;

    let v_mod_k = DMatrix::from_fn(rows, cols, |r, c| {
        let mut t = Vec::with_capacity(k);
        let mut alpha_acc = 0f64;
        for i in 0..k {
            let mi = config.m[i];
            let xi = x.component(i)[(r, c)];
            let ti = (xi * config.q[i]).rem_euclid(mi);
            alpha_acc += ti as f64 / mi as f64;
            t.push(ti);
        }
        let alpha = alpha_acc.round() as i64;

        let mut v: i64 = 0;
        for i in 0..k {
            v += t[i] * config.b[i];
        }
        v -= config.big_b * alpha;
        v.rem_euclid(big_k)
    });

    let components = config.m.iter().map(|&mi| v_mod_k.map(|v| v.rem_euclid(mi))).collect();
    ResidueTensor::from_components(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crt::numbers::decompose;
    use num_bigint::BigInt;
    use std::collections::HashMap;

    fn cfg() -> EngineConfig {
        EngineConfig::spdz_default(HashMap::new())
    }

    fn tensor_of(value: i64, config: &EngineConfig) -> ResidueTensor {
        let residues = decompose(&BigInt::from(value), &config.m);
        let comps = residues.into_iter().map(|r| DMatrix::from_element(1, 1, r)).collect();
        ResidueTensor::from_components(comps)
    }

    #[test]
    fn recovers_v_mod_k_for_small_values() {
        let config = cfg();
        for v in [0i64, 1, 5, 1000, 65535, 65536, 70000] {
            let x = tensor_of(v, &config);
            let reduced = crt_mod(&x, &config);
            let expected = v.rem_euclid(config.big_k);
            for (i, &mi) in config.m.iter().enumerate() {
                assert_eq!(reduced.component(i)[(0, 0)], expected.rem_euclid(mi), "v={v} component {i}");
            }
        }
    }
}
