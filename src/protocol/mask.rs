//! Masking & triples (C7): produces a random mask on CP, shares it, and
//! reconstructs the mask-difference `alpha = x - a` on both servers.
//! Grounded on `mask()` in `spdz.py`.

use log::debug;

use crate::engine::{Engine, MaskedPrivateTensor, MemoKey, OpTag, PrivateTensor};
use crate::error::Result;
use crate::tensor::sharing::{reconstruct, sample, share};

impl Engine {
    /// `mask(x)`: memoized by `('mask', x)`. On CP, sample `a` and share it
    /// as `(a0, a1)`; on S0, `alpha0 = x0 - a0`; on S1, `alpha1 = x1 - a1`;
    /// both servers then locally reconstruct the same `alpha` from
    /// `(alpha0, alpha1)`. Property S6/invariant 6: the distribution of `a0`
    /// (resp. `a1`) is uniform, since `sample` is never memoized.
    pub fn mask(&mut self, x: PrivateTensor) -> Result<MaskedPrivateTensor> {
        let key = MemoKey::new(OpTag::Mask, &[x.0]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(MaskedPrivateTensor(id));
        }

        let (x0, x1) = self.private_node(x);
        let (rows, cols) = x0.shape();
        let config = self.config().clone();

        let a = sample(rows, cols, &config);
        let (a0, a1) = share(&a, &config);

        let alpha0 = x0.sub(&a0, &config)?;
        let alpha1 = x1.sub(&a1, &config)?;

        // "Exchange of alphas": both sides reconstruct the same value from
        // the pair, which is why `MaskedPrivateTensor` stores two copies
        // placed on different devices rather than one shared value.
        let alpha_on_0 = reconstruct(&alpha0, &alpha1, &config);
        let alpha_on_1 = reconstruct(&alpha0, &alpha1, &config);

        debug!("mask: produced fresh triple for node {:?}", x.0);

        let masked = self.alloc_masked(a, a0, a1, alpha_on_0, alpha_on_1);
        self.memo_insert(key, masked.0);
        Ok(masked)
    }

    /// Accepts either variant, masking `PrivateTensor`s on first use and
    /// passing already-`MaskedPrivateTensor`s through untouched. Used by
    /// `mul`/`dot`/`square` so callers never have to mask inputs manually.
    pub(crate) fn ensure_masked(&mut self, x: crate::engine::AnyTensor) -> Result<MaskedPrivateTensor> {
        match x {
            crate::engine::AnyTensor::Private(p) => self.mask(p),
            crate::engine::AnyTensor::Masked(m) => Ok(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::tensor::residue::ResidueTensor;
    use nalgebra::DMatrix;
    use std::collections::HashMap;

    fn cfg() -> EngineConfig {
        EngineConfig::spdz_default(HashMap::new())
    }

    fn private_of(value: i64, engine: &mut Engine) -> PrivateTensor {
        let comps: Vec<DMatrix<i64>> =
            engine.config().m.iter().map(|&mi| DMatrix::from_element(1, 1, value.rem_euclid(mi))).collect();
        let secret = ResidueTensor::from_components(comps);
        let (s0, s1) = share(&secret, engine.config());
        engine.alloc_private(s0, s1)
    }

    #[test]
    fn mask_is_idempotent_on_identity() {
        let mut engine = Engine::new(cfg());
        let x = private_of(7, &mut engine);
        let m1 = engine.mask(x).unwrap();
        let m2 = engine.mask(x).unwrap();
        assert_eq!(m1, m2);
    }

    #[test]
    fn mask_reconstructs_equal_alpha_on_both_sides() {
        let mut engine = Engine::new(cfg());
        let x = private_of(11, &mut engine);
        let masked = engine.mask(x).unwrap();
        let (_, _, _, alpha0, alpha1) = engine.masked_node(masked);
        assert_eq!(alpha0, alpha1);
    }
}
