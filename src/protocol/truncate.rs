//! Distributed truncation (C5): turns `x * 2^f` back into `x` across both
//! shares with no cross-server communication, matching `gen_truncate`'s
//! `raw_truncate`/`truncate` in `spdz.py`.

use crate::config::EngineConfig;
use crate::crt::modk::crt_mod;
use crate::engine::{Engine, PrivateTensor};
use crate::error::Result;
use crate::tensor::residue::ResidueTensor;

/// `raw_truncate(s) = (s - crt_mod(s)) * K_inv mod M`.
fn raw_truncate(x: &ResidueTensor, config: &EngineConfig) -> ResidueTensor {
    let reduced = crt_mod(x, config);
    let stripped = x.sub(&reduced, config).expect("crt_mod preserves shape");
    stripped.scale(&config.k_inv, config)
}

/// Per-side truncation: `y0 = raw_truncate(x0)`,
/// `y1 = M - raw_truncate(M - x1) mod M`. The complementary form on S1
/// cancels `crt_mod`'s rounding bias between the two sides up to the
/// `g`-bit gap.
pub fn truncate_share0(x0: &ResidueTensor, config: &EngineConfig) -> ResidueTensor {
    raw_truncate(x0, config)
}

pub fn truncate_share1(x1: &ResidueTensor, config: &EngineConfig) -> ResidueTensor {
    let (rows, cols) = x1.shape();
    let m_wrap = broadcast_constant(&config.m_wrap, rows, cols, config);
    let complement = m_wrap.sub(x1, config).expect("same shape by construction");
    let raw = raw_truncate(&complement, config);
    m_wrap.sub(&raw, config).expect("same shape by construction")
}

impl Engine {
    /// Invariant from spec.md §3: "any PrivateTensor resulting from a
    /// multiplicative op (mul, dot, square) is immediately truncated before
    /// being stored or cached." Not separately memoized; callers memoize
    /// under their own op tag (`mul`/`dot`/`square`/rational `scale`).
    pub fn truncate(&mut self, x: PrivateTensor) -> Result<PrivateTensor> {
        let (x0, x1) = self.private_node(x);
        let config = self.config().clone();
        let y0 = truncate_share0(&x0, &config);
        let y1 = truncate_share1(&x1, &config);
        Ok(self.alloc_private(y0, y1))
    }
}

fn broadcast_constant(decomposed: &[i64], rows: usize, cols: usize, config: &EngineConfig) -> ResidueTensor {
    let ones = ResidueTensor::from_components(
        config
            .m
            .iter()
            .map(|_| nalgebra::DMatrix::from_element(rows, cols, 1i64))
            .collect(),
    );
    ones.scale(decomposed, config)
}
