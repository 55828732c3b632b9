//! I/O ops (C10): the boundary with the input provider (IP) and output
//! receiver (OR). Grounded on `define_input`/`define_variable`/`assign`/
//! `reveal`/`encode_input`/`decode_output` in `spdz.py`.
//!
//! The source's `define_input` creates IP-side `tf.placeholder`s that are
//! fed at session-run time via the dict `encode_input` builds. Since this
//! crate evaluates eagerly (no lazy graph/session split), `define_input`
//! takes the already-encoded residue feed directly — exactly what
//! `encode_input` would otherwise have produced for the placeholder.

use nalgebra::DMatrix;

use crate::crt::fixed_point::{decode, encode};
use crate::crt::numbers::{decompose, recombine};
use crate::engine::{Engine, PrivateTensor};
use crate::error::{EngineError, Result};
use crate::role::{Placed, Role};
use crate::tensor::residue::ResidueTensor;
use crate::tensor::sharing::{reconstruct, share};

impl Engine {
    /// `define_input(shape, name?)`: the IP-side placeholder `input_x` is
    /// `input` itself here (already decomposed residues, as `encode_input`
    /// would produce), tagged `Role::Ip` per spec.md §6's device-scope
    /// language; shares it and returns `(input_handles, PrivateTensor)`.
    pub fn define_input(&mut self, input: ResidueTensor) -> (Placed<ResidueTensor>, PrivateTensor) {
        let config = self.config().clone();
        let (x0, x1) = share(&input, &config);
        let x = self.alloc_private(x0, x1);
        (Placed::new(Role::Ip, input), x)
    }

    /// `define_variable(initial_value, apply_encoding?, name?)`: IP-side
    /// encode (if requested) + share; each server's share is wrapped in a
    /// mutable cell so `assign` may later target it, exactly like `cache`.
    pub fn define_variable(&mut self, initial_value: &DMatrix<f64>, apply_encoding: bool) -> PrivateTensor {
        let config = self.config().clone();
        let (rows, cols) = initial_value.shape();
        let k = config.num_components();

        let residues_of = |v: f64| {
            let ring_value = if apply_encoding {
                encode(v, config.fractional_bits, &config.modulus)
            } else {
                num_bigint::BigInt::from(v as i64)
            };
            decompose(&ring_value, &config.m)
        };

        let components: Vec<DMatrix<i64>> = (0..k)
            .map(|i| DMatrix::from_fn(rows, cols, |r, c| residues_of(initial_value[(r, c)])[i]))
            .collect();
        let encoded = ResidueTensor::from_components(components);

        let (v0, v1) = share(&encoded, &config);
        let x = self.alloc_private(v0, v1);
        self.mark_cached(x.0);
        x
    }

    /// `assign(x, v)`: overwrites a cached (mutable) `PrivateTensor`'s
    /// shares with `v`'s. Fails with `AssignmentTargetNotMutable` unless `x`
    /// was produced by `define_variable` or `cache`.
    pub fn assign(&mut self, x: PrivateTensor, v: PrivateTensor) -> Result<()> {
        self.require_cached(x.0)?;
        let (v0, v1) = self.private_node(v);
        self.overwrite_private(x.0, v0, v1);
        Ok(())
    }

    /// `reveal(x)`: reconstructs without decoding, tagged `Role::Or` per
    /// spec.md §6 ("`reveal(x) -> residue_tensor_on_OR`"). The caller is
    /// responsible for `recombine` + `decode` (here: [`decode_output`]).
    pub fn reveal(&self, x: PrivateTensor) -> Placed<ResidueTensor> {
        let (x0, x1) = self.private_node(x);
        Placed::new(Role::Or, reconstruct(&x0, &x1, self.config()))
    }
}

/// Host-side helper: turns a rational tensor into the decomposed residue
/// feed `define_input` expects.
pub fn encode_input(values: &DMatrix<f64>, config: &crate::config::EngineConfig) -> ResidueTensor {
    let (rows, cols) = values.shape();
    let components = (0..config.num_components())
        .map(|i| {
            DMatrix::from_fn(rows, cols, |r, c| {
                decompose(&encode(values[(r, c)], config.fractional_bits, &config.modulus), &config.m)[i]
            })
        })
        .collect();
    ResidueTensor::from_components(components)
}

/// Host-side helper: `recombine` then `decode` a revealed residue tensor.
pub fn decode_output(revealed: &ResidueTensor, config: &crate::config::EngineConfig) -> DMatrix<f64> {
    let (rows, cols) = revealed.shape();
    DMatrix::from_fn(rows, cols, |r, c| {
        let residues: Vec<i64> = (0..revealed.num_components()).map(|i| revealed.component(i)[(r, c)]).collect();
        let combined = recombine(&residues, &config.lambda, &config.modulus);
        decode(&combined, config.fractional_bits, &config.modulus)
    })
}
