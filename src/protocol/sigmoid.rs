//! `sigmoid` (spec.md §6): a degree-9 odd polynomial approximation built
//! from masked multiplications, with the constant term `w0` injected into
//! S0's share only. Grounded on `sigmoid()` in `spdz.py`; coefficients are
//! copied verbatim from the source.

use nalgebra::DMatrix;

use crate::crt::fixed_point::encode;
use crate::crt::numbers::decompose;
use crate::engine::{Engine, MemoKey, OpTag, PrivateTensor};
use crate::error::Result;
use crate::protocol::arith::ScaleConstant;

const W0: f64 = 0.5;
const W1: f64 = 0.2159198015;
const W3: f64 = -0.0082176259;
const W5: f64 = 0.0001825597;
const W7: f64 = -0.0000018848;
const W9: f64 = 0.0000000072;

impl Engine {
    /// Degree-9 odd polynomial sigmoid approximation, accurate for roughly
    /// `|x| <= 4`; outside that domain the polynomial diverges and is the
    /// caller's responsibility to avoid (spec.md Testable Properties, S3).
    pub fn sigmoid(&mut self, x: PrivateTensor) -> Result<PrivateTensor> {
        let key = MemoKey::new(OpTag::Sigmoid, &[x.0]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(PrivateTensor(id));
        }

        // TODO: the source notes this depth isn't optimized (five serial
        // masked multiplies for x^3..x^9); kept as-is since no grounded
        // improved schedule exists in the retrieval pack.
        let x2 = self.square(x)?;
        let x3 = self.mul(x2, x)?;
        let x5 = self.mul(x2, x3)?;
        let x7 = self.mul(x2, x5)?;
        let x9 = self.mul(x2, x7)?;

        let y1 = self.scale(x, ScaleConstant::Rational(W1))?;
        let y3 = self.scale(x3, ScaleConstant::Rational(W3))?;
        let y5 = self.scale(x5, ScaleConstant::Rational(W5))?;
        let y7 = self.scale(x7, ScaleConstant::Rational(W7))?;
        let y9 = self.scale(x9, ScaleConstant::Rational(W9))?;

        let config = self.config().clone();
        let (rows, cols) = self.shape_of(x);
        let w0_encoded = encode(W0, config.fractional_bits, &config.modulus);
        let w0_residues = decompose(&w0_encoded, &config.m);
        let w0_const = crate::tensor::residue::ResidueTensor::from_components(
            w0_residues.iter().map(|&r| DMatrix::from_element(rows, cols, r)).collect(),
        );

        let (y1_0, y1_1) = self.private_node(y1);
        let (y3_0, y3_1) = self.private_node(y3);
        let (y5_0, y5_1) = self.private_node(y5);
        let (y7_0, y7_1) = self.private_node(y7);
        let (y9_0, y9_1) = self.private_node(y9);

        let z0 = y1_0
            .add(&y3_0, &config)?
            .add(&y5_0, &config)?
            .add(&y7_0, &config)?
            .add(&y9_0, &config)?
            .add(&w0_const, &config)?;
        let z1 = y1_1.add(&y3_1, &config)?.add(&y5_1, &config)?.add(&y7_1, &config)?.add(&y9_1, &config)?;

        let z = self.alloc_private(z0, z1);
        self.memo_insert(key, z.0);
        Ok(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::crt::fixed_point::decode;
    use crate::crt::numbers::recombine;
    use crate::tensor::residue::ResidueTensor;
    use crate::tensor::sharing::{reconstruct, share};
    use std::collections::HashMap;

    fn cfg() -> EngineConfig {
        EngineConfig::spdz_default(HashMap::new())
    }

    fn private_of_encoded(value: f64, engine: &mut Engine) -> PrivateTensor {
        let config = engine.config().clone();
        let encoded = encode(value, config.fractional_bits, &config.modulus);
        let residues = decompose(&encoded, &config.m);
        let secret = ResidueTensor::from_components(residues.into_iter().map(|r| DMatrix::from_element(1, 1, r)).collect());
        let (s0, s1) = share(&secret, &config);
        engine.alloc_private(s0, s1)
    }

    fn decode_private(x: PrivateTensor, engine: &Engine) -> f64 {
        let (s0, s1) = engine.private_node(x);
        let config = engine.config();
        let revealed = reconstruct(&s0, &s1, config);
        let residues: Vec<i64> = (0..revealed.num_components()).map(|i| revealed.component(i)[(0, 0)]).collect();
        let combined = recombine(&residues, &config.lambda, &config.modulus);
        decode(&combined, config.fractional_bits, &config.modulus)
    }

    #[test]
    fn sigmoid_matches_reference_values_within_domain() {
        let mut engine = Engine::new(cfg());
        for (input, expected) in [(0.0, 0.5), (1.0, 0.7310585786), (-1.0, 0.2689414214)] {
            let x = private_of_encoded(input, &mut engine);
            let y = engine.sigmoid(x).unwrap();
            let decoded = decode_private(y, &engine);
            assert!((decoded - expected).abs() < 1e-3, "sigmoid({input}) = {decoded}, expected ~{expected}");
        }
    }
}
