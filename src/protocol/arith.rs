//! Arithmetic ops (part of C8): `add`, `sub`, `scale`. No crypto producer
//! involvement and no truncation, except `scale` by a rational constant
//! (which re-encodes at double precision and so must truncate). Grounded on
//! `add`/`sub`/`scale` in `spdz.py`.

use num_bigint::BigInt;

use crate::crt::fixed_point::encode;
use crate::crt::numbers::decompose;
use crate::engine::{Engine, MemoKey, OpTag, PrivateTensor};
use crate::error::Result;

/// A `scale` constant: integer constants are applied exactly (no
/// truncation); rational constants are encoded first and the result is
/// truncated, matching `scale`'s `apply_encoding` auto-detection in the
/// source (`type(k) is float`).
#[derive(Debug, Clone, Copy)]
pub enum ScaleConstant {
    Integer(i64),
    Rational(f64),
}

impl Engine {
    /// `add(x, y)`: componentwise on each server. Memoized (spec.md's
    /// Design Notes: caching add/sub/scale results "avoids re-emitting
    /// nodes").
    pub fn add(&mut self, x: PrivateTensor, y: PrivateTensor) -> Result<PrivateTensor> {
        let key = MemoKey::new(OpTag::Add, &[x.0, y.0]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(PrivateTensor(id));
        }
        let (x0, x1) = self.private_node(x);
        let (y0, y1) = self.private_node(y);
        let config = self.config().clone();
        let z0 = x0.add(&y0, &config)?;
        let z1 = x1.add(&y1, &config)?;
        let z = self.alloc_private(z0, z1);
        self.memo_insert(key, z.0);
        Ok(z)
    }

    /// `sub(x, y)`: componentwise on each server.
    pub fn sub(&mut self, x: PrivateTensor, y: PrivateTensor) -> Result<PrivateTensor> {
        let key = MemoKey::new(OpTag::Sub, &[x.0, y.0]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(PrivateTensor(id));
        }
        let (x0, x1) = self.private_node(x);
        let (y0, y1) = self.private_node(y);
        let config = self.config().clone();
        let z0 = x0.sub(&y0, &config)?;
        let z1 = x1.sub(&y1, &config)?;
        let z = self.alloc_private(z0, z1);
        self.memo_insert(key, z.0);
        Ok(z)
    }

    /// `scale(x, k)`: multiply each share by the decomposed constant `k`;
    /// if `k` is rational, `k` is first fixed-point encoded, and the result
    /// is truncated to bring precision back down to `f` bits.
    pub fn scale(&mut self, x: PrivateTensor, k: ScaleConstant) -> Result<PrivateTensor> {
        let op = match k {
            ScaleConstant::Integer(v) => OpTag::ScaleInt(v),
            ScaleConstant::Rational(v) => OpTag::ScaleRational(v.to_bits()),
        };
        let key = MemoKey::new(op, &[x.0]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(PrivateTensor(id));
        }

        let (x0, x1) = self.private_node(x);
        let config = self.config().clone();

        let (c, apply_encoding) = match k {
            ScaleConstant::Integer(v) => (decompose(&BigInt::from(v), &config.m), false),
            ScaleConstant::Rational(v) => {
                let encoded = encode(v, config.fractional_bits, &config.modulus);
                (decompose(&encoded, &config.m), true)
            }
        };

        let y0 = x0.scale(&c, &config);
        let y1 = x1.scale(&c, &config);
        let mut y = self.alloc_private(y0, y1);

        if apply_encoding {
            y = self.truncate(y)?;
        }

        self.memo_insert(key, y.0);
        Ok(y)
    }
}
