//! Arithmetic ops, multiplicative half of C8: `mul`, `dot`, `square`.
//! Grounded on `mul`/`dot`/`square` in `spdz.py`; see spec.md §4.8 for the
//! correctness argument (the `alpha*beta` cross term lives only on S0 so it
//! is not double-counted on reconstruction).

use crate::engine::{AnyTensor, Engine, MemoKey, OpTag, PrivateTensor};
use crate::error::Result;
use crate::tensor::sharing::share;

impl Engine {
    /// `mul(x, y)`: elementwise masked multiplication, truncated.
    pub fn mul(&mut self, x: PrivateTensor, y: PrivateTensor) -> Result<PrivateTensor> {
        let key = MemoKey::new(OpTag::Mul, &[x.0, y.0]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(PrivateTensor(id));
        }

        let xm = self.ensure_masked(AnyTensor::Private(x))?;
        let ym = self.ensure_masked(AnyTensor::Private(y))?;
        let (a, a0, a1, alpha0, alpha1) = self.masked_node(xm);
        let (b, b0, b1, beta0, beta1) = self.masked_node(ym);
        let config = self.config().clone();

        let ab = a.mul(&b, &config)?;
        let (ab0, ab1) = share(&ab, &config);

        // S0: z0 = ab0 + a0*beta + alpha*b0 + alpha*beta
        let z0 = ab0
            .add(&a0.mul(&beta0, &config)?, &config)?
            .add(&alpha0.mul(&b0, &config)?, &config)?
            .add(&alpha0.mul(&beta0, &config)?, &config)?;

        // S1: z1 = ab1 + a1*beta + alpha*b1  (no cross term, it's on S0 only)
        let z1 = ab1.add(&a1.mul(&beta1, &config)?, &config)?.add(&alpha1.mul(&b1, &config)?, &config)?;

        let z = self.alloc_private(z0, z1);
        let z = self.truncate(z)?;
        self.memo_insert(key, z.0);
        Ok(z)
    }

    /// `dot(x, y)`: same structure as `mul`, but every `*` is a matrix
    /// multiply (`crt_dot`). Shape/contraction-length checks live in
    /// [`crate::tensor::residue::ResidueTensor::dot`].
    pub fn dot(&mut self, x: PrivateTensor, y: PrivateTensor) -> Result<PrivateTensor> {
        let key = MemoKey::new(OpTag::Dot, &[x.0, y.0]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(PrivateTensor(id));
        }

        let xm = self.ensure_masked(AnyTensor::Private(x))?;
        let ym = self.ensure_masked(AnyTensor::Private(y))?;
        let (a, a0, a1, alpha0, alpha1) = self.masked_node(xm);
        let (b, b0, b1, beta0, beta1) = self.masked_node(ym);
        let config = self.config().clone();

        let ab = a.dot(&b, &config)?;
        let (ab0, ab1) = share(&ab, &config);

        let z0 = ab0
            .add(&a0.dot(&beta0, &config)?, &config)?
            .add(&alpha0.dot(&b0, &config)?, &config)?
            .add(&alpha0.dot(&beta0, &config)?, &config)?;

        let z1 = ab1.add(&a1.dot(&beta1, &config)?, &config)?.add(&alpha1.dot(&b1, &config)?, &config)?;

        let z = self.alloc_private(z0, z1);
        let z = self.truncate(z)?;
        self.memo_insert(key, z.0);
        Ok(z)
    }

    /// `square(x)`: specialization of `mul(x, x)` that shares a single mask
    /// and triple (`aa = a*a` instead of a separate `ab = a*b`).
    ///
    /// The source computes `a0*alpha + alpha*a0` on S0 (two equal terms)
    /// where symmetry would suggest `scale(a0*alpha, 2)`; spec.md's Open
    /// Questions note this is correct but redundant and left as a future
    /// optimization, not applied here either.
    pub fn square(&mut self, x: PrivateTensor) -> Result<PrivateTensor> {
        let key = MemoKey::new(OpTag::Square, &[x.0]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(PrivateTensor(id));
        }

        let xm = self.mask(x)?;
        let (a, a0, a1, alpha0, alpha1) = self.masked_node(xm);
        let config = self.config().clone();

        let aa = a.mul(&a, &config)?;
        let (aa0, aa1) = share(&aa, &config);

        let y0 = aa0
            .add(&a0.mul(&alpha0, &config)?, &config)?
            .add(&alpha0.mul(&a0, &config)?, &config)?
            .add(&alpha0.mul(&alpha0, &config)?, &config)?;

        let y1 = aa1.add(&a1.mul(&alpha1, &config)?, &config)?.add(&alpha1.mul(&a1, &config)?, &config)?;

        let y = self.alloc_private(y0, y1);
        let y = self.truncate(y)?;
        self.memo_insert(key, y.0);
        Ok(y)
    }
}
