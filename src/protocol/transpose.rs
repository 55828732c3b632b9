//! `transpose` (mentioned in spec.md §4.7): transposes both shares on their
//! respective servers, and — if `x` already has a memoized mask — derives
//! the transpose's mask by transposing all five residue tensors of the
//! existing mask instead of drawing a fresh triple. Grounded on
//! `transpose()` in `spdz.py`.

use crate::engine::{Engine, MemoKey, OpTag, PrivateTensor};
use crate::error::Result;

impl Engine {
    pub fn transpose(&mut self, x: PrivateTensor) -> Result<PrivateTensor> {
        let key = MemoKey::new(OpTag::Transpose, &[x.0]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(PrivateTensor(id));
        }

        let (x0, x1) = self.private_node(x);
        let x0_t = x0.transpose();
        let x1_t = x1.transpose();
        let xt = self.alloc_private(x0_t, x1_t);
        self.memo_insert(key, xt.0);

        let mask_key = MemoKey::new(OpTag::Mask, &[x.0]);
        if let Some(mask_id) = self.memo_get(&mask_key) {
            let masked = crate::engine::MaskedPrivateTensor(mask_id);
            let (a, a0, a1, alpha0, alpha1) = self.masked_node(masked);
            let masked_t = self.alloc_masked(a.transpose(), a0.transpose(), a1.transpose(), alpha0.transpose(), alpha1.transpose());
            let mask_t_key = MemoKey::new(OpTag::Mask, &[xt.0]);
            self.memo_insert(mask_t_key, masked_t.0);
        }

        Ok(xt)
    }
}
