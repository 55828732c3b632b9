//! Residue-tensor kernels (C3): a `ResidueTensor` is a `k`-tuple of
//! same-shape integer matrices, component `i` holding values in `[0, m_i)`.
//! Mirrors the teacher's use of `nalgebra` matrices/vectors for secret-shared
//! data (`mpc/additive_sharing.rs`, `mpc/lwe_scheme.rs`), generalized from a
//! single `BigInt` ring to `k` small-modulus `i64` components.

use nalgebra::DMatrix;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// A `k`-tuple of equal-shape `i64` matrices, one per CRT component.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueTensor {
    components: Vec<DMatrix<i64>>,
}

impl ResidueTensor {
    pub fn from_components(components: Vec<DMatrix<i64>>) -> Self {
        debug_assert!(!components.is_empty());
        let shape = components[0].shape();
        debug_assert!(components.iter().all(|c| c.shape() == shape));
        ResidueTensor { components }
    }

    pub fn zeros(rows: usize, cols: usize, num_components: usize) -> Self {
        ResidueTensor {
            components: (0..num_components).map(|_| DMatrix::zeros(rows, cols)).collect(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.components[0].shape()
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[DMatrix<i64>] {
        &self.components
    }

    pub fn component(&self, i: usize) -> &DMatrix<i64> {
        &self.components[i]
    }

    fn check_same_shape(op: &'static str, a: &ResidueTensor, b: &ResidueTensor) -> Result<()> {
        if a.shape() != b.shape() {
            return Err(EngineError::ShapeMismatch { op, lhs: a.shape(), rhs: b.shape() });
        }
        Ok(())
    }

    /// `add_i = (x_i + y_i) mod m_i`.
    pub fn add(&self, other: &ResidueTensor, config: &EngineConfig) -> Result<ResidueTensor> {
        Self::check_same_shape("residue::add", self, other)?;
        let components = self
            .components
            .iter()
            .zip(other.components.iter())
            .zip(config.m.iter())
            .map(|((xi, yi), &mi)| xi.zip_map(yi, |x, y| (x + y).rem_euclid(mi)))
            .collect();
        Ok(ResidueTensor::from_components(components))
    }

    /// `sub_i = (x_i - y_i) mod m_i`, corrected to `[0, m_i)`.
    pub fn sub(&self, other: &ResidueTensor, config: &EngineConfig) -> Result<ResidueTensor> {
        Self::check_same_shape("residue::sub", self, other)?;
        let components = self
            .components
            .iter()
            .zip(other.components.iter())
            .zip(config.m.iter())
            .map(|((xi, yi), &mi)| xi.zip_map(yi, |x, y| (x - y).rem_euclid(mi)))
            .collect();
        Ok(ResidueTensor::from_components(components))
    }

    /// `mul_i = (x_i * y_i) mod m_i`, elementwise (Hadamard) product.
    pub fn mul(&self, other: &ResidueTensor, config: &EngineConfig) -> Result<ResidueTensor> {
        Self::check_same_shape("residue::mul", self, other)?;
        let components = self
            .components
            .iter()
            .zip(other.components.iter())
            .zip(config.m.iter())
            .map(|((xi, yi), &mi)| xi.zip_map(yi, |x, y| (x * y).rem_euclid(mi)))
            .collect();
        Ok(ResidueTensor::from_components(components))
    }

    /// `scale_i(x, c) = (x_i * c_i) mod m_i`, `c` a decomposed scalar broadcast
    /// over every element of the shape.
    pub fn scale(&self, c: &[i64], config: &EngineConfig) -> ResidueTensor {
        let components = self
            .components
            .iter()
            .zip(c.iter())
            .zip(config.m.iter())
            .map(|((xi, &ci), &mi)| xi.map(|x| (x * ci).rem_euclid(mi)))
            .collect();
        ResidueTensor::from_components(components)
    }

    /// `dot_i = (x_i * y_i) mod m_i` under matrix-multiply contraction.
    /// The contraction length must satisfy `m_i^2 * len <= WORD_MAX` (checked
    /// via `EngineConfig`'s `batch_bound` at construction time).
    pub fn dot(&self, other: &ResidueTensor, config: &EngineConfig) -> Result<ResidueTensor> {
        let (_, lhs_cols) = self.shape();
        let (rhs_rows, _) = other.shape();
        if lhs_cols != rhs_rows {
            return Err(EngineError::ShapeMismatch {
                op: "residue::dot",
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }
        if lhs_cols > config.batch_bound {
            return Err(EngineError::ParameterInvariantViolation {
                detail: format!(
                    "dot contraction length {lhs_cols} exceeds configured batch_bound {}",
                    config.batch_bound
                ),
            });
        }
        let components = self
            .components
            .iter()
            .zip(other.components.iter())
            .zip(config.m.iter())
            .map(|((xi, yi), &mi)| (xi * yi).map(|v| v.rem_euclid(mi)))
            .collect();
        Ok(ResidueTensor::from_components(components))
    }

    pub fn transpose(&self) -> ResidueTensor {
        ResidueTensor::from_components(self.components.iter().map(|c| c.transpose()).collect())
    }
}
