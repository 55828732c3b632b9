//! Graph memoization (C9): node table, structural memo map, and the
//! cache-update list, generalized from the source's global `nodes = dict()`
//! and `cache_updators = []` (`spdz.py`) into an explicit context struct
//! (Design Notes: "Encapsulate them in an engine context passed explicitly
//! to all builder calls; this also makes multiple independent graphs
//! trivially supported").
//!
//! Because the host dataflow runtime is out of scope, `Engine` plays every
//! role in-process and evaluates eagerly: each builder call computes actual
//! residues immediately rather than emitting a lazy graph node, mirroring
//! how the teacher's `Protocol` (`mpc/protocol.rs`) drives an in-process
//! `Vec<Party>` without a live network.

use std::collections::{HashMap, HashSet};

use log::trace;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::tensor::residue::ResidueTensor;

/// Opaque node identity. Per the Design Notes, tensors expose only their id
/// externally; structural equality of handles is id equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A handle to a `PrivateTensor` node: `(share0, share1)` on `S0`/`S1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrivateTensor(pub(crate) NodeId);

/// A handle to a `MaskedPrivateTensor` node: `(a, a0, a1, alpha0, alpha1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskedPrivateTensor(pub(crate) NodeId);

/// The tagged variant from the Design Notes ("`PrivateTensor` and
/// `MaskedPrivateTensor` become a discriminated variant with two cases").
/// `cache` and the multiplicative ops accept either and pattern-match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyTensor {
    Private(PrivateTensor),
    Masked(MaskedPrivateTensor),
}

impl From<PrivateTensor> for AnyTensor {
    fn from(t: PrivateTensor) -> Self {
        AnyTensor::Private(t)
    }
}

impl From<MaskedPrivateTensor> for AnyTensor {
    fn from(t: MaskedPrivateTensor) -> Self {
        AnyTensor::Masked(t)
    }
}

impl AnyTensor {
    pub(crate) fn node_id(&self) -> NodeId {
        match self {
            AnyTensor::Private(t) => t.0,
            AnyTensor::Masked(t) => t.0,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Private {
        share0: ResidueTensor,
        share1: ResidueTensor,
    },
    Masked {
        a: ResidueTensor,
        a0: ResidueTensor,
        a1: ResidueTensor,
        alpha0: ResidueTensor,
        alpha1: ResidueTensor,
    },
}

impl NodeKind {
    fn shape(&self) -> (usize, usize) {
        match self {
            NodeKind::Private { share0, .. } => share0.shape(),
            NodeKind::Masked { a, .. } => a.shape(),
        }
    }
}

/// Structural key a node was produced under: `(op_name, operand_identities...)`
/// from spec.md §4.8/§4.9. Two tensors built from distinct sharings are
/// distinct operands even if they encode the same cleartext, because they
/// carry distinct `NodeId`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum OpTag {
    Add,
    Sub,
    Mul,
    Dot,
    Square,
    Mask,
    Cache,
    Transpose,
    Sigmoid,
    /// `scale` by an integer constant (exact, no truncation).
    ScaleInt(i64),
    /// `scale` by a rational constant, keyed on the `f64`'s bit pattern.
    ScaleRational(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MemoKey {
    op: OpTag,
    operands: Vec<NodeId>,
}

impl MemoKey {
    pub(crate) fn new(op: OpTag, operands: &[NodeId]) -> MemoKey {
        MemoKey { op, operands: operands.to_vec() }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CacheUpdate {
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
}

/// The process-wide (here: per-`Engine`) builder context: node table,
/// structural memo map, and cache-update list (spec.md §4.9 / §5).
pub struct Engine {
    config: EngineConfig,
    nodes: HashMap<NodeId, NodeKind>,
    memo: HashMap<MemoKey, NodeId>,
    cached_nodes: HashSet<NodeId>,
    cache_updates: Vec<CacheUpdate>,
    next_id: usize,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Engine {
        Engine {
            config,
            nodes: HashMap::new(),
            memo: HashMap::new(),
            cached_nodes: HashSet::new(),
            cache_updates: Vec::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn alloc_private(&mut self, share0: ResidueTensor, share1: ResidueTensor) -> PrivateTensor {
        let id = self.fresh_id();
        self.nodes.insert(id, NodeKind::Private { share0, share1 });
        PrivateTensor(id)
    }

    pub(crate) fn alloc_masked(
        &mut self,
        a: ResidueTensor,
        a0: ResidueTensor,
        a1: ResidueTensor,
        alpha0: ResidueTensor,
        alpha1: ResidueTensor,
    ) -> MaskedPrivateTensor {
        let id = self.fresh_id();
        self.nodes.insert(id, NodeKind::Masked { a, a0, a1, alpha0, alpha1 });
        MaskedPrivateTensor(id)
    }

    pub(crate) fn memo_get(&self, key: &MemoKey) -> Option<NodeId> {
        self.memo.get(key).copied()
    }

    pub(crate) fn memo_insert(&mut self, key: MemoKey, id: NodeId) {
        self.memo.insert(key, id);
    }

    /// Owned clones of a `PrivateTensor` node's shares. Cloning (rather than
    /// borrowing) lets callers immediately follow up with another `&mut
    /// self` call (e.g. `alloc_private`) without fighting the borrow
    /// checker over the node table.
    pub(crate) fn private_node(&self, t: PrivateTensor) -> (ResidueTensor, ResidueTensor) {
        match self.nodes.get(&t.0).expect("PrivateTensor handle outlived its engine") {
            NodeKind::Private { share0, share1 } => (share0.clone(), share1.clone()),
            NodeKind::Masked { .. } => panic!("PrivateTensor handle pointed at a Masked node"),
        }
    }

    pub(crate) fn masked_node(
        &self,
        t: MaskedPrivateTensor,
    ) -> (ResidueTensor, ResidueTensor, ResidueTensor, ResidueTensor, ResidueTensor) {
        match self.nodes.get(&t.0).expect("MaskedPrivateTensor handle outlived its engine") {
            NodeKind::Masked { a, a0, a1, alpha0, alpha1 } => {
                (a.clone(), a0.clone(), a1.clone(), alpha0.clone(), alpha1.clone())
            }
            NodeKind::Private { .. } => panic!("MaskedPrivateTensor handle pointed at a Private node"),
        }
    }

    pub fn shape_of(&self, t: impl Into<AnyTensor>) -> (usize, usize) {
        let t = t.into();
        self.nodes
            .get(&t.node_id())
            .expect("tensor handle outlived its engine")
            .shape()
    }

    /// Mark `id` as a cached (mutable) node so `assign` may target it.
    pub(crate) fn mark_cached(&mut self, id: NodeId) {
        self.cached_nodes.insert(id);
    }

    pub(crate) fn is_cached(&self, id: NodeId) -> bool {
        self.cached_nodes.contains(&id)
    }

    pub(crate) fn require_cached(&self, id: NodeId) -> Result<()> {
        if self.is_cached(id) {
            Ok(())
        } else {
            Err(EngineError::AssignmentTargetNotMutable)
        }
    }

    pub(crate) fn overwrite_private(&mut self, id: NodeId, share0: ResidueTensor, share1: ResidueTensor) {
        self.nodes.insert(id, NodeKind::Private { share0, share1 });
    }

    pub(crate) fn register_cache_update(&mut self, source: NodeId, target: NodeId) {
        self.cache_updates.push(CacheUpdate { source, target });
    }

    /// `cache(x)`: allocates a persistent cell (seeded with fresh random
    /// residues, mirroring the source's `tf.Variable(tf.random_uniform(...))`
    /// initializer) for either a `PrivateTensor` or a `MaskedPrivateTensor`,
    /// and registers an update action that [`Engine::run_cache_updates`]
    /// later uses to materialize `x`'s current residues into the cell.
    /// Memoized by `('cache', x)`; cached tensors are themselves valid
    /// handles of the same variant and may be fed into further ops.
    pub fn cache(&mut self, x: AnyTensor) -> Result<AnyTensor> {
        let key = MemoKey::new(OpTag::Cache, &[x.node_id()]);
        if let Some(id) = self.memo_get(&key) {
            return Ok(self.wrap_as(x, id));
        }

        let (rows, cols) = self.shape_of(x);
        let config = self.config.clone();

        let new_id = match x {
            AnyTensor::Private(_) => {
                let share0 = crate::tensor::sharing::sample(rows, cols, &config);
                let share1 = crate::tensor::sharing::sample(rows, cols, &config);
                let id = self.fresh_id();
                self.nodes.insert(id, NodeKind::Private { share0, share1 });
                id
            }
            AnyTensor::Masked(_) => {
                let a = crate::tensor::sharing::sample(rows, cols, &config);
                let a0 = crate::tensor::sharing::sample(rows, cols, &config);
                let a1 = crate::tensor::sharing::sample(rows, cols, &config);
                let alpha0 = crate::tensor::sharing::sample(rows, cols, &config);
                let alpha1 = crate::tensor::sharing::sample(rows, cols, &config);
                let id = self.fresh_id();
                self.nodes.insert(id, NodeKind::Masked { a, a0, a1, alpha0, alpha1 });
                id
            }
        };

        self.mark_cached(new_id);
        self.register_cache_update(x.node_id(), new_id);
        self.memo_insert(key, new_id);
        Ok(self.wrap_as(x, new_id))
    }

    fn wrap_as(&self, like: AnyTensor, id: NodeId) -> AnyTensor {
        match like {
            AnyTensor::Private(_) => AnyTensor::Private(PrivateTensor(id)),
            AnyTensor::Masked(_) => AnyTensor::Masked(MaskedPrivateTensor(id)),
        }
    }

    /// Materialize the most recently computed residues of every cached
    /// node's source into its cell (spec.md §4.9: "invoking the
    /// update-collection materializes the most recent computed residues
    /// into the cells"), mirroring the source's `cache_updators` list of
    /// `tf.assign` ops run once per training step.
    pub fn run_cache_updates(&mut self) {
        let updates = self.cache_updates.clone();
        for update in updates {
            let fresh = self.nodes.get(&update.source).cloned();
            if let Some(fresh) = fresh {
                trace!("cache update: node {:?} <- node {:?}", update.target, update.source);
                self.nodes.insert(update.target, fresh);
            }
        }
    }
}
