//! A two-server additive-secret-sharing tensor engine over a Chinese
//! Remainder Theorem (CRT) residue representation.
//!
//! An "input provider" shares private tensors between two non-colluding
//! compute servers (`S0`, `S1`) and an offline crypto producer (`CP`); the
//! servers evaluate arithmetic circuits (add, sub, scale, mul, dot, square,
//! sigmoid) over the shares without either learning the cleartext, and an
//! output receiver (`OR`) reconstructs the result.
//!
//! This crate implements the protocol core (CRT arithmetic, fixed-point
//! codec, Beaver-triple-style masking, distributed truncation, and
//! expression-graph memoization) in-process, via [`engine::Engine`]. The
//! host dataflow runtime and network transport that a real two-server
//! deployment would need are out of scope — see [`role`] for the seam
//! where that plugs in.

pub mod config;
pub mod crt;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod role;
pub mod tensor;

pub use config::EngineConfig;
pub use engine::{AnyTensor, Engine, MaskedPrivateTensor, PrivateTensor};
pub use error::{EngineError, Result};
pub use protocol::arith::ScaleConstant;
pub use role::{Placed, Role};
