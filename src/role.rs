//! Device placement markers.
//!
//! The host dataflow runtime (out of scope for this crate) is responsible
//! for actually moving residues between roles. All this module provides is
//! a way to tag, in the type system, which role's local computation a given
//! value belongs to — the Rust analogue of the teacher's `with tf.device(...)`
//! scopes in `spdz.py`. `Engine::define_input` tags its IP-side feed with
//! `Role::Ip` and `Engine::reveal` tags its output with `Role::Or`, the two
//! boundary ops spec.md §6 calls out by role name.

use std::fmt;

/// One of the five logical parties in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Role {
    /// Compute server 0.
    S0,
    /// Compute server 1.
    S1,
    /// Offline crypto producer / dealer.
    Cp,
    /// Input provider.
    Ip,
    /// Output receiver.
    Or,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::S0 => "S0",
            Role::S1 => "S1",
            Role::Cp => "CP",
            Role::Ip => "IP",
            Role::Or => "OR",
        };
        f.write_str(s)
    }
}

/// A value tagged with the role whose device scope produced it.
///
/// `Placed` never moves data between roles by itself; combining two
/// `Placed` values from different roles is only valid when the runtime has
/// already arranged for the cross-role exchange (e.g. after `reconstruct`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed<T> {
    role: Role,
    value: T,
}

impl<T> Placed<T> {
    pub fn new(role: Role, value: T) -> Self {
        Placed { role, value }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn as_ref(&self) -> &T {
        &self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Placed<U> {
        Placed { role: self.role, value: f(self.value) }
    }
}
