use thiserror::Error;

/// Fatal, build-time errors. All graph-construction entry points on
/// [`crate::engine::Engine`] surface these instead of panicking; on error,
/// no partial node is left registered in the memo.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("shape mismatch in `{op}`: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    #[error("type mismatch in `{op}`: {detail}")]
    TypeMismatch { op: &'static str, detail: String },

    #[error("parameter invariant violated: {detail}")]
    ParameterInvariantViolation { detail: String },

    #[error("assign target is not a cached (mutable) tensor")]
    AssignmentTargetNotMutable,
}

pub type Result<T> = std::result::Result<T, EngineError>;
