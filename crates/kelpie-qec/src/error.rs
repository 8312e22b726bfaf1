//! Error types for the QEC transformation layer.

use thiserror::Error;

/// Errors that can occur while rewriting an operation graph.
///
/// All variants are fatal for the running pass: there is no partial-success
/// mode and no automatic retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QecError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] kelpie_ir::IrError),

    /// A matched rotation is structurally unusable: trivial Pauli string
    /// or non-positive order.
    #[error("Malformed PPR operand: weight {weight}, order {order}")]
    MalformedOperand {
        /// Weight of the rotation's Pauli string.
        weight: usize,
        /// Rotation order of the operand.
        order: u8,
    },

    /// The rewrite driver exhausted its iteration bound without reaching
    /// a fixed point.
    #[error("Rewriting did not converge within {iterations} applications")]
    NonConvergence {
        /// The iteration bound that was exhausted.
        iterations: usize,
    },

    /// A decomposition would emit a rotation whose order is not strictly
    /// smaller than its input's. Correctness guard; never retried.
    #[error("Decomposition emitted order {order}, expected strictly below {limit}")]
    InvariantViolation {
        /// Order of the offending emitted rotation.
        order: u8,
        /// Exclusive upper bound (the input rotation's order).
        limit: u8,
    },

    /// Pass execution failed.
    #[error("Pass '{name}' failed: {reason}")]
    PassFailed {
        /// Name of the failing pass.
        name: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// Result type for QEC transformations.
pub type QecResult<T> = Result<T, QecError>;
