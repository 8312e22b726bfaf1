//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in the operation graph.
    #[error("Qubit {qubit} not found in graph{}", format_op_context(.op_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional operation name for context.
        op_name: Option<String>,
    },

    /// Classical bit not found in the operation graph.
    #[error("Classical bit {clbit} not found in graph{}", format_op_context(.op_name))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Optional operation name for context.
        op_name: Option<String>,
    },

    /// Duplicate qubit in an operation or Pauli string.
    #[error("Duplicate qubit {qubit}{}", format_op_context(.op_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional operation name for context.
        op_name: Option<String>,
    },

    /// Duplicate classical bit in an operation's operand list.
    #[error("Duplicate classical bit {clbit}{}", format_op_context(.op_name))]
    DuplicateClbit {
        /// The duplicate classical bit.
        clbit: ClbitId,
        /// Optional operation name for context.
        op_name: Option<String>,
    },

    /// Pauli word length does not match the operand qubit count.
    #[error("Operation '{op_name}' has {qubits} qubits but {paulis} Pauli entries")]
    PauliArityMismatch {
        /// Name of the operation.
        op_name: String,
        /// Number of qubit operands.
        qubits: usize,
        /// Number of Pauli entries.
        paulis: usize,
    },

    /// Operation carries the wrong number of classical bits.
    #[error("Operation '{op_name}' expects {expected} classical bit(s), got {got}")]
    ClbitCountMismatch {
        /// Name of the operation.
        op_name: String,
        /// Expected number of classical bits.
        expected: usize,
        /// Actual number of classical bits.
        got: usize,
    },

    /// A splice replacement referenced a wire it does not own.
    ///
    /// Replacement operations may only touch the wires of the operation
    /// being replaced, or freshly allocated wires that carry no operations
    /// yet. Anything else would let a rewrite reach outside its own scope.
    #[error("Splice replacement references foreign wire: {wire}")]
    ForeignWire {
        /// Description of the offending wire.
        wire: String,
    },

    /// Invalid node index.
    #[error("Invalid node index")]
    InvalidNode,

    /// Invalid graph structure.
    #[error("Invalid graph structure: {0}")]
    InvalidGraph(String),
}

/// Helper function to format optional operation context.
#[allow(clippy::ref_option)]
fn format_op_context(op_name: &Option<String>) -> String {
    match op_name {
        Some(name) => format!(" (op: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
