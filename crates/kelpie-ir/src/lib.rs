//! Kelpie QEC Operation-Graph Intermediate Representation
//!
//! This crate provides the data structures for representing circuits in the
//! Pauli-based computation model used by fault-tolerant compilation: Pauli
//! product rotations (PPR), Pauli product measurements (PPM), and ancilla
//! preparation, arranged in a wire-threaded operation DAG.
//!
//! # Core Components
//!
//! - **Identifiers**: [`QubitId`], [`ClbitId`] for quantum and classical wires
//! - **Pauli algebra**: [`Pauli`], [`PauliString`] with commutation and
//!   phase-tracked products
//! - **Operations**: [`Instruction`] / [`OpKind`] for PPR, PPM and
//!   [`AncillaState`] preparation
//! - **Graph**: [`OpGraph`] — the mutable operation DAG with erase and
//!   splice primitives used by rewrite passes
//!
//! # Example: a non-Clifford rotation followed by a measurement
//!
//! ```rust
//! use kelpie_ir::{Instruction, OpGraph, Pauli, PauliString, ClbitId, QubitId};
//!
//! let mut graph = OpGraph::new();
//! graph.add_qubit(QubitId(0));
//! graph.add_clbit(ClbitId(0));
//!
//! // PPR(X, pi/8): order 3, non-Clifford.
//! let axis = PauliString::single(QubitId(0), Pauli::X);
//! graph.apply(Instruction::ppr(&axis, 3)).unwrap();
//! graph.apply(Instruction::ppm(&axis, ClbitId(0))).unwrap();
//!
//! assert_eq!(graph.num_ops(), 2);
//! assert_eq!(graph.depth(), 2);
//! ```

pub mod error;
pub mod graph;
pub mod op;
pub mod pauli;
pub mod qubit;

pub use error::{IrError, IrResult};
pub use graph::{GraphNode, NodeIndex, OpGraph, WireEdge, WireId};
pub use op::{AncillaState, Instruction, OpKind};
pub use pauli::{Pauli, PauliString};
pub use qubit::{ClbitId, QubitId};
