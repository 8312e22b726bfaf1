//! Kelpie QEC Transformation Passes
//!
//! This crate rewrites operation graphs in the Pauli-based computation
//! model toward a form executable on lattice-surgery hardware. The central
//! transformation decomposes non-Clifford Pauli product rotations (order
//! k >= 3, angle pi/2^k) into magic-state consumption: one fresh ancilla,
//! one joint Pauli product measurement, and an outcome-conditioned rotation
//! of strictly smaller order. Driving the rewrite to a fixed point leaves a
//! graph whose every rotation is Clifford (order <= 2).
//!
//! # Architecture
//!
//! ```text
//! OpGraph
//!    │
//!    ▼
//! ┌─────────────┐     ┌─────────────────────┐
//! │ PassManager │ ──► │ GreedyRewriteDriver │ ◄── RewriteRule
//! └─────────────┘     └─────────────────────┘
//!    │
//!    ├── DecomposeNonCliffordPpr (PPR k>=3 → ancilla + PPM + corrected PPR)
//!    └── MergePprIntoPpm (Clifford PPR absorbed into following PPM)
//!    │
//!    ▼
//! OpGraph with only Clifford rotations
//! ```
//!
//! # Example
//!
//! ```rust
//! use kelpie_ir::{Instruction, OpGraph, Pauli, PauliString, QubitId};
//! use kelpie_qec::{DecomposeConfig, DecomposeNonCliffordPpr, Pass};
//!
//! let mut graph = OpGraph::new();
//! graph.add_qubit(QubitId(0));
//! let axis = PauliString::single(QubitId(0), Pauli::X);
//! graph.apply(Instruction::ppr(&axis, 3)).unwrap();
//!
//! let pass = DecomposeNonCliffordPpr::new(DecomposeConfig::default());
//! pass.run(&mut graph).unwrap();
//!
//! // Every surviving rotation is Clifford.
//! assert!(graph
//!     .topological_ops()
//!     .filter_map(|(_, inst)| inst.rotation_order())
//!     .all(|order| order <= 2));
//! ```
//!
//! # Failure model
//!
//! A pass either succeeds or returns a single aggregate [`QecError`]; there
//! is no partial-success mode. A failed pass leaves no usable graph.

pub mod error;
pub mod manager;
pub mod pass;
pub mod rewrite;

// Built-in passes
pub mod passes;

pub use error::{QecError, QecResult};
pub use manager::PassManager;
pub use pass::{Pass, PassKind};
pub use passes::{
    DecomposeConfig, DecomposeMethod, DecomposeNonCliffordPpr, MergePprIntoPpm, is_non_clifford,
};
pub use rewrite::{GreedyRewriteDriver, RewriteRule};
