//! Pass trait and types for graph transformations.

use kelpie_ir::OpGraph;

use crate::error::QecResult;

/// The kind of pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the graph.
    Analysis,
    /// Transformation pass that modifies the graph.
    Transformation,
}

/// A pass that operates on a QEC operation graph.
///
/// Passes own the graph for the duration of [`Pass::run`]; rewriting is
/// single-threaded and synchronous. A pass either succeeds, leaving the
/// graph in its transformed state, or fails, in which case the caller must
/// discard the graph.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given graph.
    fn run(&self, graph: &mut OpGraph) -> QecResult<()>;

    /// Check if this pass should run on the given graph.
    fn should_run(&self, _graph: &OpGraph) -> bool {
        true
    }
}
