//! Pass manager for orchestrating transformations.

use tracing::{debug, info, instrument};

use kelpie_ir::OpGraph;

use crate::error::{QecError, QecResult};
use crate::pass::Pass;

/// Manages and executes a sequence of passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given graph.
    ///
    /// The first failing pass aborts the run; the graph must then be
    /// treated as unusable by the caller.
    #[instrument(skip(self, graph))]
    pub fn run(&self, graph: &mut OpGraph) -> QecResult<()> {
        info!(
            "Running pass manager with {} passes on graph with {} qubits",
            self.passes.len(),
            graph.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(graph) {
                debug!("Running pass: {}", pass.name());
                pass.run(graph).map_err(|source| QecError::PassFailed {
                    name: pass.name().to_string(),
                    reason: source.to_string(),
                })?;
                debug!("Pass {} completed, ops: {}", pass.name(), graph.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            graph.depth(),
            graph.num_ops()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}
