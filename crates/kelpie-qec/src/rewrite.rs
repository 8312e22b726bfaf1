//! Greedy fixed-point rewrite driver.
//!
//! The driver owns the loop structure of pattern rewriting and nothing
//! else: rules supply the matching predicate and the replacement logic.
//! It repeatedly scans the graph in topological order, applies the first
//! matching rule, and rescans, until no rule matches anywhere (the fixed
//! point) or the iteration bound is exhausted.

use tracing::{debug, trace};

use kelpie_ir::{Instruction, NodeIndex, OpGraph};

use crate::error::{QecError, QecResult};

/// Default bound on the number of rule applications per driver run.
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// A single match-and-replace unit consumable by the driver.
///
/// The driver guarantees it calls [`RewriteRule::apply`] only on nodes for
/// which [`RewriteRule::matches`] returned true, and treats any `apply`
/// error as fatal for the whole run.
pub trait RewriteRule {
    /// Get the name of this rule.
    fn name(&self) -> &str;

    /// Check whether this rule applies to the given operation node.
    fn matches(&self, graph: &OpGraph, node: NodeIndex, inst: &Instruction) -> bool;

    /// Rewrite the matched node in place.
    ///
    /// Implementations must erase the node and splice its replacement
    /// atomically (see `OpGraph::splice`), never leaving the graph in a
    /// half-rewritten state.
    fn apply(&self, graph: &mut OpGraph, node: NodeIndex) -> QecResult<()>;
}

/// Worklist-free greedy driver: rescan after every application.
///
/// Rescanning keeps the driver oblivious to node-index churn inside rule
/// applications, at O(n) per application. Rewrite passes here shrink or
/// locally expand the graph, so the bound of [`DEFAULT_MAX_ITERATIONS`]
/// applications is far beyond anything a terminating rule set produces.
pub struct GreedyRewriteDriver {
    rules: Vec<Box<dyn RewriteRule>>,
    max_iterations: usize,
}

impl GreedyRewriteDriver {
    /// Create a driver with the default iteration bound.
    pub fn new() -> Self {
        Self {
            rules: vec![],
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the iteration bound.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Register a rewrite rule.
    pub fn add_rule(&mut self, rule: impl RewriteRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Find the first (rule, node) match in topological order.
    fn find_match(&self, graph: &OpGraph) -> Option<(usize, NodeIndex)> {
        for (node, inst) in graph.topological_ops() {
            for (rule_idx, rule) in self.rules.iter().enumerate() {
                if rule.matches(graph, node, inst) {
                    return Some((rule_idx, node));
                }
            }
        }
        None
    }

    /// Apply rules until no rule matches.
    ///
    /// Returns [`QecError::NonConvergence`] if the iteration bound is
    /// exhausted while matches remain.
    pub fn run(&self, graph: &mut OpGraph) -> QecResult<()> {
        for iteration in 0..self.max_iterations {
            let Some((rule_idx, node)) = self.find_match(graph) else {
                debug!("Fixed point reached after {iteration} applications");
                return Ok(());
            };
            let rule = &self.rules[rule_idx];
            trace!("Applying rule '{}' at node {:?}", rule.name(), node);
            rule.apply(graph, node)?;
        }

        if self.find_match(graph).is_some() {
            return Err(QecError::NonConvergence {
                iterations: self.max_iterations,
            });
        }
        Ok(())
    }
}

impl Default for GreedyRewriteDriver {
    fn default() -> Self {
        Self::new()
    }
}
