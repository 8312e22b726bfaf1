//! Absorption of Clifford rotations into measurements.
//!
//! A Clifford PPR (order <= 2) immediately followed by a PPM on all of its
//! wires can be absorbed by conjugating the measurement basis: commuting
//! rotations pass through unchanged, an order-1 rotation flips the sign of
//! an anticommuting measurement, and an order-2 rotation maps an
//! anticommuting basis Q to the Pauli product of the rotation axis and Q
//! (with the sign fixed by the accumulated phase). Deferred Cliffords live
//! on in the Pauli frame of the measured qubits.

use tracing::debug;

use kelpie_ir::{Instruction, NodeIndex, OpGraph, PauliString};

use crate::error::QecResult;
use crate::pass::{Pass, PassKind};
use crate::rewrite::{GreedyRewriteDriver, RewriteRule};

/// Conjugate a measured operator through a preceding Clifford rotation.
///
/// Returns the new measurement basis and sign. `order` must be 1 or 2.
fn conjugate_basis(
    axis: &PauliString,
    ppr_negated: bool,
    order: u8,
    basis: &PauliString,
    basis_negated: bool,
) -> (PauliString, bool) {
    if axis.commutes_with(basis) {
        return (basis.clone(), basis_negated);
    }
    if order == 1 {
        // An order-1 rotation is the Pauli itself; conjugation flips the
        // sign of any anticommuting operator.
        return (basis.clone(), !basis_negated);
    }
    // Order 2: e^{i(pi/4)P} Q e^{-i(pi/4)P} = iPQ for anticommuting P, Q.
    // With P*Q = i^e R the conjugated operator is i^{e+1} R, plus a half
    // turn when the rotation itself is negated. Anticommutation makes e
    // odd, so the total exponent is even and the result is +/-R.
    let (product, phase) = axis.mul(basis);
    let total = (phase + 1 + if ppr_negated { 2 } else { 0 }) % 4;
    debug_assert_eq!(total % 2, 0, "conjugated Pauli must be Hermitian");
    (product, basis_negated ^ (total == 2))
}

/// Rewrite rule absorbing one Clifford PPR into its succeeding PPM.
pub struct MergePprRule {
    max_pauli_size: Option<usize>,
}

impl MergePprRule {
    /// Create the rule with an optional bound on the merged Pauli weight.
    pub fn new(max_pauli_size: Option<usize>) -> Self {
        Self { max_pauli_size }
    }

    /// The single PPM that immediately follows `node` on every one of its
    /// qubit wires, if there is one.
    fn target_ppm(graph: &OpGraph, node: NodeIndex, inst: &Instruction) -> Option<NodeIndex> {
        let mut target = None;
        for &qubit in &inst.qubits {
            let succ = graph.successor_op_on(node, qubit)?;
            if !graph.get_instruction(succ)?.is_ppm() {
                return None;
            }
            match target {
                None => target = Some(succ),
                Some(t) if t == succ => {}
                Some(_) => return None,
            }
        }
        target
    }

    /// Compute the merged measurement, if this rule applies at `node`.
    fn merged(
        &self,
        graph: &OpGraph,
        node: NodeIndex,
        inst: &Instruction,
    ) -> Option<(NodeIndex, Instruction)> {
        if !inst.is_ppr() || !inst.sign_bits().is_empty() {
            return None;
        }
        let order = inst.rotation_order()?;
        if !(1..=2).contains(&order) {
            return None;
        }
        let axis = inst.pauli_string();
        if axis.is_identity() {
            return None;
        }

        let ppm_node = Self::target_ppm(graph, node, inst)?;
        let ppm = graph.get_instruction(ppm_node)?;
        let outcome = ppm.outcome()?;

        let (basis, negated) = conjugate_basis(
            &axis,
            inst.negated(),
            order,
            &ppm.pauli_string(),
            ppm.negated(),
        );
        if let Some(max) = self.max_pauli_size {
            if basis.weight() > max {
                return None;
            }
        }
        Some((ppm_node, Instruction::ppm_with_sign(&basis, negated, outcome)))
    }
}

impl RewriteRule for MergePprRule {
    fn name(&self) -> &'static str {
        "MergePprIntoPpm"
    }

    fn matches(&self, graph: &OpGraph, node: NodeIndex, inst: &Instruction) -> bool {
        self.merged(graph, node, inst).is_some()
    }

    fn apply(&self, graph: &mut OpGraph, node: NodeIndex) -> QecResult<()> {
        let inst = graph
            .get_instruction(node)
            .ok_or(kelpie_ir::IrError::InvalidNode)?
            .clone();
        let (ppm_node, new_ppm) = self
            .merged(graph, node, &inst)
            .ok_or(kelpie_ir::IrError::InvalidNode)?;
        debug!(
            "Absorbing order-{} PPR into PPM, new basis {}",
            inst.rotation_order().unwrap_or(0),
            new_ppm.pauli_string(),
        );
        graph.remove_op(node)?;
        graph.splice(ppm_node, vec![new_ppm])?;
        Ok(())
    }
}

/// Pass that absorbs Clifford PPRs into the measurements that follow them.
pub struct MergePprIntoPpm {
    max_pauli_size: Option<usize>,
}

impl MergePprIntoPpm {
    /// Create the pass with an optional bound on the merged Pauli weight.
    pub fn new(max_pauli_size: Option<usize>) -> Self {
        Self { max_pauli_size }
    }
}

impl Default for MergePprIntoPpm {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Pass for MergePprIntoPpm {
    fn name(&self) -> &'static str {
        "MergePprIntoPpm"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, graph: &mut OpGraph) -> QecResult<()> {
        let mut driver = GreedyRewriteDriver::new();
        driver.add_rule(MergePprRule::new(self.max_pauli_size));
        driver.run(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kelpie_ir::{ClbitId, Pauli, QubitId};

    fn string(pairs: &[(u32, Pauli)]) -> PauliString {
        PauliString::from_pairs(pairs.iter().map(|&(q, p)| (QubitId(q), p))).unwrap()
    }

    fn run_merge(graph: &mut OpGraph, max: Option<usize>) {
        MergePprIntoPpm::new(max).run(graph).unwrap();
    }

    #[test]
    fn test_conjugate_commuting_unchanged() {
        let axis = string(&[(0, Pauli::Z)]);
        let basis = string(&[(0, Pauli::Z), (1, Pauli::X)]);
        let (b, neg) = conjugate_basis(&axis, false, 2, &basis, false);
        assert_eq!(b, basis);
        assert!(!neg);
    }

    #[test]
    fn test_conjugate_order1_flips_sign() {
        let axis = string(&[(0, Pauli::X)]);
        let basis = string(&[(0, Pauli::Z)]);
        let (b, neg) = conjugate_basis(&axis, false, 1, &basis, false);
        assert_eq!(b, basis);
        assert!(neg);
    }

    #[test]
    fn test_conjugate_order2_products() {
        // e^{i(pi/4)X} Z e^{-i(pi/4)X} = iXZ = Y.
        let x = string(&[(0, Pauli::X)]);
        let z = string(&[(0, Pauli::Z)]);
        let (b, neg) = conjugate_basis(&x, false, 2, &z, false);
        assert_eq!(b, string(&[(0, Pauli::Y)]));
        assert!(!neg);

        // e^{i(pi/4)Z} X e^{-i(pi/4)Z} = iZX = -Y.
        let (b, neg) = conjugate_basis(&z, false, 2, &x, false);
        assert_eq!(b, string(&[(0, Pauli::Y)]));
        assert!(neg);

        // Negating the rotation flips the result sign.
        let (b, neg) = conjugate_basis(&x, true, 2, &z, false);
        assert_eq!(b, string(&[(0, Pauli::Y)]));
        assert!(neg);
    }

    #[test]
    fn test_merge_anticommuting_rewrites_basis() {
        let mut graph = OpGraph::new();
        graph.add_qubit(QubitId(0));
        graph.add_clbit(ClbitId(0));
        graph
            .apply(Instruction::ppr(&string(&[(0, Pauli::X)]), 2))
            .unwrap();
        graph
            .apply(Instruction::ppm(&string(&[(0, Pauli::Z)]), ClbitId(0)))
            .unwrap();

        run_merge(&mut graph, None);

        assert_eq!(graph.num_ops(), 1);
        let (_, ppm) = graph.topological_ops().next().unwrap();
        assert!(ppm.is_ppm());
        assert_eq!(ppm.pauli_string(), string(&[(0, Pauli::Y)]));
        assert_eq!(ppm.outcome(), Some(ClbitId(0)));
        graph.verify_integrity().unwrap();
    }

    #[test]
    fn test_merge_commuting_drops_rotation() {
        let mut graph = OpGraph::new();
        graph.add_qubit(QubitId(0));
        graph.add_clbit(ClbitId(0));
        graph
            .apply(Instruction::ppr(&string(&[(0, Pauli::Z)]), 2))
            .unwrap();
        graph
            .apply(Instruction::ppm(&string(&[(0, Pauli::Z)]), ClbitId(0)))
            .unwrap();

        run_merge(&mut graph, None);

        assert_eq!(graph.num_ops(), 1);
        let (_, ppm) = graph.topological_ops().next().unwrap();
        assert_eq!(ppm.pauli_string(), string(&[(0, Pauli::Z)]));
        assert!(!ppm.negated());
    }

    #[test]
    fn test_merge_chain_of_cliffords() {
        let mut graph = OpGraph::new();
        graph.add_qubit(QubitId(0));
        graph.add_clbit(ClbitId(0));
        graph
            .apply(Instruction::ppr(&string(&[(0, Pauli::X)]), 2))
            .unwrap();
        graph
            .apply(Instruction::ppr(&string(&[(0, Pauli::X)]), 1))
            .unwrap();
        graph
            .apply(Instruction::ppm(&string(&[(0, Pauli::Z)]), ClbitId(0)))
            .unwrap();

        run_merge(&mut graph, None);

        // Both rotations absorb, one after the other.
        assert_eq!(graph.num_ops(), 1);
        graph.verify_integrity().unwrap();
    }

    #[test]
    fn test_merge_respects_max_pauli_size() {
        let mut graph = OpGraph::new();
        graph.add_qubit(QubitId(0));
        graph.add_qubit(QubitId(1));
        graph.add_clbit(ClbitId(0));
        // Axis X0 anticommutes with basis Z0·Z1; the merged basis Y0·Z1
        // has weight 2, above the bound of 1.
        graph
            .apply(Instruction::ppr(&string(&[(0, Pauli::X)]), 2))
            .unwrap();
        graph
            .apply(Instruction::ppm(
                &string(&[(0, Pauli::Z), (1, Pauli::Z)]),
                ClbitId(0),
            ))
            .unwrap();

        run_merge(&mut graph, Some(1));
        assert_eq!(graph.num_ops(), 2);

        run_merge(&mut graph, None);
        assert_eq!(graph.num_ops(), 1);
        let (_, ppm) = graph.topological_ops().next().unwrap();
        assert_eq!(ppm.pauli_string(), string(&[(0, Pauli::Y), (1, Pauli::Z)]));
    }

    #[test]
    fn test_no_merge_when_rotation_not_adjacent() {
        let mut graph = OpGraph::new();
        graph.add_qubit(QubitId(0));
        graph.add_clbit(ClbitId(0));
        graph
            .apply(Instruction::ppr(&string(&[(0, Pauli::X)]), 2))
            .unwrap();
        // An intervening non-Clifford rotation blocks absorption.
        graph
            .apply(Instruction::ppr(&string(&[(0, Pauli::Z)]), 3))
            .unwrap();
        graph
            .apply(Instruction::ppm(&string(&[(0, Pauli::Z)]), ClbitId(0)))
            .unwrap();

        run_merge(&mut graph, None);
        assert_eq!(graph.num_ops(), 3);
    }

    #[test]
    fn test_no_merge_for_conditioned_rotation() {
        let mut graph = OpGraph::new();
        graph.add_qubit(QubitId(0));
        graph.add_clbit(ClbitId(0));
        graph.add_clbit(ClbitId(1));
        graph
            .apply(Instruction::ppm(&string(&[(0, Pauli::Z)]), ClbitId(0)))
            .unwrap();
        graph
            .apply(Instruction::conditioned_ppr(
                &string(&[(0, Pauli::X)]),
                2,
                false,
                ClbitId(0),
            ))
            .unwrap();
        graph
            .apply(Instruction::ppm(&string(&[(0, Pauli::Z)]), ClbitId(1)))
            .unwrap();

        run_merge(&mut graph, None);
        // Outcome-conditioned corrections are left for later stages.
        assert_eq!(graph.num_ops(), 3);
    }
}
