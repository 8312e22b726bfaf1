//! Decomposition of non-Clifford Pauli product rotations.
//!
//! A PPR of order k >= 3 (angle pi/2^k) is not in the Clifford group. It is
//! rewritten into magic-state consumption: prepare one ancilla in the order-k
//! resource state, measure the rotation axis extended onto the ancilla, and
//! apply an order-(k-1) rotation whose sign is selected by the outcome. Each
//! application strictly reduces the rotation order, so driving the rule to a
//! fixed point leaves only Clifford rotations (order <= 2), measurements and
//! preparations.
//!
//! The extended measurement uses ancilla basis Z for a positive rotation and
//! Y for a negated one (the adjoint consumes the same resource state through
//! the conjugate basis). Y-basis measurements are disfavored on lattice
//! surgery hardware; with Y-avoidance enabled the Y case is traded for an
//! X-basis measurement wrapped in a pair of ancilla-local Clifford rotations.

use tracing::debug;

use kelpie_ir::{
    AncillaState, ClbitId, Instruction, NodeIndex, OpGraph, Pauli, QubitId,
};

use crate::error::{QecError, QecResult};
use crate::pass::{Pass, PassKind};
use crate::rewrite::{GreedyRewriteDriver, RewriteRule};

/// Decomposition method selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecomposeMethod {
    /// Measure in whatever ancilla basis the identity calls for,
    /// including Y.
    #[default]
    Standard,
    /// Trade Y-basis measurements for extra ancilla-local Cliffords.
    AvoidYMeasure,
}

/// Immutable configuration for one decomposition pass run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecomposeConfig {
    /// The decomposition method.
    pub method: DecomposeMethod,
    /// Independent flag forcing Y-avoidance regardless of method.
    pub avoid_y_measure: bool,
}

impl DecomposeConfig {
    /// Create a configuration.
    pub fn new(method: DecomposeMethod, avoid_y_measure: bool) -> Self {
        Self {
            method,
            avoid_y_measure,
        }
    }

    /// Whether Y-basis measurements must be avoided under this configuration.
    pub fn avoid_y(&self) -> bool {
        self.method == DecomposeMethod::AvoidYMeasure || self.avoid_y_measure
    }
}

/// Check whether an operation is a non-Clifford rotation (order >= 3).
///
/// Clifford rotations (order <= 2), measurements and preparations are fixed
/// points of the decomposition.
pub fn is_non_clifford(inst: &Instruction) -> bool {
    matches!(inst.rotation_order(), Some(order) if order >= 3)
}

/// Reject rotations that are structurally unusable.
fn check_operand(inst: &Instruction) -> QecResult<()> {
    let Some(order) = inst.rotation_order() else {
        return Ok(());
    };
    let weight = inst.pauli_string().weight();
    if weight == 0 || order < 1 {
        return Err(QecError::MalformedOperand { weight, order });
    }
    Ok(())
}

/// Build the replacement for one non-Clifford rotation.
///
/// `ancilla` and `outcome` must be freshly allocated wires owned by this
/// invocation. The returned operations, in order:
///
/// 1. prepare `ancilla` in the order-k magic state,
/// 2. (Y-avoidance only) ancilla-local Clifford rotation,
/// 3. PPM of the axis extended onto the ancilla, writing `outcome`,
/// 4. order-(k-1) rotation over the original axis, sign selected by
///    `outcome` together with any sign bits the input already carried
///    (cascade steps accumulate one bit per consumed outcome),
/// 5. (Y-avoidance only) the compensating ancilla-local Clifford.
pub fn decompose(
    inst: &Instruction,
    ancilla: QubitId,
    outcome: ClbitId,
    config: &DecomposeConfig,
) -> QecResult<Vec<Instruction>> {
    check_operand(inst)?;
    let order = inst
        .rotation_order()
        .ok_or_else(|| QecError::MalformedOperand {
            weight: 0,
            order: 0,
        })?;
    let axis = inst.pauli_string();
    let negated = inst.negated();

    let mut ancilla_basis = if negated { Pauli::Y } else { Pauli::Z };
    let mut wrap = None;
    if config.avoid_y() && ancilla_basis == Pauli::Y {
        // Rotate the ancilla so the joint measurement lands in the X basis:
        // conjugating X by the pi/4 Z rotation yields Y.
        let z_anc = kelpie_ir::PauliString::single(ancilla, Pauli::Z);
        wrap = Some((
            Instruction::ppr(&z_anc, 2),
            Instruction::ppr_with_sign(&z_anc, 2, true),
        ));
        ancilla_basis = Pauli::X;
    }

    let extended = axis.with(ancilla, ancilla_basis);

    let mut replacement = Vec::with_capacity(5);
    replacement.push(Instruction::prepare(
        AncillaState::Magic { order },
        ancilla,
    ));
    if let Some((pre, _)) = &wrap {
        replacement.push(pre.clone());
    }
    replacement.push(Instruction::ppm(&extended, outcome));
    let mut sign_bits = inst.sign_bits().to_vec();
    sign_bits.push(outcome);
    replacement.push(Instruction::ppr_with_sign_bits(
        &axis,
        order - 1,
        negated,
        sign_bits,
    ));
    if let Some((_, post)) = wrap {
        replacement.push(post);
    }

    // Guard: every emitted rotation must have strictly smaller order.
    for emitted in &replacement {
        if let Some(o) = emitted.rotation_order() {
            if o >= order {
                return Err(QecError::InvariantViolation {
                    order: o,
                    limit: order,
                });
            }
        }
    }

    Ok(replacement)
}

/// Rewrite rule binding the non-Clifford classifier to the decomposition.
pub struct DecomposePprRule {
    config: DecomposeConfig,
}

impl DecomposePprRule {
    /// Create the rule for the given configuration.
    pub fn new(config: DecomposeConfig) -> Self {
        Self { config }
    }
}

impl RewriteRule for DecomposePprRule {
    fn name(&self) -> &'static str {
        "DecomposePpr"
    }

    fn matches(&self, _graph: &OpGraph, _node: NodeIndex, inst: &Instruction) -> bool {
        is_non_clifford(inst)
    }

    fn apply(&self, graph: &mut OpGraph, node: NodeIndex) -> QecResult<()> {
        let inst = graph
            .get_instruction(node)
            .ok_or(kelpie_ir::IrError::InvalidNode)?
            .clone();
        check_operand(&inst)?;

        let ancilla = graph.alloc_qubit();
        let outcome = graph.alloc_clbit();
        let replacement = decompose(&inst, ancilla, outcome, &self.config)?;
        debug!(
            "Decomposing order-{} PPR into {} ops (ancilla {ancilla})",
            inst.rotation_order().unwrap_or(0),
            replacement.len(),
        );
        graph.splice(node, replacement)?;
        Ok(())
    }
}

/// Pass that rewrites every non-Clifford PPR to Clifford operations plus
/// measurements and magic-state consumption.
pub struct DecomposeNonCliffordPpr {
    config: DecomposeConfig,
}

impl DecomposeNonCliffordPpr {
    /// Create the pass with the given configuration.
    pub fn new(config: DecomposeConfig) -> Self {
        Self { config }
    }
}

impl Default for DecomposeNonCliffordPpr {
    fn default() -> Self {
        Self::new(DecomposeConfig::default())
    }
}

impl Pass for DecomposeNonCliffordPpr {
    fn name(&self) -> &'static str {
        "DecomposeNonCliffordPpr"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, graph: &mut OpGraph) -> QecResult<()> {
        // Malformed rotations are rejected up front rather than silently
        // skipped by the order >= 3 match.
        let malformed = graph
            .topological_ops()
            .find_map(|(_, inst)| check_operand(inst).err());
        if let Some(err) = malformed {
            return Err(err);
        }

        let mut driver = GreedyRewriteDriver::new();
        driver.add_rule(DecomposePprRule::new(self.config));
        driver.run(graph)
    }
}
