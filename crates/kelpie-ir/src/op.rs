//! QEC operations combining Pauli products with operands.
//!
//! The operation set mirrors the Pauli-based computation model: Pauli
//! product rotations (PPR) by angles pi/2^k, Pauli product measurements
//! (PPM) producing classical outcome bits, and ancilla state preparation.

use serde::{Deserialize, Serialize};

use crate::pauli::{Pauli, PauliString};
use crate::qubit::{ClbitId, QubitId};

/// Initial state for a freshly prepared ancilla qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AncillaState {
    /// Computational zero state.
    Zero,
    /// X-basis plus state.
    Plus,
    /// Y-basis plus-i state.
    PlusI,
    /// Magic resource state for injecting a rotation of order `order`
    /// (angle pi/2^order).
    Magic {
        /// Rotation order of the injected resource.
        order: u8,
    },
}

impl AncillaState {
    /// Short name of the state.
    pub fn name(self) -> &'static str {
        match self {
            AncillaState::Zero => "zero",
            AncillaState::Plus => "plus",
            AncillaState::PlusI => "plus_i",
            AncillaState::Magic { .. } => "magic",
        }
    }
}

/// The kind of operation in the graph.
///
/// Pauli words are stored aligned with `Instruction::qubits`: entry `i`
/// acts on qubit `i` of the operand list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    /// Pauli product rotation by pi/2^order about the Pauli-word axis.
    ///
    /// Clifford iff `order <= 2`. The instruction's classical bits are
    /// sign-selection bits: the effective sign is `negated` XOR the parity
    /// of the bit values, each set bit flipping the rotation direction at
    /// circuit-execution time. The dependency is structural (classical
    /// wires), not a runtime branch.
    Ppr {
        /// Pauli word aligned with the qubit operands.
        paulis: Vec<Pauli>,
        /// Rotation order k (angle pi/2^k, k >= 1).
        order: u8,
        /// Base sign of the rotation angle.
        negated: bool,
    },
    /// Pauli product measurement yielding one classical outcome bit.
    Ppm {
        /// Pauli word aligned with the qubit operands.
        paulis: Vec<Pauli>,
        /// Whether the measured operator carries a minus sign.
        negated: bool,
    },
    /// Prepare a qubit in a fixed ancilla state.
    Prepare {
        /// The state to prepare.
        state: AncillaState,
    },
}

/// A complete operation with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of operation.
    pub kind: OpKind,
    /// Qubits this operation acts on.
    pub qubits: Vec<QubitId>,
    /// Classical bits: the outcome bit for a PPM, the sign-selection bits
    /// for a conditioned PPR.
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create an unconditioned positive PPR.
    pub fn ppr(pauli: &PauliString, order: u8) -> Self {
        Self::ppr_with_sign(pauli, order, false)
    }

    /// Create an unconditioned PPR with an explicit sign.
    pub fn ppr_with_sign(pauli: &PauliString, order: u8, negated: bool) -> Self {
        let (qubits, paulis) = split_string(pauli);
        Self {
            kind: OpKind::Ppr {
                paulis,
                order,
                negated,
            },
            qubits,
            clbits: vec![],
        }
    }

    /// Create a PPR whose sign is selected by a classical bit.
    ///
    /// The effective sign at execution time is `negated XOR bit`.
    pub fn conditioned_ppr(pauli: &PauliString, order: u8, negated: bool, bit: ClbitId) -> Self {
        Self::ppr_with_sign_bits(pauli, order, negated, vec![bit])
    }

    /// Create a PPR whose sign is selected by several classical bits.
    ///
    /// The effective sign is `negated` XOR the parity of the bit values.
    /// Decomposition cascades accumulate one bit per consumed outcome.
    pub fn ppr_with_sign_bits(
        pauli: &PauliString,
        order: u8,
        negated: bool,
        bits: Vec<ClbitId>,
    ) -> Self {
        let (qubits, paulis) = split_string(pauli);
        Self {
            kind: OpKind::Ppr {
                paulis,
                order,
                negated,
            },
            qubits,
            clbits: bits,
        }
    }

    /// Create a PPM writing its outcome to `outcome`.
    pub fn ppm(pauli: &PauliString, outcome: ClbitId) -> Self {
        Self::ppm_with_sign(pauli, false, outcome)
    }

    /// Create a PPM of a signed Pauli operator.
    pub fn ppm_with_sign(pauli: &PauliString, negated: bool, outcome: ClbitId) -> Self {
        let (qubits, paulis) = split_string(pauli);
        Self {
            kind: OpKind::Ppm { paulis, negated },
            qubits,
            clbits: vec![outcome],
        }
    }

    /// Create an ancilla preparation.
    pub fn prepare(state: AncillaState, qubit: QubitId) -> Self {
        Self {
            kind: OpKind::Prepare { state },
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    /// Check if this is a rotation.
    pub fn is_ppr(&self) -> bool {
        matches!(self.kind, OpKind::Ppr { .. })
    }

    /// Check if this is a measurement.
    pub fn is_ppm(&self) -> bool {
        matches!(self.kind, OpKind::Ppm { .. })
    }

    /// Check if this is an ancilla preparation.
    pub fn is_prepare(&self) -> bool {
        matches!(self.kind, OpKind::Prepare { .. })
    }

    /// Rotation order, if this is a PPR.
    pub fn rotation_order(&self) -> Option<u8> {
        match self.kind {
            OpKind::Ppr { order, .. } => Some(order),
            _ => None,
        }
    }

    /// Check if this is a Clifford rotation (order <= 2).
    pub fn is_clifford_ppr(&self) -> bool {
        matches!(self.kind, OpKind::Ppr { order, .. } if order <= 2)
    }

    /// Base sign of the operation's Pauli operator or rotation angle.
    pub fn negated(&self) -> bool {
        match self.kind {
            OpKind::Ppr { negated, .. } | OpKind::Ppm { negated, .. } => negated,
            OpKind::Prepare { .. } => false,
        }
    }

    /// The first sign-selection bit of a conditioned PPR.
    pub fn sign_bit(&self) -> Option<ClbitId> {
        self.sign_bits().first().copied()
    }

    /// All sign-selection bits of a conditioned PPR.
    pub fn sign_bits(&self) -> &[ClbitId] {
        match self.kind {
            OpKind::Ppr { .. } => &self.clbits,
            _ => &[],
        }
    }

    /// The outcome bit of a PPM.
    pub fn outcome(&self) -> Option<ClbitId> {
        match self.kind {
            OpKind::Ppm { .. } => self.clbits.first().copied(),
            _ => None,
        }
    }

    /// Reconstruct the Pauli string view of the operand word.
    ///
    /// Identity entries (possible on manually constructed instructions)
    /// are elided, so the result's weight is the operator weight.
    pub fn pauli_string(&self) -> PauliString {
        let paulis: &[Pauli] = match &self.kind {
            OpKind::Ppr { paulis, .. } | OpKind::Ppm { paulis, .. } => paulis,
            OpKind::Prepare { .. } => &[],
        };
        let pairs = self.qubits.iter().copied().zip(paulis.iter().copied());
        // Operand lists are unique per `OpGraph::apply` validation; fall
        // back to identity if a malformed instruction duplicates a qubit.
        PauliString::from_pairs(pairs).unwrap_or_default()
    }

    /// Get the name of the operation.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            OpKind::Ppr { .. } => "ppr",
            OpKind::Ppm { .. } => "ppm",
            OpKind::Prepare { .. } => "prepare",
        }
    }
}

/// Split a Pauli string into aligned operand and Pauli-word vectors.
fn split_string(pauli: &PauliString) -> (Vec<QubitId>, Vec<Pauli>) {
    pauli.iter().unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xz_string() -> PauliString {
        PauliString::from_pairs([(QubitId(0), Pauli::X), (QubitId(2), Pauli::Z)]).unwrap()
    }

    #[test]
    fn test_ppr_instruction() {
        let inst = Instruction::ppr(&xz_string(), 3);
        assert!(inst.is_ppr());
        assert!(!inst.is_clifford_ppr());
        assert_eq!(inst.rotation_order(), Some(3));
        assert_eq!(inst.qubits, vec![QubitId(0), QubitId(2)]);
        assert_eq!(inst.sign_bit(), None);
        assert_eq!(inst.name(), "ppr");
        assert_eq!(inst.pauli_string(), xz_string());
    }

    #[test]
    fn test_conditioned_ppr() {
        let inst = Instruction::conditioned_ppr(&xz_string(), 2, false, ClbitId(1));
        assert!(inst.is_clifford_ppr());
        assert_eq!(inst.sign_bit(), Some(ClbitId(1)));
        assert_eq!(inst.sign_bits(), &[ClbitId(1)]);
        assert_eq!(inst.clbits, vec![ClbitId(1)]);
    }

    #[test]
    fn test_accumulated_sign_bits() {
        let inst =
            Instruction::ppr_with_sign_bits(&xz_string(), 3, true, vec![ClbitId(0), ClbitId(2)]);
        assert_eq!(inst.sign_bits(), &[ClbitId(0), ClbitId(2)]);
        assert_eq!(inst.sign_bit(), Some(ClbitId(0)));
        assert!(inst.negated());

        // Non-rotations never expose sign bits.
        let ppm = Instruction::ppm(&xz_string(), ClbitId(0));
        assert!(ppm.sign_bits().is_empty());
    }

    #[test]
    fn test_ppm_instruction() {
        let inst = Instruction::ppm(&xz_string(), ClbitId(0));
        assert!(inst.is_ppm());
        assert_eq!(inst.outcome(), Some(ClbitId(0)));
        assert_eq!(inst.sign_bit(), None);
        assert_eq!(inst.rotation_order(), None);
        assert!(!inst.negated());
    }

    #[test]
    fn test_prepare_instruction() {
        let inst = Instruction::prepare(AncillaState::Magic { order: 3 }, QubitId(5));
        assert!(inst.is_prepare());
        assert_eq!(inst.qubits, vec![QubitId(5)]);
        assert!(inst.pauli_string().is_identity());
        assert_eq!(inst.name(), "prepare");
    }

    #[test]
    fn test_instruction_serialization() {
        let inst = Instruction::conditioned_ppr(&xz_string(), 2, true, ClbitId(1));
        let json = serde_json::to_string(&inst).unwrap();
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"]["Ppr"]["order"], 2);
        assert_eq!(value["kind"]["Ppr"]["negated"], true);
    }
}
