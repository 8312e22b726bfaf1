//! Pauli operators and Pauli strings.
//!
//! A [`PauliString`] is the axis of a Pauli product rotation or measurement:
//! a mapping from qubits to single-qubit Pauli operators, with identity
//! entries never stored. Products track the accumulated power of `i` so that
//! measurement bases can be conjugated exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::qubit::QubitId;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Check if this is the identity.
    #[inline]
    pub fn is_identity(self) -> bool {
        self == Pauli::I
    }

    /// Two single-qubit Paulis commute iff either is identity or they are equal.
    #[inline]
    pub fn commutes_with(self, other: Pauli) -> bool {
        self == Pauli::I || other == Pauli::I || self == other
    }

    /// Multiply `self * other`.
    ///
    /// Returns the resulting Pauli and the power of `i` picked up, e.g.
    /// `X * Y = iZ` yields `(Z, 1)` and `Y * X = -iZ` yields `(Z, 3)`.
    pub fn mul(self, other: Pauli) -> (Pauli, u8) {
        use Pauli::{I, X, Y, Z};
        match (self, other) {
            (I, p) | (p, I) => (p, 0),
            (p, q) if p == q => (I, 0),
            (X, Y) => (Z, 1),
            (Y, X) => (Z, 3),
            (Y, Z) => (X, 1),
            (Z, Y) => (X, 3),
            (Z, X) => (Y, 1),
            (X, Z) => (Y, 3),
            _ => unreachable!("all Pauli pairs covered"),
        }
    }

    /// Short name of the operator.
    pub fn name(self) -> &'static str {
        match self {
            Pauli::I => "I",
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A product of single-qubit Pauli operators over named qubits.
///
/// Stored as `(qubit, pauli)` pairs sorted by qubit id, with identity
/// entries elided. The empty string is the identity operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauliString {
    terms: Vec<(QubitId, Pauli)>,
}

impl PauliString {
    /// Create the identity Pauli string.
    pub fn new() -> Self {
        Self { terms: vec![] }
    }

    /// Create a single-qubit Pauli string.
    pub fn single(qubit: QubitId, pauli: Pauli) -> Self {
        Self::new().with(qubit, pauli)
    }

    /// Build a Pauli string from `(qubit, pauli)` pairs.
    ///
    /// Identity entries are dropped. Returns an error if a qubit appears
    /// more than once.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (QubitId, Pauli)>) -> IrResult<Self> {
        let mut terms: Vec<(QubitId, Pauli)> = pairs
            .into_iter()
            .filter(|(_, p)| !p.is_identity())
            .collect();
        terms.sort_by_key(|(q, _)| *q);
        for pair in terms.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(IrError::DuplicateQubit {
                    qubit: pair[0].0,
                    op_name: None,
                });
            }
        }
        Ok(Self { terms })
    }

    /// Return a copy with the entry for `qubit` set to `pauli`.
    ///
    /// Setting identity removes the entry.
    #[must_use]
    pub fn with(&self, qubit: QubitId, pauli: Pauli) -> Self {
        let mut terms = self.terms.clone();
        match terms.binary_search_by_key(&qubit, |(q, _)| *q) {
            Ok(pos) => {
                if pauli.is_identity() {
                    terms.remove(pos);
                } else {
                    terms[pos].1 = pauli;
                }
            }
            Err(pos) => {
                if !pauli.is_identity() {
                    terms.insert(pos, (qubit, pauli));
                }
            }
        }
        Self { terms }
    }

    /// Get the Pauli acting on `qubit` (identity if absent).
    pub fn get(&self, qubit: QubitId) -> Pauli {
        self.terms
            .binary_search_by_key(&qubit, |(q, _)| *q)
            .map_or(Pauli::I, |pos| self.terms[pos].1)
    }

    /// Number of non-identity entries.
    #[inline]
    pub fn weight(&self) -> usize {
        self.terms.len()
    }

    /// Check if this is the identity operator.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over `(qubit, pauli)` entries in qubit order.
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, Pauli)> + '_ {
        self.terms.iter().copied()
    }

    /// Iterate over the support (qubits with a non-identity entry).
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.terms.iter().map(|(q, _)| *q)
    }

    /// Two Pauli strings commute iff the number of qubits where both act
    /// non-trivially with different Paulis is even.
    pub fn commutes_with(&self, other: &PauliString) -> bool {
        let anticommuting = self
            .terms
            .iter()
            .filter(|(q, p)| {
                let o = other.get(*q);
                !o.is_identity() && o != *p
            })
            .count();
        anticommuting % 2 == 0
    }

    /// Multiply `self * other` entrywise.
    ///
    /// Returns the product string and the accumulated power of `i` (mod 4),
    /// so `self * other = i^phase * result`.
    pub fn mul(&self, other: &PauliString) -> (PauliString, u8) {
        let mut terms = Vec::with_capacity(self.terms.len() + other.terms.len());
        let mut phase: u8 = 0;
        let mut lhs = self.terms.iter().copied().peekable();
        let mut rhs = other.terms.iter().copied().peekable();
        loop {
            match (lhs.peek().copied(), rhs.peek().copied()) {
                (Some((ql, pl)), Some((qr, pr))) => {
                    if ql < qr {
                        terms.push((ql, pl));
                        lhs.next();
                    } else if qr < ql {
                        terms.push((qr, pr));
                        rhs.next();
                    } else {
                        let (p, ph) = pl.mul(pr);
                        phase = (phase + ph) % 4;
                        if !p.is_identity() {
                            terms.push((ql, p));
                        }
                        lhs.next();
                        rhs.next();
                    }
                }
                (Some(t), None) => {
                    terms.push(t);
                    lhs.next();
                }
                (None, Some(t)) => {
                    terms.push(t);
                    rhs.next();
                }
                (None, None) => break,
            }
        }
        (PauliString { terms }, phase)
    }
}

impl fmt::Display for PauliString {
    /// Formats as e.g. `X(q0)·Z(q2)`, or `I` for the identity string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("I");
        }
        for (i, (q, p)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str("·")?;
            }
            write!(f, "{p}({q})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pauli_mul_phases() {
        assert_eq!(Pauli::X.mul(Pauli::Y), (Pauli::Z, 1));
        assert_eq!(Pauli::Y.mul(Pauli::X), (Pauli::Z, 3));
        assert_eq!(Pauli::Z.mul(Pauli::Z), (Pauli::I, 0));
        assert_eq!(Pauli::I.mul(Pauli::Y), (Pauli::Y, 0));
    }

    #[test]
    fn test_single_qubit_commutation() {
        assert!(Pauli::X.commutes_with(Pauli::X));
        assert!(Pauli::X.commutes_with(Pauli::I));
        assert!(!Pauli::X.commutes_with(Pauli::Z));
    }

    #[test]
    fn test_string_construction() {
        let p = PauliString::from_pairs([(QubitId(2), Pauli::Z), (QubitId(0), Pauli::X)]).unwrap();
        assert_eq!(p.weight(), 2);
        assert_eq!(p.get(QubitId(0)), Pauli::X);
        assert_eq!(p.get(QubitId(1)), Pauli::I);
        assert_eq!(p.get(QubitId(2)), Pauli::Z);
    }

    #[test]
    fn test_identity_entries_elided() {
        let p = PauliString::from_pairs([(QubitId(0), Pauli::I)]).unwrap();
        assert!(p.is_identity());
        let p = PauliString::single(QubitId(0), Pauli::X).with(QubitId(0), Pauli::I);
        assert!(p.is_identity());
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let res = PauliString::from_pairs([(QubitId(0), Pauli::X), (QubitId(0), Pauli::Z)]);
        assert!(matches!(res, Err(IrError::DuplicateQubit { .. })));
    }

    #[test]
    fn test_string_commutation() {
        // X0 and Z0 anticommute.
        let x0 = PauliString::single(QubitId(0), Pauli::X);
        let z0 = PauliString::single(QubitId(0), Pauli::Z);
        assert!(!x0.commutes_with(&z0));

        // X0X1 and Z0Z1 commute (two anticommuting positions).
        let xx = PauliString::from_pairs([(QubitId(0), Pauli::X), (QubitId(1), Pauli::X)]).unwrap();
        let zz = PauliString::from_pairs([(QubitId(0), Pauli::Z), (QubitId(1), Pauli::Z)]).unwrap();
        assert!(xx.commutes_with(&zz));

        // Identity commutes with everything.
        assert!(PauliString::new().commutes_with(&x0));
    }

    #[test]
    fn test_string_mul() {
        let x0 = PauliString::single(QubitId(0), Pauli::X);
        let y0 = PauliString::single(QubitId(0), Pauli::Y);
        let (prod, phase) = x0.mul(&y0);
        assert_eq!(prod, PauliString::single(QubitId(0), Pauli::Z));
        assert_eq!(phase, 1);

        // Disjoint supports multiply without phase.
        let z1 = PauliString::single(QubitId(1), Pauli::Z);
        let (prod, phase) = x0.mul(&z1);
        assert_eq!(phase, 0);
        assert_eq!(prod.weight(), 2);

        // Self-product is the identity.
        let (prod, phase) = x0.mul(&x0);
        assert!(prod.is_identity());
        assert_eq!(phase, 0);
    }

    #[test]
    fn test_display() {
        let p = PauliString::from_pairs([(QubitId(0), Pauli::X), (QubitId(2), Pauli::Z)]).unwrap();
        assert_eq!(format!("{p}"), "X(q0)·Z(q2)");
        assert_eq!(format!("{}", PauliString::new()), "I");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_string() -> impl Strategy<Value = PauliString> {
            let pauli = prop_oneof![
                Just(Pauli::I),
                Just(Pauli::X),
                Just(Pauli::Y),
                Just(Pauli::Z)
            ];
            proptest::collection::vec(pauli, 0..6).prop_map(|paulis| {
                PauliString::from_pairs(
                    paulis
                        .into_iter()
                        .enumerate()
                        .map(|(q, p)| (QubitId(q as u32), p)),
                )
                .unwrap()
            })
        }

        proptest! {
            #[test]
            fn prop_commutation_is_symmetric(a in arb_string(), b in arb_string()) {
                prop_assert_eq!(a.commutes_with(&b), b.commutes_with(&a));
            }

            #[test]
            fn prop_self_product_is_identity(a in arb_string()) {
                let (prod, phase) = a.mul(&a);
                prop_assert!(prod.is_identity());
                prop_assert_eq!(phase, 0);
            }

            // ab = (-1)^c ba with c the commutation bit, so the phases of
            // the two orderings differ by 2 mod 4 exactly when a and b
            // anticommute.
            #[test]
            fn prop_phase_tracks_commutation(a in arb_string(), b in arb_string()) {
                let (ab, p_ab) = a.mul(&b);
                let (ba, p_ba) = b.mul(&a);
                prop_assert_eq!(ab, ba);
                let diff = (4 + p_ab - p_ba) % 4;
                if a.commutes_with(&b) {
                    prop_assert_eq!(diff, 0);
                } else {
                    prop_assert_eq!(diff, 2);
                }
            }

            #[test]
            fn prop_product_support_bounded(a in arb_string(), b in arb_string()) {
                let (prod, _) = a.mul(&b);
                prop_assert!(prod.weight() <= a.weight() + b.weight());
                for (q, _) in prod.iter() {
                    prop_assert!(!a.get(q).is_identity() || !b.get(q).is_identity());
                }
            }
        }
    }
}
