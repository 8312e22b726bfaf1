//! DAG-based operation graph.

use petgraph::Direction;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{IrError, IrResult};
use crate::op::{Instruction, OpKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the operation graph.
pub type NodeIndex = petgraph::stable_graph::NodeIndex;

/// A node in the operation graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node.
    Op(Instruction),
}

impl GraphNode {
    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, GraphNode::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            GraphNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireId::Qubit(q) => write!(f, "{q}"),
            WireId::Clbit(c) => write!(f, "{c}"),
        }
    }
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the operation graph representing a wire segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireEdge {
    /// The wire this edge belongs to.
    pub wire: WireId,
}

/// DAG representation of a QEC operation graph.
///
/// - Nodes are wire inputs, wire outputs, or operations
/// - Edges represent wire segments (quantum or classical)
/// - Each wire forms a path from its In node to its Out node
///
/// The graph uses petgraph's stable indices, so removing a node never
/// invalidates the indices of the remaining nodes. A `wire_front` index
/// maps each wire to the node just before its Out node, giving O(1)
/// predecessor lookups when appending operations.
#[derive(Debug, Clone)]
pub struct OpGraph {
    /// The underlying graph.
    graph: StableDiGraph<GraphNode, WireEdge>,
    /// Map from qubit to its input node.
    qubit_inputs: FxHashMap<QubitId, NodeIndex>,
    /// Map from qubit to its output node.
    qubit_outputs: FxHashMap<QubitId, NodeIndex>,
    /// Map from classical bit to its input node.
    clbit_inputs: FxHashMap<ClbitId, NodeIndex>,
    /// Map from classical bit to its output node.
    clbit_outputs: FxHashMap<ClbitId, NodeIndex>,
    /// Maps each wire to the node just before its Out node.
    wire_front: FxHashMap<WireId, NodeIndex>,
    /// Next id handed out by `alloc_qubit`.
    next_qubit: u32,
    /// Next id handed out by `alloc_clbit`.
    next_clbit: u32,
}

impl OpGraph {
    /// Create a new empty operation graph.
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
            qubit_inputs: FxHashMap::default(),
            qubit_outputs: FxHashMap::default(),
            clbit_inputs: FxHashMap::default(),
            clbit_outputs: FxHashMap::default(),
            wire_front: FxHashMap::default(),
            next_qubit: 0,
            next_clbit: 0,
        }
    }

    /// Add a qubit wire to the graph.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.qubit_inputs.contains_key(&qubit) {
            return;
        }
        let wire = WireId::Qubit(qubit);
        let in_node = self.graph.add_node(GraphNode::In(wire));
        let out_node = self.graph.add_node(GraphNode::Out(wire));
        self.graph.add_edge(in_node, out_node, WireEdge { wire });
        self.qubit_inputs.insert(qubit, in_node);
        self.qubit_outputs.insert(qubit, out_node);
        self.wire_front.insert(wire, in_node);
        self.next_qubit = self.next_qubit.max(qubit.0 + 1);
    }

    /// Add a classical wire to the graph.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.clbit_inputs.contains_key(&clbit) {
            return;
        }
        let wire = WireId::Clbit(clbit);
        let in_node = self.graph.add_node(GraphNode::In(wire));
        let out_node = self.graph.add_node(GraphNode::Out(wire));
        self.graph.add_edge(in_node, out_node, WireEdge { wire });
        self.clbit_inputs.insert(clbit, in_node);
        self.clbit_outputs.insert(clbit, out_node);
        self.wire_front.insert(wire, in_node);
        self.next_clbit = self.next_clbit.max(clbit.0 + 1);
    }

    /// Allocate a fresh qubit wire (for ancillas).
    pub fn alloc_qubit(&mut self) -> QubitId {
        let qubit = QubitId(self.next_qubit);
        self.add_qubit(qubit);
        qubit
    }

    /// Allocate a fresh classical wire (for measurement outcomes).
    pub fn alloc_clbit(&mut self) -> ClbitId {
        let clbit = ClbitId(self.next_clbit);
        self.add_clbit(clbit);
        clbit
    }

    /// Validate an instruction's operands against this graph.
    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let op_name = instruction.name();

        if instruction.qubits.is_empty() {
            return Err(IrError::InvalidGraph(format!(
                "Operation '{op_name}' has no qubit operands"
            )));
        }

        match &instruction.kind {
            OpKind::Ppr { paulis, .. } | OpKind::Ppm { paulis, .. } => {
                if paulis.len() != instruction.qubits.len() {
                    return Err(IrError::PauliArityMismatch {
                        op_name: op_name.to_string(),
                        qubits: instruction.qubits.len(),
                        paulis: paulis.len(),
                    });
                }
            }
            OpKind::Prepare { .. } => {
                if instruction.qubits.len() != 1 {
                    return Err(IrError::InvalidGraph(format!(
                        "Operation '{op_name}' must act on exactly one qubit"
                    )));
                }
            }
        }

        let expected_clbits = match &instruction.kind {
            OpKind::Ppm { .. } => Some(1),
            // A rotation carries any number of sign-selection bits.
            OpKind::Ppr { .. } => None,
            OpKind::Prepare { .. } => Some(0),
        };
        if let Some(expected) = expected_clbits {
            if instruction.clbits.len() != expected {
                return Err(IrError::ClbitCountMismatch {
                    op_name: op_name.to_string(),
                    expected,
                    got: instruction.clbits.len(),
                });
            }
        }

        for &qubit in &instruction.qubits {
            if !self.qubit_inputs.contains_key(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    op_name: Some(op_name.to_string()),
                });
            }
        }
        for &clbit in &instruction.clbits {
            if !self.clbit_inputs.contains_key(&clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    op_name: Some(op_name.to_string()),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    op_name: Some(op_name.to_string()),
                });
            }
        }

        let mut seen_clbits = FxHashSet::default();
        for &clbit in &instruction.clbits {
            if !seen_clbits.insert(clbit) {
                return Err(IrError::DuplicateClbit {
                    clbit,
                    op_name: Some(op_name.to_string()),
                });
            }
        }

        Ok(())
    }

    /// Wires touched by an instruction, qubit wires first.
    fn wires_of(instruction: &Instruction) -> impl Iterator<Item = WireId> + '_ {
        instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
    }

    /// Out node of a wire.
    fn out_node(&self, wire: WireId) -> Option<NodeIndex> {
        match wire {
            WireId::Qubit(q) => self.qubit_outputs.get(&q).copied(),
            WireId::Clbit(c) => self.clbit_outputs.get(&c).copied(),
        }
    }

    /// In node of a wire.
    fn in_node(&self, wire: WireId) -> Option<NodeIndex> {
        match wire {
            WireId::Qubit(q) => self.qubit_inputs.get(&q).copied(),
            WireId::Clbit(c) => self.clbit_inputs.get(&c).copied(),
        }
    }

    /// Append an instruction at the current front of its wires.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.validate(&instruction)?;

        let wires: Vec<WireId> = Self::wires_of(&instruction).collect();
        let op_node = self.graph.add_node(GraphNode::Op(instruction));

        for wire in wires {
            let out_node = self.out_node(wire).ok_or(IrError::InvalidNode)?;
            let prev_node = self.wire_front[&wire];

            let edge_id = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidGraph(format!(
                        "Missing edge from front to output for wire {wire}"
                    ))
                })?;
            self.graph.remove_edge(edge_id);
            self.graph.add_edge(prev_node, op_node, WireEdge { wire });
            self.graph.add_edge(op_node, out_node, WireEdge { wire });
            self.wire_front.insert(wire, op_node);
        }

        Ok(op_node)
    }

    /// Iterate over operations in topological order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        petgraph::algo::toposort(&self.graph, None)
            .expect("DAG must be acyclic — cycle detected in operation graph")
            .into_iter()
            .filter_map(|idx| match &self.graph[idx] {
                GraphNode::Op(inst) => Some((idx, inst)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(|n| n.instruction())
    }

    /// Remove an operation node, reconnecting its wires.
    pub fn remove_op(&mut self, node: NodeIndex) -> IrResult<Instruction> {
        let graph_node = self.graph.node_weight(node).ok_or(IrError::InvalidNode)?;
        let GraphNode::Op(_) = graph_node else {
            return Err(IrError::InvalidGraph(
                "Cannot remove non-operation node".into(),
            ));
        };

        let incoming: Vec<(NodeIndex, WireId)> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.source(), e.weight().wire))
            .collect();
        let outgoing: Vec<(NodeIndex, WireId)> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), e.weight().wire))
            .collect();

        for &(pred, wire) in &incoming {
            if self.wire_front.get(&wire) == Some(&node) {
                self.wire_front.insert(wire, pred);
            }
        }

        let Some(GraphNode::Op(instruction)) = self.graph.remove_node(node) else {
            return Err(IrError::InvalidNode);
        };

        for &(pred, wire) in &incoming {
            for &(succ, succ_wire) in &outgoing {
                if wire == succ_wire {
                    self.graph.add_edge(pred, succ, WireEdge { wire });
                }
            }
        }

        Ok(instruction)
    }

    /// Atomically replace an operation node with a sequence of operations.
    ///
    /// The replacement is spliced into the victim's position: for every wire
    /// through the victim, the replacement chain is wired between the
    /// victim's predecessor and successor on that wire, preserving all
    /// external dependencies. Replacement operations may additionally use
    /// fresh wires (added but not yet carrying any operation), which is how
    /// decompositions introduce ancillas and outcome bits.
    ///
    /// All validation happens before the first mutation, so on error the
    /// graph is unchanged and the victim is still in place.
    pub fn splice(
        &mut self,
        node: NodeIndex,
        replacement: Vec<Instruction>,
    ) -> IrResult<Vec<NodeIndex>> {
        let Some(GraphNode::Op(_)) = self.graph.node_weight(node) else {
            return Err(IrError::InvalidNode);
        };

        let preds: FxHashMap<WireId, NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.weight().wire, e.source()))
            .collect();
        let succs: FxHashMap<WireId, NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.weight().wire, e.target()))
            .collect();

        // Validate everything up front: operand sanity, and the scope rule
        // that replacement wires are either the victim's or still unused.
        let mut fresh_wires: Vec<WireId> = vec![];
        for inst in &replacement {
            self.validate(inst)?;
            for wire in Self::wires_of(inst) {
                if preds.contains_key(&wire) || fresh_wires.contains(&wire) {
                    continue;
                }
                let front = self.wire_front[&wire];
                if Some(front) != self.in_node(wire) {
                    return Err(IrError::ForeignWire {
                        wire: wire.to_string(),
                    });
                }
                fresh_wires.push(wire);
            }
        }

        self.graph.remove_node(node);

        // Tails: the node each wire's chain currently ends at.
        let mut tails: FxHashMap<WireId, NodeIndex> = preds.clone();
        // Where each wire's chain must reconnect to.
        let mut closes: FxHashMap<WireId, NodeIndex> = succs.clone();

        for &wire in &fresh_wires {
            let in_node = self.in_node(wire).ok_or(IrError::InvalidNode)?;
            let out_node = self.out_node(wire).ok_or(IrError::InvalidNode)?;
            let edge_id = self
                .graph
                .edges_directed(in_node, Direction::Outgoing)
                .find(|e| e.weight().wire == wire)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidGraph(format!("Missing seed edge for fresh wire {wire}"))
                })?;
            self.graph.remove_edge(edge_id);
            tails.insert(wire, in_node);
            closes.insert(wire, out_node);
        }

        let mut new_nodes = Vec::with_capacity(replacement.len());
        for inst in replacement {
            let wires: Vec<WireId> = Self::wires_of(&inst).collect();
            let op_node = self.graph.add_node(GraphNode::Op(inst));
            for wire in wires {
                let tail = tails[&wire];
                self.graph.add_edge(tail, op_node, WireEdge { wire });
                tails.insert(wire, op_node);
            }
            new_nodes.push(op_node);
        }

        for (&wire, &succ) in &closes {
            let tail = tails[&wire];
            self.graph.add_edge(tail, succ, WireEdge { wire });
            if self.out_node(wire) == Some(succ) {
                self.wire_front.insert(wire, tail);
            }
        }

        Ok(new_nodes)
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubit_inputs.len()
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.clbit_inputs.len()
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        let io_nodes = 2 * (self.qubit_inputs.len() + self.clbit_inputs.len());
        self.graph.node_count().saturating_sub(io_nodes)
    }

    /// Calculate the graph depth (longest operation chain).
    pub fn depth(&self) -> usize {
        let mut depths: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(self.graph.node_count(), Default::default());
        let mut max_depth = 0usize;

        for node in petgraph::algo::toposort(&self.graph, None)
            .expect("DAG must be acyclic — cycle detected in operation graph")
        {
            let max_pred_depth = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths.get(&e.source()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);

            let node_depth = if self.graph[node].is_op() {
                max_pred_depth + 1
            } else {
                max_pred_depth
            };

            max_depth = max_depth.max(node_depth);
            depths.insert(node, node_depth);
        }

        max_depth
    }

    /// Iterate over qubits.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.qubit_inputs.keys().copied()
    }

    /// Iterate over classical bits.
    pub fn clbits(&self) -> impl Iterator<Item = ClbitId> + '_ {
        self.clbit_inputs.keys().copied()
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &StableDiGraph<GraphNode, WireEdge> {
        &self.graph
    }

    /// The immediate successor operation on a given qubit wire, if the next
    /// node on that wire is an operation (rather than the wire output).
    pub fn successor_op_on(&self, node: NodeIndex, qubit: QubitId) -> Option<NodeIndex> {
        let wire = WireId::Qubit(qubit);
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire)
            .map(|e| e.target())
            .filter(|&t| self.graph[t].is_op())
    }

    /// Verify the structural integrity of the graph.
    ///
    /// Checks acyclicity, In/Out pairing for every wire, and that every
    /// wire forms an unbroken path from its In node to its Out node.
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidGraph("Graph contains a cycle".into()));
        }

        for &qubit in self.qubit_inputs.keys() {
            if !self.qubit_outputs.contains_key(&qubit) {
                return Err(IrError::InvalidGraph(format!(
                    "Qubit {qubit} has an In node but no Out node"
                )));
            }
        }
        for &clbit in self.clbit_inputs.keys() {
            if !self.clbit_outputs.contains_key(&clbit) {
                return Err(IrError::InvalidGraph(format!(
                    "Clbit {clbit} has an In node but no Out node"
                )));
            }
        }

        let wires: Vec<WireId> = self
            .qubit_inputs
            .keys()
            .map(|&q| WireId::Qubit(q))
            .chain(self.clbit_inputs.keys().map(|&c| WireId::Clbit(c)))
            .collect();

        for wire in wires {
            let in_node = self.in_node(wire).ok_or(IrError::InvalidNode)?;
            let out_node = self.out_node(wire).ok_or(IrError::InvalidNode)?;
            let max_steps = self.graph.node_count();

            let mut current = in_node;
            let mut steps = 0;
            while current != out_node {
                let next = self
                    .graph
                    .edges_directed(current, Direction::Outgoing)
                    .find(|e| e.weight().wire == wire)
                    .map(|e| e.target());
                match next {
                    Some(n) => current = n,
                    None => {
                        return Err(IrError::InvalidGraph(format!(
                            "Wire {wire} is broken: no outgoing edge from node {current:?}"
                        )));
                    }
                }
                steps += 1;
                if steps > max_steps {
                    return Err(IrError::InvalidGraph(format!(
                        "Wire {wire} has too many steps (possible loop)"
                    )));
                }
            }

            // Front index must point at the node before the Out node.
            let front = self.wire_front[&wire];
            let front_ok = self
                .graph
                .edges_directed(front, Direction::Outgoing)
                .any(|e| e.weight().wire == wire && e.target() == out_node);
            if !front_ok {
                return Err(IrError::InvalidGraph(format!(
                    "Stale wire front for wire {wire}"
                )));
            }
        }

        Ok(())
    }
}

impl Default for OpGraph {
    fn default() -> Self {
        Self::new()
    }
}
