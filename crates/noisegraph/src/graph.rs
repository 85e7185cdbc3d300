// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure owning the nodes and the designated output.
//!
//! Edges live inside the nodes as UID-valued [`Expression`]s. They are not
//! validated on mutation; the compiler rejects cycles and dangling references
//! when it walks the graph.

use crate::expression::{Expression, ReferenceSite};
use crate::node::{Node, NodeKind, NodeUid};
use crate::reshape::reshape;
use indexmap::IndexMap;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

/// A noise graph
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeUid, Node>,
    /// Value the compiled function returns
    output: Expression,
    /// Next UID to hand out; never decreases
    next_uid: u32,
}

/// Result of removing a node
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    /// The removed node
    pub node: Node,
    /// Sites that referenced it and were reset to their defaults, sorted
    pub rewritten: Vec<ReferenceSite>,
}

impl Graph {
    /// Create a new empty graph whose output is `0.0`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            output: Expression::Constant(0.0),
            next_uid: 0,
        }
    }

    /// Add a node with default slots, returning its new UID.
    ///
    /// `u32::MAX` is never handed out; once the counter reaches it the graph
    /// accepts no new nodes.
    pub fn add_node(&mut self, kind: NodeKind) -> Result<NodeUid, GraphError> {
        if self.next_uid == u32::MAX {
            return Err(GraphError::UidSpaceExhausted);
        }
        let uid = NodeUid(self.next_uid);
        self.next_uid += 1;
        self.nodes.insert(uid, Node::new(uid, kind));
        tracing::trace!("Added node {uid}");
        Ok(uid)
    }

    /// Insert a node that already carries a UID (persistence)
    pub(crate) fn insert_node(&mut self, node: Node) -> Option<Node> {
        // Saturates at u32::MAX, which add_node treats as exhausted
        self.next_uid = self.next_uid.max(node.uid.0.saturating_add(1));
        self.nodes.insert(node.uid, node)
    }

    /// Remove a node, resetting every reference to it.
    ///
    /// Referencing slots fall back to their declared default constant; an
    /// output that referenced the node becomes `Constant(0.0)`.
    pub fn remove_node(&mut self, uid: NodeUid) -> Result<Removal, GraphError> {
        let node = self
            .nodes
            .shift_remove(&uid)
            .ok_or(GraphError::NodeNotFound(uid))?;

        let mut rewritten = Vec::new();
        for other in self.nodes.values_mut() {
            for slot in other.detach(uid) {
                rewritten.push(ReferenceSite::Slot {
                    node: other.uid,
                    slot,
                });
            }
        }
        if self.output.references(uid) {
            self.output = Expression::Constant(0.0);
            rewritten.push(ReferenceSite::Output);
        }
        rewritten.sort();

        tracing::debug!("Removed node {uid}, rewrote {} references", rewritten.len());
        Ok(Removal { node, rewritten })
    }

    /// Get a node by UID
    pub fn node(&self, uid: NodeUid) -> Option<&Node> {
        self.nodes.get(&uid)
    }

    /// Check whether a node exists
    pub fn contains(&self, uid: NodeUid) -> bool {
        self.nodes.contains_key(&uid)
    }

    /// Get all nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node UIDs, in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeUid> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// UID the next inserted node will receive
    pub fn next_uid(&self) -> NodeUid {
        NodeUid(self.next_uid)
    }

    pub(crate) fn raise_next_uid(&mut self, next: u32) {
        self.next_uid = self.next_uid.max(next);
    }

    /// Rename a node
    pub fn rename(&mut self, uid: NodeUid, name: impl Into<String>) -> Result<(), GraphError> {
        self.node_mut(uid)?.name = name.into();
        Ok(())
    }

    /// Wire an input slot. The target of a reference is checked at compile time.
    pub fn set_input(
        &mut self,
        uid: NodeUid,
        slot: usize,
        expression: impl Into<Expression>,
    ) -> Result<(), GraphError> {
        let node = self.node_mut(uid)?;
        let len = node.inputs.len();
        if node.set_expression(slot, expression.into()) {
            Ok(())
        } else {
            Err(GraphError::SlotOutOfRange { node: uid, slot, len })
        }
    }

    /// Wire an input slot by name
    pub fn set_input_by_name(
        &mut self,
        uid: NodeUid,
        name: &str,
        expression: impl Into<Expression>,
    ) -> Result<(), GraphError> {
        let slot = self.slot_index(uid, name)?;
        self.set_input(uid, slot, expression)
    }

    /// Mark a slot as hard-wired so it is never exposed as a parameter
    pub fn set_pinned(&mut self, uid: NodeUid, slot: usize, pinned: bool) -> Result<(), GraphError> {
        let node = self.node_mut(uid)?;
        let len = node.inputs.len();
        let target = node
            .inputs
            .get_mut(slot)
            .ok_or(GraphError::SlotOutOfRange { node: uid, slot, len })?;
        target.pinned = pinned;
        Ok(())
    }

    /// Find a slot index by name
    pub fn slot_index(&self, uid: NodeUid, name: &str) -> Result<usize, GraphError> {
        let node = self.node(uid).ok_or(GraphError::NodeNotFound(uid))?;
        node.slot_index(name).ok_or_else(|| GraphError::UnknownSlot {
            node: uid,
            name: name.to_string(),
        })
    }

    /// Change a node's variant or configuration, migrating its slots
    pub fn reconfigure(&mut self, uid: NodeUid, kind: NodeKind) -> Result<(), GraphError> {
        let node = self.node_mut(uid)?;
        let default_name = node.name == node.kind.display_name();
        node.inputs = reshape(&node.inputs, &kind);
        if default_name {
            node.name = kind.display_name();
        }
        tracing::debug!("Reconfigured node {uid}: {} -> {kind}", node.kind);
        node.kind = kind;
        Ok(())
    }

    /// Set the designated output
    pub fn set_output(&mut self, output: impl Into<Expression>) {
        self.output = output.into();
    }

    /// The designated output
    pub fn output(&self) -> Expression {
        self.output
    }

    fn node_mut(&mut self, uid: NodeUid) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(&uid).ok_or(GraphError::NodeNotFound(uid))
    }

    /// Distinct referenced nodes that exist, ascending
    fn present_dependencies(&self, uid: NodeUid) -> Vec<NodeUid> {
        let deps: BTreeSet<NodeUid> = self
            .nodes
            .get(&uid)
            .map(|node| node.dependencies().filter(|dep| self.contains(*dep)).collect())
            .unwrap_or_default();
        deps.into_iter().collect()
    }

    /// Find a cycle anywhere in the graph.
    ///
    /// Returns the path `[a, ..., a]` of the first cycle found when roots are
    /// visited in ascending UID order. Iterative, so deep graphs cannot
    /// overflow the stack. References to absent nodes are ignored here.
    pub fn find_cycle(&self) -> Option<Vec<NodeUid>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            InProgress,
            Done,
        }

        struct Frame {
            uid: NodeUid,
            deps: Vec<NodeUid>,
            next: usize,
        }

        let mut marks: HashMap<NodeUid, Mark> = HashMap::new();
        let mut roots: Vec<NodeUid> = self.node_ids().collect();
        roots.sort();

        for root in roots {
            if marks.contains_key(&root) {
                continue;
            }
            marks.insert(root, Mark::InProgress);
            let mut stack = vec![Frame {
                uid: root,
                deps: self.present_dependencies(root),
                next: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                let current = frame.uid;
                let next = frame.deps.get(frame.next).copied();
                frame.next += 1;

                let Some(dep) = next else {
                    marks.insert(current, Mark::Done);
                    stack.pop();
                    continue;
                };

                match marks.get(&dep) {
                    Some(Mark::InProgress) => {
                        let start = stack.iter().position(|f| f.uid == dep).unwrap_or(0);
                        let mut path: Vec<NodeUid> = stack[start..].iter().map(|f| f.uid).collect();
                        path.push(dep);
                        return Some(path);
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(dep, Mark::InProgress);
                        stack.push(Frame {
                            uid: dep,
                            deps: self.present_dependencies(dep),
                            next: 0,
                        });
                    }
                }
            }
        }
        None
    }

    /// Nodes transitively referenced by the output, ignoring absent UIDs
    pub fn reachable(&self) -> BTreeSet<NodeUid> {
        let mut reached = BTreeSet::new();
        let mut stack: Vec<NodeUid> = self.output.target().into_iter().collect();
        while let Some(uid) = stack.pop() {
            let Some(node) = self.nodes.get(&uid) else {
                continue;
            };
            if reached.insert(uid) {
                stack.extend(node.dependencies());
            }
        }
        reached
    }

    /// Dependencies-first order over `subset`, ties broken by ascending UID.
    ///
    /// The graph restricted to `subset` must be acyclic; nodes on a cycle are
    /// left out.
    pub fn topological_order(&self, subset: &BTreeSet<NodeUid>) -> Vec<NodeUid> {
        let mut pending: HashMap<NodeUid, usize> = HashMap::new();
        let mut dependents: HashMap<NodeUid, Vec<NodeUid>> = HashMap::new();

        for &uid in subset {
            let deps: Vec<NodeUid> = self
                .present_dependencies(uid)
                .into_iter()
                .filter(|dep| subset.contains(dep))
                .collect();
            pending.insert(uid, deps.len());
            for dep in deps {
                dependents.entry(dep).or_default().push(uid);
            }
        }

        let mut ready: BinaryHeap<Reverse<NodeUid>> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(uid, _)| Reverse(*uid))
            .collect();
        let mut order = Vec::with_capacity(subset.len());

        while let Some(Reverse(uid)) = ready.pop() {
            order.push(uid);
            for dependent in dependents.get(&uid).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse(*dependent));
                    }
                }
            }
        }
        order
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when editing a graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeUid),

    /// Slot index past the end of the node's inputs
    #[error("Node {node} has {len} slots, no slot {slot}")]
    SlotOutOfRange {
        /// Node being edited
        node: NodeUid,
        /// Requested slot
        slot: usize,
        /// Slot count
        len: usize,
    },

    /// No slot with that name
    #[error("Node {node} has no slot named {name:?}")]
    UnknownSlot {
        /// Node being edited
        node: NodeUid,
        /// Requested slot name
        name: String,
    },

    /// Every assignable UID is taken
    #[error("No node UIDs left to assign")]
    UidSpaceExhausted,
}
