// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the noise graph.

use crate::expression::Expression;
use crate::kinds::math::MathOp;
use crate::kinds::noise::{NoiseKind, NoiseNode};
use crate::kinds::worley;
use crate::kinds::{Axis, Dimensions};
use crate::slot::{Slot, SlotSpec};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node, stable for the node's lifetime and persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeUid(pub u32);

impl fmt::Display for NodeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of node variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Noise generator
    Noise(NoiseNode),
    /// Arithmetic, intrinsic or remap operation
    Math(MathOp),
    /// One component of the evaluation position
    Coordinate(Axis),
}

impl NodeKind {
    /// Every node kind in its default configuration
    pub fn catalog() -> Vec<NodeKind> {
        let mut kinds = Vec::new();
        for kind in NoiseKind::ALL {
            for dimensions in Dimensions::ALL {
                kinds.push(Self::Noise(NoiseNode::new(kind, dimensions)));
            }
        }
        kinds.extend(MathOp::ALL.into_iter().map(Self::Math));
        kinds.extend(Axis::ALL.into_iter().map(Self::Coordinate));
        kinds
    }

    /// Look up a kind by its stable type id
    pub fn from_type_id(id: &str) -> Result<Self, UnknownNodeType> {
        Self::catalog()
            .into_iter()
            .find(|kind| kind.type_id() == id)
            .ok_or_else(|| UnknownNodeType(id.to_string()))
    }

    /// Stable type id, e.g. `WhiteNoise1` or `Power`
    pub fn type_id(&self) -> String {
        match self {
            Self::Noise(noise) => noise.type_id(),
            Self::Math(op) => op.type_id().to_string(),
            Self::Coordinate(axis) => format!("Coordinate{}", axis.label()),
        }
    }

    /// Human-readable name, used as the default node name
    pub fn display_name(&self) -> String {
        match self {
            Self::Noise(noise) => noise.display_name(),
            Self::Math(op) => op.display_name().to_string(),
            Self::Coordinate(axis) => format!("Coordinate {}", axis.label()),
        }
    }

    /// Input slots declared by this kind and configuration
    pub fn slot_specs(&self) -> Vec<SlotSpec> {
        match self {
            Self::Noise(noise) => noise.slot_specs(),
            Self::Math(op) => op.slot_specs(),
            Self::Coordinate(_) => Vec::new(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_id())
    }
}

/// Raised when a host names a node type that does not exist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown node type: {0}")]
pub struct UnknownNodeType(pub String);

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub(crate) uid: NodeUid,
    /// Display name (can be customized)
    pub(crate) name: String,
    /// Variant and configuration
    pub(crate) kind: NodeKind,
    /// Input slots, in the order declared by `kind`
    pub(crate) inputs: Vec<Slot>,
}

impl Node {
    /// Create a node with default slots
    pub(crate) fn new(uid: NodeUid, kind: NodeKind) -> Self {
        Self {
            uid,
            name: kind.display_name(),
            inputs: kind.slot_specs().iter().map(SlotSpec::instantiate).collect(),
            kind,
        }
    }

    /// Unique instance ID
    pub fn uid(&self) -> NodeUid {
        self.uid
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variant and configuration
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Input slots
    pub fn inputs(&self) -> &[Slot] {
        &self.inputs
    }

    /// Get an input slot by index
    pub fn input(&self, index: usize) -> Option<&Slot> {
        self.inputs.get(index)
    }

    /// Find a slot index by name
    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|slot| slot.name == name)
    }

    /// Nodes referenced by this node's inputs, in slot order
    pub fn dependencies(&self) -> impl Iterator<Item = NodeUid> + '_ {
        self.inputs.iter().filter_map(|slot| slot.expression.target())
    }

    /// Name of the variable holding this node's output in generated source.
    ///
    /// A name reducing to the Worley helper stem gets an `n` prefix so the
    /// variable cannot shadow the node's own helper function.
    pub fn variable_name(&self) -> String {
        let mut ident = identifier(&self.name);
        if ident == worley::HELPER_STEM {
            ident.insert(0, 'n');
        }
        format!("{ident}_{}", self.uid)
    }

    /// Replace every reference to `target` with the slot default, returning touched slot indices
    pub(crate) fn detach(&mut self, target: NodeUid) -> Vec<usize> {
        let mut touched = Vec::new();
        for (index, slot) in self.inputs.iter_mut().enumerate() {
            if slot.expression.references(target) {
                slot.reset();
                touched.push(index);
            }
        }
        touched
    }

    pub(crate) fn set_expression(&mut self, index: usize, expression: Expression) -> bool {
        match self.inputs.get_mut(index) {
            Some(slot) => {
                slot.expression = expression;
                true
            }
            None => false,
        }
    }
}

/// Reduce a display name to an identifier fragment: ASCII alphanumerics only.
pub fn identifier(name: &str) -> String {
    let mut ident: String = name.chars().filter(char::is_ascii_alphanumeric).collect();
    if ident.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        ident.insert(0, 'n');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_type_ids_round_trip() {
        let catalog = NodeKind::catalog();
        let ids: HashSet<String> = catalog.iter().map(NodeKind::type_id).collect();
        assert_eq!(ids.len(), catalog.len(), "type ids must be unique");

        for kind in &catalog {
            let parsed = NodeKind::from_type_id(&kind.type_id()).unwrap();
            assert_eq!(&parsed, kind);
        }
    }

    #[test]
    fn test_catalog_covers_every_noise_configuration() {
        let noise_count = NodeKind::catalog()
            .iter()
            .filter(|kind| matches!(kind, NodeKind::Noise(_)))
            .count();
        assert_eq!(noise_count, NoiseKind::ALL.len() * Dimensions::ALL.len());
    }

    #[test]
    fn test_unknown_type_id() {
        let err = NodeKind::from_type_id("FractalNoise4").unwrap_err();
        assert_eq!(err, UnknownNodeType("FractalNoise4".to_string()));
    }

    #[test]
    fn test_known_type_ids() {
        assert_eq!(
            NodeKind::Noise(NoiseNode::new(NoiseKind::White, Dimensions::One)).type_id(),
            "WhiteNoise1"
        );
        assert_eq!(NodeKind::Math(MathOp::Power).type_id(), "Power");
        assert_eq!(NodeKind::Coordinate(Axis::Z).type_id(), "CoordinateZ");
    }

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("White Noise 1D"), "WhiteNoise1D");
        assert_eq!(identifier("3 octaves"), "n3octaves");
        assert_eq!(identifier("__"), "n");
    }

    #[test]
    fn test_variable_name_uses_uid() {
        let node = Node::new(NodeUid(7), NodeKind::Math(MathOp::OneMinus));
        assert_eq!(node.name(), "One Minus");
        assert_eq!(node.variable_name(), "OneMinus_7");
    }

    #[test]
    fn test_helper_stem_is_not_a_bare_variable() {
        let mut node = Node::new(NodeUid(0), NodeKind::Math(MathOp::Sin));
        node.name = "Worley!".to_string();
        assert_eq!(node.variable_name(), "nWorley_0");
        node.name = "Worley 2".to_string();
        assert_eq!(node.variable_name(), "Worley2_0");
    }

    #[test]
    fn test_detach_resets_to_default() {
        let mut node = Node::new(NodeUid(1), NodeKind::Math(MathOp::Multiply));
        node.set_expression(0, Expression::Node(NodeUid(0)));
        node.set_expression(1, Expression::Node(NodeUid(0)));
        assert_eq!(node.detach(NodeUid(0)), vec![0, 1]);
        assert_eq!(node.inputs()[0].expression, Expression::Constant(1.0));
        assert_eq!(node.dependencies().count(), 0);
    }
}
