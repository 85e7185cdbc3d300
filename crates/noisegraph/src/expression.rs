// SPDX-License-Identifier: MIT OR Apache-2.0
//! Expressions: the values that flow into node input slots.

use crate::node::NodeUid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value held by an input slot or by the graph output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Literal numeric constant
    Constant(f32),
    /// Output of another node
    Node(NodeUid),
}

impl Expression {
    /// The referenced node, if this is a reference
    pub fn target(&self) -> Option<NodeUid> {
        match self {
            Self::Constant(_) => None,
            Self::Node(uid) => Some(*uid),
        }
    }

    /// The constant value, if this is a literal
    pub fn constant(&self) -> Option<f32> {
        match self {
            Self::Constant(value) => Some(*value),
            Self::Node(_) => None,
        }
    }

    /// Check if this expression references a specific node
    pub fn references(&self, uid: NodeUid) -> bool {
        self.target() == Some(uid)
    }
}

impl Default for Expression {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

impl From<f32> for Expression {
    fn from(value: f32) -> Self {
        Self::Constant(value)
    }
}

impl From<NodeUid> for Expression {
    fn from(uid: NodeUid) -> Self {
        Self::Node(uid)
    }
}

/// Where an expression lives inside a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceSite {
    /// An input slot of a node
    Slot {
        /// Owning node
        node: NodeUid,
        /// Slot index on that node
        slot: usize,
    },
    /// The designated graph output
    Output,
}

impl fmt::Display for ReferenceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot { node, slot } => write!(f, "node {node} slot {slot}"),
            Self::Output => f.write_str("graph output"),
        }
    }
}

/// Format a constant as shading-language literal text.
///
/// Uses the shortest representation that round-trips, and always carries a
/// decimal point or exponent so the literal is typed as a float.
pub fn float_literal(value: f32) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    // Debug keeps a trailing ".0" on integral values ("3.0", "1e20")
    Some(format!("{value:?}"))
}

/// Wrap negative literals so they compose safely inside larger expressions
pub(crate) fn operand(text: &str) -> String {
    if text.starts_with('-') {
        format!("({text})")
    } else {
        text.to_string()
    }
}
