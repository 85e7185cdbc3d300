// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input slot definitions for nodes.

use crate::expression::Expression;
use serde::{Deserialize, Serialize};

/// Shape of an input slot as declared by a node kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    /// Slot name, also its semantic position across reconfiguration
    pub name: String,
    /// Value used when nothing else is wired in
    pub default: f32,
}

impl SlotSpec {
    /// Create a new slot spec
    pub fn new(name: impl Into<String>, default: f32) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }

    /// Instantiate a slot holding the default constant
    pub fn instantiate(&self) -> Slot {
        Slot {
            name: self.name.clone(),
            default: self.default,
            expression: Expression::Constant(self.default),
            pinned: false,
        }
    }
}

/// An input slot on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot name
    pub name: String,
    /// Default value declared by the node kind
    pub default: f32,
    /// Current value
    pub expression: Expression,
    /// Hard-wired constant, never exposed as a parameter
    #[serde(default)]
    pub pinned: bool,
}

impl Slot {
    /// Reset the slot to its declared default
    pub fn reset(&mut self) {
        self.expression = Expression::Constant(self.default);
    }

    /// Whether the user wired, changed or pinned the slot
    pub fn is_edited(&self) -> bool {
        self.pinned
            || match self.expression {
                Expression::Constant(value) => value.to_bits() != self.default.to_bits(),
                Expression::Node(_) => true,
            }
    }

    /// Whether this slot becomes an external parameter
    pub fn is_tunable(&self) -> bool {
        !self.pinned && matches!(self.expression, Expression::Constant(_))
    }
}
