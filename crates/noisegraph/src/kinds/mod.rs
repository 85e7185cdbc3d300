// SPDX-License-Identifier: MIT OR Apache-2.0
//! Concrete node variants and their code-emission contracts.
//!
//! Every site that depends on the variant matches `NodeKind` exhaustively,
//! so a new variant does not compile until emission and slot generation
//! handle it.

pub mod math;
pub mod noise;
pub mod worley;

use crate::compile::CompileError;
use crate::node::{NodeKind, NodeUid};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of seed components a noise node consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimensions {
    /// Scalar seed
    One,
    /// `float2` seed
    Two,
    /// `float3` seed
    Three,
}

impl Dimensions {
    /// All dimensionalities in ascending order
    pub const ALL: [Dimensions; 3] = [Self::One, Self::Two, Self::Three];

    /// Component count
    pub fn count(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Smallest dimensionality holding `count` components (clamped to 1..=3)
    pub fn from_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::One,
            2 => Self::Two,
            _ => Self::Three,
        }
    }

    /// Shading-language type of a vector with this many components
    pub fn vector_type(self) -> &'static str {
        match self {
            Self::One => "float",
            Self::Two => "float2",
            Self::Three => "float3",
        }
    }

    /// Build a vector expression from per-component expressions
    pub fn vector(self, components: &[String]) -> String {
        match self {
            Self::One => components.join(", "),
            Self::Two | Self::Three => {
                format!("{}({})", self.vector_type(), components.join(", "))
            }
        }
    }
}

/// Axis of the evaluation position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// First component
    X,
    /// Second component
    Y,
    /// Third component
    Z,
}

impl Axis {
    /// All axes in component order
    pub const ALL: [Axis; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Upper-case label used in names
    pub fn label(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }

    /// Swizzle suffix
    pub fn swizzle(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Names the emitter needs from the surrounding function
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    /// Name of the seed position parameter
    pub seed_name: &'a str,
}

impl Default for EmitContext<'_> {
    fn default() -> Self {
        Self { seed_name: "pos" }
    }
}

/// Deduplication key for one-time helper definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HelperKey {
    /// Per-node Worley helper with custom formulas
    CustomWorley(NodeUid),
}

/// A helper definition requested by a node
#[derive(Debug, Clone, PartialEq)]
pub struct HelperDefinition {
    /// Deduplication key
    pub key: HelperKey,
    /// Source text
    pub text: String,
    /// Non-fatal findings while generating the helper
    pub warnings: Vec<String>,
}

impl NodeKind {
    /// Emit the statement computing this node into `variable`.
    ///
    /// `inputs` are resolved slot expressions in slot order.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` is shorter than [`NodeKind::slot_specs`];
    /// [`Graph::compile_with`](crate::graph::Graph::compile_with) checks this
    /// before emitting.
    pub fn emit_code(
        &self,
        uid: NodeUid,
        ctx: &EmitContext<'_>,
        variable: &str,
        inputs: &[String],
    ) -> String {
        let value = match self {
            Self::Noise(noise) => noise.expression(uid, inputs),
            Self::Math(op) => op.expression(inputs),
            Self::Coordinate(axis) => format!("{}.{}", ctx.seed_name, axis.swizzle()),
        };
        format!("float {variable} = {value};")
    }

    /// One-time definition this node's statement depends on, if any
    pub fn helper_definition(&self, uid: NodeUid) -> Result<Option<HelperDefinition>, CompileError> {
        match self {
            Self::Noise(noise) => noise.helper_definition(uid),
            Self::Math(_) | Self::Coordinate(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("in{i}")).collect()
    }

    #[test]
    fn test_every_kind_emits_a_declaration() {
        let ctx = EmitContext::default();
        for kind in NodeKind::catalog() {
            let inputs = names(kind.slot_specs().len());
            let code = kind.emit_code(NodeUid(3), &ctx, "v_3", &inputs);
            assert!(code.starts_with("float v_3 = "), "{kind}: {code}");
            assert!(code.ends_with(';'), "{kind}: {code}");
            for input in &inputs {
                assert!(code.contains(input.as_str()), "{kind} dropped {input}: {code}");
            }
            assert!(kind.helper_definition(NodeUid(3)).unwrap().is_none(), "{kind}");
        }
    }

    #[test]
    fn test_vector_construction() {
        let parts = vec!["a".to_string(), "b".to_string()];
        assert_eq!(Dimensions::Two.vector(&parts), "float2(a, b)");
        assert_eq!(Dimensions::One.vector(&parts[..1]), "a");
        assert_eq!(Dimensions::from_count(5), Dimensions::Three);
    }

    #[test]
    fn test_coordinate_reads_seed() {
        let ctx = EmitContext { seed_name: "uvw" };
        let code = NodeKind::Coordinate(Axis::Y).emit_code(NodeUid(0), &ctx, "CoordinateY_0", &[]);
        assert_eq!(code, "float CoordinateY_0 = uvw.y;");
    }
}
