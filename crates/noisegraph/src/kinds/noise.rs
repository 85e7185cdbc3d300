// SPDX-License-Identifier: MIT OR Apache-2.0
//! Noise generator nodes.
//!
//! Noise nodes call into the host's noise-primitive library by the naming
//! convention `<Kind>Noise<N>` (or `hashValue<N>` for white noise). The only
//! code a noise node defines itself is the per-node Worley helper used when
//! its distance or combine formula is customized.

use crate::compile::CompileError;
use crate::expression::operand;
use crate::kinds::worley::{self, WorleyFormulas};
use crate::kinds::{Dimensions, HelperDefinition};
use crate::node::NodeUid;
use crate::slot::SlotSpec;
use serde::{Deserialize, Serialize};

/// Seed slot names by component
pub const SEED_SLOTS: [&str; 3] = ["X", "Y", "Z"];
/// Cell variance slot names by component (Worley only)
pub const VARIANCE_SLOTS: [&str; 3] = ["Variance X", "Variance Y", "Variance Z"];
/// Scale slot name
pub const SCALE_SLOT: &str = "Scale";
/// Weight slot name
pub const WEIGHT_SLOT: &str = "Weight";

/// Noise algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseKind {
    /// Per-point hash
    White,
    /// Hash of the containing grid cell
    Blocky,
    /// Linearly interpolated value noise
    Linear,
    /// Smoothstep-interpolated value noise
    Smooth,
    /// Quintic-interpolated value noise
    Smoother,
    /// Gradient noise
    Perlin,
    /// Cellular noise
    Worley,
}

impl NoiseKind {
    /// Every noise kind, in catalog order
    pub const ALL: [NoiseKind; 7] = [
        Self::White,
        Self::Blocky,
        Self::Linear,
        Self::Smooth,
        Self::Smoother,
        Self::Perlin,
        Self::Worley,
    ];

    /// Word used in type ids and display names
    pub fn label(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Blocky => "Blocky",
            Self::Linear => "Linear",
            Self::Smooth => "Smooth",
            Self::Smoother => "Smoother",
            Self::Perlin => "Perlin",
            Self::Worley => "Worley",
        }
    }

    /// Name of the library primitive for this kind
    pub fn primitive(self, dimensions: Dimensions) -> String {
        let n = dimensions.count();
        match self {
            Self::White => format!("hashValue{n}"),
            Self::Blocky => format!("GridNoise{n}"),
            Self::Linear => format!("LinearNoise{n}"),
            Self::Smooth => format!("SmoothNoise{n}"),
            Self::Smoother => format!("SmootherNoise{n}"),
            Self::Perlin => format!("PerlinNoise{n}"),
            Self::Worley => format!("WorleyNoise{n}"),
        }
    }
}

/// Configuration of a noise node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseNode {
    /// Noise algorithm
    pub kind: NoiseKind,
    /// Seed dimensionality
    pub dimensions: Dimensions,
    /// Distance and combine formulas, used by Worley only
    #[serde(default)]
    pub formulas: WorleyFormulas,
}

impl NoiseNode {
    /// Create a noise node configuration with default formulas
    pub fn new(kind: NoiseKind, dimensions: Dimensions) -> Self {
        Self {
            kind,
            dimensions,
            formulas: WorleyFormulas::default(),
        }
    }

    /// Create a Worley configuration with the given formulas
    pub fn worley(dimensions: Dimensions, formulas: WorleyFormulas) -> Self {
        Self {
            kind: NoiseKind::Worley,
            dimensions,
            formulas,
        }
    }

    /// Same configuration with a different dimensionality
    pub fn with_dimensions(&self, dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            ..self.clone()
        }
    }

    /// Whether this node needs its own Worley helper
    pub fn is_custom_worley(&self) -> bool {
        self.kind == NoiseKind::Worley && !self.formulas.is_default()
    }

    /// Stable type id, e.g. `WhiteNoise1`
    pub fn type_id(&self) -> String {
        format!("{}Noise{}", self.kind.label(), self.dimensions.count())
    }

    /// Display name, e.g. `White Noise 1D`
    pub fn display_name(&self) -> String {
        format!("{} Noise {}D", self.kind.label(), self.dimensions.count())
    }

    /// Function called by the emitted statement
    pub fn function_name(&self, uid: NodeUid) -> String {
        if self.is_custom_worley() {
            worley::helper_name(uid)
        } else {
            self.kind.primitive(self.dimensions)
        }
    }

    /// Declared input slots: seed components, scale, weight, then cell variance for Worley
    pub fn slot_specs(&self) -> Vec<SlotSpec> {
        let n = self.dimensions.count();
        let mut specs: Vec<SlotSpec> = SEED_SLOTS[..n]
            .iter()
            .map(|name| SlotSpec::new(*name, 0.0))
            .collect();
        specs.push(SlotSpec::new(SCALE_SLOT, 1.0));
        specs.push(SlotSpec::new(WEIGHT_SLOT, 1.0));
        if self.kind == NoiseKind::Worley {
            specs.extend(VARIANCE_SLOTS[..n].iter().map(|name| SlotSpec::new(*name, 1.0)));
        }
        specs
    }

    /// `Weight * F(Scale * seed[, variance])`
    pub fn expression(&self, uid: NodeUid, inputs: &[String]) -> String {
        let n = self.dimensions.count();
        let seed = self.dimensions.vector(&inputs[..n]);
        let scale = operand(&inputs[n]);
        let weight = operand(&inputs[n + 1]);
        let seed = match self.dimensions {
            Dimensions::One => operand(&seed),
            Dimensions::Two | Dimensions::Three => seed,
        };
        let function = self.function_name(uid);
        if self.kind == NoiseKind::Worley {
            let variance = self.dimensions.vector(&inputs[n + 2..n + 2 + n]);
            format!("{weight} * {function}({scale} * {seed}, {variance})")
        } else {
            format!("{weight} * {function}({scale} * {seed})")
        }
    }

    /// Custom Worley helper, if this node needs one
    pub fn helper_definition(&self, uid: NodeUid) -> Result<Option<HelperDefinition>, CompileError> {
        if !self.is_custom_worley() {
            return Ok(None);
        }
        worley::custom_helper(uid, self.dimensions, &self.formulas).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_primitive_names() {
        assert_eq!(NoiseKind::White.primitive(Dimensions::One), "hashValue1");
        assert_eq!(NoiseKind::Blocky.primitive(Dimensions::Two), "GridNoise2");
        assert_eq!(NoiseKind::Smoother.primitive(Dimensions::Three), "SmootherNoise3");
        assert_eq!(NoiseKind::Worley.primitive(Dimensions::Three), "WorleyNoise3");
    }

    #[test]
    fn test_white_noise_expression() {
        let node = NoiseNode::new(NoiseKind::White, Dimensions::One);
        let code = node.expression(NodeUid(0), &strings(&["234.1241", "1.0", "1.0"]));
        assert_eq!(code, "1.0 * hashValue1(1.0 * 234.1241)");
    }

    #[test]
    fn test_perlin_2d_expression() {
        let node = NoiseNode::new(NoiseKind::Perlin, Dimensions::Two);
        let code = node.expression(NodeUid(0), &strings(&["a", "b", "4.0", "w"]));
        assert_eq!(code, "w * PerlinNoise2(4.0 * float2(a, b))");
    }

    #[test]
    fn test_worley_slot_layout() {
        let node = NoiseNode::new(NoiseKind::Worley, Dimensions::Two);
        let names: Vec<String> = node.slot_specs().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            ["X", "Y", "Scale", "Weight", "Variance X", "Variance Y"]
        );
    }

    #[test]
    fn test_default_worley_uses_library() {
        let node = NoiseNode::new(NoiseKind::Worley, Dimensions::Three);
        let inputs = strings(&["x", "y", "z", "s", "w", "vx", "vy", "vz"]);
        assert_eq!(
            node.expression(NodeUid(9), &inputs),
            "w * WorleyNoise3(s * float3(x, y, z), float3(vx, vy, vz))"
        );
        assert!(node.helper_definition(NodeUid(9)).unwrap().is_none());
    }

    #[test]
    fn test_custom_worley_uses_helper() {
        let formulas = WorleyFormulas::new("distance($1, $2)", "$2 - $1");
        let node = NoiseNode::worley(Dimensions::One, formulas);
        assert!(node.is_custom_worley());
        let code = node.expression(NodeUid(12), &strings(&["x", "s", "w", "v"]));
        assert_eq!(code, "w * Worley_12(s * x, v)");
        let helper = node.helper_definition(NodeUid(12)).unwrap().unwrap();
        assert!(helper.text.contains("float Worley_12("));
    }

    #[test]
    fn test_formulas_ignored_for_other_kinds() {
        let mut node = NoiseNode::new(NoiseKind::Perlin, Dimensions::One);
        node.formulas = WorleyFormulas::new("abs($1 - $2)", "$1");
        assert!(!node.is_custom_worley());
        assert_eq!(node.function_name(NodeUid(1)), "PerlinNoise1");
    }
}
