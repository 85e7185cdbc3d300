// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic, intrinsic and remap nodes.

use crate::expression::operand;
use crate::slot::SlotSpec;
use serde::{Deserialize, Serialize};

/// Fixed-arity math operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathOp {
    /// `A + B`
    Add,
    /// `A - B`
    Subtract,
    /// `A * B`
    Multiply,
    /// `A / B`
    Divide,
    /// `pow(Base, Exponent)`
    Power,
    /// `min(A, B)`
    Min,
    /// `max(A, B)`
    Max,
    /// `fmod(A, B)`
    Modulo,
    /// `step(Edge, Value)`
    Step,
    /// `abs(Value)`
    Abs,
    /// `-Value`
    Negate,
    /// `1.0 - Value`
    OneMinus,
    /// `floor(Value)`
    Floor,
    /// `ceil(Value)`
    Ceil,
    /// `frac(Value)`
    Frac,
    /// `sqrt(Value)`
    Sqrt,
    /// `sin(Value)`
    Sin,
    /// `cos(Value)`
    Cos,
    /// `saturate(Value)`
    Saturate,
    /// `lerp(A, B, T)`
    Lerp,
    /// `clamp(Value, Min, Max)`
    Clamp,
    /// `smoothstep(Edge0, Edge1, Value)`
    SmoothStep,
    /// Linear remap of `Value` from one range to another
    Remap,
}

impl MathOp {
    /// Every operation, in catalog order
    pub const ALL: [MathOp; 23] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Power,
        Self::Min,
        Self::Max,
        Self::Modulo,
        Self::Step,
        Self::Abs,
        Self::Negate,
        Self::OneMinus,
        Self::Floor,
        Self::Ceil,
        Self::Frac,
        Self::Sqrt,
        Self::Sin,
        Self::Cos,
        Self::Saturate,
        Self::Lerp,
        Self::Clamp,
        Self::SmoothStep,
        Self::Remap,
    ];

    /// Stable type id
    pub fn type_id(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Power => "Power",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Modulo => "Modulo",
            Self::Step => "Step",
            Self::Abs => "Abs",
            Self::Negate => "Negate",
            Self::OneMinus => "OneMinus",
            Self::Floor => "Floor",
            Self::Ceil => "Ceil",
            Self::Frac => "Frac",
            Self::Sqrt => "Sqrt",
            Self::Sin => "Sin",
            Self::Cos => "Cos",
            Self::Saturate => "Saturate",
            Self::Lerp => "Lerp",
            Self::Clamp => "Clamp",
            Self::SmoothStep => "SmoothStep",
            Self::Remap => "Remap",
        }
    }

    /// Display name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OneMinus => "One Minus",
            Self::SmoothStep => "Smooth Step",
            other => other.type_id(),
        }
    }

    /// Declared input slots
    pub fn slot_specs(self) -> Vec<SlotSpec> {
        let specs: &[(&str, f32)] = match self {
            Self::Add | Self::Subtract | Self::Min | Self::Max => &[("A", 0.0), ("B", 0.0)],
            Self::Multiply | Self::Divide => &[("A", 1.0), ("B", 1.0)],
            Self::Modulo => &[("A", 0.0), ("B", 1.0)],
            Self::Power => &[("Base", 0.0), ("Exponent", 1.0)],
            Self::Step => &[("Edge", 0.5), ("Value", 0.0)],
            Self::Abs
            | Self::Negate
            | Self::OneMinus
            | Self::Floor
            | Self::Ceil
            | Self::Frac
            | Self::Sqrt
            | Self::Sin
            | Self::Cos
            | Self::Saturate => &[("Value", 0.0)],
            Self::Lerp => &[("A", 0.0), ("B", 1.0), ("T", 0.5)],
            Self::Clamp => &[("Value", 0.0), ("Min", 0.0), ("Max", 1.0)],
            Self::SmoothStep => &[("Edge0", 0.0), ("Edge1", 1.0), ("Value", 0.0)],
            Self::Remap => &[
                ("Value", 0.0),
                ("From Min", -1.0),
                ("From Max", 1.0),
                ("To Min", 0.0),
                ("To Max", 1.0),
            ],
        };
        specs
            .iter()
            .map(|(name, default)| SlotSpec::new(*name, *default))
            .collect()
    }

    /// Right-hand side computing this operation from resolved inputs
    pub fn expression(self, inputs: &[String]) -> String {
        let arg = |index: usize| operand(&inputs[index]);
        match self {
            Self::Add => format!("{} + {}", arg(0), arg(1)),
            Self::Subtract => format!("{} - {}", arg(0), arg(1)),
            Self::Multiply => format!("{} * {}", arg(0), arg(1)),
            Self::Divide => format!("{} / {}", arg(0), arg(1)),
            Self::Negate => format!("-{}", arg(0)),
            Self::OneMinus => format!("1.0 - {}", arg(0)),
            Self::Remap => {
                let (value, from_min, from_max, to_min, to_max) =
                    (arg(0), arg(1), arg(2), arg(3), arg(4));
                format!(
                    "{to_min} + ({value} - {from_min}) * ({to_max} - {to_min}) / ({from_max} - {from_min})"
                )
            }
            Self::Power => call("pow", inputs),
            Self::Min => call("min", inputs),
            Self::Max => call("max", inputs),
            Self::Modulo => call("fmod", inputs),
            Self::Step => call("step", inputs),
            Self::Abs => call("abs", inputs),
            Self::Floor => call("floor", inputs),
            Self::Ceil => call("ceil", inputs),
            Self::Frac => call("frac", inputs),
            Self::Sqrt => call("sqrt", inputs),
            Self::Sin => call("sin", inputs),
            Self::Cos => call("cos", inputs),
            Self::Saturate => call("saturate", inputs),
            Self::Lerp => call("lerp", inputs),
            Self::Clamp => call("clamp", inputs),
            Self::SmoothStep => call("smoothstep", inputs),
        }
    }
}

fn call(function: &str, inputs: &[String]) -> String {
    format!("{function}({})", inputs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_power_expression() {
        let code = MathOp::Power.expression(&strings(&["WhiteNoise1D_0", "3.0"]));
        assert_eq!(code, "pow(WhiteNoise1D_0, 3.0)");
    }

    #[test]
    fn test_negative_literals_are_wrapped() {
        assert_eq!(MathOp::Subtract.expression(&strings(&["a", "-2.0"])), "a - (-2.0)");
        assert_eq!(MathOp::Negate.expression(&strings(&["-1.0"])), "-(-1.0)");
    }

    #[test]
    fn test_remap_expression() {
        let code = MathOp::Remap.expression(&strings(&["v", "-1.0", "1.0", "0.0", "10.0"]));
        assert_eq!(code, "0.0 + (v - (-1.0)) * (10.0 - 0.0) / (1.0 - (-1.0))");
    }

    #[test]
    fn test_slot_counts() {
        assert_eq!(MathOp::Sin.slot_specs().len(), 1);
        assert_eq!(MathOp::Power.slot_specs().len(), 2);
        assert_eq!(MathOp::Clamp.slot_specs().len(), 3);
        assert_eq!(MathOp::Remap.slot_specs().len(), 5);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(MathOp::SmoothStep.display_name(), "Smooth Step");
        assert_eq!(MathOp::Power.display_name(), "Power");
    }
}
