// SPDX-License-Identifier: MIT OR Apache-2.0
//! Worley helper generation for nodes with custom formulas.
//!
//! One template covers every dimensionality: the neighbor search is driven by
//! [`NeighborStencil`], which enumerates all `3^d` cell offsets with one loop
//! per axis.

use crate::compile::CompileError;
use crate::kinds::{Dimensions, HelperDefinition, HelperKey};
use crate::node::NodeUid;
use crate::template;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Euclidean distance between the sample point and the cell point
pub const DEFAULT_DISTANCE_FORMULA: &str = "distance($1, $2)";
/// Return the nearest distance
pub const DEFAULT_COMBINE_FORMULA: &str = "$1";

/// Stem of per-node helper names; node variables never use it bare
pub const HELPER_STEM: &str = "Worley";
const NEIGHBOR_REACH: i32 = 1;
const LOOP_VARIABLES: [&str; 3] = ["ox", "oy", "oz"];
const JITTER_SALTS: [&str; 3] = ["", " + 17.31", " + 59.97"];
const INDENT: &str = "    ";

/// Distance and combine formulas of a Worley node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorleyFormulas {
    /// Distance between `$1` (sample point) and `$2` (cell point)
    pub distance: String,
    /// Combine `$1` (nearest) and `$2` (second nearest) distances
    pub combine: String,
}

impl WorleyFormulas {
    /// Create formulas from template strings
    pub fn new(distance: impl Into<String>, combine: impl Into<String>) -> Self {
        Self {
            distance: distance.into(),
            combine: combine.into(),
        }
    }

    /// Both formulas exactly match the library defaults
    pub fn is_default(&self) -> bool {
        self.distance == DEFAULT_DISTANCE_FORMULA && self.combine == DEFAULT_COMBINE_FORMULA
    }
}

impl Default for WorleyFormulas {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE_FORMULA, DEFAULT_COMBINE_FORMULA)
    }
}

/// Which Worley formula a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaRole {
    /// Distance formula
    Distance,
    /// Combine formula
    Combine,
}

impl fmt::Display for FormulaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distance => f.write_str("distance"),
            Self::Combine => f.write_str("combine"),
        }
    }
}

/// Neighbor cells visited by the Worley search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborStencil {
    dimensions: Dimensions,
}

impl NeighborStencil {
    /// Stencil over `{-1, 0, 1}^d`
    pub fn new(dimensions: Dimensions) -> Self {
        Self { dimensions }
    }

    /// Number of candidate cells, including the center
    pub fn len(&self) -> usize {
        self.axis_range().count().pow(self.dimensions.count() as u32)
    }

    /// Always false; the center cell is part of every stencil
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Cell offsets visited along each axis
    pub fn axis_range(&self) -> RangeInclusive<i32> {
        -NEIGHBOR_REACH..=NEIGHBOR_REACH
    }

    /// Loop variable per axis, outermost first
    pub fn loop_variables(&self) -> &'static [&'static str] {
        &LOOP_VARIABLES[..self.dimensions.count()]
    }

    /// Emitted `for` header per axis, outermost first, walking [`Self::axis_range`]
    pub fn loop_headers(&self) -> Vec<String> {
        let range = self.axis_range();
        let (first, last) = (range.start(), range.end());
        self.loop_variables()
            .iter()
            .map(|v| format!("for (int {v} = {first}; {v} <= {last}; {v}++)"))
            .collect()
    }

    /// Every offset, first axis outermost; unused axes are zero
    pub fn offsets(&self) -> Vec<[i32; 3]> {
        let mut offsets = vec![[0; 3]];
        for axis in 0..self.dimensions.count() {
            offsets = offsets
                .into_iter()
                .flat_map(|base| {
                    self.axis_range().map(move |step| {
                        let mut offset = base;
                        offset[axis] = step;
                        offset
                    })
                })
                .collect();
        }
        offsets
    }
}

/// Name of the per-node helper function
pub fn helper_name(uid: NodeUid) -> String {
    format!("{HELPER_STEM}_{uid}")
}

/// Build the helper definition for a customized Worley node
pub fn custom_helper(
    uid: NodeUid,
    dimensions: Dimensions,
    formulas: &WorleyFormulas,
) -> Result<HelperDefinition, CompileError> {
    let mut warnings = Vec::new();
    let distance = macro_body(uid, FormulaRole::Distance, &formulas.distance, &mut warnings)?;
    let combine = macro_body(uid, FormulaRole::Combine, &formulas.combine, &mut warnings)?;

    let distance_macro = format!("WORLEY_DISTANCE_{uid}");
    let combine_macro = format!("WORLEY_COMBINE_{uid}");
    let vector = dimensions.vector_type();
    let stencil = NeighborStencil::new(dimensions);
    let loop_variables = stencil.loop_variables();

    let mut out = String::new();
    line(&mut out, 0, &format!("#define {distance_macro}(a, b) ({distance})"));
    line(&mut out, 0, &format!("#define {combine_macro}(a, b) ({combine})"));
    line(
        &mut out,
        0,
        &format!("float {}({vector} p, {vector} variance)", helper_name(uid)),
    );
    line(&mut out, 0, "{");
    line(&mut out, 1, &format!("{vector} cell = floor(p);"));
    line(&mut out, 1, "float nearest = 1e30;");
    line(&mut out, 1, "float second = 1e30;");

    let mut depth = 1;
    for header in stencil.loop_headers() {
        line(&mut out, depth, &header);
        line(&mut out, depth, "{");
        depth += 1;
    }

    let offset: Vec<String> = loop_variables.iter().map(ToString::to_string).collect();
    let primitive = format!("hashValue{}", dimensions.count());
    let jitter: Vec<String> = JITTER_SALTS[..dimensions.count()]
        .iter()
        .map(|salt| format!("{primitive}(neighbor{salt})"))
        .collect();

    line(&mut out, depth, &format!("{vector} neighbor = cell + {};", dimensions.vector(&offset)));
    line(&mut out, depth, &format!("{vector} jitter = {};", dimensions.vector(&jitter)));
    line(&mut out, depth, &format!("{vector} site = neighbor + 0.5 + (jitter - 0.5) * variance;"));
    line(&mut out, depth, &format!("float d = {distance_macro}(p, site);"));
    line(&mut out, depth, "if (d < nearest)");
    line(&mut out, depth, "{");
    line(&mut out, depth + 1, "second = nearest;");
    line(&mut out, depth + 1, "nearest = d;");
    line(&mut out, depth, "}");
    line(&mut out, depth, "else if (d < second)");
    line(&mut out, depth, "{");
    line(&mut out, depth + 1, "second = d;");
    line(&mut out, depth, "}");

    while depth > 1 {
        depth -= 1;
        line(&mut out, depth, "}");
    }

    line(&mut out, 1, &format!("return {combine_macro}(nearest, second);"));
    line(&mut out, 0, "}");
    line(&mut out, 0, &format!("#undef {distance_macro}"));
    line(&mut out, 0, &format!("#undef {combine_macro}"));

    Ok(HelperDefinition {
        key: HelperKey::CustomWorley(uid),
        text: out,
        warnings,
    })
}

/// Expand a formula into a single-line macro body over parameters `a` and `b`
fn macro_body(
    uid: NodeUid,
    role: FormulaRole,
    formula: &str,
    warnings: &mut Vec<String>,
) -> Result<String, CompileError> {
    // Macro definitions must stay on one line
    let flattened = formula
        .lines()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if flattened.is_empty() {
        return Err(CompileError::EmptyFormula { node: uid, role });
    }

    let expansion = template::expand(&flattened, "(a)", "(b)");
    if expansion.is_constant() {
        warnings.push(format!(
            "Worley node {uid}: {role} formula `{flattened}` references neither $1 nor $2"
        ));
    }
    Ok(expansion.text)
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}
