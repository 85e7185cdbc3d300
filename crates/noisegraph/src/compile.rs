// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph compilation: validation, emission order and statement generation.
//!
//! Compilation is a read-only walk over the graph:
//! 1. the output reference and every edge are checked (cycles, dangling UIDs)
//! 2. only nodes reachable from the output are scheduled
//! 3. scheduled nodes are emitted dependencies-first, ties broken by UID
//! 4. helper definitions are collected once per [`HelperKey`]
//!
//! Any error aborts with no partial output.

use crate::expression::{float_literal, Expression, ReferenceSite};
use crate::graph::Graph;
use crate::kinds::worley::FormulaRole;
use crate::kinds::{Axis, Dimensions, EmitContext, HelperKey};
use crate::node::{NodeKind, NodeUid};
use crate::params::ParameterBindings;
use indexmap::IndexMap;
use std::fmt;

/// Default name of the variable holding the graph result
pub const DEFAULT_OUTPUT_SYMBOL: &str = "result";
/// Default name of the seed position parameter
pub const DEFAULT_SEED_NAME: &str = "pos";

/// Severity of a non-fatal finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational
    Note,
    /// Likely a mistake, but the source is still valid
    Warning,
}

/// A non-fatal finding reported alongside compiled output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Node the finding is about, if any
    pub node: Option<NodeUid>,
    /// Message
    pub message: String,
}

impl Diagnostic {
    fn note(node: Option<NodeUid>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            node,
            message: message.into(),
        }
    }

    fn warning(node: Option<NodeUid>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            node,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Note => "note",
            Severity::Warning => "warning",
        };
        match self.node {
            Some(node) => write!(f, "{level}: node {node}: {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

/// Options controlling emitted names and parameter substitution
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions<'a> {
    /// Seed position parameter read by coordinate nodes
    pub seed_name: &'a str,
    /// Variable receiving the graph result
    pub output_symbol: &'a str,
    /// Constant slots to replace with parameter identifiers
    pub bindings: Option<&'a ParameterBindings>,
    /// Seed dimensionality coordinate nodes must fit in; `None` accepts any axis
    pub coordinate_dims: Option<Dimensions>,
}

impl Default for CompileOptions<'_> {
    fn default() -> Self {
        Self {
            seed_name: DEFAULT_SEED_NAME,
            output_symbol: DEFAULT_OUTPUT_SYMBOL,
            bindings: None,
            coordinate_dims: None,
        }
    }
}

/// Validated emission schedule of a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionPlan {
    /// Reachable nodes, dependencies first
    pub order: Vec<NodeUid>,
    /// Findings made while validating
    pub diagnostics: Vec<Diagnostic>,
}

/// Output of compiling a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledGraph {
    /// Emitted nodes, in statement order
    pub order: Vec<NodeUid>,
    /// Distinct helper definitions, in first-use order
    pub helpers: Vec<String>,
    /// One statement per emitted node
    pub statements: Vec<String>,
    /// Final assignment to the output symbol
    pub output: String,
    /// Seed components read by reachable coordinate nodes
    pub seed_components: usize,
    /// Non-fatal findings
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledGraph {
    /// Statements followed by the output assignment, one per line
    pub fn body(&self) -> String {
        let mut body = String::new();
        for statement in self.statements.iter().chain(std::iter::once(&self.output)) {
            body.push_str(statement);
            body.push('\n');
        }
        body
    }

    /// Whether any warning was reported
    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }
}

impl Graph {
    /// Validate the graph and derive its emission order
    pub fn emission_plan(&self) -> Result<EmissionPlan, CompileError> {
        let mut diagnostics = Vec::new();

        if let Some(target) = self.output().target() {
            if !self.contains(target) {
                return Err(CompileError::DanglingReference {
                    site: ReferenceSite::Output,
                    target,
                });
            }
        }

        if let Some(path) = self.find_cycle() {
            return Err(CompileError::CyclicGraph {
                node: path[0],
                path,
            });
        }

        let reachable = self.reachable();
        let mut uids: Vec<NodeUid> = self.node_ids().collect();
        uids.sort();
        for uid in uids {
            let Some(node) = self.node(uid) else {
                continue;
            };
            let live = reachable.contains(&uid);
            for (slot, input) in node.inputs().iter().enumerate() {
                let Some(target) = input.expression.target() else {
                    continue;
                };
                if self.contains(target) {
                    continue;
                }
                if live {
                    return Err(CompileError::DanglingReference {
                        site: ReferenceSite::Slot { node: uid, slot },
                        target,
                    });
                }
                diagnostics.push(Diagnostic::warning(
                    Some(uid),
                    format!("unreachable slot {slot} references missing node {target}"),
                ));
            }
        }

        let skipped = self.node_count() - reachable.len();
        if skipped > 0 {
            diagnostics.push(Diagnostic::note(
                None,
                format!("{skipped} node(s) do not contribute to the output and were skipped"),
            ));
        }

        let order = self.topological_order(&reachable);
        Ok(EmissionPlan { order, diagnostics })
    }

    /// Compile with default names and all constants inlined
    pub fn compile(&self) -> Result<CompiledGraph, CompileError> {
        self.compile_with(&CompileOptions::default())
    }

    /// Compile the reachable subgraph into helper definitions and statements
    pub fn compile_with(&self, options: &CompileOptions<'_>) -> Result<CompiledGraph, CompileError> {
        let EmissionPlan {
            order,
            mut diagnostics,
        } = self.emission_plan()?;

        let ctx = EmitContext {
            seed_name: options.seed_name,
        };
        let mut helpers: IndexMap<HelperKey, String> = IndexMap::new();
        let mut statements = Vec::with_capacity(order.len());
        let mut seed_components = 0;

        for &uid in &order {
            let Some(node) = self.node(uid) else {
                continue;
            };

            let expected = node.kind().slot_specs().len();
            if node.inputs().len() != expected {
                return Err(CompileError::SlotMismatch {
                    node: uid,
                    expected,
                    found: node.inputs().len(),
                });
            }

            if let NodeKind::Coordinate(axis) = node.kind() {
                check_axis(uid, *axis, options.coordinate_dims)?;
                seed_components = seed_components.max(axis.index() + 1);
            }

            if let Some(helper) = node.kind().helper_definition(uid)? {
                for warning in helper.warnings {
                    diagnostics.push(Diagnostic::warning(Some(uid), warning));
                }
                helpers.entry(helper.key).or_insert(helper.text);
            }

            let inputs = node
                .inputs()
                .iter()
                .enumerate()
                .map(|(slot, input)| {
                    let site = ReferenceSite::Slot { node: uid, slot };
                    match options.bindings.and_then(|b| b.get(uid, slot)) {
                        Some(identifier) if input.expression.constant().is_some() => {
                            Ok(identifier.to_string())
                        }
                        _ => self.resolve(input.expression, site),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;

            statements.push(node.kind().emit_code(uid, &ctx, &node.variable_name(), &inputs));
        }

        let value = self.resolve(self.output(), ReferenceSite::Output)?;
        let output = format!("float {} = {value};", options.output_symbol);

        tracing::debug!(
            "Compiled graph {:?}: {} statements, {} helpers",
            self.name,
            statements.len(),
            helpers.len()
        );

        Ok(CompiledGraph {
            order,
            helpers: helpers.into_values().collect(),
            statements,
            output,
            seed_components,
            diagnostics,
        })
    }

    /// Source text of an expression: a literal or an emitted variable name
    fn resolve(&self, expression: Expression, site: ReferenceSite) -> Result<String, CompileError> {
        match expression {
            Expression::Constant(value) => {
                float_literal(value).ok_or(CompileError::NonFiniteConstant { site })
            }
            Expression::Node(target) => self
                .node(target)
                .map(|node| node.variable_name())
                .ok_or(CompileError::DanglingReference { site, target }),
        }
    }
}

fn check_axis(uid: NodeUid, axis: Axis, dims: Option<Dimensions>) -> Result<(), CompileError> {
    match dims {
        Some(dims) if axis.index() >= dims.count() => Err(CompileError::CoordinateOutOfRange {
            node: uid,
            axis,
            dims: dims.count(),
        }),
        _ => Ok(()),
    }
}

fn display_path(path: &[NodeUid]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Error during compilation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A node's inputs transitively reference itself
    #[error("Graph contains a cycle through node {node}: {}", display_path(.path))]
    CyclicGraph {
        /// First node on the cycle
        node: NodeUid,
        /// The cycle, starting and ending at `node`
        path: Vec<NodeUid>,
    },

    /// A reference names a UID that is not in the graph
    #[error("{site} references missing node {target}")]
    DanglingReference {
        /// Where the reference lives
        site: ReferenceSite,
        /// The missing UID
        target: NodeUid,
    },

    /// A constant is NaN or infinite
    #[error("{site} holds a non-finite constant")]
    NonFiniteConstant {
        /// Where the constant lives
        site: ReferenceSite,
    },

    /// A custom Worley formula is blank
    #[error("Worley node {node} has an empty {role} formula")]
    EmptyFormula {
        /// The Worley node
        node: NodeUid,
        /// Which formula
        role: FormulaRole,
    },

    /// A node's slot count differs from what its kind declares
    #[error("Node {node} has {found} slot(s), its kind declares {expected}")]
    SlotMismatch {
        /// The malformed node
        node: NodeUid,
        /// Declared slot count
        expected: usize,
        /// Actual slot count
        found: usize,
    },

    /// A coordinate node reads an axis the seed does not have
    #[error("Coordinate node {node} reads axis {axis} but the seed has {dims} component(s)")]
    CoordinateOutOfRange {
        /// The coordinate node
        node: NodeUid,
        /// Requested axis
        axis: Axis,
        /// Seed component count
        dims: usize,
    },
}
