// SPDX-License-Identifier: MIT OR Apache-2.0
//! Extraction of tunable constants as external parameters.

use crate::compile::CompileError;
use crate::expression::ReferenceSite;
use crate::graph::Graph;
use crate::node::{identifier, NodeUid};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A constant slot exposed to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Display name, `"<node name> <slot name>"`
    pub name: String,
    /// Identifier used in the generated signature
    pub identifier: String,
    /// Owning node
    pub node: NodeUid,
    /// Slot index on that node
    pub slot: usize,
    /// Current constant value
    pub default: f32,
}

/// Mapping from constant slots to parameter identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBindings {
    bound: HashMap<(NodeUid, usize), String>,
}

impl ParameterBindings {
    /// Bind every extracted parameter
    pub fn from_parameters(parameters: &[Parameter]) -> Self {
        let mut bindings = Self::default();
        for parameter in parameters {
            bindings.bind(parameter.node, parameter.slot, parameter.identifier.clone());
        }
        bindings
    }

    /// Bind one slot to an identifier
    pub fn bind(&mut self, node: NodeUid, slot: usize, identifier: impl Into<String>) {
        self.bound.insert((node, slot), identifier.into());
    }

    /// Identifier bound to a slot
    pub fn get(&self, node: NodeUid, slot: usize) -> Option<&str> {
        self.bound.get(&(node, slot)).map(String::as_str)
    }

    /// Number of bound slots
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

/// Collect every unpinned constant slot of the reachable nodes.
///
/// Ordered by emission order, then slot index. Colliding names get a numeric
/// suffix, so repeated extraction on an unchanged graph is identical. A
/// non-finite constant fails extraction since it has no literal form.
pub fn extract_parameters(graph: &Graph) -> Result<Vec<Parameter>, CompileError> {
    let plan = graph.emission_plan()?;
    let mut names = HashSet::new();
    let mut identifiers = HashSet::new();
    let mut parameters = Vec::new();

    for uid in plan.order {
        let Some(node) = graph.node(uid) else {
            continue;
        };
        for (slot, input) in node.inputs().iter().enumerate() {
            if !input.is_tunable() {
                continue;
            }
            let Some(default) = input.expression.constant() else {
                continue;
            };
            if !default.is_finite() {
                return Err(CompileError::NonFiniteConstant {
                    site: ReferenceSite::Slot { node: uid, slot },
                });
            }

            let base_name = format!("{} {}", node.name(), input.name);
            let base_identifier = format!(
                "param_{}_{}",
                identifier(node.name()),
                identifier(&input.name)
            );
            let (name, ident) = unique(&base_name, &base_identifier, &names, &identifiers);
            names.insert(name.clone());
            identifiers.insert(ident.clone());

            parameters.push(Parameter {
                name,
                identifier: ident,
                node: uid,
                slot,
                default,
            });
        }
    }

    tracing::debug!("Extracted {} parameters from {:?}", parameters.len(), graph.name);
    Ok(parameters)
}

fn unique(
    name: &str,
    ident: &str,
    names: &HashSet<String>,
    identifiers: &HashSet<String>,
) -> (String, String) {
    if !names.contains(name) && !identifiers.contains(ident) {
        return (name.to_string(), ident.to_string());
    }
    let mut suffix = 2;
    loop {
        let candidate = (format!("{name} {suffix}"), format!("{ident}_{suffix}"));
        if !names.contains(&candidate.0) && !identifiers.contains(&candidate.1) {
            return candidate;
        }
        suffix += 1;
    }
}
