// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted graph format.
//!
//! Graphs are saved as a versioned [`GraphDocument`], either as pretty RON
//! (text) or bincode (binary). UIDs are part of the format: expressions
//! reference nodes by UID, so they round-trip exactly.

use crate::expression::Expression;
use crate::graph::Graph;
use crate::node::{Node, NodeUid};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Current document format version
pub const FORMAT_VERSION: u32 = 1;

/// Serializable snapshot of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Format version
    pub version: u32,
    /// Graph name
    pub name: String,
    /// Next UID the graph would hand out
    pub next_uid: u32,
    /// Designated output
    pub output: Expression,
    /// Nodes in insertion order
    pub nodes: Vec<Node>,
}

/// Persistence errors
#[derive(Debug, Error)]
pub enum PersistError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON serialization failed
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),

    /// RON text could not be parsed
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// Binary encoding or decoding failed
    #[error("Binary format error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Document written by a newer version
    #[error("Graph format version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the document
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },

    /// Two nodes share a UID
    #[error("Duplicate node UID {0}")]
    DuplicateUid(NodeUid),

    /// A node's slots do not match the layout its kind declares
    #[error("Node {node} has slots {found:?}, its kind declares {expected:?}")]
    SlotMismatch {
        /// Offending node
        node: NodeUid,
        /// Slot names the kind declares
        expected: Vec<String>,
        /// Slot names in the document
        found: Vec<String>,
    },
}

impl Graph {
    /// Snapshot the graph
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            version: FORMAT_VERSION,
            name: self.name.clone(),
            next_uid: self.next_uid().0,
            output: self.output(),
            nodes: self.nodes().cloned().collect(),
        }
    }

    /// Rebuild a graph from a snapshot, preserving UIDs
    pub fn from_document(document: GraphDocument) -> Result<Self, PersistError> {
        if document.version > FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: document.version,
                supported: FORMAT_VERSION,
            });
        }

        let mut seen = HashSet::new();
        let mut graph = Graph::new(document.name);
        for mut node in document.nodes {
            if !seen.insert(node.uid()) {
                return Err(PersistError::DuplicateUid(node.uid()));
            }
            check_slots(&mut node)?;
            graph.insert_node(node);
        }
        graph.raise_next_uid(document.next_uid);
        graph.set_output(document.output);
        Ok(graph)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, PersistError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(&self.to_document(), config)?)
    }

    /// Deserialize from RON
    pub fn from_ron(text: &str) -> Result<Self, PersistError> {
        let document: GraphDocument = ron::from_str(text)?;
        Self::from_document(document)
    }

    /// Serialize to the binary format
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        Ok(bincode::serialize(&self.to_document())?)
    }

    /// Deserialize from the binary format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        let document: GraphDocument = bincode::deserialize(bytes)?;
        Self::from_document(document)
    }

    /// Save to a file: `.ron` is written as text, anything else as binary
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        if is_text_path(path) {
            std::fs::write(path, self.to_ron()?)?;
        } else {
            std::fs::write(path, self.to_bytes()?)?;
        }
        tracing::info!("Saved graph {:?} to {}", self.name, path.display());
        Ok(())
    }

    /// Load from a file written by [`Graph::save`]
    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let graph = if is_text_path(path) {
            Self::from_ron(&std::fs::read_to_string(path)?)?
        } else {
            Self::from_bytes(&std::fs::read(path)?)?
        };
        tracing::info!(
            "Loaded graph {:?} ({} nodes) from {}",
            graph.name,
            graph.node_count(),
            path.display()
        );
        Ok(graph)
    }
}

/// Slots must match the kind's declared layout; defaults are taken from the kind
fn check_slots(node: &mut Node) -> Result<(), PersistError> {
    let specs = node.kind.slot_specs();
    let matches = specs.len() == node.inputs.len()
        && specs.iter().zip(&node.inputs).all(|(spec, slot)| spec.name == slot.name);
    if !matches {
        return Err(PersistError::SlotMismatch {
            node: node.uid,
            expected: specs.into_iter().map(|spec| spec.name).collect(),
            found: node.inputs.iter().map(|slot| slot.name.clone()).collect(),
        });
    }
    for (spec, slot) in specs.iter().zip(node.inputs.iter_mut()) {
        slot.default = spec.default;
    }
    Ok(())
}

fn is_text_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"))
}
