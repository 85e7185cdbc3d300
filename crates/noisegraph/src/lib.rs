// SPDX-License-Identifier: MIT OR Apache-2.0
//! Procedural-noise node graphs compiled to shading-language source.
//!
//! A [`Graph`] holds noise, math and coordinate nodes. Each input slot is
//! either a constant or a reference to another node. Compiling a graph
//! produces one declaration per reachable node, ordered so that every
//! reference is declared before use, followed by an assignment to the
//! output symbol.
//!
//! ## Architecture
//!
//! - [`graph`]: node arena, mutation, reachability and ordering
//! - [`kinds`]: the closed set of node variants and their emitters
//! - [`compile`]: graph walk producing declarations and diagnostics
//! - [`params`]: exposing constant slots as function parameters
//! - [`driver`]: wrapping compiled code into a complete function
//! - [`persist`]: RON and binary graph documents

pub mod compile;
pub mod config;
pub mod driver;
pub mod expression;
pub mod graph;
pub mod kinds;
pub mod node;
pub mod params;
pub mod persist;
pub mod reshape;
pub mod slot;
pub mod template;

pub use compile::{CompileError, CompileOptions, CompiledGraph, Diagnostic, EmissionPlan, Severity};
pub use config::{CompilerConfig, ConfigError};
pub use driver::{ShaderCompiler, SourceUnit};
pub use expression::{Expression, ReferenceSite};
pub use graph::{Graph, GraphError, Removal};
pub use kinds::math::MathOp;
pub use kinds::noise::{NoiseKind, NoiseNode};
pub use kinds::worley::WorleyFormulas;
pub use kinds::{Axis, Dimensions};
pub use node::{Node, NodeKind, NodeUid, UnknownNodeType};
pub use params::{extract_parameters, Parameter, ParameterBindings};
pub use persist::{GraphDocument, PersistError, FORMAT_VERSION};
pub use slot::{Slot, SlotSpec};
