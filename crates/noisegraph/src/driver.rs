// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler driver: wraps a compiled graph into a complete source unit.

use crate::compile::{CompileError, CompileOptions, Diagnostic};
use crate::config::CompilerConfig;
use crate::graph::Graph;
use crate::kinds::Dimensions;
use crate::params::{extract_parameters, Parameter, ParameterBindings};
use serde::Serialize;

const INDENT: &str = "    ";

/// A complete, self-contained shading-language source unit
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    /// Full source text
    pub text: String,
    /// Name of the generated function
    pub function_name: String,
    /// Seed dimensionality of the signature
    pub seed_dimensions: Dimensions,
    /// Parameters following the seed in the signature
    pub parameters: Vec<Parameter>,
    /// Non-fatal findings
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
struct Manifest<'a> {
    function: &'a str,
    seed_components: usize,
    parameters: &'a [Parameter],
}

impl SourceUnit {
    /// JSON description of the signature for binding parameters host-side
    pub fn manifest_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Manifest {
            function: &self.function_name,
            seed_components: self.seed_dimensions.count(),
            parameters: &self.parameters,
        })
    }
}

/// Turns graphs into source units using one configuration
#[derive(Debug, Clone, Default)]
pub struct ShaderCompiler {
    config: CompilerConfig,
}

impl ShaderCompiler {
    /// Create a compiler with the given configuration
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a graph into a source unit
    pub fn compile(&self, graph: &Graph) -> Result<SourceUnit, CompileError> {
        let config = &self.config;
        let parameters = if config.expose_parameters {
            extract_parameters(graph)?
        } else {
            Vec::new()
        };
        let bindings = ParameterBindings::from_parameters(&parameters);
        let options = CompileOptions {
            seed_name: &config.seed_name,
            output_symbol: &config.output_symbol,
            bindings: Some(&bindings),
            coordinate_dims: config.coordinate_dims,
        };
        let compiled = graph.compile_with(&options)?;
        let seed_dimensions = config
            .coordinate_dims
            .unwrap_or_else(|| Dimensions::from_count(compiled.seed_components));

        let mut text = String::new();
        text.push_str(&format!("// Generated by noisegraph from graph {:?}\n", graph.name));
        for include in &config.includes {
            text.push_str(&format!("#include \"{include}\"\n"));
        }
        text.push('\n');

        for helper in &compiled.helpers {
            text.push_str(helper);
            text.push('\n');
        }

        let mut signature = vec![format!("{} {}", seed_dimensions.vector_type(), config.seed_name)];
        signature.extend(parameters.iter().map(|p| format!("float {}", p.identifier)));
        text.push_str(&format!("float {}({})\n{{\n", config.function_name, signature.join(", ")));
        for statement in compiled.statements.iter().chain(std::iter::once(&compiled.output)) {
            text.push_str(INDENT);
            text.push_str(statement);
            text.push('\n');
        }
        text.push_str(&format!("{INDENT}return {};\n}}\n", config.output_symbol));

        for diagnostic in &compiled.diagnostics {
            tracing::warn!("{diagnostic}");
        }
        tracing::info!(
            "Generated {} for {:?}: {} statements, {} helpers, {} parameters",
            config.function_name,
            graph.name,
            compiled.statements.len(),
            compiled.helpers.len(),
            parameters.len()
        );

        Ok(SourceUnit {
            text,
            function_name: config.function_name.clone(),
            seed_dimensions,
            parameters,
            diagnostics: compiled.diagnostics,
        })
    }
}
