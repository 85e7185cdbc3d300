// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler configuration, stored as RON.

use crate::compile::{DEFAULT_OUTPUT_SYMBOL, DEFAULT_SEED_NAME};
use crate::kinds::Dimensions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Settings for the generated source unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Name of the generated function
    pub function_name: String,
    /// Variable holding the result before it is returned
    pub output_symbol: String,
    /// Name of the seed position parameter
    pub seed_name: String,
    /// Files included ahead of the generated code (the noise-primitive library)
    pub includes: Vec<String>,
    /// Expose tunable constants as function parameters instead of inlining them
    pub expose_parameters: bool,
    /// Seed dimensionality; inferred from coordinate nodes when unset
    pub coordinate_dims: Option<Dimensions>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            function_name: "SampleNoise".to_string(),
            output_symbol: DEFAULT_OUTPUT_SYMBOL.to_string(),
            seed_name: DEFAULT_SEED_NAME.to_string(),
            includes: vec!["NoisePrimitives.hlsl".to_string()],
            expose_parameters: true,
            coordinate_dims: None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON for this schema
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be serialized
    #[error("Config serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

impl CompilerConfig {
    /// Parse from RON text; missing fields take their defaults
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded compiler config from {}", path.display());
        Ok(config)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
