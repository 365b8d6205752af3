//! Settings file for the `ct-comp` binary.
//!
//! ```toml
//! [generator]
//! monetary_decimals = 0
//! title = "Computation for HMRC"
//!
//! [validator]
//! max_document_bytes = 2097152
//! ```
//!
//! Both tables, and every key inside them, are optional.

use std::path::Path;

use anyhow::{Context, Result};
use ct_core::{GeneratorConfig, ValidatorConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub generator: GeneratorConfig,
    pub validator: ValidatorConfig,
}

impl CliConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Reads `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }
}
