//! Lowering configuration
//!
//! Read from a `lowering.toml`-style file:
//!
//! ```toml
//! parallel = true
//! threads = 4
//! verify = true
//! ```

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use toml::de;

/// Knobs for lowering a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoweringConfig {
    /// Lower independent files on a worker pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Worker count; the pool picks one per core when unset
    #[serde(default)]
    pub threads: Option<usize>,

    /// Run the IR verifier over every lowered file
    #[serde(default = "default_true")]
    pub verify: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            verify: true,
        }
    }
}

impl LoweringConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed text, a wrongly typed value or an
    /// unknown key.
    pub fn from_toml_str(content: &str) -> Result<Self, de::Error> {
        toml::from_str(content)
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse; the message
    /// names the path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lowering config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse lowering config: {}", path.display()))
    }

    /// Sequential configuration, mostly for deterministic tests
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}
