//! Transform configuration
//!
//! ```toml
//! exclude = ["**/*.test.ts", "node_modules/**"]
//!
//! [ir]
//! namespace = "$ir"
//! module = "refract/ir"
//! ```

use crate::TransformError;
use anyhow::{Context, Result};
use glob::Pattern;
use rf_emit::IrModule;
use serde::Deserialize;
use std::path::Path;

/// Configuration of a transform run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Glob patterns of source paths left untouched
    pub exclude: Vec<String>,

    /// IR module imported by transformed sources
    pub ir: IrModule,
}

impl TransformConfig {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not match the configuration schema.
    pub fn from_toml_str(text: &str) -> Result<Self, TransformError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transform config: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse transform config: {}", path.display()))
    }

    /// Compile the exclusion patterns and check the IR module handle
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid glob pattern, a namespace that is not an
    /// identifier, or an empty module specifier.
    pub fn validate(&self) -> Result<Exclusions, TransformError> {
        if !is_identifier(&self.ir.namespace) {
            return Err(TransformError::InvalidNamespace {
                namespace: self.ir.namespace.clone(),
            });
        }
        if self.ir.module.is_empty() {
            return Err(TransformError::EmptyModule);
        }

        let patterns = self
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| TransformError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Exclusions { patterns })
    }
}

/// Compiled exclusion patterns
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    patterns: Vec<Pattern>,
}

impl Exclusions {
    /// Whether `path` matches any exclusion pattern
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches_path(path))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|rest| rest.is_ascii_alphanumeric() || rest == '_' || rest == '$')
}
