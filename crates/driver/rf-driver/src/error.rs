//! Failures that stop a source unit from being transformed
//!
//! Note: the struct fields are read by miette's `#[derive(Diagnostic)]` macro
//! for rich error output, which the unused-assignment lint cannot see through.

#![allow(unused_assignments)]

use miette::Diagnostic;
use rf_parser::ParseError;
use thiserror::Error;

/// Fatal error for one source unit or for the configuration
#[derive(Error, Debug, Diagnostic)]
pub enum TransformError {
    /// The configuration text does not match the schema
    #[error("invalid transform configuration: {0}")]
    #[diagnostic(code(driver::config))]
    Config(#[from] toml::de::Error),

    /// An exclusion pattern does not compile
    #[error("invalid exclusion pattern `{pattern}`")]
    #[diagnostic(code(driver::invalid_pattern))]
    InvalidPattern {
        /// The pattern as written
        pattern: String,
        /// Why it is invalid
        #[source]
        source: glob::PatternError,
    },

    /// The IR namespace cannot be used as an import binding
    #[error("IR namespace `{namespace}` is not a valid identifier")]
    #[diagnostic(code(driver::invalid_namespace))]
    InvalidNamespace {
        /// The configured namespace
        namespace: String,
    },

    /// The IR module specifier is empty
    #[error("IR module specifier must not be empty")]
    #[diagnostic(code(driver::empty_module))]
    EmptyModule,

    /// The source unit has syntax errors
    #[error("{path} has {} syntax error(s)", .errors.len())]
    #[diagnostic(code(driver::syntax), help("fix the syntax errors before transforming"))]
    Syntax {
        /// Path of the source unit
        path: String,
        /// The individual errors
        #[related]
        errors: Vec<ParseError>,
    },
}
