//! Source transform driver
//!
//! Walks a parsed source unit once, asks the [`selector`] which call and
//! construction sites hold reflected functions, lowers each reflected slot
//! under the error boundary and splices the emitted IR construction code back
//! into the source. Everything outside a rewritten slot stays byte-identical.

pub mod config;
pub mod error;
pub mod selector;

pub use config::{Exclusions, TransformConfig};
pub use error::TransformError;
pub use selector::{ConstructKind, SelectorMatch};

use anyhow::{Context, Result};
use log::{debug, info};
use rf_ir::Node;
use rf_lower::{LoweringContext, lower_reflected};
use rf_span::Span;
use rf_syntax::{SyntaxKind, SyntaxNode};
use rf_ty::TypeOracle;
use serde::Serialize;
use std::path::Path;

/// One reflected slot that was replaced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rewrite {
    /// Construct the slot belongs to
    pub kind: ConstructKind,
    /// Location of the original slot
    pub span: Span,
    /// The lowered function, or an `Err` node
    pub ir: Node,
}

/// Result of transforming one source unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformOutput {
    /// The transformed source text
    pub source: String,
    /// Rewritten slots in source order
    pub rewrites: Vec<Rewrite>,
    /// Whether the unit matched an exclusion pattern and was left alone
    pub excluded: bool,
}

impl TransformOutput {
    /// Whether the source was changed
    pub fn is_modified(&self) -> bool {
        !self.rewrites.is_empty()
    }
}

/// Transforms source units against one type oracle and configuration
pub struct Transformer<'oracle> {
    oracle: &'oracle dyn TypeOracle,
    config: TransformConfig,
    exclusions: Exclusions,
}

impl<'oracle> Transformer<'oracle> {
    /// Create a transformer
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(oracle: &'oracle dyn TypeOracle, config: TransformConfig) -> Result<Self, TransformError> {
        let exclusions = config.validate()?;
        Ok(Self {
            oracle,
            config,
            exclusions,
        })
    }

    /// Transform the source unit at `path` with contents `source`
    ///
    /// # Errors
    ///
    /// Returns an error if the source has syntax errors. Lowering failures are
    /// not errors; they become `Err` nodes in the output.
    pub fn transform(&self, path: &Path, source: &str) -> Result<TransformOutput, TransformError> {
        if self.exclusions.is_excluded(path) {
            info!("skipping excluded source {}", path.display());
            return Ok(TransformOutput {
                source: source.to_string(),
                rewrites: Vec::new(),
                excluded: true,
            });
        }

        let parsed = rf_parser::parse_path(path, source);
        let syntax = match parsed.syntax {
            Some(syntax) if parsed.errors.is_empty() => syntax,
            _ => {
                return Err(TransformError::Syntax {
                    path: path.display().to_string(),
                    errors: parsed.errors,
                });
            }
        };

        let ctx = LoweringContext::new(self.oracle);
        let mut rewrites = Vec::new();
        self.visit(&ctx, &syntax, &mut rewrites);
        rewrites.sort_by_key(|rewrite| rewrite.span.start);

        debug!("{}: {} reflected function(s)", path.display(), rewrites.len());
        Ok(TransformOutput {
            source: self.splice(source, &rewrites),
            rewrites,
            excluded: false,
        })
    }

    /// Read and transform the file at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has syntax errors.
    pub fn transform_file(&self, path: &Path) -> Result<TransformOutput> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        self.transform(path, &source)
            .with_context(|| format!("Failed to transform source file: {}", path.display()))
    }

    fn visit(&self, ctx: &LoweringContext<'_>, node: &SyntaxNode, rewrites: &mut Vec<Rewrite>) {
        let mut reflected = Vec::new();
        if let Some(found) = selector::select(self.oracle, node) {
            let arguments = node.call_arguments();
            for index in &found.reflect {
                let Some(slot) = arguments.get(*index).copied() else {
                    continue;
                };
                let ir = lower_reflected(ctx, slot, found.drop_args);
                debug!("lowered {} argument {index} at {:?}", found.kind, slot.span);
                rewrites.push(Rewrite {
                    kind: found.kind,
                    span: slot.span,
                    ir,
                });
                reflected.push(slot);
            }
        }

        // The callee and the other arguments may hold further constructs;
        // lowered slots are inert data.
        for child in &node.children {
            if child.kind == SyntaxKind::Arguments && !reflected.is_empty() {
                for argument in &child.children {
                    if !reflected.iter().any(|slot| std::ptr::eq(*slot, argument)) {
                        self.visit(ctx, argument, rewrites);
                    }
                }
            } else {
                self.visit(ctx, child, rewrites);
            }
        }
    }

    /// Replace every rewritten slot and add the IR import
    fn splice(&self, source: &str, rewrites: &[Rewrite]) -> String {
        if rewrites.is_empty() {
            return source.to_string();
        }

        let module = &self.config.ir;
        let mut body = String::with_capacity(source.len());
        let mut cursor = 0;
        for rewrite in rewrites {
            let range = rewrite.span.range();
            body.push_str(source.get(cursor..range.start).unwrap_or_default());
            body.push_str(&module.emit(&rewrite.ir));
            cursor = range.end;
        }
        body.push_str(source.get(cursor..).unwrap_or_default());

        let import = module.import_line();
        match shebang_end(&body) {
            Some(end) => {
                let (shebang, rest) = body.split_at(end);
                format!("{shebang}{import}\n{rest}")
            }
            None => format!("{import}\n{body}"),
        }
    }
}

/// Byte offset just past a leading `#!` line
fn shebang_end(source: &str) -> Option<usize> {
    if !source.starts_with("#!") {
        return None;
    }
    Some(source.find('\n').map_or(source.len(), |newline| newline + 1))
}
