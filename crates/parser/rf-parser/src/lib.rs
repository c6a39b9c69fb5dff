//! TypeScript parser front end
//!
//! Runs the tree-sitter grammar over a source unit, converts the concrete tree
//! into [`SyntaxNode`]s and reports every error region the grammar recovered
//! from as a [`ParseError`].

pub mod error;

pub use error::ParseError;

use lang_typescript::TypeScriptLanguage;
use miette::{NamedSource, SourceSpan};
use rf_syntax::{Language, SyntaxNode};
use std::path::Path;

/// Name used for diagnostics of sources without a path
const ANONYMOUS: &str = "<input>";

/// Result of parsing a source unit
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Converted syntax tree, absent if the grammar could not run
    pub syntax: Option<SyntaxNode>,
    /// Syntax errors, in source order
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Whether the source parsed without any error
    pub fn is_clean(&self) -> bool {
        self.syntax.is_some() && self.errors.is_empty()
    }
}

/// Parse TypeScript source text
pub fn parse_source(source: &str) -> ParseResult {
    parse_with(&TypeScriptLanguage::new(), ANONYMOUS, source)
}

/// Parse a source unit, picking the dialect from its extension and naming
/// diagnostics after its path
pub fn parse_path(path: &Path, source: &str) -> ParseResult {
    parse_with(
        &TypeScriptLanguage::for_path(path),
        &path.display().to_string(),
        source,
    )
}

/// Parse `source` with `language`, reporting diagnostics against `name`
pub fn parse_with(language: &dyn Language, name: &str, source: &str) -> ParseResult {
    let tree = match language.parse(source) {
        Ok(tree) => tree,
        Err(error) => {
            return ParseResult {
                syntax: None,
                errors: vec![ParseError::GrammarUnavailable {
                    reason: error.to_string(),
                }],
            };
        }
    };

    let root = tree.root_node();
    let mut errors = Vec::new();
    if root.has_error() {
        let reporter = Reporter {
            src: NamedSource::new(name, source.to_string()),
            source,
        };
        reporter.collect(&root, &mut errors);
    }

    ParseResult {
        syntax: Some(language.lower_node(&root, source)),
        errors,
    }
}

struct Reporter<'src> {
    src: NamedSource<String>,
    source: &'src str,
}

impl Reporter<'_> {
    /// Report error and missing nodes under `node`
    ///
    /// Each error region is reported once; its contents are not searched.
    fn collect(&self, node: &tree_sitter::Node<'_>, errors: &mut Vec<ParseError>) {
        if node.is_error() {
            errors.push(self.unexpected(node));
            return;
        }
        if node.is_missing() {
            errors.push(self.missing(node));
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.has_error() || child.is_missing() {
                self.collect(&child, errors);
            }
        }
    }

    fn unexpected(&self, node: &tree_sitter::Node<'_>) -> ParseError {
        let text = self
            .source
            .get(node.byte_range())
            .and_then(|text| text.lines().next())
            .unwrap_or_default()
            .trim()
            .to_string();
        let context = node
            .parent()
            .map_or_else(|| "source unit".to_string(), |parent| describe(parent.kind()));

        ParseError::Unexpected {
            text,
            context,
            span: span_of(node),
            src: self.src.clone(),
        }
    }

    fn missing(&self, node: &tree_sitter::Node<'_>) -> ParseError {
        let expected = node.kind();
        let end: SourceSpan = (node.start_byte(), 0).into();

        let opening = opening_for(expected).and_then(|delimiter| {
            let parent = node.parent()?;
            let text = self.source.get(parent.byte_range())?;
            let offset = text.find(delimiter)?;
            Some((delimiter, parent.start_byte() + offset))
        });

        match opening {
            Some((delimiter, position)) => ParseError::Unclosed {
                delimiter,
                opening: (position, 1).into(),
                end,
                src: self.src.clone(),
            },
            None => ParseError::Missing {
                expected: expected.to_string(),
                span: end,
                src: self.src.clone(),
            },
        }
    }
}

fn span_of(node: &tree_sitter::Node<'_>) -> SourceSpan {
    (node.start_byte(), node.end_byte() - node.start_byte()).into()
}

/// Opening delimiter of a closing one
fn opening_for(closing: &str) -> Option<char> {
    match closing {
        ")" => Some('('),
        "}" => Some('{'),
        "]" => Some('['),
        _ => None,
    }
}

/// Grammar node kind in words
fn describe(kind: &str) -> String {
    match kind {
        "program" => "source unit",
        "arguments" => "argument list",
        "formal_parameters" => "parameter list",
        "statement_block" => "block",
        "object" => "object literal",
        "array" => "array literal",
        "template_string" => "template literal",
        other => return other.replace('_', " "),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_syntax::SyntaxKind;

    #[test]
    fn test_parse_success() {
        let result = parse_source("const handler = reflect((x: number) => x + 1);");

        assert!(result.errors.is_empty());
        assert!(result.is_clean());
        assert_eq!(result.syntax.map(|root| root.kind), Some(SyntaxKind::Program));
    }

    #[test]
    fn test_syntax_error_keeps_tree() {
        let result = parse_source("reflect((a) => { return a; );");

        assert!(!result.errors.is_empty());
        assert!(result.syntax.is_some());
        assert!(!result.is_clean());
        assert!(result.errors.iter().all(|error| error.span().is_some()));
    }

    #[test]
    fn test_parse_path_names_diagnostics() {
        let source = "function broken( {\n  return 1;\n}";
        let result = parse_path(Path::new("src/broken.ts"), source);

        assert!(!result.errors.is_empty());
        let rendered = format!("{:?}", result.errors[0]);
        assert!(rendered.contains("src/broken.ts"), "diagnostic should name the file: {rendered}");
    }

    #[test]
    fn test_tsx_path_accepts_jsx() {
        let source = "const view = <div>{name}</div>;";
        assert!(parse_path(Path::new("view.tsx"), source).is_clean());
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe("arguments"), "argument list");
        assert_eq!(describe("for_in_statement"), "for in statement");
    }

    #[test]
    fn test_opening_for() {
        assert_eq!(opening_for(")"), Some('('));
        assert_eq!(opening_for(";"), None);
    }
}
