//! Source operator tokens and their canonical IR symbols
//!
//! Strict and loose equality share a symbol: interpreters compare with the
//! semantics of their target language.

/// Binary operator tokens with their canonical symbols
pub const BINARY_OPERATORS: &[(&str, &str)] = &[
    ("=", "="),
    ("+", "+"),
    ("-", "-"),
    ("*", "*"),
    ("/", "/"),
    ("%", "%"),
    ("&&", "&&"),
    ("||", "||"),
    ("??", "??"),
    ("==", "=="),
    ("===", "=="),
    ("!=", "!="),
    ("!==", "!="),
    ("<", "<"),
    ("<=", "<="),
    (">", ">"),
    (">=", ">="),
    ("in", "in"),
];

/// Unary operator tokens with their canonical symbols
///
/// `typeof` is not listed; it lowers to its own node kind.
pub const UNARY_OPERATORS: &[(&str, &str)] = &[("!", "!"), ("-", "-"), ("+", "+")];

/// Canonical symbol of a binary operator token
pub fn binary(token: &str) -> Option<&'static str> {
    lookup(BINARY_OPERATORS, token)
}

/// Canonical symbol of a unary operator token
pub fn unary(token: &str) -> Option<&'static str> {
    lookup(UNARY_OPERATORS, token)
}

fn lookup(table: &[(&str, &'static str)], token: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(source, _)| *source == token)
        .map(|(_, canonical)| *canonical)
}
