//! Decoding of string and template literal text

use std::iter::Peekable;
use std::str::Chars;

/// Value of a string literal, given its raw text including the quotes
pub fn string_value(raw: &str) -> String {
    let inner = raw
        .strip_prefix(['"', '\''])
        .and_then(|rest| rest.strip_suffix(['"', '\'']))
        .unwrap_or(raw);
    cook(inner)
}

/// Decode JavaScript escape sequences
///
/// Malformed `\x` / `\u` escapes keep their escaped character, the way
/// non-strict engines read them. A backslash before a line break is a line
/// continuation and contributes nothing. Raw `\r\n` and `\r` line breaks
/// read as `\n`. An escaped UTF-16 surrogate pair decodes to one character; a
/// lone surrogate decodes to U+FFFD.
pub fn cook(text: &str) -> String {
    let mut cooked = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(current) = chars.next() {
        if current == '\r' {
            chars.next_if_eq(&'\n');
            cooked.push('\n');
            continue;
        }
        if current != '\\' {
            cooked.push(current);
            continue;
        }
        let Some(escaped) = chars.next() else {
            cooked.push('\\');
            break;
        };
        match escaped {
            'n' => cooked.push('\n'),
            't' => cooked.push('\t'),
            'r' => cooked.push('\r'),
            'b' => cooked.push('\u{8}'),
            'f' => cooked.push('\u{c}'),
            'v' => cooked.push('\u{b}'),
            '0' if !chars.peek().is_some_and(char::is_ascii_digit) => cooked.push('\0'),
            'x' => match fixed_hex(&mut chars, 2).and_then(char::from_u32) {
                Some(decoded) => cooked.push(decoded),
                None => cooked.push('x'),
            },
            'u' => match unicode_escape(&mut chars) {
                Some(unit) if is_high_surrogate(unit) => {
                    let mut lookahead = chars.clone();
                    let low = (lookahead.next() == Some('\\') && lookahead.next() == Some('u'))
                        .then(|| unicode_escape(&mut lookahead))
                        .flatten()
                        .filter(|low| is_low_surrogate(*low));
                    match low {
                        Some(low) => {
                            chars = lookahead;
                            cooked.push(combine_surrogates(unit, low));
                        }
                        None => cooked.push(char::REPLACEMENT_CHARACTER),
                    }
                }
                Some(unit) => cooked.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)),
                None => cooked.push('u'),
            },
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => cooked.push(other),
        }
    }

    cooked
}

/// Code point of the escape after `\u`, either `XXXX` or `{X...}`
///
/// Consumes the digits only when they are well formed.
fn unicode_escape(chars: &mut Peekable<Chars<'_>>) -> Option<u32> {
    if chars.peek() != Some(&'{') {
        return fixed_hex(chars, 4);
    }
    let digits: String = chars.clone().skip(1).take_while(|digit| *digit != '}').collect();
    let value = parse_hex(&digits).filter(|value| *value <= u32::from(char::MAX))?;
    let closed = chars.clone().nth(digits.chars().count() + 1) == Some('}');
    if !closed {
        return None;
    }
    chars.nth(digits.chars().count() + 1);
    Some(value)
}

/// Exactly `count` hex digits, consumed only when all are present
fn fixed_hex(chars: &mut Peekable<Chars<'_>>, count: usize) -> Option<u32> {
    let digits: String = chars.clone().take(count).collect();
    if digits.chars().count() != count {
        return None;
    }
    let value = parse_hex(&digits)?;
    chars.nth(count - 1);
    Some(value)
}

fn parse_hex(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|digit| digit.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

fn is_high_surrogate(unit: u32) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

fn combine_surrogates(high: u32, low: u32) -> char {
    let units = [high, low].map(|unit| u16::try_from(unit).unwrap_or_default());
    char::decode_utf16(units)
        .next()
        .and_then(Result::ok)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}
