//! Top-level statement scanner for compiler-generated JavaScript.
//!
//! The Thrift JavaScript generator emits a flat script in which every
//! declaration is a property assignment on one namespace object:
//!
//! ```text
//! demo.Color = { 'RED' : 0, 'GREEN' : 1 };
//! demo.Point = function(args) { ... };
//! demo.Point.prototype.read = function(input) { ... };
//! ```
//!
//! The scanner splits such a script into top-level statements by tracking
//! bracket depth, string and template literals and comments, then classifies
//! the statements that assign to a path under the namespace. Bodies are kept
//! as borrowed spans of the input.

use crate::text::is_ident_char;

/// Right-hand side of a namespace assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignedValue<'a> {
    /// `function(params) { body }`; holds everything after the keyword.
    Function(&'a str),
    /// `{ ... }`; holds the text between the outer braces.
    Object(&'a str),
    /// Any other expression.
    Other(&'a str),
}

/// `<namespace>.<target> = <value>` at the top level of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<'a> {
    /// Assigned path below the namespace, e.g. `Point.prototype.read`.
    pub target: &'a str,
    /// The statement with the namespace qualifier removed.
    pub unqualified: &'a str,
    /// The statement as written.
    pub statement: &'a str,
    /// Classified right-hand side.
    pub value: AssignedValue<'a>,
}

impl<'a> Assignment<'a> {
    /// Classify `statement` if it assigns to a path under `namespace`.
    pub fn parse(statement: &'a str, namespace: &str) -> Option<Self> {
        let unqualified = statement.strip_prefix(namespace)?.strip_prefix('.')?;
        let target_len = unqualified
            .find(|c: char| !(is_ident_char(c) || c == '.'))
            .unwrap_or(unqualified.len());
        let target = &unqualified[..target_len];
        if target.is_empty() || target.starts_with('.') || target.ends_with('.') {
            return None;
        }

        let rhs = unqualified[target_len..].trim_start().strip_prefix('=')?;
        if rhs.starts_with(['=', '>']) {
            return None;
        }
        let rhs = rhs.trim_start();

        let value = if let Some(after) = strip_function_keyword(rhs) {
            AssignedValue::Function(after)
        } else if rhs.len() >= 2 && rhs.starts_with('{') && rhs.ends_with('}') {
            AssignedValue::Object(&rhs[1..rhs.len() - 1])
        } else {
            AssignedValue::Other(rhs)
        };

        Some(Self {
            target,
            unqualified,
            statement,
            value,
        })
    }

    /// First segment of the target path.
    pub fn root(&self) -> &'a str {
        self.target.split('.').next().unwrap_or(self.target)
    }
}

fn strip_function_keyword(rhs: &str) -> Option<&str> {
    let rest = rhs.strip_prefix("function")?;
    if rest.starts_with(is_ident_char) {
        return None;
    }
    Some(rest.trim_start())
}

/// Every top-level assignment under `namespace`, in script order.
pub fn assignments<'a>(script: &'a str, namespace: &str) -> Vec<Assignment<'a>> {
    top_level_statements(script)
        .into_iter()
        .filter_map(|statement| Assignment::parse(statement, namespace))
        .collect()
}

/// Split a script into its top-level statements, each without surrounding
/// whitespace or its final `;`.
///
/// A statement ends at a `;` outside any bracket, or at a closing `}` that
/// brings the depth back to zero when the next token cannot continue the
/// statement (`if (...) { ... }` blocks).
pub fn top_level_statements(script: &str) -> Vec<&str> {
    let bytes = script.as_bytes();
    let mut statements = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut i = 0;

    let mut push = |from: usize, to: usize| {
        let text = script[from..to].trim();
        if !text.is_empty() {
            statements.push(text);
        }
    };

    while i < bytes.len() {
        let byte = bytes[i];
        match byte {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line_comment(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
                continue;
            }
            b'"' | b'\'' | b'`' => {
                start.get_or_insert(i);
                i = skip_literal(bytes, i);
                continue;
            }
            b'(' | b'[' | b'{' => {
                start.get_or_insert(i);
                depth += 1;
            }
            b')' | b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if byte == b'}' && depth == 0 && ends_block_statement(script, i + 1) {
                    if let Some(from) = start.take() {
                        push(from, i + 1);
                    }
                }
            }
            b';' if depth == 0 => {
                if let Some(from) = start.take() {
                    push(from, i);
                }
            }
            _ if byte.is_ascii_whitespace() => {}
            _ => {
                start.get_or_insert(i);
            }
        }
        i += 1;
    }

    if let Some(from) = start {
        push(from, bytes.len());
    }
    statements
}

/// Whether a depth-zero `}` at `after - 1` closes the statement.
fn ends_block_statement(script: &str, after: usize) -> bool {
    let rest = script[after..].trim_start();
    let Some(next) = rest.chars().next() else {
        return true;
    };
    if matches!(next, ';' | ',' | ')' | ']' | '.' | '(' | '[' | '?' | ':') {
        return false;
    }
    let word_len = rest
        .find(|c: char| !is_ident_char(c))
        .unwrap_or(rest.len());
    !matches!(&rest[..word_len], "else" | "catch" | "finally" | "while")
}

fn skip_line_comment(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| from + offset)
}

fn skip_block_comment(bytes: &[u8], from: usize) -> usize {
    bytes[from + 2..]
        .windows(2)
        .position(|window| window == b"*/")
        .map_or(bytes.len(), |offset| from + 2 + offset + 2)
}

/// Index just past the literal opened at `from`.
fn skip_literal(bytes: &[u8], from: usize) -> usize {
    let quote = bytes[from];
    let mut i = from + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' if quote != b'`' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}
