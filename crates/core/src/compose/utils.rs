//! Qualifier rewriting shared by the composers.

use crate::text::{is_ident_char, is_quote, take_word};

/// What to do with a qualifier that directly follows a quote character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoted {
    Strip,
    Keep,
}

/// Whether the qualifier occurrence preceded by `before` starts a path,
/// rather than continuing an identifier or a longer dotted chain.
fn starts_path(before: Option<char>) -> bool {
    before.is_none_or(|c| !is_ident_char(c) && c != '.')
}

/// Remove every `<qualifier>.` prefix that starts a path.
///
/// `pkg.model.User` becomes `User`; `xpkg.model.User` and `a.pkg.model.User`
/// are left as they are.
pub fn strip_qualifier(line: &str, qualifier: &str, quoted: Quoted) -> String {
    let needle = format!("{qualifier}.");
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    let mut before = None;

    while let Some(pos) = rest.find(&needle) {
        let prev = rest[..pos].chars().next_back().or(before);
        let keep = !starts_path(prev)
            || (quoted == Quoted::Keep && prev.is_some_and(is_quote));
        out.push_str(&rest[..pos]);
        if keep {
            out.push_str(&needle);
        }
        before = Some('.');
        rest = &rest[pos + needle.len()..];
    }
    out.push_str(rest);
    out
}

/// Identifiers referenced as `<qualifier>.<Name>` outside quotes.
pub fn qualified_references<'a>(line: &'a str, qualifier: &str) -> Vec<&'a str> {
    let needle = format!("{qualifier}.");
    let mut found = Vec::new();
    let mut from = 0;

    while let Some(offset) = line[from..].find(&needle) {
        let start = from + offset;
        from = start + needle.len();
        let prev = line[..start].chars().next_back();
        if !starts_path(prev) || prev.is_some_and(is_quote) {
            continue;
        }
        let name = take_word(&line[from..]);
        if !name.is_empty() {
            found.push(name);
        }
    }
    found
}

/// Drop `/* ... */` comments that open and close on the same line.
pub fn strip_block_comments(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find("/*") {
        let Some(close) = rest[open + 2..].find("*/") else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + 2 + close + 2..];
    }
    out.push_str(rest);
    out
}
