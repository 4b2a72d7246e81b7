//! Small lexical helpers shared by the IDL and JavaScript scanners.

/// `\w` in the ASCII sense: letters, digits and underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Characters that may appear in a JavaScript identifier.
pub fn is_ident_char(c: char) -> bool {
    is_word_char(c) || c == '$'
}

pub fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

/// Longest prefix of `text` made of word characters.
pub fn take_word(text: &str) -> &str {
    let end = text.find(|c: char| !is_word_char(c)).unwrap_or(text.len());
    &text[..end]
}

/// If `text` starts with `keyword` followed by at least one whitespace
/// character, returns what follows with the whitespace removed.
pub fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return None;
    }
    Some(trimmed)
}

/// For every occurrence of `keyword` that starts a word and is followed by
/// whitespace, the remainder of the line after that whitespace.
pub fn keyword_tails<'a>(line: &'a str, keyword: &str) -> Vec<&'a str> {
    let mut tails = Vec::new();
    let mut from = 0;
    while let Some(offset) = line[from..].find(keyword) {
        let start = from + offset;
        from = start + keyword.len();
        let at_word_start = line[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_word_char(c));
        if !at_word_start {
            continue;
        }
        if let Some(tail) = strip_keyword(&line[start..], keyword) {
            tails.push(tail);
        }
    }
    tails
}
