//! Wildcard to regular expression translation.
//!
//! `*` matches zero or more characters and `?` exactly one. Every other
//! character is literal. The expression is unanchored and no wildcard is
//! appended implicitly, so `*.txt` finds `a.txt` and `a.txt.bak` but not `a.bin`.

use regex::{Regex, RegexBuilder};

/// Upper bound on the compiled size of a translated wildcard expression.
pub const WILDCARD_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Returns true if `pattern` contains `*` or `?`.
pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Translates a wildcard pattern into regex source.
pub fn translate_wildcard(pattern: &str) -> String {
    let mut translated = String::with_capacity(pattern.len() * 2);
    let mut buf = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            other => translated.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    translated
}

/// Compiles translated wildcard source. Callers pass already case-folded text,
/// so the expression itself is case-sensitive.
pub fn compile_wildcard(translated: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(translated)
        .dot_matches_new_line(true)
        .size_limit(size_limit)
        .build()
}
