//! Compiled pattern matcher for search operations.

use std::borrow::Cow;

use memchr::memmem;
use regex::{Regex, RegexBuilder};

use super::wildcard::{compile_wildcard, has_wildcards, translate_wildcard, WILDCARD_REGEX_SIZE_LIMIT};
use crate::error::{FileSearchError, Result};
use crate::options::SearchOptions;

#[derive(Debug, Clone)]
enum MatchStrategy {
    /// Whole-candidate equality against the folded pattern.
    Exact(String),
    /// Plain containment of the folded pattern.
    Substring(memmem::Finder<'static>),
    /// Translated wildcard expression, run against folded text.
    Wildcard(Regex),
    /// Explicit regular expression, run against the raw text.
    Regex(Regex),
}

/// A pattern compiled once per search and applied to every candidate.
///
/// Strategy selection, in order:
/// 1. `whole_word`: equality after case folding.
/// 2. `use_regex`: unanchored regex search; an invalid pattern is an error.
/// 3. `*` or `?` present: wildcard translation, falling back to substring
///    containment if the translated expression does not compile.
/// 4. Otherwise: substring containment.
///
/// Folding is ASCII-only except in regex mode, where the regex engine's own
/// case-insensitive matching applies.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    strategy: MatchStrategy,
    pattern: String,
    case_sensitive: bool,
}

impl PatternMatcher {
    /// Compiles `pattern` under `options`.
    pub fn compile(pattern: &str, options: &SearchOptions) -> Result<Self> {
        Self::compile_with_limit(pattern, options, WILDCARD_REGEX_SIZE_LIMIT)
    }

    fn compile_with_limit(
        pattern: &str,
        options: &SearchOptions,
        wildcard_size_limit: usize,
    ) -> Result<Self> {
        let case_sensitive = options.case_sensitive;
        let folded = fold_case(pattern, case_sensitive).into_owned();

        let strategy = if options.whole_word {
            MatchStrategy::Exact(folded)
        } else if options.use_regex {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|error| FileSearchError::PatternSyntax {
                    pattern: pattern.to_string(),
                    message: error.to_string(),
                })?;
            MatchStrategy::Regex(regex)
        } else if has_wildcards(&folded) {
            match compile_wildcard(&translate_wildcard(&folded), wildcard_size_limit) {
                Ok(regex) => MatchStrategy::Wildcard(regex),
                Err(error) => {
                    log::debug!(
                        "wildcard pattern {pattern:?} did not compile ({error}), using substring match"
                    );
                    MatchStrategy::Substring(memmem::Finder::new(folded.as_bytes()).into_owned())
                }
            }
        } else {
            MatchStrategy::Substring(memmem::Finder::new(folded.as_bytes()).into_owned())
        };

        Ok(Self {
            strategy,
            pattern: pattern.to_string(),
            case_sensitive,
        })
    }

    /// Returns the pattern as given by the caller.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Returns the folded pattern when this matcher is an exact-name matcher.
    pub fn exact_term(&self) -> Option<&str> {
        match &self.strategy {
            MatchStrategy::Exact(term) => Some(term.as_str()),
            _ => None,
        }
    }

    /// Returns true if the matcher degraded from wildcard to substring matching.
    pub fn is_substring_fallback(&self) -> bool {
        matches!(self.strategy, MatchStrategy::Substring(_)) && has_wildcards(&self.pattern)
    }

    /// Tests one candidate text.
    pub fn matches(&self, text: &str) -> bool {
        match &self.strategy {
            MatchStrategy::Regex(regex) => regex.is_match(text),
            MatchStrategy::Exact(term) => fold_case(text, self.case_sensitive) == term.as_str(),
            MatchStrategy::Substring(finder) => finder
                .find(fold_case(text, self.case_sensitive).as_bytes())
                .is_some(),
            MatchStrategy::Wildcard(regex) => regex.is_match(&fold_case(text, self.case_sensitive)),
        }
    }
}

/// One-shot form of [`PatternMatcher`]: compiles and tests a single candidate.
pub fn matches(text: &str, pattern: &str, options: &SearchOptions) -> Result<bool> {
    Ok(PatternMatcher::compile(pattern, options)?.matches(text))
}

/// ASCII case folding; borrows when nothing needs to change.
pub fn fold_case(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive || !text.bytes().any(|byte| byte.is_ascii_uppercase()) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SearchOptions {
        SearchOptions::default()
    }

    #[test]
    fn substring_is_case_insensitive_by_default() {
        let matcher = PatternMatcher::compile("READ", &options()).unwrap();
        assert!(matcher.matches("readme.md"));
        assert!(matcher.matches("ALREADY"));
        assert!(!matcher.matches("rad"));
    }

    #[test]
    fn case_sensitive_substring() {
        let opts = SearchOptions {
            case_sensitive: true,
            ..options()
        };
        let matcher = PatternMatcher::compile("Read", &opts).unwrap();
        assert!(matcher.matches("ReadMe"));
        assert!(!matcher.matches("readme"));
    }

    #[test]
    fn whole_word_requires_equality() {
        let opts = SearchOptions {
            whole_word: true,
            ..options()
        };
        let matcher = PatternMatcher::compile("main", &opts).unwrap();
        assert!(matcher.matches("main"));
        assert!(matcher.matches("MAIN"));
        assert!(!matcher.matches("mainmodule"));
        assert!(!matcher.matches("the_main"));
        assert_eq!(matcher.exact_term(), Some("main"));
    }

    #[test]
    fn whole_word_takes_precedence_over_regex() {
        let opts = SearchOptions {
            whole_word: true,
            use_regex: true,
            ..options()
        };
        let matcher = PatternMatcher::compile("a(", &opts).unwrap();
        assert!(matcher.matches("A("));
    }

    #[test]
    fn wildcard_matches_extension() {
        let matcher = PatternMatcher::compile("*.txt", &options()).unwrap();
        assert!(matcher.matches("a.txt"));
        assert!(matcher.matches("NOTES.TXT"));
        assert!(!matcher.matches("a.bin"));
        assert!(!matcher.matches("atxt"));
    }

    #[test]
    fn wildcard_is_unanchored() {
        let matcher = PatternMatcher::compile("b?d", &options()).unwrap();
        assert!(matcher.matches("abcde"));
        assert!(!matcher.matches("bd"));
    }

    #[test]
    fn regex_search_is_unanchored_and_folds_case() {
        let opts = SearchOptions {
            use_regex: true,
            ..options()
        };
        let matcher = PatternMatcher::compile(r"\.cpp$", &opts).unwrap();
        assert!(matcher.matches("main.CPP"));
        assert!(!matcher.matches("main.cpp.bak"));

        let matcher = PatternMatcher::compile("ain", &opts).unwrap();
        assert!(matcher.matches("main.rs"));
    }

    #[test]
    fn regex_keeps_escape_classes_intact() {
        let opts = SearchOptions {
            use_regex: true,
            ..options()
        };
        let matcher = PatternMatcher::compile(r"^\D+$", &opts).unwrap();
        assert!(matcher.matches("abc"));
        assert!(!matcher.matches("a1c"));
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let opts = SearchOptions {
            use_regex: true,
            ..options()
        };
        let error = PatternMatcher::compile("(unclosed", &opts).unwrap_err();
        assert!(error.is_pattern_error());
        assert!(matches("anything", "(unclosed", &opts).is_err());
    }

    #[test]
    fn oversized_wildcard_falls_back_to_substring() {
        let matcher = PatternMatcher::compile_with_limit("a*b", &options(), 1).unwrap();
        assert!(matcher.is_substring_fallback());
        assert!(matcher.matches("xa*by"));
        assert!(!matcher.matches("axxb"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let matcher = PatternMatcher::compile("", &options()).unwrap();
        assert!(matcher.matches("anything"));
        assert!(matcher.matches(""));
    }

    #[test]
    fn fold_case_borrows_lowercase_input() {
        assert!(matches!(fold_case("abc", false), Cow::Borrowed(_)));
        assert!(matches!(fold_case("ABC", true), Cow::Borrowed(_)));
        assert_eq!(fold_case("AbC", false), "abc");
    }
}
