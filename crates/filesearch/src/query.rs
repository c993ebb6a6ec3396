//! Pattern matching for file name and path search.
//!
//! - `matcher` - strategy selection and the compiled `PatternMatcher`
//! - `wildcard` - `*`/`?` translation into unanchored regular expressions

mod matcher;
mod wildcard;

pub use matcher::{fold_case, matches, PatternMatcher};
pub use wildcard::{has_wildcards, translate_wildcard};
