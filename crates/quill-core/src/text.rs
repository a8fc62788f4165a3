//! Text matching primitives shared by the query descriptor and adapters.
//!
//! Two deliberately different capabilities:
//! - substring search: case-insensitive containment, no tokenization
//! - indexed search: tokenized, every query term must appear as a whole word

use std::collections::HashSet;

/// Case-insensitive substring containment. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Split text into lowercase alphanumeric terms.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// True when every term of `query` occurs as a term of `document`.
/// A query without terms matches nothing.
pub fn full_text_match(document: &str, query: &str) -> bool {
    let terms = tokenize(query);
    if terms.is_empty() {
        return false;
    }
    let words: HashSet<String> = tokenize(document).into_iter().collect();
    terms.iter().all(|t| words.contains(t))
}

/// Escape `%`, `_` and `\` so `needle` is matched literally by SQL `LIKE`.
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_is_case_insensitive_and_partial() {
        assert!(contains_ignore_case("Learning Rust", "rUs"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Learning Rust", "go"));
    }

    #[test]
    fn test_full_text_requires_whole_terms() {
        let doc = "Async Rust: pinning, futures and executors";
        assert!(full_text_match(doc, "rust futures"));
        assert!(full_text_match(doc, "ASYNC"));
        // Substrings of a word are not terms.
        assert!(!full_text_match(doc, "rus"));
        assert!(!full_text_match(doc, "rust tokio"));
        assert!(!full_text_match(doc, "  ,, "));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
