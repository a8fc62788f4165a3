//! Slug derivation and the post collision policy.
//!
//! A post slug is `base`, `base-1`, `base-2`, ... where `base` is the
//! slugified title. The first candidate that is free (or already owned by the
//! post being saved) wins.

use crate::error::DomainError;

/// Highest numeric suffix tried before giving up with a conflict.
pub const MAX_SUFFIX: u32 = 1000;

/// Derive the base slug for a title or name.
pub fn slugify(text: &str) -> Result<String, DomainError> {
    let slug = ::slug::slugify(text);
    if slug.is_empty() {
        return Err(DomainError::invalid(format!(
            "'{text}' does not contain any characters usable in a slug"
        )));
    }
    Ok(slug)
}

/// The `attempt`-th candidate for `base`; attempt 0 is the base itself.
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_lowercases_and_collapses_punctuation() {
        assert_eq!(slugify("Hello World").unwrap(), "hello-world");
        assert_eq!(slugify("Hello, World!!").unwrap(), "hello-world");
        assert_eq!(slugify("  Rust   2024 ").unwrap(), "rust-2024");
    }

    #[test]
    fn test_slugify_rejects_titles_without_alphanumerics() {
        assert!(matches!(
            slugify("!!!"),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_candidates_are_deterministic() {
        assert_eq!(candidate("hello-world", 0), "hello-world");
        assert_eq!(candidate("hello-world", 1), "hello-world-1");
        assert_eq!(candidate("hello-world", 12), "hello-world-12");
    }
}
