//! Slug validation for post URLs.
//!
//! Slugs are supplied by authors rather than generated, so the helpers here
//! only check that a candidate is already in canonical form and, when it is
//! not, suggest the canonical spelling produced by the `slug` crate.

use slug::slugify;
use thiserror::Error;

const MAX_SLUG_LEN: usize = 200;

/// Errors produced when a candidate slug is not canonical.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug must not be empty")]
    EmptyInput,
    #[error("slug exceeds {MAX_SLUG_LEN} characters")]
    TooLong,
    #[error("slug `{input}` is not canonical, try `{suggestion}`")]
    NotCanonical { input: String, suggestion: String },
}

/// Derive a canonical slug from free text, transliterating accented letters.
pub fn derive_slug(input: &str) -> String {
    slugify(input)
}

/// Accept `input` only when it is already lowercase ASCII words joined by single hyphens.
pub fn validate_slug(input: &str) -> Result<(), SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }
    if input.len() > MAX_SLUG_LEN {
        return Err(SlugError::TooLong);
    }

    let canonical = input
        .split('-')
        .all(|part| {
            !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        });

    if canonical {
        Ok(())
    } else {
        Err(SlugError::NotCanonical {
            input: input.to_string(),
            suggestion: derive_slug(input),
        })
    }
}
