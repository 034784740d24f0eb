//! Invalidation patterns.
//!
//! A pattern without `*` names one key. With `*` it matches every key whose
//! full text fits, each `*` standing for zero or more characters and every
//! other character matched literally.

use regex::Regex;

const WILDCARD: char = '*';

#[derive(Debug, Clone)]
pub enum KeyPattern {
    Exact(String),
    Wildcard(Regex),
}

impl KeyPattern {
    pub fn parse(pattern: &str) -> Result<Self, regex::Error> {
        if !pattern.contains(WILDCARD) {
            return Ok(Self::Exact(pattern.to_string()));
        }

        let body = pattern
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Regex::new(&format!("(?s)^{body}$")).map(Self::Wildcard)
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == key,
            Self::Wildcard(regex) => regex.is_match(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pattern: &str) -> KeyPattern {
        KeyPattern::parse(pattern).expect("pattern compiles")
    }

    #[test]
    fn exact_pattern_matches_only_itself() {
        let pattern = parse("post:slug:a");
        assert!(matches!(pattern, KeyPattern::Exact(_)));
        assert!(pattern.matches("post:slug:a"));
        assert!(!pattern.matches("post:slug:ab"));
    }

    #[test]
    fn wildcard_is_anchored_at_both_ends() {
        let pattern = parse("posts:*");
        assert!(pattern.matches("posts:"));
        assert!(pattern.matches("posts:featured:limit=5"));
        assert!(!pattern.matches("post:slug:x"));
        assert!(!pattern.matches("xposts:featured"));
    }

    #[test]
    fn metacharacters_are_literal() {
        let pattern = parse("posts:category:a.b*");
        assert!(pattern.matches("posts:category:a.b:limit=all"));
        assert!(!pattern.matches("posts:category:aXb:limit=all"));

        let parens = parse("(x)+*");
        assert!(parens.matches("(x)+tail"));
        assert!(!parens.matches("xx"));
    }

    #[test]
    fn interior_wildcards_match_empty_runs() {
        let pattern = parse("a*b*c");
        assert!(pattern.matches("abc"));
        assert!(pattern.matches("a--b--c"));
        assert!(!pattern.matches("a--c"));
    }
}
