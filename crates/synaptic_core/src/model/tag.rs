//! Tag name rules.
//!
//! # Invariants
//! - Tag names are host attribute identifiers: ASCII letter or underscore
//!   first, then letters, digits or underscores.
//! - Tag names are case-sensitive and never rewritten.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid tag name regex"));

/// Returns whether `name` can be used as a tag.
pub fn is_valid_tag_name(name: &str) -> bool {
    TAG_NAME_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::is_valid_tag_name;

    #[test]
    fn accepts_attribute_like_names() {
        for name in ["rainbow", "Root_Joint", "_private", "ik2"] {
            assert!(is_valid_tag_name(name), "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_names_hosts_cannot_store() {
        for name in ["", " ", "2nd", "with space", "dotted.name", "dash-ed"] {
            assert!(!is_valid_tag_name(name), "{name:?} should be rejected");
        }
    }
}
