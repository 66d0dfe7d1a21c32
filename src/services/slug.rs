use once_cell::sync::Lazy;
use regex::Regex;
use slug::slugify;

pub(crate) static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z0-9\-]+$").unwrap());

/// Lowercases, transliterates, and collapses every run of other characters
/// into a single hyphen. Applying it to its own output changes nothing.
pub fn generate_slug(title: &str) -> String {
    slugify(title)
}

/// The explicit slug if one was given, otherwise one derived from `title`.
pub fn slug_or_generate(slug: Option<&str>, title: &str) -> String {
    slug.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| generate_slug(title))
}

pub fn validate_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}
