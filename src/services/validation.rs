//! Validation of series input before anything is written.
//!
//! Every failed rule is reported with a localization key so the admin UI can
//! show a translated message next to the field.

use crate::services::slug::SLUG_PATTERN;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^[a-z0-9\-?!,." ]+$"#).unwrap());

pub const MIN_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Slug,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Slug => "slug",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Self::Title => &TITLE_PATTERN,
            Self::Slug => &SLUG_PATTERN,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    Required,
    Unique,
    Min,
    Regex,
}

/// Localization key of the message for a failed rule.
pub fn message_key(field: Field, rule: Rule) -> &'static str {
    match (field, rule) {
        (Field::Title, Rule::Required) => "taxonomy::lang.form.series.title_required",
        (Field::Title, Rule::Unique) => "taxonomy::lang.form.series.title_unique",
        (Field::Title, Rule::Min) => "taxonomy::lang.form.series.title_too_short",
        (Field::Title, Rule::Regex) => "taxonomy::lang.form.series.title_invalid",
        (Field::Slug, Rule::Required) => "taxonomy::lang.form.series.slug_required",
        (Field::Slug, Rule::Unique) => "taxonomy::lang.form.series.slug_unique",
        (Field::Slug, Rule::Min) => "taxonomy::lang.form.series.slug_too_short",
        (Field::Slug, Rule::Regex) => "taxonomy::lang.form.series.slug_invalid",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: Field,
    pub rule: Rule,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("validation failed: {}", summary(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn summary(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} ({})", v.field, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn has(&self, field: Field, rule: Rule) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.rule == rule)
    }

    pub fn messages(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.message).collect()
    }
}

/// Validates a full title/slug pair. `is_taken` answers whether another
/// series already uses a value, compared case-insensitively.
pub fn validate_series<F>(title: &str, slug: &str, mut is_taken: F) -> Result<()>
where
    F: FnMut(Field, &str) -> Result<bool>,
{
    let mut violations = Vec::new();
    check_field(Field::Title, Some(title), true, &mut is_taken, &mut violations)?;
    check_field(Field::Slug, Some(slug), true, &mut is_taken, &mut violations)?;
    finish(violations)
}

/// Validates the fields present in a translation. Absent fields fall back to
/// the base values and are not checked.
pub fn validate_translation<F>(
    title: Option<&str>,
    slug: Option<&str>,
    mut is_taken: F,
) -> Result<()>
where
    F: FnMut(Field, &str) -> Result<bool>,
{
    let mut violations = Vec::new();
    check_field(Field::Title, title, false, &mut is_taken, &mut violations)?;
    check_field(Field::Slug, slug, false, &mut is_taken, &mut violations)?;
    finish(violations)
}

fn check_field<F>(
    field: Field,
    value: Option<&str>,
    required: bool,
    is_taken: &mut F,
    violations: &mut Vec<Violation>,
) -> Result<()>
where
    F: FnMut(Field, &str) -> Result<bool>,
{
    let mut fail = |rule: Rule| {
        violations.push(Violation {
            field,
            rule,
            message: message_key(field, rule),
        })
    };

    let value = match value {
        Some(v) if !v.trim().is_empty() => v,
        Some(_) | None => {
            if required || value.is_some() {
                fail(Rule::Required);
            }
            return Ok(());
        }
    };

    if value.chars().count() < MIN_LENGTH {
        fail(Rule::Min);
    }
    if !field.pattern().is_match(value) {
        fail(Rule::Regex);
    }
    if is_taken(field, value)? {
        fail(Rule::Unique);
    }
    Ok(())
}

fn finish(violations: Vec<Violation>) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations }.into())
    }
}
