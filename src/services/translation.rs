//! Per-locale storage of the translatable series fields.
//!
//! Translation is optional. With [`Translation::Disabled`] every operation
//! is a no-op and series keep a single language: lookups fall back to the
//! base columns and stored translations are ignored with a warning.

use crate::config::TranslationConfig;
use crate::models::{Series, TranslatedFields};
use crate::services::slug::generate_slug;
use crate::services::validation::{validate_translation, Field};
use anyhow::{bail, Result};
use rusqlite::{Connection, OptionalExtension};

#[derive(Debug, Clone)]
pub struct Translator {
    default_locale: String,
    locales: Vec<String>,
}

impl Translator {
    pub fn new(default_locale: impl Into<String>, locales: Vec<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            locales,
        }
    }

    /// Whether `locale` has rows of its own, as opposed to the base columns.
    fn is_translated_locale(&self, locale: &str) -> bool {
        locale != self.default_locale && self.locales.iter().any(|l| l == locale)
    }
}

#[derive(Debug, Clone, Default)]
pub enum Translation {
    #[default]
    Disabled,
    Enabled(Translator),
}

impl Translation {
    pub fn from_config(config: &TranslationConfig) -> Self {
        if config.enabled {
            Self::Enabled(Translator::new(
                config.default_locale.clone(),
                config.locales.clone(),
            ))
        } else {
            Self::Disabled
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    /// Whether reads in `locale` replace the base text fields.
    pub(crate) fn translates(&self, locale: Option<&str>) -> bool {
        self.target(locale).is_some()
    }

    /// Locale to translate into, if `locale` is one with its own rows.
    fn target<'a>(&self, locale: Option<&'a str>) -> Option<&'a str> {
        match (self, locale) {
            (Self::Enabled(translator), Some(locale)) if translator.is_translated_locale(locale) => {
                Some(locale)
            }
            _ => None,
        }
    }

    /// Stores translated fields for a series. A translated title without a
    /// slug gets a slug derived from it. Returns whether anything was stored.
    pub fn store(
        &self,
        conn: &Connection,
        series_id: i64,
        locale: &str,
        fields: &TranslatedFields,
    ) -> Result<bool> {
        let translator = match self {
            Self::Enabled(translator) => translator,
            Self::Disabled => {
                tracing::warn!(
                    "Translation is disabled, ignoring '{}' fields for series {}",
                    locale,
                    series_id
                );
                return Ok(false);
            }
        };

        if locale == translator.default_locale {
            bail!(
                "'{}' is the default locale; edit the series itself instead",
                locale
            );
        }
        if !translator.is_translated_locale(locale) {
            bail!(
                "Unsupported locale '{}'. Available locales: {}",
                locale,
                translator.locales.join(", ")
            );
        }
        if fields.is_empty() {
            return Ok(false);
        }

        let title = fields.title.as_deref().map(str::trim);
        let slug = fields
            .slug
            .as_deref()
            .map(str::trim)
            .map(String::from)
            .or_else(|| title.filter(|t| !t.is_empty()).map(generate_slug));

        validate_translation(title, slug.as_deref(), |field, value| {
            translated_value_taken(conn, series_id, locale, field, value)
        })?;

        conn.execute(
            r#"
            INSERT INTO series_translations (series_id, locale, title, slug, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(series_id, locale) DO UPDATE SET
                title = COALESCE(excluded.title, title),
                slug = COALESCE(excluded.slug, slug),
                description = COALESCE(excluded.description, description)
            "#,
            (series_id, locale, title, &slug, &fields.description),
        )?;
        tracing::info!("Stored '{}' translation of series {}", locale, series_id);
        Ok(true)
    }

    /// Stored translation of a series, if there is one.
    pub fn fields(
        &self,
        conn: &Connection,
        series_id: i64,
        locale: &str,
    ) -> Result<Option<TranslatedFields>> {
        let Some(locale) = self.target(Some(locale)) else {
            return Ok(None);
        };
        let fields = conn
            .query_row(
                "SELECT title, slug, description FROM series_translations WHERE series_id = ? AND locale = ?",
                (series_id, locale),
                |row| {
                    Ok(TranslatedFields {
                        title: row.get(0)?,
                        slug: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(fields)
    }

    /// Replaces the text fields of `series` with their `locale` translation.
    /// Fields without a translation keep their base value.
    pub fn translate(&self, conn: &Connection, series: &mut Series, locale: Option<&str>) -> Result<()> {
        let Some(locale) = self.target(locale) else {
            return Ok(());
        };
        if let Some(fields) = self.fields(conn, series.id, locale)? {
            if let Some(title) = fields.title {
                series.title = title;
            }
            if let Some(slug) = fields.slug {
                series.slug = slug;
            }
            if let Some(description) = fields.description {
                series.description = description;
            }
        }
        series.locale = Some(locale.to_string());
        Ok(())
    }

    /// Id of the series whose `locale` slug is `slug`.
    pub fn find_by_slug(&self, conn: &Connection, slug: &str, locale: Option<&str>) -> Result<Option<i64>> {
        let Some(locale) = self.target(locale) else {
            return Ok(None);
        };
        let id = conn
            .query_row(
                "SELECT series_id FROM series_translations WHERE locale = ? AND slug = ? COLLATE NOCASE",
                (locale, slug),
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

fn translated_value_taken(
    conn: &Connection,
    series_id: i64,
    locale: &str,
    field: Field,
    value: &str,
) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM series_translations WHERE locale = ? AND {} = ? COLLATE NOCASE AND series_id != ?)",
        field.column()
    );
    let taken: bool = conn.query_row(&sql, (locale, value, series_id), |row| row.get(0))?;
    Ok(taken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::series::{create_series, get_series_by_id};
    use crate::models::CreateSeries;
    use crate::services::validation::{Rule, ValidationError};
    use crate::Database;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn setup_test_db() -> Database {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db = Database::open_memory(&format!("translation_test_{}", id)).unwrap();
        db.migrate().unwrap();
        db
    }

    fn enabled() -> Translation {
        Translation::Enabled(Translator::new("en", vec!["en".into(), "de".into(), "fr".into()]))
    }

    fn seed(db: &Database, title: &str) -> i64 {
        create_series(
            db,
            &CreateSeries {
                title: title.to_string(),
                slug: None,
                description: "English description".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_disabled_translation_is_noop() {
        let db = setup_test_db();
        let id = seed(&db, "Getting Started");
        let conn = db.get().unwrap();
        let translation = Translation::Disabled;

        let fields = TranslatedFields {
            title: Some("Erste Schritte".into()),
            ..Default::default()
        };
        assert!(!translation.store(&conn, id, "de", &fields).unwrap());

        let mut series = get_series_by_id(&db, id).unwrap().unwrap();
        translation.translate(&conn, &mut series, Some("de")).unwrap();
        assert_eq!(series.title, "Getting Started");
        assert_eq!(series.locale, None);
        assert_eq!(
            translation.find_by_slug(&conn, "erste-schritte", Some("de")).unwrap(),
            None
        );
    }

    #[test]
    fn test_store_and_translate() {
        let db = setup_test_db();
        let id = seed(&db, "Getting Started");
        let conn = db.get().unwrap();
        let translation = enabled();

        let fields = TranslatedFields {
            title: Some("Erste Schritte".into()),
            ..Default::default()
        };
        assert!(translation.store(&conn, id, "de", &fields).unwrap());

        let mut series = get_series_by_id(&db, id).unwrap().unwrap();
        translation.translate(&conn, &mut series, Some("de")).unwrap();
        assert_eq!(series.title, "Erste Schritte");
        assert_eq!(series.slug, "erste-schritte");
        assert_eq!(series.description, "English description");
        assert_eq!(series.locale.as_deref(), Some("de"));

        assert_eq!(
            translation.find_by_slug(&conn, "Erste-Schritte", Some("de")).unwrap(),
            Some(id)
        );
        assert_eq!(
            translation.find_by_slug(&conn, "erste-schritte", Some("fr")).unwrap(),
            None
        );
    }

    #[test]
    fn test_store_merges_fields() {
        let db = setup_test_db();
        let id = seed(&db, "Getting Started");
        let conn = db.get().unwrap();
        let translation = enabled();

        translation
            .store(&conn, id, "fr", &TranslatedFields {
                title: Some("Premiers pas".into()),
                ..Default::default()
            })
            .unwrap();
        translation
            .store(&conn, id, "fr", &TranslatedFields {
                description: Some("Description".into()),
                ..Default::default()
            })
            .unwrap();

        let fields = translation.fields(&conn, id, "fr").unwrap().unwrap();
        assert_eq!(fields.title.as_deref(), Some("Premiers pas"));
        assert_eq!(fields.slug.as_deref(), Some("premiers-pas"));
        assert_eq!(fields.description.as_deref(), Some("Description"));
    }

    #[test]
    fn test_translated_slug_unique_per_locale() {
        let db = setup_test_db();
        let first = seed(&db, "First Series");
        let second = seed(&db, "Second Series");
        let conn = db.get().unwrap();
        let translation = enabled();

        let fields = TranslatedFields {
            slug: Some("gemeinsam".into()),
            ..Default::default()
        };
        translation.store(&conn, first, "de", &fields).unwrap();

        let err = translation
            .store(&conn, second, "de", &fields)
            .unwrap_err()
            .downcast::<ValidationError>()
            .unwrap();
        assert!(err.has(Field::Slug, Rule::Unique));

        // Same slug in another locale is fine.
        assert!(translation.store(&conn, second, "fr", &fields).unwrap());
    }

    #[test]
    fn test_store_rejects_default_and_unknown_locales() {
        let db = setup_test_db();
        let id = seed(&db, "Getting Started");
        let conn = db.get().unwrap();
        let translation = enabled();
        let fields = TranslatedFields {
            title: Some("Whatever".into()),
            ..Default::default()
        };

        assert!(translation.store(&conn, id, "en", &fields).is_err());
        assert!(translation.store(&conn, id, "es", &fields).is_err());
    }

    #[test]
    fn test_default_locale_is_untouched() {
        let db = setup_test_db();
        let id = seed(&db, "Getting Started");
        let conn = db.get().unwrap();
        let translation = enabled();

        let mut series = get_series_by_id(&db, id).unwrap().unwrap();
        translation.translate(&conn, &mut series, Some("en")).unwrap();
        assert_eq!(series.locale, None);
        assert_eq!(series.title, "Getting Started");
    }
}
