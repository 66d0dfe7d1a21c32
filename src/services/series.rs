//! Series: named groups of blog posts with their own slug, description,
//! translations, and featured images.

use crate::models::{
    AttachmentOwner, CreateSeries, File, NewFile, Post, PostDeletePolicy, Series, SeriesOrder,
    TranslatedFields, UpdateSeries,
};
use crate::services::posts::{self, PUBLISHED_SCOPE};
use crate::services::slug::slug_or_generate;
use crate::services::timestamp;
use crate::services::translation::Translation;
use crate::services::validation::{validate_series, Field};
use crate::services::media;
use crate::Database;
use anyhow::{anyhow, bail, Result};
use rusqlite::Connection;
use std::path::Path;

/// Series columns plus the published post count, readable as a table.
fn series_select() -> String {
    format!(
        r#"
        SELECT s.id, s.title, s.slug, s.description, s.created_at, s.updated_at,
               (SELECT COUNT(*) FROM posts p WHERE p.series_id = s.id AND {}) AS posts_count
        FROM series s
        "#,
        PUBLISHED_SCOPE
    )
}

/// Options for listing series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesQuery {
    pub order: SeriesOrder,
    /// Maximum number of series, 0 for all.
    pub limit: usize,
    /// Include series without published posts.
    pub include_empty: bool,
}

pub fn create_series(db: &Database, input: &CreateSeries) -> Result<i64> {
    let title = input.title.trim();
    let slug = slug_or_generate(input.slug.as_deref(), title);

    let conn = db.get()?;
    validate_series(title, &slug, |field, value| value_taken(&conn, field, value, None))?;

    let now = timestamp();
    conn.execute(
        "INSERT INTO series (title, slug, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        (title, &slug, input.description.trim(), &now, &now),
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!("Created series {} ({})", id, slug);
    Ok(id)
}

/// Applies an edit. A changed title without an explicit slug regenerates the
/// slug from the new title.
pub fn update_series(db: &Database, id: i64, input: &UpdateSeries) -> Result<()> {
    let current = get_series_by_id(db, id)?.ok_or_else(|| anyhow!("Series not found"))?;

    let title = input
        .title
        .as_deref()
        .map(str::trim)
        .unwrap_or(&current.title);
    let explicit_slug = input
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let slug = match explicit_slug {
        Some(slug) => slug.to_string(),
        None if title != current.title => slug_or_generate(None, title),
        None => current.slug.clone(),
    };
    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or(&current.description);

    let conn = db.get()?;
    validate_series(title, &slug, |field, value| {
        value_taken(&conn, field, value, Some(id))
    })?;

    conn.execute(
        "UPDATE series SET title = ?, slug = ?, description = ?, updated_at = ? WHERE id = ?",
        (title, &slug, description, timestamp(), id),
    )?;
    tracing::info!("Updated series {} ({})", id, slug);
    Ok(())
}

/// Deletes a series with its translations and featured images, including
/// the images' stored files under `upload_dir`. Posts in the series are
/// handled according to `policy`.
pub fn delete_series(
    db: &Database,
    upload_dir: &Path,
    id: i64,
    policy: PostDeletePolicy,
) -> Result<()> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM series WHERE id = ?)",
        [id],
        |row| row.get(0),
    )?;
    if !exists {
        bail!("Series not found");
    }

    let post_count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM posts WHERE series_id = ?",
        [id],
        |row| row.get(0),
    )?;
    match policy {
        PostDeletePolicy::Restrict if post_count > 0 => {
            bail!(
                "Series {} still has {} post(s); move them out before deleting it",
                id,
                post_count
            );
        }
        PostDeletePolicy::Restrict => {}
        PostDeletePolicy::Nullify => {
            tx.execute(
                "UPDATE posts SET series_id = NULL, updated_at = ? WHERE series_id = ?",
                (timestamp(), id),
            )?;
        }
        PostDeletePolicy::Cascade => {
            tx.execute("DELETE FROM posts WHERE series_id = ?", [id])?;
        }
    }

    let files = media::detach_all(&tx, Series::ATTACHMENT_TYPE, id)?;
    tx.execute("DELETE FROM series_translations WHERE series_id = ?", [id])?;
    tx.execute("DELETE FROM series WHERE id = ?", [id])?;
    tx.commit()?;
    media::remove_stored(upload_dir, &files);

    tracing::info!(
        "Deleted series {} ({} post(s) {}, {} file(s) detached)",
        id,
        post_count,
        match policy {
            PostDeletePolicy::Cascade => "deleted",
            _ => "released",
        },
        files.len()
    );
    Ok(())
}

pub fn get_series_by_id(db: &Database, id: i64) -> Result<Option<Series>> {
    let conn = db.get()?;
    let sql = format!("{} WHERE s.id = ?", series_select());
    let series = conn.query_row(&sql, [id], row_to_series).ok();
    Ok(series)
}

/// Finds a series by slug. With a translated `locale`, the slug is looked up
/// among that locale's slugs first and the result is translated.
pub fn get_series_by_slug(
    db: &Database,
    slug: &str,
    translation: &Translation,
    locale: Option<&str>,
) -> Result<Option<Series>> {
    let conn = db.get()?;
    let id = match translation.find_by_slug(&conn, slug, locale)? {
        Some(id) => Some(id),
        None => conn
            .query_row(
                "SELECT id FROM series WHERE slug = ? COLLATE NOCASE",
                [slug],
                |row| row.get::<_, i64>(0),
            )
            .ok(),
    };
    let Some(id) = id else {
        return Ok(None);
    };

    let sql = format!("{} WHERE s.id = ?", series_select());
    let mut series = conn.query_row(&sql, [id], row_to_series)?;
    translation.translate(&conn, &mut series, locale)?;
    Ok(Some(series))
}

pub fn list_series(
    db: &Database,
    query: &SeriesQuery,
    translation: &Translation,
    locale: Option<&str>,
) -> Result<Vec<Series>> {
    // Title orders over a translated locale sort on the translated titles,
    // so the limit is applied after translating.
    let sort_translated = translation.translates(locale)
        && matches!(query.order, SeriesOrder::TitleAsc | SeriesOrder::TitleDesc);

    let conn = db.get()?;
    let mut sql = format!(
        "SELECT * FROM ({}) WHERE (? OR posts_count > 0) ORDER BY {}",
        series_select(),
        query.order.sql()
    );
    if query.limit > 0 && !sort_translated {
        sql.push_str(&format!(" LIMIT {}", query.limit));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut list: Vec<Series> = stmt
        .query_map([query.include_empty], row_to_series)?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    for series in &mut list {
        translation.translate(&conn, series, locale)?;
    }

    if sort_translated {
        list.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        if query.order == SeriesOrder::TitleDesc {
            list.reverse();
        }
        if query.limit > 0 {
            list.truncate(query.limit);
        }
    }
    Ok(list)
}

/// Number of published posts in a series.
pub fn post_count(db: &Database, id: i64) -> Result<i64> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT COUNT(*) FROM posts p WHERE p.series_id = ? AND {}",
        PUBLISHED_SCOPE
    );
    let count: i64 = conn.query_row(&sql, [id], |row| row.get(0))?;
    Ok(count)
}

/// Published posts of a series, newest first.
pub fn list_published_posts(db: &Database, id: i64) -> Result<Vec<Post>> {
    posts::list_series_posts(db, id, true)
}

pub fn translate_series(
    db: &Database,
    translation: &Translation,
    id: i64,
    locale: &str,
    fields: &TranslatedFields,
) -> Result<bool> {
    if get_series_by_id(db, id)?.is_none() {
        bail!("Series not found");
    }
    let conn = db.get()?;
    translation.store(&conn, id, locale, fields)
}

fn featured_images(id: i64) -> AttachmentOwner<'static> {
    AttachmentOwner {
        attachment_type: Series::ATTACHMENT_TYPE,
        attachment_id: id,
        field: Series::FEATURED_IMAGES,
    }
}

pub fn attach_featured_image(
    db: &Database,
    upload_dir: &Path,
    id: i64,
    file: &NewFile,
    data: &[u8],
) -> Result<File> {
    if get_series_by_id(db, id)?.is_none() {
        bail!("Series not found");
    }
    media::attach(db, upload_dir, featured_images(id), file, data)
}

pub fn list_featured_images(db: &Database, id: i64) -> Result<Vec<File>> {
    media::list_attachments(db, featured_images(id))
}

pub fn detach_featured_image(
    db: &Database,
    upload_dir: &Path,
    id: i64,
    file_id: i64,
) -> Result<bool> {
    media::detach(db, upload_dir, featured_images(id), file_id)
}

fn value_taken(conn: &Connection, field: Field, value: &str, except: Option<i64>) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM series WHERE {} = ? COLLATE NOCASE AND id != ?)",
        field.column()
    );
    let taken: bool = conn.query_row(&sql, (value, except.unwrap_or(-1)), |row| row.get(0))?;
    Ok(taken)
}

fn row_to_series(row: &rusqlite::Row) -> rusqlite::Result<Series> {
    Ok(Series {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        post_count: row.get(6)?,
        locale: None,
        url: None,
    })
}
