//! The slice of the blog's post and category tables the series layer needs.

use crate::models::{Category, CreatePost, Post};
use crate::services::slug::{generate_slug, slug_or_generate};
use crate::services::timestamp;
use crate::Database;
use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::Connection;
use std::collections::HashMap;

/// Condition selecting posts visible to readers, over alias `p`.
pub(crate) const PUBLISHED_SCOPE: &str =
    "p.published = 1 AND p.published_at IS NOT NULL AND p.published_at <= datetime('now')";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const POST_COLUMNS: &str =
    "p.id, p.title, p.slug, p.excerpt, p.published, p.published_at, p.series_id, p.created_at";

pub fn create_post(db: &Database, input: &CreatePost) -> Result<i64> {
    let title = input.title.trim();
    if title.is_empty() {
        bail!("Post title cannot be empty");
    }
    let slug = slug_or_generate(input.slug.as_deref(), title);
    let now = timestamp();
    let published_at = match (&input.published_at, input.published) {
        (Some(at), _) => Some(normalize_timestamp(at)?),
        (None, true) => Some(now.clone()),
        (None, false) => None,
    };

    let conn = db.get()?;
    conn.execute(
        "INSERT INTO posts (title, slug, excerpt, published, published_at, series_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            title,
            &slug,
            &input.excerpt,
            input.published,
            &published_at,
            input.series_id,
            &now,
            &now,
        ),
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!("Created post {} ({})", id, slug);
    Ok(id)
}

/// Rewrites a publish time into the UTC `YYYY-MM-DD HH:MM:SS` form SQLite's
/// `datetime('now')` produces, so the published scope compares like with
/// like. Accepts RFC 3339, naive date-times (taken as UTC) and bare dates.
pub fn normalize_timestamp(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string());
    }
    for format in NAIVE_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(at.format(TIMESTAMP_FORMAT).to_string());
        }
    }
    if let Some(at) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(at.format(TIMESTAMP_FORMAT).to_string());
    }
    bail!("Invalid publish time '{}'", raw)
}

pub fn get_post(db: &Database, id: i64) -> Result<Option<Post>> {
    let conn = db.get()?;
    let sql = format!("SELECT {} FROM posts p WHERE p.id = ?", POST_COLUMNS);
    let post = conn.query_row(&sql, [id], row_to_post).ok();
    let Some(mut post) = post else {
        return Ok(None);
    };
    post.categories = categories_for_posts(&conn, &[id])?
        .remove(&id)
        .unwrap_or_default();
    Ok(Some(post))
}

pub fn get_post_by_slug(db: &Database, slug: &str) -> Result<Option<Post>> {
    let conn = db.get()?;
    let id: Option<i64> = conn
        .query_row("SELECT id FROM posts WHERE slug = ?", [slug], |row| row.get(0))
        .ok();
    drop(conn);
    match id {
        Some(id) => get_post(db, id),
        None => Ok(None),
    }
}

/// Moves a post into a series, or out of any series with `None`.
pub fn set_post_series(db: &Database, post_id: i64, series_id: Option<i64>) -> Result<()> {
    let conn = db.get()?;
    let updated = conn.execute(
        "UPDATE posts SET series_id = ?, updated_at = ? WHERE id = ?",
        (series_id, timestamp(), post_id),
    )?;
    if updated == 0 {
        bail!("Post {} not found", post_id);
    }
    Ok(())
}

pub fn create_category(db: &Database, name: &str, slug: Option<&str>) -> Result<i64> {
    let slug = slug
        .map(String::from)
        .unwrap_or_else(|| generate_slug(name));
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO categories (name, slug) VALUES (?, ?)",
        (&name, &slug),
    )?;
    Ok(conn.last_insert_rowid())
}

/// Id of the category with `name`'s slug, creating it when missing.
pub fn ensure_category(db: &Database, name: &str) -> Result<i64> {
    let slug = generate_slug(name);
    let existing: Option<i64> = {
        let conn = db.get()?;
        conn.query_row("SELECT id FROM categories WHERE slug = ?", [&slug], |row| row.get(0))
            .ok()
    };
    match existing {
        Some(id) => Ok(id),
        None => create_category(db, name, Some(&slug)),
    }
}

pub fn add_post_category(db: &Database, post_id: i64, category_id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute(
        "INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?, ?)",
        (post_id, category_id),
    )?;
    Ok(())
}

/// Posts of a series, newest first, with their categories.
pub fn list_series_posts(db: &Database, series_id: i64, published_only: bool) -> Result<Vec<Post>> {
    let conn = db.get()?;
    let scope = if published_only { PUBLISHED_SCOPE } else { "1 = 1" };
    let sql = format!(
        "SELECT {} FROM posts p WHERE p.series_id = ? AND {} ORDER BY p.published_at DESC, p.id DESC",
        POST_COLUMNS, scope
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut posts: Vec<Post> = stmt
        .query_map([series_id], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    let mut categories = categories_for_posts(&conn, &ids)?;
    for post in &mut posts {
        post.categories = categories.remove(&post.id).unwrap_or_default();
    }
    Ok(posts)
}

fn categories_for_posts(conn: &Connection, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Category>>> {
    let mut by_post: HashMap<i64, Vec<Category>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(by_post);
    }

    let placeholders = post_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "SELECT pc.post_id, c.id, c.name, c.slug
         FROM categories c
         JOIN post_categories pc ON c.id = pc.category_id
         WHERE pc.post_id IN ({})
         ORDER BY c.name",
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = post_ids
        .iter()
        .map(|id| id as &dyn rusqlite::ToSql)
        .collect();
    let rows = stmt.query_map(params.as_slice(), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            Category {
                id: row.get(1)?,
                name: row.get(2)?,
                slug: row.get(3)?,
                url: None,
            },
        ))
    })?;
    for row in rows {
        let (post_id, category) = row?;
        by_post.entry(post_id).or_default().push(category);
    }
    Ok(by_post)
}

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        excerpt: row.get(3)?,
        published: row.get(4)?,
        published_at: row.get(5)?,
        series_id: row.get(6)?,
        created_at: row.get(7)?,
        categories: Vec::new(),
        url: None,
    })
}
