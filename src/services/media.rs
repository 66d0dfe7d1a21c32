use crate::models::{AttachmentOwner, File, NewFile};
use crate::services::timestamp;
use crate::Database;
use anyhow::{bail, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10MB

const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

const FILE_COLUMNS: &str = "id, disk_name, file_name, content_type, file_size, title, field, attachment_type, attachment_id, sort_order, created_at";

/// Stores `data` in `upload_dir` and records it as attached to `owner`,
/// after the files already there.
pub fn attach(
    db: &Database,
    upload_dir: &Path,
    owner: AttachmentOwner<'_>,
    file: &NewFile,
    data: &[u8],
) -> Result<File> {
    if data.is_empty() {
        bail!("File '{}' is empty", file.file_name);
    }
    if data.len() > MAX_FILE_SIZE {
        bail!(
            "File too large: {} bytes (max {} bytes)",
            data.len(),
            MAX_FILE_SIZE
        );
    }
    if !ALLOWED_MIME_TYPES.contains(&file.content_type.as_str()) {
        bail!(
            "File type not allowed: {}. Allowed types: {}",
            file.content_type,
            ALLOWED_MIME_TYPES.join(", ")
        );
    }

    let extension = Path::new(&file.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let disk_name = if extension.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        format!("{}.{}", Uuid::new_v4(), extension)
    };

    std::fs::create_dir_all(upload_dir)?;
    let file_path = upload_dir.join(&disk_name);
    std::fs::write(&file_path, data)?;

    match insert(db, owner, file, &disk_name, data.len() as i64) {
        Ok(record) => {
            tracing::info!(
                "Attached file {} to {} {} ({})",
                record.id,
                owner.attachment_type,
                owner.attachment_id,
                owner.field
            );
            Ok(record)
        }
        Err(e) => {
            remove_stored(upload_dir, &[disk_name]);
            Err(e)
        }
    }
}

fn insert(
    db: &Database,
    owner: AttachmentOwner<'_>,
    file: &NewFile,
    disk_name: &str,
    file_size: i64,
) -> Result<File> {
    let conn = db.get()?;
    let sort_order: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(sort_order), 0) FROM files WHERE attachment_type = ? AND attachment_id = ? AND field = ?",
            (owner.attachment_type, owner.attachment_id, owner.field),
            |row| row.get(0),
        )
        .unwrap_or(0)
        + 1;
    let created_at = timestamp();

    conn.execute(
        "INSERT INTO files (disk_name, file_name, content_type, file_size, title, field, attachment_type, attachment_id, sort_order, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            disk_name,
            &file.file_name,
            &file.content_type,
            file_size,
            &file.title,
            owner.field,
            owner.attachment_type,
            owner.attachment_id,
            sort_order,
            &created_at,
        ),
    )?;

    Ok(File {
        id: conn.last_insert_rowid(),
        disk_name: disk_name.to_string(),
        file_name: file.file_name.clone(),
        content_type: file.content_type.clone(),
        file_size,
        title: file.title.clone(),
        field: owner.field.to_string(),
        attachment_type: owner.attachment_type.to_string(),
        attachment_id: owner.attachment_id,
        sort_order,
        created_at,
    })
}

pub fn list_attachments(db: &Database, owner: AttachmentOwner<'_>) -> Result<Vec<File>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {} FROM files WHERE attachment_type = ? AND attachment_id = ? AND field = ? ORDER BY sort_order ASC, id ASC",
        FILE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let files = stmt
        .query_map(
            (owner.attachment_type, owner.attachment_id, owner.field),
            row_to_file,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(files)
}

/// Removes one attached file and its stored bytes. Returns false if it was
/// not attached to `owner`.
pub fn detach(
    db: &Database,
    upload_dir: &Path,
    owner: AttachmentOwner<'_>,
    file_id: i64,
) -> Result<bool> {
    let conn = db.get()?;
    let disk_name: Option<String> = conn
        .query_row(
            "SELECT disk_name FROM files WHERE id = ? AND attachment_type = ? AND attachment_id = ? AND field = ?",
            (file_id, owner.attachment_type, owner.attachment_id, owner.field),
            |row| row.get(0),
        )
        .optional()?;
    let Some(disk_name) = disk_name else {
        return Ok(false);
    };

    conn.execute("DELETE FROM files WHERE id = ?", [file_id])?;
    remove_stored(upload_dir, &[disk_name]);
    Ok(true)
}

/// Deletes the records of every file attached to a record, whatever the
/// field, and returns their disk names. The stored bytes are left for the
/// caller to remove once its transaction commits.
pub(crate) fn detach_all(
    conn: &Connection,
    attachment_type: &str,
    attachment_id: i64,
) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT disk_name FROM files WHERE attachment_type = ? AND attachment_id = ?",
    )?;
    let disk_names = stmt
        .query_map((attachment_type, attachment_id), |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);
    conn.execute(
        "DELETE FROM files WHERE attachment_type = ? AND attachment_id = ?",
        (attachment_type, attachment_id),
    )?;
    Ok(disk_names)
}

/// Deletes stored files. A file already gone is not an error.
pub(crate) fn remove_stored(upload_dir: &Path, disk_names: &[String]) {
    for disk_name in disk_names {
        let path = upload_dir.join(disk_name);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
        }
    }
}

fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        disk_name: row.get(1)?,
        file_name: row.get(2)?,
        content_type: row.get(3)?,
        file_size: row.get(4)?,
        title: row.get(5)?,
        field: row.get(6)?,
        attachment_type: row.get(7)?,
        attachment_id: row.get(8)?,
        sort_order: row.get(9)?,
        created_at: row.get(10)?,
    })
}
