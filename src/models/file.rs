use serde::{Deserialize, Serialize};

/// A file attached to some owning model under a named field. Its bytes live
/// in the upload directory under `disk_name`.
#[derive(Debug, Clone, Serialize)]
pub struct File {
    pub id: i64,
    pub disk_name: String,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub title: Option<String>,
    pub field: String,
    pub attachment_type: String,
    pub attachment_id: i64,
    pub sort_order: i32,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFile {
    pub file_name: String,
    pub content_type: String,
    pub title: Option<String>,
}

/// Identifies the owner side of an attachment relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentOwner<'a> {
    pub attachment_type: &'a str,
    pub attachment_id: i64,
    pub field: &'a str,
}
