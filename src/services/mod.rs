pub mod media;
pub mod posts;
pub mod series;
pub mod slug;
pub mod translation;
pub mod validation;

/// Current UTC time in SQLite's `CURRENT_TIMESTAMP` format.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
