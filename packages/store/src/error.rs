//! Errors surfaced by the persistence layer.
//!
//! Reads never fail: an absent or malformed collection degrades to an empty
//! one, and unreadable records are skipped. Writes, config (de)serialisation
//! and backup import can error; a write never replaces a malformed collection.

/// Errors that can occur while writing collections, config or backups.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record could not be encoded to, or a backup decoded from, JSON.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The stored settings are not valid TOML for [`crate::SocietyConfig`].
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The settings could not be rendered as TOML.
    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// An imported backup is JSON but lacks a `members` array.
    #[error("Invalid data format")]
    InvalidBackup,

    /// The stored value under `key` is not a JSON array, so writing would
    /// discard data that could not be read.
    #[error("stored collection {key:?} is unreadable; refusing to overwrite it")]
    Unreadable { key: String },
}
