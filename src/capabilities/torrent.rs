//! Torrent capability objects.

use super::Field;
use crate::error::AdapterError;
use async_trait::async_trait;

/// A torrent as listed by an indexer.
///
/// `description` and `files` are detail-only: listing results leave them
/// `NotLoaded` until the detail page is fetched.
#[derive(Debug, Clone, Default)]
pub struct Torrent {
    pub id: String,
    pub backend: String,

    pub name: Field<String>,

    /// Size in bytes.
    pub size: Field<u64>,

    pub seeders: Field<u32>,
    pub leechers: Field<u32>,

    /// Direct `.torrent` download URL, when the site offers one.
    pub url: Field<String>,

    /// Magnet URI, when the site offers one.
    pub magnet: Field<String>,

    /// Uploader description (detail page only).
    pub description: Field<String>,

    /// File listing (detail page only).
    pub files: Field<Vec<String>>,
}

impl Torrent {
    pub fn new(id: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            backend: backend.into(),
            ..Self::default()
        }
    }

    pub fn full_id(&self) -> String {
        super::full_id(&self.id, &self.backend)
    }
}

/// Capability trait for torrent indexer backends.
#[async_trait]
pub trait TorrentProvider: Send + Sync {
    /// Searches torrents matching a pattern, best-seeded first.
    async fn iter_torrents(&self, pattern: &str) -> Result<Vec<Torrent>, AdapterError>;

    /// Fetches the detail view of one torrent.
    async fn get_torrent(&self, id: &str) -> Result<Option<Torrent>, AdapterError>;

    /// Downloads the `.torrent` file.
    ///
    /// Fails with [`AdapterError::MagnetOnly`] when the site only exposes
    /// a magnet reference for this torrent.
    async fn get_torrent_file(&self, id: &str) -> Result<Vec<u8>, AdapterError>;
}
