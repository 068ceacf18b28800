//! Subtitle capability objects.

use super::Field;
use crate::error::AdapterError;
use async_trait::async_trait;

/// A subtitle file or archive offered by a subtitle site.
#[derive(Debug, Clone, Default)]
pub struct Subtitle {
    pub id: String,
    pub backend: String,

    /// Release name the subtitle applies to.
    pub name: Field<String>,

    /// Language code the site filed the subtitle under.
    pub language: Field<String>,

    /// Download URL. Sites serve a fixed archive format, so the URL path
    /// carries the site's expected file extension.
    pub url: Field<String>,

    /// Number of CDs the release is split into.
    pub nb_cd: Field<u32>,

    /// Uploader notes (detail page only).
    pub description: Field<String>,
}

impl Subtitle {
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

/// Capability trait for subtitle site backends.
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// Searches subtitles in a language matching a pattern.
    async fn iter_subtitles(
        &self,
        language: &str,
        pattern: &str,
    ) -> Result<Vec<Subtitle>, AdapterError>;

    /// Fetches the detail view of one subtitle.
    async fn get_subtitle(&self, id: &str) -> Result<Option<Subtitle>, AdapterError>;

    /// Downloads the subtitle file or archive.
    async fn get_subtitle_file(&self, id: &str) -> Result<Vec<u8>, AdapterError>;
}
