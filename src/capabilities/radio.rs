//! Radio station capability objects.

use super::Field;
use crate::error::AdapterError;
use async_trait::async_trait;

/// What a station is broadcasting right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub artist: String,
    pub title: String,
}

/// One audio stream of a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    /// Human label, typically the bitrate.
    pub title: String,
    pub url: String,
}

/// A radio station.
#[derive(Debug, Clone, Default)]
pub struct Radio {
    pub id: String,
    pub backend: String,

    pub title: Field<String>,
    pub description: Field<String>,

    /// Currently playing emission. Refreshing it requires a feed fetch,
    /// so listing results leave it `NotLoaded`.
    pub current: Field<Emission>,

    pub streams: Field<Vec<Stream>>,
}

impl Radio {
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

/// Fillable radio fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioField {
    Current,
    Streams,
}

impl RadioField {
    /// Fields needing a network fetch to populate.
    pub const EXPENSIVE: &'static [RadioField] = &[RadioField::Current];
}

/// Capability trait for radio backends.
#[async_trait]
pub trait RadioProvider: Send + Sync {
    /// Searches stations matching a pattern (empty pattern lists all).
    async fn iter_radios(&self, pattern: &str) -> Result<Vec<Radio>, AdapterError>;

    /// Looks up one station by id.
    async fn get_radio(&self, id: &str) -> Result<Option<Radio>, AdapterError>;

    /// Populates the requested fields in place.
    async fn fill_radio(
        &self,
        radio: &mut Radio,
        fields: &[RadioField],
    ) -> Result<(), AdapterError>;
}
