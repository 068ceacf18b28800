//! Shared capability objects and the provider traits backends implement.
//!
//! Every backend converts its site's pages or API responses into these
//! shapes so the front-end can aggregate results across sites. Objects
//! returned from listing calls may be partially populated; each optional
//! field is a [`Field`] so "never fetched" and "site has no value" stay
//! distinguishable from real data.

pub mod account;
pub mod chat;
pub mod cinema;
pub mod paste;
pub mod radio;
pub mod recipe;
pub mod subtitle;
pub mod torrent;

pub use account::{Account, BankProvider, Transaction};
pub use chat::{ChatMessage, ChatProvider};
pub use cinema::{CinemaProvider, Movie, MovieField, Person, PersonField};
pub use paste::{Expiration, closest_expiration};
pub use radio::{Emission, Radio, RadioField, RadioProvider, Stream};
pub use recipe::{Recipe, RecipeField, RecipeProvider};
pub use subtitle::{Subtitle, SubtitleProvider};
pub use torrent::{Torrent, TorrentProvider};

/// Tri-state slot for an optional capability-object field.
///
/// `NotLoaded` means the producing backend never fetched the field (the
/// default for detail-only fields on listing results); `Empty` means the
/// site affirmatively has no value. Formatters skip both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Value(T),
    Empty,
    NotLoaded,
}

impl<T> Field<T> {
    /// Returns the contained value, if populated.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    /// True if a real value is present.
    pub fn is_value(&self) -> bool {
        matches!(self, Field::Value(_))
    }

    /// True if the field was fetched but the site had nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Empty)
    }

    /// True if the field has been fetched at all, with or without a value.
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Field::NotLoaded)
    }

    /// Replaces the slot with a fetched value.
    pub fn set(&mut self, value: T) {
        *self = Field::Value(value);
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::NotLoaded
    }
}

/// Converts a fetch result into a field: `None` becomes `Empty`, not
/// `NotLoaded`, because the site was actually consulted.
impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Empty,
        }
    }
}

/// Renders `id@backend`, the form the front-end prints and accepts.
pub fn full_id(id: &str, backend: &str) -> String {
    format!("{}@{}", id, backend)
}

/// Splits `id@backend` into its parts; the backend half is optional.
pub fn parse_full_id(input: &str) -> (&str, Option<&str>) {
    match input.rsplit_once('@') {
        Some((id, backend)) if !backend.is_empty() => (id, Some(backend)),
        _ => (input, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_default_is_not_loaded() {
        let field: Field<String> = Field::default();
        assert!(!field.is_loaded());
        assert!(!field.is_value());
        assert!(field.value().is_none());
    }

    #[test]
    fn test_field_from_option() {
        let present: Field<u32> = Some(7).into();
        assert_eq!(present, Field::Value(7));

        let absent: Field<u32> = None.into();
        assert!(absent.is_empty());
        assert!(absent.is_loaded());
    }

    #[test]
    fn test_field_set() {
        let mut field = Field::NotLoaded;
        field.set("hello");
        assert_eq!(field.value(), Some(&"hello"));
    }

    #[test]
    fn test_parse_full_id() {
        assert_eq!(parse_full_id("abc123@kickass"), ("abc123", Some("kickass")));
        assert_eq!(parse_full_id("abc123"), ("abc123", None));
        assert_eq!(parse_full_id("abc123@"), ("abc123@", None));
        assert_eq!(full_id("abc123", "kickass"), "abc123@kickass");
    }
}
