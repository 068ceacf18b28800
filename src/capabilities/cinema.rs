//! Movie and person capability objects.

use super::Field;
use crate::error::AdapterError;
use async_trait::async_trait;

/// A film from a movie database.
#[derive(Debug, Clone, Default)]
pub struct Movie {
    pub id: String,
    pub backend: String,

    pub original_title: Field<String>,

    /// Teaser text shown in search results.
    pub short_description: Field<String>,

    /// Release date as printed by the site (detail view only).
    pub release_date: Field<String>,

    /// Running time in minutes (detail view only).
    pub duration: Field<u32>,

    /// Site rating (detail view only).
    pub note: Field<String>,

    /// Production country (detail view only).
    pub country: Field<String>,

    /// Genre labels (detail view only).
    pub genres: Field<Vec<String>>,

    /// (role, person name) credits (detail view only).
    pub roles: Field<Vec<(String, String)>>,

    /// Synopsis (detail view only).
    pub pitch: Field<String>,
}

impl Movie {
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

/// Fillable movie fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieField {
    ReleaseDate,
    Duration,
    Note,
    Country,
    Genres,
    Roles,
    Pitch,
}

impl MovieField {
    /// Detail-view group, fetched and copied as a unit.
    pub const EXPENSIVE: &'static [MovieField] = &[
        MovieField::ReleaseDate,
        MovieField::Duration,
        MovieField::Note,
        MovieField::Country,
        MovieField::Genres,
        MovieField::Roles,
        MovieField::Pitch,
    ];
}

/// A person involved in films.
#[derive(Debug, Clone, Default)]
pub struct Person {
    pub id: String,
    pub backend: String,

    pub name: Field<String>,
    pub short_description: Field<String>,

    /// Detail view only.
    pub birth_date: Field<String>,
    pub birth_place: Field<String>,
    pub nationality: Field<String>,
    pub gender: Field<String>,

    /// (role, movie title) credits (detail view only).
    pub roles: Field<Vec<(String, String)>>,

    /// Abridged biography (detail view only).
    pub short_biography: Field<String>,
}

impl Person {
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

/// Fillable person fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonField {
    BirthDate,
    BirthPlace,
    Nationality,
    Gender,
    Roles,
    ShortBiography,
}

impl PersonField {
    /// Detail-view group, fetched and copied as a unit.
    pub const EXPENSIVE: &'static [PersonField] = &[
        PersonField::BirthDate,
        PersonField::BirthPlace,
        PersonField::Nationality,
        PersonField::Gender,
        PersonField::Roles,
        PersonField::ShortBiography,
    ];
}

/// Capability trait for movie database backends.
#[async_trait]
pub trait CinemaProvider: Send + Sync {
    async fn iter_movies(&self, pattern: &str) -> Result<Vec<Movie>, AdapterError>;

    async fn get_movie(&self, id: &str) -> Result<Option<Movie>, AdapterError>;

    /// Populates the requested fields in place.
    async fn fill_movie(
        &self,
        movie: &mut Movie,
        fields: &[MovieField],
    ) -> Result<(), AdapterError>;

    async fn iter_persons(&self, pattern: &str) -> Result<Vec<Person>, AdapterError>;

    async fn get_person(&self, id: &str) -> Result<Option<Person>, AdapterError>;

    /// Populates the requested fields in place.
    async fn fill_person(
        &self,
        person: &mut Person,
        fields: &[PersonField],
    ) -> Result<(), AdapterError>;

    /// Lists persons credited on a movie, optionally filtered by role.
    async fn iter_movie_persons(
        &self,
        movie_id: &str,
        role: Option<&str>,
    ) -> Result<Vec<Person>, AdapterError>;

    /// Lists movies a person is credited on, optionally filtered by role.
    async fn iter_person_movies(
        &self,
        person_id: &str,
        role: Option<&str>,
    ) -> Result<Vec<Movie>, AdapterError>;
}
