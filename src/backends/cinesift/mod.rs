//! CineSift movie database backend (api.cinesift.com).
//!
//! JSON API with a fixed envelope: `{"error": bool, "message": str,
//! "body": ...}`. Search endpoints return summaries; the detail
//! endpoints carry the whole movie or person sheet, copied as one group
//! by the fill operations.

use crate::backends::Backend;
use crate::browser::{HttpTransport, Transport, TransportRequest};
use crate::capabilities::{
    CinemaProvider, Field, Movie, MovieField, Person, PersonField,
};
use crate::config::HttpConfig;
use crate::error::AdapterError;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

const BACKEND_NAME: &str = "cinesift";
const API_BASE: &str = "https://api.cinesift.com/v1";

/// API response wrapper.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    error: bool,
    #[serde(default)]
    message: String,
    body: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MovieResults {
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieSummary {
    id: String,
    title: String,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieDetail {
    id: String,
    title: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    duration_minutes: Option<u32>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    credits: Vec<Credit>,
    #[serde(default)]
    pitch: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonResults {
    results: Vec<PersonSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonSummary {
    id: String,
    name: String,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonDetail {
    id: String,
    name: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    birth_date: Option<String>,
    #[serde(default)]
    birth_place: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    credits: Vec<Credit>,
    #[serde(default)]
    biography: Option<String>,
}

/// One credit line, shared by both credit directions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credit {
    id: String,
    name: String,
    role: String,
}

#[derive(Debug, Deserialize)]
struct CreditsBody {
    credits: Vec<Credit>,
}

/// Movie database backend.
pub struct CinesiftBackend {
    transport: Arc<dyn Transport>,
}

impl CinesiftBackend {
    pub fn new(http: &HttpConfig) -> Result<Self, AdapterError> {
        let transport = HttpTransport::new(
            &http.user_agent,
            http.timeout_secs,
            http.delay_between_requests_sec,
        )?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    fn search_url(kind: &str, pattern: &str) -> Result<String, AdapterError> {
        let mut url = Url::parse(&format!("{}/{}", API_BASE, kind))
            .map_err(|e| AdapterError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("q", pattern);
        Ok(url.to_string())
    }

    fn credits_url(kind: &str, id: &str, role: Option<&str>) -> Result<String, AdapterError> {
        let mut url = Url::parse(&format!("{}/{}/{}/credits", API_BASE, kind, id))
            .map_err(|e| AdapterError::InvalidUrl(e.to_string()))?;
        if let Some(role) = role {
            url.query_pairs_mut().append_pair("role", role);
        }
        Ok(url.to_string())
    }

    async fn api_request<T: DeserializeOwned>(&self, url: &str) -> Result<T, AdapterError> {
        let response = self
            .transport
            .execute(&TransportRequest::get(url))
            .await?;

        match response.status {
            200..=299 => {}
            404 => return Err(AdapterError::NotFound(url.to_string())),
            status => {
                return Err(AdapterError::Status {
                    status,
                    url: url.to_string(),
                });
            }
        }

        let envelope: ApiResponse<T> = serde_json::from_slice(&response.body)
            .map_err(|e| AdapterError::Parse(format!("API response: {}", e)))?;

        if envelope.error {
            return Err(AdapterError::NotFound(envelope.message));
        }

        envelope
            .body
            .ok_or_else(|| AdapterError::Parse("API response missing body".to_string()))
    }

    async fn movie_detail(&self, id: &str) -> Result<Option<Movie>, AdapterError> {
        let url = format!("{}/movies/{}", API_BASE, id);
        let detail: MovieDetail = match self.api_request(&url).await {
            Ok(detail) => detail,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut movie = Movie::new(detail.id, BACKEND_NAME);
        movie.original_title.set(detail.title);
        movie.short_description = detail.summary.into();
        movie.release_date = detail.release_date.into();
        movie.duration = detail.duration_minutes.into();
        movie.note = detail.note.into();
        movie.country = detail.country.into();
        movie.genres = if detail.genres.is_empty() {
            Field::Empty
        } else {
            Field::Value(detail.genres)
        };
        movie.roles = if detail.credits.is_empty() {
            Field::Empty
        } else {
            Field::Value(
                detail
                    .credits
                    .into_iter()
                    .map(|credit| (credit.role, credit.name))
                    .collect(),
            )
        };
        movie.pitch = detail.pitch.into();

        Ok(Some(movie))
    }

    async fn person_detail(&self, id: &str) -> Result<Option<Person>, AdapterError> {
        let url = format!("{}/persons/{}", API_BASE, id);
        let detail: PersonDetail = match self.api_request(&url).await {
            Ok(detail) => detail,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut person = Person::new(detail.id, BACKEND_NAME);
        person.name.set(detail.name);
        person.short_description = detail.summary.into();
        person.birth_date = detail.birth_date.into();
        person.birth_place = detail.birth_place.into();
        person.nationality = detail.nationality.into();
        person.gender = detail.gender.into();
        person.roles = if detail.credits.is_empty() {
            Field::Empty
        } else {
            Field::Value(
                detail
                    .credits
                    .into_iter()
                    .map(|credit| (credit.role, credit.name))
                    .collect(),
            )
        };
        person.short_biography = detail.biography.into();

        Ok(Some(person))
    }
}

impl Backend for CinesiftBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn as_cinema(&self) -> Option<&dyn CinemaProvider> {
        Some(self)
    }
}

#[async_trait]
impl CinemaProvider for CinesiftBackend {
    async fn iter_movies(&self, pattern: &str) -> Result<Vec<Movie>, AdapterError> {
        let body: MovieResults = self
            .api_request(&Self::search_url("movies", pattern)?)
            .await?;

        let movies = body
            .results
            .into_iter()
            .map(|summary| {
                let mut movie = Movie::new(summary.id, BACKEND_NAME);
                movie.original_title.set(summary.title);
                movie.short_description = summary.summary.into();
                movie
            })
            .collect();
        Ok(movies)
    }

    async fn get_movie(&self, id: &str) -> Result<Option<Movie>, AdapterError> {
        self.movie_detail(id).await
    }

    async fn fill_movie(
        &self,
        movie: &mut Movie,
        fields: &[MovieField],
    ) -> Result<(), AdapterError> {
        let needs_detail = fields
            .iter()
            .any(|field| MovieField::EXPENSIVE.contains(field));
        if !needs_detail {
            return Ok(());
        }

        let full = self
            .movie_detail(&movie.id)
            .await?
            .ok_or_else(|| AdapterError::NotFound(movie.id.clone()))?;

        movie.release_date = full.release_date;
        movie.duration = full.duration;
        movie.note = full.note;
        movie.country = full.country;
        movie.genres = full.genres;
        movie.roles = full.roles;
        movie.pitch = full.pitch;

        Ok(())
    }

    async fn iter_persons(&self, pattern: &str) -> Result<Vec<Person>, AdapterError> {
        let body: PersonResults = self
            .api_request(&Self::search_url("persons", pattern)?)
            .await?;

        let persons = body
            .results
            .into_iter()
            .map(|summary| {
                let mut person = Person::new(summary.id, BACKEND_NAME);
                person.name.set(summary.name);
                person.short_description = summary.summary.into();
                person
            })
            .collect();
        Ok(persons)
    }

    async fn get_person(&self, id: &str) -> Result<Option<Person>, AdapterError> {
        self.person_detail(id).await
    }

    async fn fill_person(
        &self,
        person: &mut Person,
        fields: &[PersonField],
    ) -> Result<(), AdapterError> {
        let needs_detail = fields
            .iter()
            .any(|field| PersonField::EXPENSIVE.contains(field));
        if !needs_detail {
            return Ok(());
        }

        let full = self
            .person_detail(&person.id)
            .await?
            .ok_or_else(|| AdapterError::NotFound(person.id.clone()))?;

        person.birth_date = full.birth_date;
        person.birth_place = full.birth_place;
        person.nationality = full.nationality;
        person.gender = full.gender;
        person.roles = full.roles;
        person.short_biography = full.short_biography;

        Ok(())
    }

    async fn iter_movie_persons(
        &self,
        movie_id: &str,
        role: Option<&str>,
    ) -> Result<Vec<Person>, AdapterError> {
        let body: CreditsBody = self
            .api_request(&Self::credits_url("movies", movie_id, role)?)
            .await?;

        let persons = body
            .credits
            .into_iter()
            .map(|credit| {
                let mut person = Person::new(credit.id, BACKEND_NAME);
                person.name.set(credit.name);
                person.short_description.set(credit.role);
                person
            })
            .collect();
        Ok(persons)
    }

    async fn iter_person_movies(
        &self,
        person_id: &str,
        role: Option<&str>,
    ) -> Result<Vec<Movie>, AdapterError> {
        let body: CreditsBody = self
            .api_request(&Self::credits_url("persons", person_id, role)?)
            .await?;

        let movies = body
            .credits
            .into_iter()
            .map(|credit| {
                let mut movie = Movie::new(credit.id, BACKEND_NAME);
                movie.original_title.set(credit.name);
                movie.short_description.set(credit.role);
                movie
            })
            .collect();
        Ok(movies)
    }
}
