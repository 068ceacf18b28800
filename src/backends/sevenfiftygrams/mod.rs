//! 750g recipe site backend (www.750g.com).
//!
//! Anonymous site. Search results are paginated; recipe details carry
//! the whole "cooking sheet" (ingredients, instructions, timings), which
//! is fetched as one group when any of its fields is requested.

mod pages;

use crate::backends::Backend;
use crate::browser::{Browser, HttpTransport, Router, Transport, paginate};
use crate::capabilities::{Recipe, RecipeField, RecipeProvider};
use crate::config::HttpConfig;
use crate::error::AdapterError;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

const BACKEND_NAME: &str = "750g";
const BASE_URL: &str = "https://www.750g.com";

/// Page handlers of the 750g site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SevenFiftyGramsPage {
    Search,
    Recipe,
}

fn router() -> Router<SevenFiftyGramsPage> {
    Router::new()
        .route(
            r"https://www\.750g\.com/recherche\.htm.*",
            SevenFiftyGramsPage::Search,
        )
        .route(
            r"https://www\.750g\.com/recettes/.*\.htm",
            SevenFiftyGramsPage::Recipe,
        )
}

/// Recipe site backend.
pub struct SevenFiftyGramsBackend {
    browser: Browser<SevenFiftyGramsPage>,
}

impl SevenFiftyGramsBackend {
    pub fn new(http: &HttpConfig) -> Result<Self, AdapterError> {
        let transport = HttpTransport::new(
            &http.user_agent,
            http.timeout_secs,
            http.delay_between_requests_sec,
        )?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            browser: Browser::new(transport, router()),
        }
    }

    fn search_url(pattern: &str) -> Result<String, AdapterError> {
        let mut url = Url::parse(&format!("{}/recherche.htm", BASE_URL))
            .map_err(|e| AdapterError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("q", pattern);
        Ok(url.to_string())
    }

    fn recipe_url(id: &str) -> String {
        format!("{}/recettes/{}.htm", BASE_URL, id)
    }
}

impl Backend for SevenFiftyGramsBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn as_recipe(&self) -> Option<&dyn RecipeProvider> {
        Some(self)
    }
}

#[async_trait]
impl RecipeProvider for SevenFiftyGramsBackend {
    async fn iter_recipes(&self, pattern: &str) -> Result<Vec<Recipe>, AdapterError> {
        paginate(&self.browser, Self::search_url(pattern)?, |page| {
            pages::parse_search(&page.body, BACKEND_NAME)
        })
        .await
    }

    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>, AdapterError> {
        let page = match self.browser.navigate(&Self::recipe_url(id)).await {
            Ok(page) => page,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        pages::parse_recipe(&page.body, id, BACKEND_NAME).map(Some)
    }

    async fn fill_recipe(
        &self,
        recipe: &mut Recipe,
        fields: &[RecipeField],
    ) -> Result<(), AdapterError> {
        let needs_detail = fields
            .iter()
            .any(|field| RecipeField::EXPENSIVE.contains(field));
        if !needs_detail {
            return Ok(());
        }

        // One detail fetch covers the whole group; never one field at a time.
        let full = self
            .get_recipe(&recipe.id)
            .await?
            .ok_or_else(|| AdapterError::NotFound(recipe.id.clone()))?;

        recipe.picture_url = full.picture_url;
        recipe.nb_person = full.nb_person;
        recipe.preparation_time = full.preparation_time;
        recipe.cooking_time = full.cooking_time;
        recipe.ingredients = full.ingredients;
        recipe.instructions = full.instructions;
        recipe.author = full.author;
        recipe.comments = full.comments;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::pages::tests::{RECIPE_FIXTURE, SEARCH_PAGE_1, SEARCH_PAGE_2};
    use super::*;
    use crate::browser::testing::{ScriptedTransport, page};

    fn search_transport() -> ScriptedTransport {
        let url1 = "https://www.750g.com/recherche.htm?q=tartiflette";
        let url2 = "https://www.750g.com/recherche.htm?q=tartiflette&page=2";
        ScriptedTransport::new()
            .on(url1, page(url1, SEARCH_PAGE_1))
            .on(url2, page(url2, SEARCH_PAGE_2))
    }

    #[tokio::test]
    async fn test_iter_recipes_follows_pagination() {
        let backend = SevenFiftyGramsBackend::with_transport(Arc::new(search_transport()));

        let recipes = backend.iter_recipes("tartiflette").await.unwrap();
        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[2].id, "tartiflette-express");

        for recipe in &recipes {
            assert!(recipe.title.is_value());
            // Cooking-sheet fields stay unloaded on listing results.
            assert!(!recipe.instructions.is_loaded());
            assert!(!recipe.ingredients.is_loaded());
        }
    }

    #[tokio::test]
    async fn test_fill_recipe_copies_whole_group_once() {
        let detail_url = "https://www.750g.com/recettes/tartiflette-savoyarde.htm";
        let transport = ScriptedTransport::new().on(detail_url, page(detail_url, RECIPE_FIXTURE));
        let transport = Arc::new(transport);
        let backend = SevenFiftyGramsBackend::with_transport(transport.clone());

        let mut recipe = Recipe::new("tartiflette-savoyarde", "750g");
        backend
            .fill_recipe(&mut recipe, &[RecipeField::Instructions])
            .await
            .unwrap();

        // One requested field populates the whole detail group.
        assert!(recipe.instructions.is_value());
        assert!(recipe.ingredients.is_value());
        assert_eq!(*recipe.nb_person.value().unwrap(), 4);
        assert_eq!(transport.request_count("recettes/"), 1);
    }

    #[tokio::test]
    async fn test_fill_recipe_is_idempotent() {
        let detail_url = "https://www.750g.com/recettes/tartiflette-savoyarde.htm";
        let transport = ScriptedTransport::new().on(detail_url, page(detail_url, RECIPE_FIXTURE));
        let backend = SevenFiftyGramsBackend::with_transport(Arc::new(transport));

        let mut recipe = Recipe::new("tartiflette-savoyarde", "750g");
        let fields = [RecipeField::Ingredients, RecipeField::NbPerson];
        backend.fill_recipe(&mut recipe, &fields).await.unwrap();
        let first = recipe.clone();

        backend.fill_recipe(&mut recipe, &fields).await.unwrap();
        assert_eq!(recipe.ingredients, first.ingredients);
        assert_eq!(recipe.nb_person, first.nb_person);
        assert_eq!(recipe.instructions, first.instructions);
    }

    #[tokio::test]
    async fn test_fill_recipe_without_expensive_fields_skips_fetch() {
        let transport = Arc::new(ScriptedTransport::new());
        let backend = SevenFiftyGramsBackend::with_transport(transport.clone());

        let mut recipe = Recipe::new("tartiflette-savoyarde", "750g");
        backend.fill_recipe(&mut recipe, &[]).await.unwrap();

        assert_eq!(transport.requests().len(), 0);
        assert!(!recipe.instructions.is_loaded());
    }
}
