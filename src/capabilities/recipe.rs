//! Recipe capability objects.

use super::Field;
use crate::error::AdapterError;
use async_trait::async_trait;

/// A cooking recipe.
#[derive(Debug, Clone, Default)]
pub struct Recipe {
    pub id: String,
    pub backend: String,

    pub title: Field<String>,

    /// Teaser text shown in search results.
    pub short_description: Field<String>,

    /// Illustration URL (detail page only).
    pub picture_url: Field<String>,

    /// Number of persons the quantities are for (detail page only).
    pub nb_person: Field<u32>,

    /// Preparation time in minutes (detail page only).
    pub preparation_time: Field<u32>,

    /// Cooking time in minutes (detail page only).
    pub cooking_time: Field<u32>,

    /// Ingredient lines (detail page only).
    pub ingredients: Field<Vec<String>>,

    /// Instruction text (detail page only).
    pub instructions: Field<String>,

    /// Recipe author (detail page only).
    pub author: Field<String>,

    /// Reader comments (detail page only).
    pub comments: Field<Vec<String>>,
}

impl Recipe {
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

/// Fillable recipe fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeField {
    PictureUrl,
    NbPerson,
    PreparationTime,
    CookingTime,
    Ingredients,
    Instructions,
    Author,
    Comments,
}

impl RecipeField {
    /// Fields that require fetching the detail page. Requesting any one of
    /// them fetches and copies the whole group at once.
    pub const EXPENSIVE: &'static [RecipeField] = &[
        RecipeField::PictureUrl,
        RecipeField::NbPerson,
        RecipeField::PreparationTime,
        RecipeField::CookingTime,
        RecipeField::Ingredients,
        RecipeField::Instructions,
        RecipeField::Author,
        RecipeField::Comments,
    ];
}

/// Capability trait for recipe site backends.
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Searches recipes matching a pattern.
    async fn iter_recipes(&self, pattern: &str) -> Result<Vec<Recipe>, AdapterError>;

    /// Fetches the detail view of one recipe.
    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>, AdapterError>;

    /// Populates the requested fields in place, fetching the detail page
    /// at most once.
    async fn fill_recipe(
        &self,
        recipe: &mut Recipe,
        fields: &[RecipeField],
    ) -> Result<(), AdapterError>;
}
