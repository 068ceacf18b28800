//! Page handlers for the 750g recipe site.

use crate::capabilities::{Field, Recipe};
use crate::error::AdapterError;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Recipe slug embedded in a link like `/recettes/tartiflette-savoyarde.htm`.
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/recettes/([^/]+)\.htm$").unwrap());

/// Leading number in cells like `4 personnes` or `25 min`.
static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

struct Selectors {
    results_list: Selector,
    result_item: Selector,
    result_link: Selector,
    result_teaser: Selector,
    next_page: Selector,
    title: Selector,
    picture: Selector,
    nb_person: Selector,
    preparation_time: Selector,
    cooking_time: Selector,
    ingredient: Selector,
    instructions: Selector,
    author: Selector,
    comment: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    results_list: Selector::parse("ul.recipe-results").unwrap(),
    result_item: Selector::parse("ul.recipe-results li.recipe").unwrap(),
    result_link: Selector::parse("a.recipe-link").unwrap(),
    result_teaser: Selector::parse("p.teaser").unwrap(),
    next_page: Selector::parse("a.pagination-next").unwrap(),
    title: Selector::parse("h1.recipe-title").unwrap(),
    picture: Selector::parse("img.recipe-picture").unwrap(),
    nb_person: Selector::parse("span.nb-person").unwrap(),
    preparation_time: Selector::parse("span.preparation-time").unwrap(),
    cooking_time: Selector::parse("span.cooking-time").unwrap(),
    ingredient: Selector::parse("ul.ingredients li").unwrap(),
    instructions: Selector::parse("div.instructions").unwrap(),
    author: Selector::parse("span.author").unwrap(),
    comment: Selector::parse("div.comments p.comment").unwrap(),
});

/// Parses one search results page into partial recipes plus the next
/// page link, if any.
pub fn parse_search(
    body: &str,
    backend: &str,
) -> Result<(Vec<Recipe>, Option<String>), AdapterError> {
    let doc = Html::parse_document(body);

    if doc.select(&SELECTORS.results_list).next().is_none() {
        return Err(AdapterError::Extraction("recipe results list".to_string()));
    }

    let mut recipes = Vec::new();
    for item in doc.select(&SELECTORS.result_item) {
        let link = item
            .select(&SELECTORS.result_link)
            .next()
            .ok_or_else(|| AdapterError::Extraction("recipe result link".to_string()))?;
        let href = link
            .value()
            .attr("href")
            .ok_or_else(|| AdapterError::Extraction("recipe link href".to_string()))?;
        let id = ID_REGEX
            .captures(href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| AdapterError::Extraction(format!("recipe id in '{}'", href)))?;

        let mut recipe = Recipe::new(id, backend);
        recipe
            .title
            .set(link.text().collect::<String>().trim().to_string());
        recipe.short_description = item
            .select(&SELECTORS.result_teaser)
            .next()
            .map(|elem| elem.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .into();

        recipes.push(recipe);
    }

    let next = doc
        .select(&SELECTORS.next_page)
        .next()
        .and_then(|elem| elem.value().attr("href"))
        .map(absolutize);

    Ok((recipes, next))
}

/// Parses a recipe detail page into a fully-loaded recipe.
pub fn parse_recipe(body: &str, id: &str, backend: &str) -> Result<Recipe, AdapterError> {
    let doc = Html::parse_document(body);

    let title = doc
        .select(&SELECTORS.title)
        .next()
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AdapterError::Extraction("recipe title".to_string()))?;

    let mut recipe = Recipe::new(id, backend);
    recipe.title.set(title);

    recipe.picture_url = doc
        .select(&SELECTORS.picture)
        .next()
        .and_then(|elem| elem.value().attr("src"))
        .map(str::to_string)
        .into();

    recipe.nb_person = leading_number(&doc, &SELECTORS.nb_person).into();
    recipe.preparation_time = leading_number(&doc, &SELECTORS.preparation_time).into();
    recipe.cooking_time = leading_number(&doc, &SELECTORS.cooking_time).into();

    let ingredients: Vec<String> = doc
        .select(&SELECTORS.ingredient)
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    recipe.ingredients = if ingredients.is_empty() {
        Field::Empty
    } else {
        Field::Value(ingredients)
    };

    recipe.instructions = doc
        .select(&SELECTORS.instructions)
        .next()
        .map(|elem| {
            elem.text()
                .collect::<String>()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|text| !text.is_empty())
        .into();

    recipe.author = doc
        .select(&SELECTORS.author)
        .next()
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .into();

    let comments: Vec<String> = doc
        .select(&SELECTORS.comment)
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    recipe.comments = if comments.is_empty() {
        Field::Empty
    } else {
        Field::Value(comments)
    };

    Ok(recipe)
}

fn leading_number(doc: &Html, selector: &Selector) -> Option<u32> {
    let text = doc
        .select(selector)
        .next()
        .map(|elem| elem.text().collect::<String>())?;
    NUMBER_REGEX
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("https://www.750g.com{}", href)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const SEARCH_PAGE_1: &str = r#"
<html><body>
<ul class="recipe-results">
  <li class="recipe">
    <a class="recipe-link" href="/recettes/tartiflette-savoyarde.htm">Tartiflette savoyarde</a>
    <p class="teaser">La vraie, au reblochon fermier.</p>
  </li>
  <li class="recipe">
    <a class="recipe-link" href="/recettes/tartiflette-legere.htm">Tartiflette allégée</a>
    <p class="teaser">Moins de crème, autant de goût.</p>
  </li>
</ul>
<a class="pagination-next" href="/recherche.htm?q=tartiflette&amp;page=2">Suivant</a>
</body></html>
"#;

    pub const SEARCH_PAGE_2: &str = r#"
<html><body>
<ul class="recipe-results">
  <li class="recipe">
    <a class="recipe-link" href="/recettes/tartiflette-express.htm">Tartiflette express</a>
    <p class="teaser"></p>
  </li>
</ul>
</body></html>
"#;

    pub const RECIPE_FIXTURE: &str = r#"
<html><body>
<h1 class="recipe-title">Tartiflette savoyarde</h1>
<img class="recipe-picture" src="https://static.750g.com/images/tartiflette.jpg" />
<span class="nb-person">4 personnes</span>
<span class="preparation-time">25 min</span>
<span class="cooking-time">45 min</span>
<ul class="ingredients">
  <li>1 kg de pommes de terre</li>
  <li>1 reblochon fermier</li>
  <li>200 g de lardons</li>
</ul>
<div class="instructions">
  Faire revenir les lardons.
  Monter la tartiflette et enfourner 45 minutes.
</div>
<span class="author">mamie750g</span>
<div class="comments">
  <p class="comment">Parfaite pour l'hiver.</p>
</div>
</body></html>
"#;

    #[test]
    fn test_parse_search_with_next_link() {
        let (recipes, next) = parse_search(SEARCH_PAGE_1, "750g").unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].id, "tartiflette-savoyarde");
        assert_eq!(
            next.as_deref(),
            Some("https://www.750g.com/recherche.htm?q=tartiflette&page=2")
        );
    }

    #[test]
    fn test_parse_search_last_page_has_no_next() {
        let (recipes, next) = parse_search(SEARCH_PAGE_2, "750g").unwrap();
        assert_eq!(recipes.len(), 1);
        assert!(next.is_none());
        // Empty teaser is fetched-but-absent.
        assert!(recipes[0].short_description.is_empty());
    }

    #[test]
    fn test_parse_recipe_detail() {
        let recipe = parse_recipe(RECIPE_FIXTURE, "tartiflette-savoyarde", "750g").unwrap();
        assert_eq!(recipe.title.value().unwrap(), "Tartiflette savoyarde");
        assert_eq!(*recipe.nb_person.value().unwrap(), 4);
        assert_eq!(*recipe.preparation_time.value().unwrap(), 25);
        assert_eq!(*recipe.cooking_time.value().unwrap(), 45);
        assert_eq!(recipe.ingredients.value().unwrap().len(), 3);
        assert!(recipe.instructions.value().unwrap().contains("lardons"));
        assert_eq!(recipe.author.value().unwrap(), "mamie750g");
        assert_eq!(recipe.comments.value().unwrap().len(), 1);
    }
}
