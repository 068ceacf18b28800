//! Page handlers for the attilasub subtitle site.

use super::ARCHIVE_SUFFIX;
use crate::capabilities::Subtitle;
use crate::error::AdapterError;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Subtitle id embedded in a detail link like `/subtitle/spiderman-fr-847.html`.
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/subtitle/([^/]+)\.html$").unwrap());

struct Selectors {
    results_table: Selector,
    result_row: Selector,
    name_link: Selector,
    download_link: Selector,
    cd_cell: Selector,
    detail_name: Selector,
    detail_download: Selector,
    detail_notes: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    results_table: Selector::parse("table.results").unwrap(),
    result_row: Selector::parse("table.results tr.sub").unwrap(),
    name_link: Selector::parse("a.subName").unwrap(),
    download_link: Selector::parse("a.subDownload").unwrap(),
    cd_cell: Selector::parse("td.cds").unwrap(),
    detail_name: Selector::parse("h2.subTitle").unwrap(),
    detail_download: Selector::parse("a.subDownload").unwrap(),
    detail_notes: Selector::parse("div.subNotes").unwrap(),
});

/// Parses a search results page.
///
/// Rows whose download target is not a direct archive link are dropped;
/// the site pads its result tables with promotional entries.
pub fn parse_search(
    body: &str,
    language: &str,
    backend: &str,
) -> Result<Vec<Subtitle>, AdapterError> {
    let doc = Html::parse_document(body);

    if doc.select(&SELECTORS.results_table).next().is_none() {
        return Err(AdapterError::Extraction("results table".to_string()));
    }

    let mut subtitles = Vec::new();
    for row in doc.select(&SELECTORS.result_row) {
        let name_link = row
            .select(&SELECTORS.name_link)
            .next()
            .ok_or_else(|| AdapterError::Extraction("subtitle row name link".to_string()))?;
        let detail_href = name_link
            .value()
            .attr("href")
            .ok_or_else(|| AdapterError::Extraction("subtitle link href".to_string()))?;

        let download = row
            .select(&SELECTORS.download_link)
            .next()
            .and_then(|elem| elem.value().attr("href"));
        let Some(download) = download else {
            continue;
        };
        if !path_of(download).ends_with(ARCHIVE_SUFFIX) {
            continue;
        }

        let id = ID_REGEX
            .captures(detail_href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| AdapterError::Extraction(format!("subtitle id in '{}'", detail_href)))?;

        let mut subtitle = Subtitle::new(id, backend);
        subtitle
            .name
            .set(name_link.text().collect::<String>().trim().to_string());
        subtitle.language.set(language.to_string());
        subtitle.url.set(download.to_string());
        subtitle.nb_cd = row
            .select(&SELECTORS.cd_cell)
            .next()
            .and_then(|cell| cell.text().collect::<String>().trim().parse().ok())
            .into();

        subtitles.push(subtitle);
    }

    Ok(subtitles)
}

/// Parses a subtitle detail page.
pub fn parse_subtitle(body: &str, id: &str, backend: &str) -> Result<Subtitle, AdapterError> {
    let doc = Html::parse_document(body);

    let name = doc
        .select(&SELECTORS.detail_name)
        .next()
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AdapterError::Extraction("subtitle title".to_string()))?;

    let mut subtitle = Subtitle::new(id, backend);
    subtitle.name.set(name);

    subtitle.url = doc
        .select(&SELECTORS.detail_download)
        .next()
        .and_then(|elem| elem.value().attr("href"))
        .filter(|href| path_of(href).ends_with(ARCHIVE_SUFFIX))
        .map(str::to_string)
        .into();

    subtitle.description = doc
        .select(&SELECTORS.detail_notes)
        .next()
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .into();

    // The language is encoded in the id on this site.
    subtitle.language = id
        .rsplit('-')
        .nth(1)
        .map(str::to_string)
        .into();

    Ok(subtitle)
}

/// Strips any query string before suffix checks.
fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
