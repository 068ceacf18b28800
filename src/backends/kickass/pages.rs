//! Page handlers for the kickass torrent indexer.

use crate::capabilities::{Field, Torrent};
use crate::error::AdapterError;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Torrent id embedded in a detail link like `/some-torrent-t123.html`.
static ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/([^/]+)\.html$").unwrap());

/// CSS selectors used for parsing.
struct Selectors {
    results_table: Selector,
    row: Selector,
    main_link: Selector,
    size_cell: Selector,
    seeders_cell: Selector,
    leechers_cell: Selector,
    detail_title: Selector,
    magnet_link: Selector,
    download_link: Selector,
    summary: Selector,
    file_name: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    results_table: Selector::parse("table.data").unwrap(),
    row: Selector::parse("tr[id^='torrent_']").unwrap(),
    main_link: Selector::parse("a.cellMainLink").unwrap(),
    size_cell: Selector::parse("td.nobr").unwrap(),
    seeders_cell: Selector::parse("td.green").unwrap(),
    leechers_cell: Selector::parse("td.red").unwrap(),
    detail_title: Selector::parse("h1.novertmarg a").unwrap(),
    magnet_link: Selector::parse("a[href^='magnet:']").unwrap(),
    download_link: Selector::parse("a[href$='.torrent']").unwrap(),
    summary: Selector::parse("div#summary").unwrap(),
    file_name: Selector::parse("table.torrentFileList td.torFileName").unwrap(),
});

/// Parses a search results page into partial torrents.
///
/// Only cheap listing fields are populated; `description` and `files`
/// stay unloaded until the detail page is fetched.
pub fn parse_search(body: &str, backend: &str) -> Result<Vec<Torrent>, AdapterError> {
    let doc = Html::parse_document(body);

    if doc.select(&SELECTORS.results_table).next().is_none() {
        return Err(AdapterError::Extraction("results table".to_string()));
    }

    let mut torrents = Vec::new();
    for row in doc.select(&SELECTORS.row) {
        let link = row
            .select(&SELECTORS.main_link)
            .next()
            .ok_or_else(|| AdapterError::Extraction("torrent row main link".to_string()))?;
        let href = link
            .value()
            .attr("href")
            .ok_or_else(|| AdapterError::Extraction("torrent link href".to_string()))?;
        let id = ID_REGEX
            .captures(href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| AdapterError::Extraction(format!("torrent id in '{}'", href)))?;

        let mut torrent = Torrent::new(id, backend);
        torrent.name.set(link.text().collect::<String>().trim().to_string());

        torrent.size = row
            .select(&SELECTORS.size_cell)
            .next()
            .and_then(|cell| parse_size(&cell.text().collect::<String>()))
            .into();
        torrent.seeders = cell_number(&row, &SELECTORS.seeders_cell).into();
        torrent.leechers = cell_number(&row, &SELECTORS.leechers_cell).into();

        torrents.push(torrent);
    }

    Ok(torrents)
}

/// Parses a torrent detail page into a fully-loaded torrent.
pub fn parse_torrent(body: &str, id: &str, backend: &str) -> Result<Torrent, AdapterError> {
    let doc = Html::parse_document(body);

    let title = doc
        .select(&SELECTORS.detail_title)
        .next()
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AdapterError::Extraction("torrent title".to_string()))?;

    let mut torrent = Torrent::new(id, backend);
    torrent.name.set(title);

    torrent.magnet = doc
        .select(&SELECTORS.magnet_link)
        .next()
        .and_then(|elem| elem.value().attr("href"))
        .map(str::to_string)
        .into();

    torrent.url = doc
        .select(&SELECTORS.download_link)
        .next()
        .and_then(|elem| elem.value().attr("href"))
        .map(absolutize)
        .into();

    torrent.description = doc
        .select(&SELECTORS.summary)
        .next()
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .into();

    let files: Vec<String> = doc
        .select(&SELECTORS.file_name)
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .collect();
    torrent.files = if files.is_empty() {
        Field::Empty
    } else {
        Field::Value(files)
    };

    Ok(torrent)
}

fn cell_number(row: &scraper::ElementRef, selector: &Selector) -> Option<u32> {
    row.select(selector)
        .next()
        .and_then(|cell| cell.text().collect::<String>().trim().parse().ok())
}

/// Protocol-relative download links come back as `//ka.tt/...`.
fn absolutize(href: &str) -> String {
    if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        href.to_string()
    }
}

/// Parses a human size like `723.86 MB` into bytes.
fn parse_size(text: &str) -> Option<u64> {
    let cleaned = text.replace('\u{a0}', " ");
    let mut parts = cleaned.split_whitespace();
    let number: f64 = parts.next()?.parse().ok()?;
    let unit = parts.next().unwrap_or("B");

    let factor: f64 = match unit.to_ascii_uppercase().as_str() {
        "B" => 1.0,
        "KB" => 1024.0,
        "MB" => 1024.0 * 1024.0,
        "GB" => 1024.0 * 1024.0 * 1024.0,
        "TB" => 1024.0f64.powi(4),
        _ => return None,
    };

    Some((number * factor) as u64)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const SEARCH_FIXTURE: &str = r#"
<html><body>
<table class="data">
  <tr id="torrent_1">
    <td><div class="torrentname">
      <a class="cellMainLink" href="/big-buck-bunny-1080p-t101.html">Big Buck Bunny 1080p</a>
    </div></td>
    <td class="nobr center">723.86 MB</td>
    <td class="green center">512</td>
    <td class="red lasttd center">17</td>
  </tr>
  <tr id="torrent_2">
    <td><div class="torrentname">
      <a class="cellMainLink" href="/big-buck-bunny-720p-t102.html">Big Buck Bunny 720p</a>
    </div></td>
    <td class="nobr center">1.2 GB</td>
    <td class="green center">48</td>
    <td class="red lasttd center">3</td>
  </tr>
</table>
</body></html>
"#;

    pub const TORRENT_FIXTURE: &str = r#"
<html><body>
<h1 class="novertmarg"><a>Big Buck Bunny 1080p</a></h1>
<a title="Magnet link" href="magnet:?xt=urn:btih:aaaabbbbccccdddd"></a>
<a title="Download torrent" href="//ka.tt/torrents/101.torrent"></a>
<div class="data" id="summary">Open movie, 1080p remux.</div>
<table class="torrentFileList">
  <tr><td class="torFileName">bbb_1080p.mkv</td></tr>
  <tr><td class="torFileName">bbb.nfo</td></tr>
</table>
</body></html>
"#;

    pub const TORRENT_MAGNET_ONLY_FIXTURE: &str = r#"
<html><body>
<h1 class="novertmarg"><a>Magnet Only Release</a></h1>
<a title="Magnet link" href="magnet:?xt=urn:btih:ffffeeeeddddcccc"></a>
<div class="data" id="summary"></div>
</body></html>
"#;

    #[test]
    fn test_parse_search() {
        let torrents = parse_search(SEARCH_FIXTURE, "kickass").unwrap();
        assert_eq!(torrents.len(), 2);

        let first = &torrents[0];
        assert_eq!(first.id, "big-buck-bunny-1080p-t101");
        assert_eq!(first.full_id(), "big-buck-bunny-1080p-t101@kickass");
        assert_eq!(first.name.value().unwrap(), "Big Buck Bunny 1080p");
        assert_eq!(*first.seeders.value().unwrap(), 512);
        assert_eq!(*first.leechers.value().unwrap(), 17);
        assert_eq!(*first.size.value().unwrap(), (723.86 * 1024.0 * 1024.0) as u64);
    }

    #[test]
    fn test_parse_search_without_table_is_extraction_error() {
        let err = parse_search("<html><body>maintenance</body></html>", "kickass").unwrap_err();
        assert!(matches!(err, AdapterError::Extraction(_)));
    }

    #[test]
    fn test_parse_torrent_detail() {
        let torrent = parse_torrent(TORRENT_FIXTURE, "big-buck-bunny-1080p-t101", "kickass").unwrap();
        assert_eq!(torrent.name.value().unwrap(), "Big Buck Bunny 1080p");
        assert_eq!(
            torrent.url.value().unwrap(),
            "https://ka.tt/torrents/101.torrent"
        );
        assert!(torrent.magnet.value().unwrap().starts_with("magnet:"));
        assert_eq!(torrent.description.value().unwrap(), "Open movie, 1080p remux.");
        assert_eq!(torrent.files.value().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_torrent_magnet_only() {
        let torrent = parse_torrent(TORRENT_MAGNET_ONLY_FIXTURE, "magnet-only-t7", "kickass").unwrap();
        assert!(torrent.url.is_empty());
        assert!(torrent.magnet.is_value());
        // Fetched but absent: empty, not unloaded.
        assert!(torrent.description.is_empty());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("723.86 MB"), Some((723.86 * 1024.0 * 1024.0) as u64));
        assert_eq!(parse_size("2 KB"), Some(2048));
        assert_eq!(parse_size("weird"), None);
    }
}
