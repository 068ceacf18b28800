//! Kickass torrent indexer backend (ka.tt).
//!
//! Anonymous site: search results sorted by seeders, one detail page per
//! torrent. Some torrents only carry a magnet reference, in which case a
//! file download reports the magnet instead.

mod pages;

use crate::backends::Backend;
use crate::browser::{Browser, HttpTransport, Router, Transport};
use crate::capabilities::{Torrent, TorrentProvider};
use crate::config::HttpConfig;
use crate::error::AdapterError;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

const BACKEND_NAME: &str = "kickass";
const BASE_URL: &str = "https://ka.tt";

/// Page handlers of the kickass site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickassPage {
    Search,
    Torrent,
}

fn router() -> Router<KickassPage> {
    Router::new()
        .route(r"https://ka\.tt/usearch/.*", KickassPage::Search)
        .route(r"https://ka\.tt/.*\.html", KickassPage::Torrent)
}

/// Torrent indexer backend.
pub struct KickassBackend {
    browser: Browser<KickassPage>,
}

impl KickassBackend {
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
        // The parser percent-encodes the pattern as a path segment.
        let url = Url::parse(&format!(
            "{}/usearch/{}/?field=seeders&sorder=desc",
            BASE_URL, pattern
        ))
        .map_err(|e| AdapterError::InvalidUrl(e.to_string()))?;
        Ok(url.to_string())
    }
}

impl Backend for KickassBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn as_torrent(&self) -> Option<&dyn TorrentProvider> {
        Some(self)
    }
}

#[async_trait]
impl TorrentProvider for KickassBackend {
    async fn iter_torrents(&self, pattern: &str) -> Result<Vec<Torrent>, AdapterError> {
        let page = self.browser.navigate(&Self::search_url(pattern)?).await?;
        pages::parse_search(&page.body, BACKEND_NAME)
    }

    async fn get_torrent(&self, id: &str) -> Result<Option<Torrent>, AdapterError> {
        let url = format!("{}/{}.html", BASE_URL, id);
        let page = match self.browser.navigate(&url).await {
            Ok(page) => page,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        pages::parse_torrent(&page.body, id, BACKEND_NAME).map(Some)
    }

    async fn get_torrent_file(&self, id: &str) -> Result<Vec<u8>, AdapterError> {
        let torrent = self
            .get_torrent(id)
            .await?
            .ok_or_else(|| AdapterError::NotFound(id.to_string()))?;

        if let Some(url) = torrent.url.value() {
            return self.browser.fetch_raw(url).await;
        }

        if let Some(magnet) = torrent.magnet.value() {
            return Err(AdapterError::MagnetOnly {
                magnet: magnet.clone(),
            });
        }

        Err(AdapterError::Unsupported(format!(
            "no download link for torrent {}",
            id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::pages::tests::{SEARCH_FIXTURE, TORRENT_MAGNET_ONLY_FIXTURE};
    use super::*;
    use crate::browser::testing::{ScriptedTransport, page, status};

    #[tokio::test]
    async fn test_iter_torrents_leaves_detail_fields_unloaded() {
        let url = "https://ka.tt/usearch/big%20buck/?field=seeders&sorder=desc";
        let transport = ScriptedTransport::new().on(url, page(url, SEARCH_FIXTURE));
        let backend = KickassBackend::with_transport(Arc::new(transport));

        let torrents = backend.iter_torrents("big buck").await.unwrap();
        assert_eq!(torrents.len(), 2);

        for torrent in &torrents {
            assert!(torrent.name.is_value());
            // Detail-only fields must stay unloaded until a detail fetch.
            assert!(!torrent.description.is_loaded());
            assert!(!torrent.files.is_loaded());
        }
    }

    #[tokio::test]
    async fn test_get_torrent_missing_id_yields_none() {
        let url = "https://ka.tt/gone-t99.html";
        let transport = ScriptedTransport::new().on(url, status(url, 404));
        let backend = KickassBackend::with_transport(Arc::new(transport));

        assert!(backend.get_torrent("gone-t99").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_torrent_file_magnet_only() {
        let url = "https://ka.tt/magnet-only-t7.html";
        let transport =
            ScriptedTransport::new().on(url, page(url, TORRENT_MAGNET_ONLY_FIXTURE));
        let backend = KickassBackend::with_transport(Arc::new(transport));

        let err = backend.get_torrent_file("magnet-only-t7").await.unwrap_err();
        match err {
            AdapterError::MagnetOnly { magnet } => {
                assert!(magnet.starts_with("magnet:?xt=urn:btih:"));
            }
            other => panic!("expected MagnetOnly, got {other:?}"),
        }
    }
}
