//! Attilasub subtitle site backend.
//!
//! Anonymous site serving subtitles as `.rar` archives. Search result
//! rows mix real download links with promotional links, so the handler
//! keeps only rows whose download target has the site's archive suffix.

mod pages;

use crate::backends::Backend;
use crate::browser::{Browser, HttpTransport, Router, Transport};
use crate::capabilities::{Subtitle, SubtitleProvider};
use crate::config::HttpConfig;
use crate::error::AdapterError;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

const BACKEND_NAME: &str = "attilasub";
const BASE_URL: &str = "http://www.attilasub.net";

/// File extension every direct download on this site uses.
pub const ARCHIVE_SUFFIX: &str = ".rar";

/// Page handlers of the attilasub site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttilasubPage {
    Search,
    Subtitle,
}

fn router() -> Router<AttilasubPage> {
    Router::new()
        .route(
            r"http://www\.attilasub\.net/engine/search\.php.*",
            AttilasubPage::Search,
        )
        .route(
            r"http://www\.attilasub\.net/subtitle/.*\.html",
            AttilasubPage::Subtitle,
        )
}

/// Subtitle site backend.
pub struct AttilasubBackend {
    browser: Browser<AttilasubPage>,
}

impl AttilasubBackend {
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

    fn search_url(language: &str, pattern: &str) -> Result<String, AdapterError> {
        let mut url = Url::parse(&format!("{}/engine/search.php", BASE_URL))
            .map_err(|e| AdapterError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("lang", language)
            .append_pair("query", pattern);
        Ok(url.to_string())
    }
}

impl Backend for AttilasubBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn as_subtitle(&self) -> Option<&dyn SubtitleProvider> {
        Some(self)
    }
}

#[async_trait]
impl SubtitleProvider for AttilasubBackend {
    async fn iter_subtitles(
        &self,
        language: &str,
        pattern: &str,
    ) -> Result<Vec<Subtitle>, AdapterError> {
        let page = self
            .browser
            .navigate(&Self::search_url(language, pattern)?)
            .await?;
        pages::parse_search(&page.body, language, BACKEND_NAME)
    }

    async fn get_subtitle(&self, id: &str) -> Result<Option<Subtitle>, AdapterError> {
        let url = format!("{}/subtitle/{}.html", BASE_URL, id);
        let page = match self.browser.navigate(&url).await {
            Ok(page) => page,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        pages::parse_subtitle(&page.body, id, BACKEND_NAME).map(Some)
    }

    async fn get_subtitle_file(&self, id: &str) -> Result<Vec<u8>, AdapterError> {
        let subtitle = self
            .get_subtitle(id)
            .await?
            .ok_or_else(|| AdapterError::NotFound(id.to_string()))?;

        let url = subtitle
            .url
            .value()
            .ok_or_else(|| AdapterError::Unsupported(format!("no download for subtitle {}", id)))?;
        self.browser.fetch_raw(url).await
    }
}
