//! Generic site-browsing core shared by all backends.
//!
//! A [`Browser`] owns one backend's HTTP transport, its URL routing table,
//! and its session state (login flag plus the last routed page). Backends
//! layer their site-specific navigation on top: fetch a resource, let the
//! router pick the page handler for the URL that came back, and parse.

mod router;
mod transport;

pub use router::Router;
pub use transport::{
    DEFAULT_USER_AGENT, HttpTransport, Method, Transport, TransportRequest, TransportResponse,
};

use crate::error::AdapterError;
use std::sync::{Arc, Mutex, MutexGuard};

/// Upper bound on pages followed in one listing call.
pub const MAX_PAGES: u32 = 100;

/// One fetched document, tagged with the page handler that owns it.
#[derive(Debug, Clone)]
pub struct Page<K> {
    pub kind: K,
    pub url: String,
    pub body: String,
}

#[derive(Debug)]
struct SessionState<K> {
    logged_in: bool,
    current: Option<Page<K>>,
}

/// Per-backend session: transport, routing table, login state, last page.
pub struct Browser<K> {
    transport: Arc<dyn Transport>,
    router: Router<K>,
    state: Mutex<SessionState<K>>,
}

impl<K: Copy + Eq> Browser<K> {
    /// Creates a browser in the logged-out state.
    pub fn new(transport: Arc<dyn Transport>, router: Router<K>) -> Self {
        Self {
            transport,
            router,
            state: Mutex::new(SessionState {
                logged_in: false,
                current: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState<K>> {
        self.state.lock().expect("session state lock poisoned")
    }

    /// Fetches a resource and routes the resulting URL to a page handler.
    pub async fn navigate(&self, url: &str) -> Result<Page<K>, AdapterError> {
        let response = self
            .transport
            .execute(&TransportRequest::get(url))
            .await?;
        self.accept(response)
    }

    /// Submits a form and routes the resulting URL like [`navigate`].
    ///
    /// [`navigate`]: Browser::navigate
    pub async fn submit_form(
        &self,
        url: &str,
        form: Vec<(String, String)>,
    ) -> Result<Page<K>, AdapterError> {
        let response = self
            .transport
            .execute(&TransportRequest::post_form(url, form))
            .await?;
        self.accept(response)
    }

    /// Fetches raw bytes without routing, for file downloads.
    pub async fn fetch_raw(&self, url: &str) -> Result<Vec<u8>, AdapterError> {
        let response = self
            .transport
            .execute(&TransportRequest::get(url))
            .await?;
        check_status(&response)?;
        Ok(response.body)
    }

    fn accept(&self, response: TransportResponse) -> Result<Page<K>, AdapterError> {
        check_status(&response)?;

        let kind = self
            .router
            .resolve(&response.final_url)
            .ok_or(AdapterError::UnroutableResponse {
                url: response.final_url.clone(),
            })?;

        let body = response.text();
        let page = Page {
            kind,
            url: response.final_url,
            body,
        };
        self.state().current = Some(page.clone());
        Ok(page)
    }

    /// Tests which page handler owns the last fetched document.
    pub fn is_on(&self, kind: K) -> bool {
        self.state()
            .current
            .as_ref()
            .is_some_and(|page| page.kind == kind)
    }

    /// Returns a copy of the last routed page.
    pub fn current(&self) -> Option<Page<K>> {
        self.state().current.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state().logged_in
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.state().logged_in = logged_in;
    }
}

fn check_status(response: &TransportResponse) -> Result<(), AdapterError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(AdapterError::NotFound(response.final_url.clone())),
        status => Err(AdapterError::Status {
            status,
            url: response.final_url.clone(),
        }),
    }
}

/// Follows "next page" links supplied by a page handler until none remain.
///
/// The extractor maps one routed page to its records plus the next URL.
/// The loop stops when the handler reports no next link, even when the
/// last page yielded zero records, and never follows more than
/// [`MAX_PAGES`] pages.
pub async fn paginate<K, T, F>(
    browser: &Browser<K>,
    start_url: String,
    mut extract: F,
) -> Result<Vec<T>, AdapterError>
where
    K: Copy + Eq,
    F: FnMut(&Page<K>) -> Result<(Vec<T>, Option<String>), AdapterError>,
{
    let mut records = Vec::new();
    let mut next = Some(start_url);
    let mut pages = 0u32;

    while let Some(url) = next {
        pages += 1;
        if pages > MAX_PAGES {
            break;
        }

        let page = browser.navigate(&url).await?;
        let (batch, following) = extract(&page)?;
        records.extend(batch);
        next = following;
    }

    Ok(records)
}


#[cfg(test)]
mod tests {
    use super::testing::{ScriptedTransport, page, status};
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        List,
        Item,
    }

    fn router() -> Router<Tag> {
        Router::new()
            .route(r"https://site\.test/list.*", Tag::List)
            .route(r"https://site\.test/item/.*", Tag::Item)
    }

    #[tokio::test]
    async fn test_navigate_routes_and_tracks_current_page() {
        let transport = ScriptedTransport::new()
            .on("https://site.test/list", page("https://site.test/list", "<html></html>"));
        let browser = Browser::new(Arc::new(transport), router());

        assert!(!browser.is_on(Tag::List));
        let page = browser.navigate("https://site.test/list").await.unwrap();
        assert_eq!(page.kind, Tag::List);
        assert!(browser.is_on(Tag::List));
        assert!(!browser.is_on(Tag::Item));
    }

    #[tokio::test]
    async fn test_navigate_unrouted_url_fails() {
        let transport = ScriptedTransport::new()
            .on("https://site.test/other", page("https://site.test/other", ""));
        let browser = Browser::new(Arc::new(transport), router());

        let err = browser.navigate("https://site.test/other").await.unwrap_err();
        assert!(matches!(err, AdapterError::UnroutableResponse { .. }));
        // A routing failure must not overwrite the current page.
        assert!(browser.current().is_none());
    }

    #[tokio::test]
    async fn test_navigate_maps_404_to_not_found() {
        let transport = ScriptedTransport::new()
            .on("https://site.test/item/9", status("https://site.test/item/9", 404));
        let browser = Browser::new(Arc::new(transport), router());

        let err = browser.navigate("https://site.test/item/9").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_paginate_follows_next_links() {
        let transport = ScriptedTransport::new()
            .on("https://site.test/list?p=1", page("https://site.test/list?p=1", "a b"))
            .on("https://site.test/list?p=2", page("https://site.test/list?p=2", "c"));
        let browser = Browser::new(Arc::new(transport), router());

        let records = paginate(&browser, "https://site.test/list?p=1".to_string(), |page| {
            let words: Vec<String> = page.body.split_whitespace().map(str::to_string).collect();
            let next = if page.url.ends_with("p=1") {
                Some("https://site.test/list?p=2".to_string())
            } else {
                None
            };
            Ok((words, next))
        })
        .await
        .unwrap();

        assert_eq!(records, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_paginate_terminates_on_empty_last_page() {
        let transport = ScriptedTransport::new()
            .on("https://site.test/list?p=1", page("https://site.test/list?p=1", "a"))
            .on("https://site.test/list?p=2", page("https://site.test/list?p=2", ""));
        let browser = Browser::new(Arc::new(transport), router());

        let records = paginate(&browser, "https://site.test/list?p=1".to_string(), |page| {
            let words: Vec<String> = page.body.split_whitespace().map(str::to_string).collect();
            let next = if page.url.ends_with("p=1") {
                Some("https://site.test/list?p=2".to_string())
            } else {
                None
            };
            Ok((words, next))
        })
        .await
        .unwrap();

        // The empty second page still terminates the loop cleanly.
        assert_eq!(records, vec!["a"]);
    }

    #[tokio::test]
    async fn test_login_state_transitions() {
        let transport = ScriptedTransport::new();
        let browser = Browser::new(Arc::new(transport), router());

        assert!(!browser.is_logged_in());
        browser.set_logged_in(true);
        assert!(browser.is_logged_in());
        browser.set_logged_in(false);
        assert!(!browser.is_logged_in());
    }
}
