//! Le Mouv' radio backend.
//!
//! The station catalog is static; only the "now playing" information
//! requires the network, read from the station's RSS ticker. What to do
//! when the ticker is malformed is a per-backend configuration choice:
//! substitute a placeholder or report an extraction error.

mod pages;

use crate::backends::Backend;
use crate::browser::{Browser, HttpTransport, Router, Transport};
use crate::capabilities::{Radio, RadioField, RadioProvider, Stream};
use crate::config::{HttpConfig, LemouvConfig, OnMissing};
use crate::error::AdapterError;
use async_trait::async_trait;
use std::sync::Arc;

const BACKEND_NAME: &str = "lemouv";
const FEED_URL: &str = "http://statique.lemouv.fr/files/rfPlayer/mouvRSS.xml";

/// Page handlers of the lemouv static server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LemouvPage {
    NowPlaying,
}

fn router() -> Router<LemouvPage> {
    Router::new().route(r".*/files/rfPlayer/mouvRSS\.xml", LemouvPage::NowPlaying)
}

/// One station of the catalog.
#[derive(Debug, Clone)]
struct Station {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    stream_title: &'static str,
    stream_url: &'static str,
}

/// Radio backend for le mouv'.
pub struct LemouvBackend {
    browser: Browser<LemouvPage>,
    stations: Vec<Station>,
    on_missing: OnMissing,
    placeholder: String,
}

impl LemouvBackend {
    pub fn new(http: &HttpConfig, config: &LemouvConfig) -> Result<Self, AdapterError> {
        let transport = HttpTransport::new(
            &http.user_agent,
            http.timeout_secs,
            http.delay_between_requests_sec,
        )?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: &LemouvConfig) -> Self {
        Self {
            browser: Browser::new(transport, router()),
            stations: vec![Station {
                id: "lemouv",
                title: "le mouv'",
                description: "le mouv', la radio musicale de Radio France",
                stream_title: "128kbits/s",
                stream_url: "http://mp3.live.tv-radio.com/lemouv/all/lemouvhautdebit.mp3",
            }],
            on_missing: config.on_missing,
            placeholder: config.placeholder.clone(),
        }
    }

    fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    fn partial_radio(&self, station: &Station) -> Radio {
        let mut radio = Radio::new(station.id, BACKEND_NAME);
        radio.title.set(station.title.to_string());
        radio.description.set(station.description.to_string());
        radio.streams.set(vec![Stream {
            title: station.stream_title.to_string(),
            url: station.stream_url.to_string(),
        }]);
        radio
    }
}

impl Backend for LemouvBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn as_radio(&self) -> Option<&dyn RadioProvider> {
        Some(self)
    }
}

#[async_trait]
impl RadioProvider for LemouvBackend {
    async fn iter_radios(&self, pattern: &str) -> Result<Vec<Radio>, AdapterError> {
        let needle = pattern.to_lowercase();
        let radios = self
            .stations
            .iter()
            .filter(|station| {
                needle.is_empty()
                    || station.title.to_lowercase().contains(&needle)
                    || station.description.to_lowercase().contains(&needle)
            })
            .map(|station| self.partial_radio(station))
            .collect();
        Ok(radios)
    }

    async fn get_radio(&self, id: &str) -> Result<Option<Radio>, AdapterError> {
        let Some(station) = self.station(id) else {
            return Ok(None);
        };

        let mut radio = self.partial_radio(station);
        self.fill_radio(&mut radio, &[RadioField::Current]).await?;
        Ok(Some(radio))
    }

    async fn fill_radio(
        &self,
        radio: &mut Radio,
        fields: &[RadioField],
    ) -> Result<(), AdapterError> {
        if fields.contains(&RadioField::Streams)
            && !radio.streams.is_loaded()
            && let Some(station) = self.station(&radio.id)
        {
            radio.streams.set(vec![Stream {
                title: station.stream_title.to_string(),
                url: station.stream_url.to_string(),
            }]);
        }

        if fields.contains(&RadioField::Current) {
            let page = self.browser.navigate(FEED_URL).await?;
            let emission =
                pages::parse_now_playing(&page.body, self.on_missing, &self.placeholder)?;
            radio.current.set(emission);
        }

        Ok(())
    }
}
