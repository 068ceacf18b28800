//! Site backends and the registry the front-end dispatches through.
//!
//! Each backend owns its own session (transport, cookies, login state)
//! and exposes the capability views it supports. The registry builds the
//! enabled backends from configuration; the fan-out helper issues one
//! logical request to every backend supporting a capability and collects
//! per-backend results and errors without aborting the others.

mod adopteunmec;
mod attilasub;
mod cinesift;
mod coopanet;
mod kickass;
mod lemouv;
mod sevenfiftygrams;

pub use adopteunmec::AdopteunmecBackend;
pub use attilasub::AttilasubBackend;
pub use cinesift::CinesiftBackend;
pub use coopanet::CoopanetBackend;
pub use kickass::KickassBackend;
pub use lemouv::LemouvBackend;
pub use sevenfiftygrams::SevenFiftyGramsBackend;

use crate::capabilities::{
    BankProvider, ChatProvider, CinemaProvider, RadioProvider, RecipeProvider, SubtitleProvider,
    TorrentProvider,
};
use crate::config::Config;
use crate::error::AdapterError;
use futures::future::BoxFuture;
use std::sync::Arc;

/// A loaded site backend and the capability views it offers.
///
/// Capability accessors default to `None`; a backend overrides the ones
/// it implements. No state is shared between backends.
pub trait Backend: Send + Sync {
    /// Identifier used in `id@backend` and configuration sections.
    fn name(&self) -> &'static str;

    fn as_bank(&self) -> Option<&dyn BankProvider> {
        None
    }

    fn as_torrent(&self) -> Option<&dyn TorrentProvider> {
        None
    }

    fn as_subtitle(&self) -> Option<&dyn SubtitleProvider> {
        None
    }

    fn as_recipe(&self) -> Option<&dyn RecipeProvider> {
        None
    }

    fn as_radio(&self) -> Option<&dyn RadioProvider> {
        None
    }

    fn as_cinema(&self) -> Option<&dyn CinemaProvider> {
        None
    }

    fn as_chat(&self) -> Option<&dyn ChatProvider> {
        None
    }
}

/// Registry of loaded backends.
pub struct BackendRegistry {
    backends: Vec<Arc<dyn Backend>>,
}

impl BackendRegistry {
    /// Builds every backend enabled in the configuration.
    pub fn from_config(config: &Config) -> Result<Self, AdapterError> {
        let mut backends: Vec<Arc<dyn Backend>> = Vec::new();

        if config.backends.coopanet.enabled {
            backends.push(Arc::new(CoopanetBackend::new(
                &config.http,
                &config.backends.coopanet,
            )?));
        }
        if config.backends.kickass.enabled {
            backends.push(Arc::new(KickassBackend::new(&config.http)?));
        }
        if config.backends.attilasub.enabled {
            backends.push(Arc::new(AttilasubBackend::new(&config.http)?));
        }
        if config.backends.sevenfiftygrams.enabled {
            backends.push(Arc::new(SevenFiftyGramsBackend::new(&config.http)?));
        }
        if config.backends.lemouv.enabled {
            backends.push(Arc::new(LemouvBackend::new(
                &config.http,
                &config.backends.lemouv,
            )?));
        }
        if config.backends.cinesift.enabled {
            backends.push(Arc::new(CinesiftBackend::new(&config.http)?));
        }
        if config.backends.adopteunmec.enabled {
            backends.push(Arc::new(AdopteunmecBackend::new(
                &config.http,
                &config.backends.adopteunmec,
            )?));
        }

        Ok(Self { backends })
    }

    #[cfg(test)]
    pub fn from_backends(backends: Vec<Arc<dyn Backend>>) -> Self {
        Self { backends }
    }

    pub fn all(&self) -> &[Arc<dyn Backend>] {
        &self.backends
    }

    pub fn find(&self, name: &str) -> Option<&Arc<dyn Backend>> {
        self.backends.iter().find(|b| b.name() == name)
    }

    /// Backends to address: all of them, or just the named one.
    pub fn select(&self, only: Option<&str>) -> Vec<Arc<dyn Backend>> {
        match only {
            Some(name) => self.find(name).cloned().into_iter().collect(),
            None => self.backends.clone(),
        }
    }
}

/// Issues one logical request to every selected backend supporting a
/// capability, concurrently, and collects per-backend outcomes.
///
/// `select` picks the capability view; backends without it are skipped.
/// Errors are returned alongside successes so the caller can report each
/// backend's failure and keep going.
pub async fn fan_out<'a, P, R>(
    backends: &'a [Arc<dyn Backend>],
    select: impl Fn(&'a dyn Backend) -> Option<&'a P>,
    call: impl Fn(&'a P) -> BoxFuture<'a, Result<R, AdapterError>>,
) -> Vec<(&'static str, Result<R, AdapterError>)>
where
    P: ?Sized + 'a,
{
    let mut tasks = Vec::new();
    for backend in backends {
        let backend = backend.as_ref();
        if let Some(provider) = select(backend) {
            let name = backend.name();
            let fut = call(provider);
            tasks.push(async move { (name, fut.await) });
        }
    }

    futures::future::join_all(tasks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{Radio, RadioField, RadioProvider};
    use async_trait::async_trait;

    struct FakeRadioBackend {
        name: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl RadioProvider for FakeRadioBackend {
        async fn iter_radios(&self, _pattern: &str) -> Result<Vec<Radio>, AdapterError> {
            if self.fail {
                return Err(AdapterError::Extraction("layout changed".to_string()));
            }
            Ok(vec![Radio::new("station", self.name)])
        }

        async fn get_radio(&self, _id: &str) -> Result<Option<Radio>, AdapterError> {
            Ok(None)
        }

        async fn fill_radio(
            &self,
            _radio: &mut Radio,
            _fields: &[RadioField],
        ) -> Result<(), AdapterError> {
            Ok(())
        }
    }

    impl Backend for FakeRadioBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        fn as_radio(&self) -> Option<&dyn RadioProvider> {
            Some(self)
        }
    }

    struct NoCapabilityBackend;

    impl Backend for NoCapabilityBackend {
        fn name(&self) -> &'static str {
            "bare"
        }
    }

    #[tokio::test]
    async fn test_fan_out_collects_partial_failures() {
        let backends: Vec<Arc<dyn Backend>> = vec![
            Arc::new(FakeRadioBackend {
                name: "good",
                fail: false,
            }),
            Arc::new(FakeRadioBackend {
                name: "broken",
                fail: true,
            }),
            Arc::new(NoCapabilityBackend),
        ];

        let results = fan_out(
            &backends,
            |b| b.as_radio(),
            |p| p.iter_radios("fip"),
        )
        .await;

        // The capability-less backend is skipped, the broken one reports
        // its error without stopping the good one.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "good");
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, "broken");
        assert!(results[1].1.is_err());
    }

    #[tokio::test]
    async fn test_registry_select() {
        let registry = BackendRegistry::from_backends(vec![
            Arc::new(FakeRadioBackend {
                name: "good",
                fail: false,
            }),
            Arc::new(NoCapabilityBackend),
        ]);

        assert_eq!(registry.select(None).len(), 2);
        assert_eq!(registry.select(Some("bare")).len(), 1);
        assert!(registry.select(Some("missing")).is_empty());
        assert!(registry.find("good").is_some());
    }
}
