//! URL-to-page-handler routing.
//!
//! Each backend declares an ordered list of (pattern, page tag) rules.
//! The first rule whose regex matches the fetched URL decides which page
//! handler parses the document; an unmatched URL is a routing error, not
//! a silent fallback.

use regex::Regex;

/// Ordered routing table mapping URL patterns to page tags.
pub struct Router<K> {
    routes: Vec<(Regex, K)>,
}

impl<K: Copy> Router<K> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Appends a rule. Patterns are fixed per backend, so an invalid one
    /// is a programming error.
    pub fn route(mut self, pattern: &str, kind: K) -> Self {
        let regex = Regex::new(pattern).unwrap();
        self.routes.push((regex, kind));
        self
    }

    /// Returns the tag of the first matching rule.
    pub fn resolve(&self, url: &str) -> Option<K> {
        self.routes
            .iter()
            .find(|(regex, _)| regex.is_match(url))
            .map(|(_, kind)| *kind)
    }
}

impl<K: Copy> Default for Router<K> {
    fn default() -> Self {
        Self::new()
    }
}
