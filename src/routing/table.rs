//! Route table mapping leading path segments to upstream bases.
//!
//! # Responsibilities
//! - Validate route keys and upstream base URLs at construction
//! - Resolve an inbound path to its upstream URL by exact first-segment
//!   match
//!
//! # Design Decisions
//! - The table is immutable once built; changes require a rebuild
//! - Matching is exact on the whole first segment, never a prefix of it
//! - Upstream URLs are composed by verbatim concatenation of the stored
//!   base and the remainder, query string included; the base is
//!   validated with the url crate but stored as written so the
//!   composition never re-normalizes anything
//! - Deterministic: same path always resolves to the same target

use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// One registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// First path segment this route claims, without slashes.
    pub key: String,

    /// Upstream base URL, stored exactly as configured.
    pub upstream: String,
}

/// Error building a route table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route key must not be empty")]
    EmptyKey,

    #[error("route key {key:?} must not contain '/' or '?'")]
    InvalidKey { key: String },

    #[error("route {key:?}: upstream url {url:?} is invalid: {source}")]
    InvalidUpstream {
        key: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("route {key:?}: upstream scheme {scheme:?} is not http or https")]
    UnsupportedScheme { key: String, scheme: String },
}

/// A resolved upstream target for one inbound path.
#[derive(Debug, PartialEq, Eq)]
pub struct ResolvedTarget<'a> {
    /// Key of the matching route.
    pub key: &'a str,

    /// Full upstream URL for this request.
    pub upstream_url: String,
}

/// Immutable registry of first-segment routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, RouteEntry>,
}

impl RouteTable {
    /// Build a table from key/upstream pairs, validating each route.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut routes = BTreeMap::new();
        for (key, upstream) in pairs {
            let key = key.into();
            let upstream = upstream.into();
            check_route(&key, &upstream)?;
            tracing::info!(route = %key, upstream = %upstream, "Route registered");
            routes.insert(key.clone(), RouteEntry { key, upstream });
        }
        Ok(Self { routes })
    }

    /// Build a table from the `[routes]` section of the configuration.
    pub fn from_config(routes: &BTreeMap<String, String>) -> Result<Self, RouteError> {
        Self::from_pairs(routes.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Resolve a path (with optional query) against the table.
    ///
    /// The first path segment must equal a registered key exactly; a key
    /// never matches as a prefix of a longer segment. Returns `None` for
    /// the root path and for unknown segments.
    pub fn resolve(&self, path_and_query: &str) -> Option<ResolvedTarget<'_>> {
        let trimmed = path_and_query.strip_prefix('/')?;
        let segment_end = trimmed.find(['/', '?']).unwrap_or(trimmed.len());
        let (segment, remainder) = trimmed.split_at(segment_end);
        if segment.is_empty() {
            return None;
        }

        let entry = self.routes.get(segment)?;
        Some(ResolvedTarget {
            key: &entry.key,
            upstream_url: format!("{}{}", entry.upstream, remainder),
        })
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over registered routes in key order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.values()
    }
}

/// Validate one route definition. Shared between table construction and
/// config validation.
pub(crate) fn check_route(key: &str, upstream: &str) -> Result<(), RouteError> {
    if key.is_empty() {
        return Err(RouteError::EmptyKey);
    }
    if key.contains(['/', '?']) {
        return Err(RouteError::InvalidKey {
            key: key.to_string(),
        });
    }

    let parsed = Url::parse(upstream).map_err(|source| RouteError::InvalidUpstream {
        key: key.to_string(),
        url: upstream.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(RouteError::UnsupportedScheme {
            key: key.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }

    Ok(())
}
