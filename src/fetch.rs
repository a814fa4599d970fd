//! The shared fetch capability behind every tier of the crawl.
//!
//! All page retrieval goes through a [`FetchSession`]: a reqwest client plus
//! an immutable [`SessionConfig`] describing the domain allow-list, the
//! URL-keyed disk cache, request identity rotation, and the politeness
//! delay. Each tier derives its own session handle from a base session;
//! derived sessions share the HTTP client and cache but get a fresh
//! visited-URL set, so every tier dedups its own visits independently.
//!
//! The [`Fetch`] trait is the seam between the walkers and the network:
//! production code uses [`FetchSession`], tests substitute an in-memory
//! fetcher serving fixture documents.
//!
//! # Caching
//!
//! Responses are cached on disk keyed by the percent-encoded URL. A cache
//! hit never touches the network and ignores the politeness delay. The
//! cache directory is either fixed or namespaced by the run id, depending
//! on configuration; its contents are opaque to the rest of the crawler.

use rand::{Rng, rng};
use reqwest::Client;
use reqwest::header::{REFERER, USER_AGENT};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::config::CrawlConfig;

/// Browser user agents rotated across requests.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:127.0) Gecko/20100101 Firefox/127.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:126.0) Gecko/20100101 Firefox/126.0",
];

/// Failure modes of a single fetch. Every variant is handled at the tier
/// that sees it; nothing propagates past a walker.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("domain not allowed: {0}")]
    DisallowedDomain(String),

    /// The URL was already visited on this session. Expected during
    /// recursive pagination; callers log it at debug level.
    #[error("already visited: {0}")]
    AlreadyVisited(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("cache io: {0}")]
    Cache(#[from] std::io::Error),
}

/// Document retrieval seam used by all walkers.
///
/// `fetch` returns the raw response body; callers parse it themselves and
/// drop the parsed document before the next await point. `derive` produces
/// a sibling handle for a child tier: same transport, fresh visit state.
pub trait Fetch {
    /// Retrieve the document at `url`, from cache when possible.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Derive a handle for a child tier: shared client and cache, fresh
    /// visited set.
    fn derive(&self) -> Self;
}

/// Immutable description of how a session fetches: allow-list, cache
/// location, referer, timeout, and politeness delay.
///
/// Built once per run and shared read-only by every derived session, so no
/// tier can observe another tier's mutations.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub allowed_domains: Vec<String>,
    pub cache_dir: PathBuf,
    /// Referer header sent with every request, normally the site root.
    pub referer: String,
    pub timeout: Duration,
    pub delay: Duration,
}

impl SessionConfig {
    /// Derive the session configuration for one run from the crawl config.
    pub fn for_run(config: &CrawlConfig, run_id: &str) -> Self {
        let cache_dir = if config.run_scoped_cache {
            PathBuf::from(format!("{}-{run_id}", config.cache_dir.trim_end_matches('/')))
        } else {
            PathBuf::from(&config.cache_dir)
        };
        Self {
            allowed_domains: config.allowed_domains.clone(),
            cache_dir,
            referer: config.base_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

/// A cached, domain-restricted fetch session.
pub struct FetchSession {
    config: Arc<SessionConfig>,
    client: Client,
    visited: Arc<Mutex<HashSet<String>>>,
}

impl FetchSession {
    /// Build the base session for a run. Creates the cache directory
    /// eagerly so later cache writes only fail for transient reasons.
    pub fn new(config: SessionConfig) -> Result<Self, FetchError> {
        std::fs::create_dir_all(&config.cache_dir)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout / 2)
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            client,
            visited: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    fn check_domain(&self, url: &Url) -> Result<(), FetchError> {
        // An empty allow-list permits any host.
        if self.config.allowed_domains.is_empty() {
            return Ok(());
        }
        let host = url.host_str().unwrap_or_default();
        if self.config.allowed_domains.iter().any(|d| d == host) {
            Ok(())
        } else {
            Err(FetchError::DisallowedDomain(host.to_string()))
        }
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        self.config.cache_dir.join(urlencoding::encode(url).as_ref())
    }
}

impl Fetch for FetchSession {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url)?;
        self.check_domain(&parsed)?;

        {
            let mut visited = self.visited.lock().await;
            if !visited.insert(url.to_string()) {
                return Err(FetchError::AlreadyVisited(url.to_string()));
            }
        }

        let cache_path = self.cache_path(url);
        match tokio::fs::read_to_string(&cache_path).await {
            Ok(body) => {
                debug!(%url, "Cache hit");
                return Ok(body);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(%url, error = %e, "Cache read failed; refetching"),
        }

        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }

        let ua = USER_AGENTS[rng().random_range(0..USER_AGENTS.len())];
        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, ua)
            .header(REFERER, &self.config.referer)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        if let Err(e) = tokio::fs::write(&cache_path, &body).await {
            warn!(%url, error = %e, "Cache write failed");
        }
        Ok(body)
    }

    fn derive(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            client: self.client.clone(),
            visited: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`Fetch`] implementation serving fixture documents.

    use super::{Fetch, FetchError};
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// Serves canned bodies by exact URL and records every request, so tests
    /// can assert on dispatch counts and URL shapes. Unknown URLs yield a
    /// 404-shaped [`FetchError::Status`]. Mirrors the session's visited-URL
    /// dedup: a repeat fetch on the same handle is `AlreadyVisited`, and
    /// `derive` resets the visited set.
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: Arc<HashMap<String, String>>,
        requests: Arc<Mutex<Vec<String>>>,
        visited: Arc<Mutex<HashSet<String>>>,
    }

    impl StaticFetcher {
        pub fn new<I, K, V>(pages: I) -> Self
        where
            I: IntoIterator<Item = (K, V)>,
            K: Into<String>,
            V: Into<String>,
        {
            Self {
                pages: Arc::new(
                    pages
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into()))
                        .collect(),
                ),
                requests: Arc::new(Mutex::new(Vec::new())),
                visited: Arc::new(Mutex::new(HashSet::new())),
            }
        }

        /// Every URL requested so far, in arrival order, across all derived
        /// handles.
        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Fetch for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            if !self.visited.lock().unwrap().insert(url.to_string()) {
                return Err(FetchError::AlreadyVisited(url.to_string()));
            }
            self.requests.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(body) => Ok(body.clone()),
                None => Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }

        fn derive(&self) -> Self {
            Self {
                pages: Arc::clone(&self.pages),
                requests: Arc::clone(&self.requests),
                visited: Arc::new(Mutex::new(HashSet::new())),
            }
        }
    }
}
