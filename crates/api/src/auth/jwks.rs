//! Remote JSON Web Key Set retrieval with caching and rate limiting.
//!
//! Keys are fetched from the identity provider's
//! `https://{domain}/.well-known/jwks.json` endpoint and cached by `kid`.
//! A cache miss triggers a refetch, but no more than a fixed number of
//! fetches may happen in any sliding one-minute window. While that budget is
//! spent, an expired key that is still held keeps being served.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet, PublicKeyUse};
use jsonwebtoken::DecodingKey;
use tokio::sync::{Mutex, RwLock};

/// Timeout for a single key-set HTTP request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Length of the rate-limit window.
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Errors raised while resolving a signing key.
#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    /// The HTTP request to the key-set endpoint failed.
    #[error("JWKS request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The key set could not be obtained for a non-HTTP reason.
    #[error("JWKS fetch failed: {0}")]
    Fetch(String),

    /// The per-minute fetch budget is exhausted.
    #[error("JWKS fetch rate limit exceeded")]
    RateLimited,

    /// The freshly fetched key set has no usable key with this `kid`.
    #[error("No signing key found for kid '{0}'")]
    KeyNotFound(String),
}

// ---------------------------------------------------------------------------
// Fetchers
// ---------------------------------------------------------------------------

/// Source of the identity provider's key set.
#[async_trait]
pub trait JwksFetcher: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, JwksError>;
}

/// Fetches the key set over HTTPS.
pub struct HttpJwksFetcher {
    client: reqwest::Client,
    uri: String,
}

impl HttpJwksFetcher {
    pub fn new(uri: String) -> Result<Self, JwksError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { client, uri })
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        tracing::debug!(uri = %self.uri, "Fetching JWKS");
        let set = self
            .client
            .get(&self.uri)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;
        Ok(set)
    }
}

/// Serves a fixed key set without network access.
///
/// Counts how many times it was asked, which lets callers observe cache hits.
pub struct StaticJwksFetcher {
    set: JwkSet,
    calls: AtomicUsize,
}

impl StaticJwksFetcher {
    pub fn new(set: JwkSet) -> Self {
        Self {
            set,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times [`JwksFetcher::fetch`] has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JwksFetcher for StaticJwksFetcher {
    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.set.clone())
    }
}

// ---------------------------------------------------------------------------
// Rate limiter
// ---------------------------------------------------------------------------

/// Sliding-window limiter: at most `max_per_window` acquisitions per window.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: usize,
    window: Duration,
    recent: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_per_window: usize, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            recent: VecDeque::with_capacity(max_per_window),
        }
    }

    /// Record an acquisition at `now` if the budget allows it.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        while let Some(&oldest) = self.recent.front() {
            if now.duration_since(oldest) >= self.window {
                self.recent.pop_front();
            } else {
                break;
            }
        }

        if self.recent.len() < self.max_per_window {
            self.recent.push_back(now);
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

struct CachedKey {
    key: DecodingKey,
    fetched_at: Instant,
}

/// Process-wide cache of decoding keys indexed by `kid`.
pub struct JwksCache {
    fetcher: Arc<dyn JwksFetcher>,
    keys: RwLock<HashMap<String, CachedKey>>,
    /// Also serializes refetches so concurrent misses share one request.
    limiter: Mutex<RateLimiter>,
    max_age: Duration,
}

impl JwksCache {
    pub fn new(fetcher: Arc<dyn JwksFetcher>, requests_per_minute: usize, max_age: Duration) -> Self {
        Self {
            fetcher,
            keys: RwLock::new(HashMap::new()),
            limiter: Mutex::new(RateLimiter::new(requests_per_minute, RATE_WINDOW)),
            max_age,
        }
    }

    /// Resolve the decoding key for `kid`, refetching the key set on a miss.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        if let Some(key) = self.cached(kid).await {
            return Ok(key);
        }

        let mut limiter = self.limiter.lock().await;

        // Another request may have refreshed the set while we waited.
        if let Some(key) = self.cached(kid).await {
            return Ok(key);
        }

        if !limiter.try_acquire(Instant::now()) {
            if let Some(key) = self.stale(kid).await {
                tracing::warn!(kid, "JWKS refetch rate limited; serving expired key");
                return Ok(key);
            }
            tracing::warn!(kid, "JWKS refetch suppressed by rate limit");
            return Err(JwksError::RateLimited);
        }

        let set = self.fetcher.fetch().await?;
        let fetched_at = Instant::now();
        let fresh = signing_keys(&set);
        tracing::info!(count = fresh.len(), "JWKS refreshed");

        let mut keys = self.keys.write().await;
        keys.clear();
        for (id, key) in fresh {
            keys.insert(id, CachedKey { key, fetched_at });
        }

        keys.get(kid)
            .map(|cached| cached.key.clone())
            .ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    async fn cached(&self, kid: &str) -> Option<DecodingKey> {
        let keys = self.keys.read().await;
        keys.get(kid)
            .filter(|cached| cached.fetched_at.elapsed() < self.max_age)
            .map(|cached| cached.key.clone())
    }

    /// A previously fetched key for `kid`, however old.
    async fn stale(&self, kid: &str) -> Option<DecodingKey> {
        self.keys.read().await.get(kid).map(|cached| cached.key.clone())
    }
}

/// Extract RSA signing keys that carry a `kid`.
///
/// Keys marked for encryption, non-RSA keys, and keys that fail to decode
/// are skipped.
fn signing_keys(set: &JwkSet) -> Vec<(String, DecodingKey)> {
    set.keys
        .iter()
        .filter(|jwk| {
            matches!(jwk.algorithm, AlgorithmParameters::RSA(_))
                && matches!(
                    jwk.common.public_key_use,
                    None | Some(PublicKeyUse::Signature)
                )
        })
        .filter_map(|jwk| {
            let kid = jwk.common.key_id.clone()?;
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(e) => {
                    tracing::warn!(kid, error = %e, "Skipping undecodable JWK");
                    None
                }
            }
        })
        .collect()
}
