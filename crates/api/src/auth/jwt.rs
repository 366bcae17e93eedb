//! Bearer-token verification against the identity provider's key set.
//!
//! Tokens must be RS256-signed, carry a `kid` present in the provider's
//! JWKS, and have the configured issuer and audience.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};

use super::jwks::{HttpJwksFetcher, JwksCache, JwksError, JwksFetcher};

/// The only accepted signing algorithm.
pub const ACCEPTED_ALGORITHM: Algorithm = Algorithm::RS256;

/// Default number of key-set fetches allowed per minute.
pub const DEFAULT_JWKS_REQUESTS_PER_MINUTE: usize = 5;

/// Default lifetime of a cached signing key, in seconds.
pub const DEFAULT_JWKS_CACHE_MAX_AGE_SECS: u64 = 600;

/// Identity-provider settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Provider domain, e.g. `tenant.eu.auth0.com` (no scheme, no slash).
    pub domain: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Key-set fetches allowed per sliding minute.
    pub jwks_requests_per_minute: usize,
    /// How long a fetched key stays valid in the cache.
    pub jwks_cache_max_age: Duration,
}

impl AuthConfig {
    /// Expected `iss` claim: `https://{domain}/`.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    /// Key-set endpoint: `https://{domain}/.well-known/jwks.json`.
    pub fn jwks_uri(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.domain)
    }
}

/// Claims read from a verified access token.
///
/// `iss` and `aud` are checked during decoding and not kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the provider's user identifier. Machine-to-machine tokens
    /// may omit it.
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: i64,
}

/// Reasons a bearer token is refused.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Malformed token header: {0}")]
    MalformedHeader(jsonwebtoken::errors::Error),

    #[error("Unsupported signing algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("Token header has no kid")]
    MissingKid,

    #[error(transparent)]
    Key(#[from] JwksError),

    #[error("Invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// Verifies bearer tokens; shared process-wide behind an `Arc`.
pub struct TokenVerifier {
    keys: JwksCache,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier that fetches keys from the provider over HTTPS.
    pub fn from_config(config: &AuthConfig) -> Result<Self, JwksError> {
        let fetcher = HttpJwksFetcher::new(config.jwks_uri())?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Build a verifier around an arbitrary key source.
    pub fn with_fetcher(config: &AuthConfig, fetcher: Arc<dyn JwksFetcher>) -> Self {
        let mut validation = Validation::new(ACCEPTED_ALGORITHM);
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self {
            keys: JwksCache::new(
                fetcher,
                config.jwks_requests_per_minute,
                config.jwks_cache_max_age,
            ),
            validation,
        }
    }

    /// Verify signature, algorithm, issuer, audience, and expiry.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(AuthError::MalformedHeader)?;

        if header.alg != ACCEPTED_ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        let kid = header.kid.ok_or(AuthError::MissingKid)?;
        let key = self.keys.decoding_key(&kid).await?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(AuthError::Invalid)?;
        Ok(data.claims)
    }
}
