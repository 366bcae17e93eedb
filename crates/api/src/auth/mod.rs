//! Authentication primitives.
//!
//! - [`jwks`] -- cached, rate-limited retrieval of the provider's signing keys.
//! - [`jwt`] -- RS256 bearer-token verification (issuer, audience, expiry).

pub mod jwks;
pub mod jwt;
