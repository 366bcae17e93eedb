//! Request interceptors.
//!
//! - [`auth::require_auth`] -- rejects requests without a valid bearer token.
//! - [`auth::AuthUser`] -- extractor for the verified caller.

pub mod auth;
