//! Extractors whose rejections render through [`AppError`].
//!
//! Use these in place of `axum::Json` and `axum::extract::Path` so malformed
//! bodies and path segments answer with the same `{error, code}` body as
//! every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
