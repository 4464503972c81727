//! REST API client module for the EyePredict authentication service.
//!
//! This module provides the `AuthClient` for the two unauthenticated
//! endpoints under the configured base:
//!
//! - `POST {base}/register` with a JSON body
//! - `POST {base}/token` with a URL-encoded OAuth2 password form

pub mod client;
pub mod error;

pub use client::AuthClient;
pub use error::ApiError;
