//! Data models for the authentication exchange.
//!
//! - `Credentials`: trimmed email/password pair extracted per submission
//! - `AuthResponse`: status class plus parsed JSON body of one request
//! - `TokenGrant`, `UserRecord`: typed views of the backend's success bodies

pub mod credentials;
pub mod response;

pub use credentials::Credentials;
pub use response::{AuthResponse, TokenGrant, UserRecord};
