//! Core library for authforms.
//!
//! Wires registration and login forms to the EyePredict authentication API:
//!
//! - `api`: `AuthClient` for the `/register` and `/token` endpoints
//! - `fields`: credential extraction from named input fields
//! - `presenter`: per-form status regions with auto-hiding messages
//! - `controller`: the submission cycle tying the pieces together
//! - `storage`: durable key-value storage for the session token
//!
//! The host (a terminal UI, a prompt, a test) is only seen through the
//! `FieldSource`, `PageForms` and `Navigator` traits.

pub mod api;
pub mod config;
pub mod controller;
pub mod fields;
pub mod forms;
pub mod models;
pub mod presenter;
pub mod storage;

pub use api::{ApiError, AuthClient};
pub use config::Config;
pub use controller::{bind_forms, Navigator, PageForms, Services, SubmissionController, SubmitOutcome};
pub use fields::{extract_credentials, FieldError, FieldSource};
pub use forms::{Encoding, FormKind, FormSpec};
pub use models::{AuthResponse, Credentials, TokenGrant, UserRecord};
pub use presenter::{MessageKind, StatusRegion, UiMessage};
pub use storage::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
