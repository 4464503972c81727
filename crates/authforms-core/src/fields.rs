//! Credential extraction from named input fields.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::Credentials;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Input field not found on page: {0}")]
    MissingField(String),
}

/// Anything that can report the current value of an input field by id
pub trait FieldSource {
    fn field_value(&self, field_id: &str) -> Option<String>;
}

impl FieldSource for HashMap<String, String> {
    fn field_value(&self, field_id: &str) -> Option<String> {
        self.get(field_id).cloned()
    }
}

impl FieldSource for HashMap<&str, &str> {
    fn field_value(&self, field_id: &str) -> Option<String> {
        self.get(field_id).map(|v| v.to_string())
    }
}

/// Read and trim the email and password fields.
///
/// An absent field means the host page does not match its form configuration;
/// that is reported, not papered over.
pub fn extract_credentials(
    source: &dyn FieldSource,
    email_field_id: &str,
    password_field_id: &str,
) -> Result<Credentials, FieldError> {
    let email = source
        .field_value(email_field_id)
        .ok_or_else(|| FieldError::MissingField(email_field_id.to_string()))?;
    let password = source
        .field_value(password_field_id)
        .ok_or_else(|| FieldError::MissingField(password_field_id.to_string()))?;
    Ok(Credentials::new(&email, &password))
}
