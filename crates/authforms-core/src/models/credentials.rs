use std::fmt;

use serde::Serialize;

/// Email/password pair for a single submission.
///
/// Both fields are trimmed on construction. No other validation happens
/// client-side; empty values are forwarded and left for the server to reject.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.trim().to_string(),
        }
    }

    /// Field pairs for the OAuth2 password form the token endpoint expects.
    /// The email travels as `username`.
    pub fn as_password_form(&self) -> [(&'static str, &str); 2] {
        [("username", self.email.as_str()), ("password", self.password.as_str())]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
