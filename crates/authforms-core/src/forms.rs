//! Per-form configuration.
//!
//! Registration and login run through the same submission controller; the
//! differences between them (identifiers, endpoint, body encoding, messages,
//! redirect) live in a `FormSpec`.

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Delay between a successful registration and the redirect to login.
/// Long enough to read the success message.
const REGISTER_REDIRECT_DELAY_MS: u64 = 2500;

/// Delay between a successful login and the redirect to the landing page.
const LOGIN_REDIRECT_DELAY_MS: u64 = 2000;

/// How a request body is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`, fields `username` and `password`
    Form,
}

impl Encoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            Encoding::Json => "application/json",
            Encoding::Form => "application/x-www-form-urlencoded",
        }
    }
}

/// The forms a page may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Register,
    Login,
}

impl FormKind {
    pub const ALL: [FormKind; 2] = [FormKind::Register, FormKind::Login];

    pub fn spec(self) -> FormSpec {
        match self {
            FormKind::Register => FormSpec {
                kind: self,
                form_id: "register-form",
                email_field: "reg-email",
                password_field: "reg-password",
                endpoint_path: "/register",
                encoding: Encoding::Json,
                success_text: "Registration successful! Redirecting to login...",
                fallback_error: "Registration failed!",
                success_redirect: "login.html",
                redirect_delay: Duration::from_millis(REGISTER_REDIRECT_DELAY_MS),
                stores_token: false,
            },
            FormKind::Login => FormSpec {
                kind: self,
                form_id: "login-form",
                email_field: "email",
                password_field: "password",
                endpoint_path: "/token",
                encoding: Encoding::Form,
                success_text: "Login successful! Redirecting...",
                fallback_error: "Invalid credentials!",
                success_redirect: "index.html",
                redirect_delay: Duration::from_millis(LOGIN_REDIRECT_DELAY_MS),
                stores_token: true,
            },
        }
    }

    /// Get the display title for this form.
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Register => "Register",
            FormKind::Login => "Login",
        }
    }
}

/// Everything the submission controller needs to know about one form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    pub kind: FormKind,
    pub form_id: &'static str,
    pub email_field: &'static str,
    pub password_field: &'static str,
    pub endpoint_path: &'static str,
    pub encoding: Encoding,
    pub success_text: &'static str,
    pub fallback_error: &'static str,
    pub success_redirect: &'static str,
    pub redirect_delay: Duration,
    /// Store the returned access token before redirecting
    pub stores_token: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_spec() {
        let spec = FormKind::Register.spec();
        assert_eq!(spec.form_id, "register-form");
        assert_eq!(spec.email_field, "reg-email");
        assert_eq!(spec.password_field, "reg-password");
        assert_eq!(spec.endpoint_path, "/register");
        assert_eq!(spec.encoding, Encoding::Json);
        assert_eq!(spec.fallback_error, "Registration failed!");
        assert_eq!(spec.success_redirect, "login.html");
        assert!(!spec.stores_token);
    }

    #[test]
    fn test_login_spec() {
        let spec = FormKind::Login.spec();
        assert_eq!(spec.form_id, "login-form");
        assert_eq!(spec.email_field, "email");
        assert_eq!(spec.password_field, "password");
        assert_eq!(spec.endpoint_path, "/token");
        assert_eq!(spec.encoding, Encoding::Form);
        assert_eq!(spec.fallback_error, "Invalid credentials!");
        assert_eq!(spec.success_redirect, "index.html");
        assert!(spec.stores_token);
    }

    #[test]
    fn test_redirect_delays() {
        assert_eq!(FormKind::Register.spec().redirect_delay, Duration::from_millis(2500));
        assert_eq!(FormKind::Login.spec().redirect_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(Encoding::Json.content_type(), "application/json");
        assert_eq!(Encoding::Form.content_type(), "application/x-www-form-urlencoded");
    }

    #[test]
    fn test_form_ids_distinct() {
        let ids: Vec<_> = FormKind::ALL.iter().map(|k| k.spec().form_id).collect();
        assert_eq!(ids, vec!["register-form", "login-form"]);
    }
}
