//! The form submission cycle.
//!
//! A `SubmissionController` owns one form: its configuration, its status
//! region and its idle/submitting state. On each submission it extracts the
//! credentials, sends one request, reports the outcome in the status region
//! and, on success, schedules the redirect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api::{ApiError, AuthClient};
use crate::config::Config;
use crate::fields::{extract_credentials, FieldError, FieldSource};
use crate::forms::{FormKind, FormSpec};
use crate::presenter::{MessageKind, StatusRegion};
use crate::storage::{self, TokenStore, TOKEN_KEY};

// ============================================================================
// Constants
// ============================================================================

/// Shown when the request never got a response
pub const NETWORK_ERROR_TEXT: &str = "Network error";

/// Shown when the response could not be used (non-JSON body, missing token,
/// token not saved)
pub const UNEXPECTED_RESPONSE_TEXT: &str = "Unexpected response from server";

/// Host-side navigation to a page target such as `login.html`
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

/// Which forms the current page contains
pub trait PageForms {
    fn has_form(&self, form_id: &str) -> bool;
}

/// Result of one submission event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A previous submission on this form is still in flight; nothing was sent
    Busy,
    /// Success message shown and redirect scheduled
    Succeeded { redirect: &'static str },
    /// Error message shown; the form is ready for another attempt
    Failed { message: String },
}

/// Shared collaborators handed to every controller at bind time
#[derive(Clone)]
pub struct Services {
    pub client: AuthClient,
    pub store: Arc<dyn TokenStore>,
    pub navigator: Arc<dyn Navigator>,
    pub message_display: Duration,
}

impl Services {
    /// Client, token store and timings as configured; the navigator is the host's
    pub fn from_config(config: &Config, navigator: Arc<dyn Navigator>) -> anyhow::Result<Self> {
        Ok(Self {
            client: AuthClient::new(&config.api_base, config.request_timeout())?,
            store: storage::open(config)?,
            navigator,
            message_display: config.message_display(),
        })
    }
}

/// Resets the submitting flag on every exit path
struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SubmissionController {
    spec: FormSpec,
    client: AuthClient,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    region: StatusRegion,
    submitting: AtomicBool,
}

impl SubmissionController {
    pub fn new(spec: FormSpec, services: &Services) -> Self {
        Self {
            spec,
            client: services.client.clone(),
            store: Arc::clone(&services.store),
            navigator: Arc::clone(&services.navigator),
            region: StatusRegion::new(services.message_display),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn kind(&self) -> FormKind {
        self.spec.kind
    }

    /// This form's status region
    pub fn region(&self) -> &StatusRegion {
        &self.region
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Handle one submission event.
    ///
    /// Returns `Err` only when the page lacks one of the form's fields; no
    /// request is made and no message is shown in that case.
    pub async fn submit(
        &self,
        fields: &(dyn FieldSource + Sync),
    ) -> Result<SubmitOutcome, FieldError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(form = self.spec.form_id, "Submission ignored, request in flight");
            return Ok(SubmitOutcome::Busy);
        }
        let _guard = SubmittingGuard(&self.submitting);

        let credentials = extract_credentials(fields, self.spec.email_field, self.spec.password_field)
            .map_err(|e| {
                error!(form = self.spec.form_id, error = %e, "Form does not match its configuration");
                e
            })?;

        let result = self
            .client
            .send(self.spec.encoding, self.spec.endpoint_path, &credentials)
            .await;
        drop(credentials);

        let outcome = match result {
            Ok(response) if response.ok => {
                if self.spec.stores_token {
                    match response.token_grant() {
                        Some(grant) => {
                            debug!(form = self.spec.form_id, token_type = ?grant.token_type, "Token granted");
                            if let Err(e) = self.store.set_item(TOKEN_KEY, &grant.access_token) {
                                warn!(form = self.spec.form_id, error = %e, "Failed to store access token");
                                return Ok(self.fail(UNEXPECTED_RESPONSE_TEXT.to_string()));
                            }
                        }
                        None => {
                            warn!(form = self.spec.form_id, status = response.status, "Success response without access_token");
                            return Ok(self.fail(UNEXPECTED_RESPONSE_TEXT.to_string()));
                        }
                    }
                }
                if let Some(user) = response.user_record() {
                    info!(form = self.spec.form_id, user_id = user.id, "Account created");
                }
                self.succeed()
            }
            Ok(response) => {
                let message = response
                    .detail_message()
                    .unwrap_or(self.spec.fallback_error)
                    .to_string();
                info!(form = self.spec.form_id, status = response.status, "Request rejected by server");
                self.fail(message)
            }
            Err(ApiError::NetworkError(e)) => {
                warn!(form = self.spec.form_id, error = %e, "Request failed before a response arrived");
                self.fail(NETWORK_ERROR_TEXT.to_string())
            }
            Err(e) => {
                warn!(form = self.spec.form_id, error = %e, "Unusable response");
                self.fail(UNEXPECTED_RESPONSE_TEXT.to_string())
            }
        };

        Ok(outcome)
    }

    fn succeed(&self) -> SubmitOutcome {
        self.region.present(MessageKind::Success, self.spec.success_text);

        let navigator = Arc::clone(&self.navigator);
        let target = self.spec.success_redirect;
        let delay = self.spec.redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(target);
        });

        info!(form = self.spec.form_id, redirect = target, "Submission succeeded");
        SubmitOutcome::Succeeded { redirect: target }
    }

    fn fail(&self, message: String) -> SubmitOutcome {
        self.region.present(MessageKind::Error, message.as_str());
        SubmitOutcome::Failed { message }
    }
}

/// Bind a controller to every configured form present on the page.
/// Pages without forms get an empty list.
pub fn bind_forms(page: &dyn PageForms, services: &Services) -> Vec<Arc<SubmissionController>> {
    FormKind::ALL
        .iter()
        .map(|kind| kind.spec())
        .filter(|spec| page.has_form(spec.form_id))
        .map(|spec| {
            debug!(form = spec.form_id, "Binding submission handler");
            Arc::new(SubmissionController::new(spec, services))
        })
        .collect()
}
