//! Application state management for the authforms terminal front end.
//!
//! The `App` plays the role of the host page: it knows which page is open,
//! holds the text typed into each form, binds a submission controller to
//! every form on the page, and follows navigation requests.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use authforms_core::{
    bind_forms, Config, FieldError, FormKind, FormSpec, Navigator, PageForms,
    Services, SubmissionController, SubmitOutcome, TOKEN_KEY,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the host event channel.
/// Each submission produces at most two events (outcome, navigation).
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input.
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Pages
// ============================================================================

/// The pages the front end can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Register,
    Login,
    Landing,
}

impl Page {
    /// Resolve a navigation target such as `login.html` or `/dashboard.html`
    pub fn from_target(target: &str) -> Option<Self> {
        let name = target.trim().trim_start_matches('/');
        let name = name.split(['?', '#']).next().unwrap_or_default();
        match name {
            "register.html" => Some(Page::Register),
            "login.html" => Some(Page::Login),
            "" | "index.html" | "dashboard.html" => Some(Page::Landing),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Register => "Create account",
            Page::Login => "Sign in",
            Page::Landing => "EyePredict",
        }
    }

    fn form_ids(&self) -> &'static [&'static str] {
        match self {
            Page::Register => &["register-form"],
            Page::Login => &["login-form"],
            Page::Landing => &[],
        }
    }
}

impl PageForms for Page {
    fn has_form(&self, form_id: &str) -> bool {
        self.form_ids().contains(&form_id)
    }
}

// ============================================================================
// Form state
// ============================================================================

/// Form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFocus {
    Email,
    Password,
    Button,
}

impl FieldFocus {
    pub fn next(&self) -> Self {
        match self {
            FieldFocus::Email => FieldFocus::Password,
            FieldFocus::Password => FieldFocus::Button,
            FieldFocus::Button => FieldFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FieldFocus::Email => FieldFocus::Button,
            FieldFocus::Password => FieldFocus::Email,
            FieldFocus::Button => FieldFocus::Password,
        }
    }
}

/// Inputs of one form on the current page, addressed by the form's field ids
#[derive(Debug, Clone)]
pub struct FormInputs {
    pub spec: FormSpec,
    pub email: String,
    pub password: String,
    pub focus: FieldFocus,
}

impl FormInputs {
    pub fn new(spec: FormSpec) -> Self {
        Self {
            spec,
            email: String::new(),
            password: String::new(),
            focus: FieldFocus::Email,
        }
    }

    /// Owned copy of the field values for a submission running in the background
    pub fn snapshot(&self) -> HashMap<String, String> {
        HashMap::from([
            (self.spec.email_field.to_string(), self.email.clone()),
            (self.spec.password_field.to_string(), self.password.clone()),
        ])
    }
}

// ============================================================================
// Host events
// ============================================================================

/// Events sent back to the UI loop from submission tasks and timers
#[derive(Debug)]
pub enum HostEvent {
    /// A submission task finished
    Submitted(FormKind, Result<SubmitOutcome, FieldError>),
    /// A redirect timer fired
    Navigate(String),
}

/// Navigator that forwards redirect requests to the UI loop
struct ChannelNavigator {
    tx: mpsc::Sender<HostEvent>,
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, target: &str) {
        if let Err(e) = self.tx.try_send(HostEvent::Navigate(target.to_string())) {
            warn!(target, error = %e, "Dropped navigation request");
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    Quitting,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    services: Services,

    pub state: AppState,
    pub page: Page,

    /// Controllers bound to the forms on the current page
    pub controllers: Vec<Arc<SubmissionController>>,
    /// Inputs for the same forms, in the same order
    pub forms: Vec<FormInputs>,

    /// Whether a session token is stored (shown on the landing page)
    pub has_token: bool,

    event_rx: mpsc::Receiver<HostEvent>,
    event_tx: mpsc::Sender<HostEvent>,
}

impl App {
    /// Create the application and open `start` as the first page
    pub fn new(config: &Config, start: Page) -> Result<Self> {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let navigator = Arc::new(ChannelNavigator { tx: tx.clone() });
        let services = Services::from_config(config, navigator)?;
        debug!(api_base = %services.client.base(), "Services configured");
        Ok(Self::assemble(services, (tx, rx), start))
    }

    fn assemble(
        services: Services,
        (event_tx, event_rx): (mpsc::Sender<HostEvent>, mpsc::Receiver<HostEvent>),
        start: Page,
    ) -> Self {
        let mut app = Self {
            services,
            state: AppState::Normal,
            page: start,
            controllers: Vec::new(),
            forms: Vec::new(),
            has_token: false,
            event_rx,
            event_tx,
        };
        app.open_page(start);
        app
    }

    /// User-requested page change. Asking for the page already open does
    /// nothing, so an in-flight submission keeps its controller and region.
    pub fn switch_page(&mut self, page: Page) {
        if self.page == page {
            debug!(?page, "Page already open");
            return;
        }
        self.open_page(page);
    }

    /// Load a page: bind handlers to the forms it contains and start with
    /// empty inputs
    pub fn open_page(&mut self, page: Page) {
        self.page = page;
        self.controllers = bind_forms(&page, &self.services);
        self.forms = self
            .controllers
            .iter()
            .map(|c| FormInputs::new(c.spec().clone()))
            .collect();
        self.has_token = self.lookup_token();
        info!(?page, forms = self.forms.len(), "Page opened");
    }

    fn lookup_token(&self) -> bool {
        match self.services.store.get_item(TOKEN_KEY) {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read token store");
                false
            }
        }
    }

    pub fn api_base(&self) -> &str {
        self.services.client.base()
    }

    /// The form that receives keyboard input
    pub fn active_form(&self) -> Option<&FormInputs> {
        self.forms.first()
    }

    pub fn active_form_mut(&mut self) -> Option<&mut FormInputs> {
        self.forms.first_mut()
    }

    pub fn active_controller(&self) -> Option<&Arc<SubmissionController>> {
        self.controllers.first()
    }

    /// Fire a submission event for the active form.
    ///
    /// The request runs on its own task so the UI keeps drawing; the outcome
    /// comes back through the event channel. The controller decides whether
    /// the event is ignored because a request is already in flight.
    pub fn submit_active_form(&mut self) {
        let (Some(controller), Some(form)) = (self.controllers.first(), self.forms.first()) else {
            return;
        };

        let controller = Arc::clone(controller);
        let fields = form.snapshot();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let kind = controller.kind();
            let outcome = controller.submit(&fields).await;
            if tx.send(HostEvent::Submitted(kind, outcome)).await.is_err() {
                debug!("UI loop gone before submission finished");
            }
        });
    }

    /// Drain events from submission tasks and redirect timers
    pub fn check_host_events(&mut self) {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        for event in events {
            self.process_host_event(event);
        }
    }

    fn process_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Submitted(kind, Ok(SubmitOutcome::Succeeded { redirect })) => {
                info!(?kind, redirect, "Submission succeeded");
                if let Some(form) = self.forms.iter_mut().find(|f| f.spec.kind == kind) {
                    form.password.clear();
                }
                self.has_token = self.lookup_token();
            }
            HostEvent::Submitted(kind, Ok(outcome)) => {
                debug!(?kind, ?outcome, "Submission finished");
            }
            HostEvent::Submitted(kind, Err(e)) => {
                warn!(?kind, error = %e, "Submission aborted");
            }
            HostEvent::Navigate(target) => match Page::from_target(&target) {
                Some(page) => self.open_page(page),
                None => warn!(target = %target, "Unknown navigation target"),
            },
        }
    }

    /// Currently visible status message of the active form, if any
    pub fn status_message(&self) -> Option<authforms_core::UiMessage> {
        self.active_controller().and_then(|c| c.region().visible())
    }

    pub fn is_submitting(&self) -> bool {
        self.active_controller().map(|c| c.is_submitting()).unwrap_or(false)
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use authforms_core::TokenStore;

    // -------------------------------------------------------------------------
    // Page Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_page_from_target() {
        assert_eq!(Page::from_target("login.html"), Some(Page::Login));
        assert_eq!(Page::from_target("/login.html"), Some(Page::Login));
        assert_eq!(Page::from_target("register.html"), Some(Page::Register));
        assert_eq!(Page::from_target("index.html"), Some(Page::Landing));
        assert_eq!(Page::from_target("/dashboard.html"), Some(Page::Landing));
        assert_eq!(Page::from_target("/"), Some(Page::Landing));
        assert_eq!(Page::from_target("index.html?next=1"), Some(Page::Landing));
        assert_eq!(Page::from_target("predict.html"), None);
    }

    #[test]
    fn test_page_forms() {
        assert!(Page::Register.has_form("register-form"));
        assert!(!Page::Register.has_form("login-form"));
        assert!(Page::Login.has_form("login-form"));
        assert!(!Page::Landing.has_form("login-form"));
        assert!(!Page::Landing.has_form("register-form"));
    }

    // -------------------------------------------------------------------------
    // Form Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_focus_cycle() {
        assert_eq!(FieldFocus::Email.next(), FieldFocus::Password);
        assert_eq!(FieldFocus::Password.next(), FieldFocus::Button);
        assert_eq!(FieldFocus::Button.next(), FieldFocus::Email); // Wraps around
        assert_eq!(FieldFocus::Email.prev(), FieldFocus::Button); // Wraps around
        assert_eq!(FieldFocus::Button.prev(), FieldFocus::Password);
    }

    #[test]
    fn test_form_inputs_snapshot_field_ids() {
        let mut form = FormInputs::new(FormKind::Register.spec());
        form.email = " ada@example.com ".to_string();
        form.password = "pw".to_string();

        let snapshot = form.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("reg-email").map(String::as_str), Some(" ada@example.com "));
        assert_eq!(snapshot.get("reg-password").map(String::as_str), Some("pw"));
        assert!(!snapshot.contains_key("email"));

        // Extraction trims, the snapshot does not
        let credentials = authforms_core::extract_credentials(&snapshot, "reg-email", "reg-password").unwrap();
        assert_eq!(credentials.email, "ada@example.com");
    }

    #[test]
    fn test_login_snapshot_field_ids() {
        let snapshot = FormInputs::new(FormKind::Login.spec()).snapshot();
        assert_eq!(snapshot.get("email").map(String::as_str), Some(""));
        assert_eq!(snapshot.get("password").map(String::as_str), Some(""));
        assert!(!snapshot.contains_key("reg-email"));
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(0, '@'));
        assert!(can_add_email_char(253, 'z'));
        // Exceeds max length
        assert!(!can_add_email_char(254, 'a'));
        // Control characters rejected
        assert!(!can_add_email_char(0, '\x00'));
        assert!(!can_add_email_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(can_add_password_char(0, ' '));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    // -------------------------------------------------------------------------
    // App Tests
    // -------------------------------------------------------------------------

    fn test_app(start: Page) -> (App, Arc<authforms_core::MemoryTokenStore>) {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let store = Arc::new(authforms_core::MemoryTokenStore::new());
        let services = Services {
            // Closed port; these tests never submit
            client: authforms_core::AuthClient::new("http://127.0.0.1:9/auth", None).unwrap(),
            store: store.clone(),
            navigator: Arc::new(ChannelNavigator { tx: tx.clone() }),
            message_display: std::time::Duration::from_millis(4000),
        };
        let app = App::assemble(services, (tx, rx), start);
        (app, store)
    }

    #[tokio::test]
    async fn test_navigation_rebinds_forms() {
        let (mut app, _) = test_app(Page::Register);
        assert_eq!(app.controllers.len(), 1);
        assert_eq!(app.forms[0].spec.form_id, "register-form");

        app.process_host_event(HostEvent::Navigate("login.html".to_string()));
        assert_eq!(app.page, Page::Login);
        assert_eq!(app.forms[0].spec.form_id, "login-form");

        app.process_host_event(HostEvent::Navigate("index.html".to_string()));
        assert_eq!(app.page, Page::Landing);
        assert!(app.controllers.is_empty());
        assert!(app.active_form().is_none());
        // No form, nothing to submit
        app.submit_active_form();
    }

    #[tokio::test]
    async fn test_switch_to_current_page_keeps_controllers() {
        let (mut app, _) = test_app(Page::Login);
        let bound = Arc::clone(&app.controllers[0]);
        app.forms[0].email = "a@b.c".to_string();

        app.switch_page(Page::Login);
        assert!(Arc::ptr_eq(&bound, &app.controllers[0]));
        assert_eq!(app.forms[0].email, "a@b.c");

        app.switch_page(Page::Register);
        assert_eq!(app.page, Page::Register);
        assert!(!Arc::ptr_eq(&bound, &app.controllers[0]));
    }

    #[tokio::test]
    async fn test_unknown_target_keeps_page() {
        let (mut app, _) = test_app(Page::Login);
        app.process_host_event(HostEvent::Navigate("predict.html".to_string()));
        assert_eq!(app.page, Page::Login);
    }

    #[tokio::test]
    async fn test_navigator_events_reach_app() {
        let (mut app, store) = test_app(Page::Login);
        assert!(!app.has_token);

        store.set_item(TOKEN_KEY, "abc123").unwrap();
        app.services.navigator.navigate("index.html");
        app.check_host_events();

        assert_eq!(app.page, Page::Landing);
        assert!(app.has_token);
    }

    #[tokio::test]
    async fn test_success_clears_password() {
        let (mut app, _) = test_app(Page::Login);
        if let Some(form) = app.active_form_mut() {
            form.email = "a@b.c".to_string();
            form.password = "secret".to_string();
        }
        app.process_host_event(HostEvent::Submitted(
            FormKind::Login,
            Ok(SubmitOutcome::Succeeded { redirect: "index.html" }),
        ));
        let form = app.active_form().unwrap();
        assert_eq!(form.email, "a@b.c");
        assert!(form.password.is_empty());
    }
}
