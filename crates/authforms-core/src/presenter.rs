//! Status regions: the per-form area that shows the latest message.
//!
//! A message is visible until its hide timer fires. Presenting a new message
//! aborts the pending timer before scheduling a fresh one, so a timer left
//! over from an older message can never hide a newer one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiMessage {
    pub kind: MessageKind,
    pub text: String,
    pub shown_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RegionState {
    message: Option<UiMessage>,
    visible: bool,
    /// Bumped on every present; a timer only hides the message it was armed for
    generation: u64,
    hide_timer: Option<JoinHandle<()>>,
}

/// One form's status region.
/// Clone is cheap and every clone refers to the same region.
#[derive(Debug, Clone)]
pub struct StatusRegion {
    state: Arc<Mutex<RegionState>>,
    display: Duration,
}

impl StatusRegion {
    pub fn new(display: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(RegionState::default())),
            display,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the region's message, show it, and re-arm the hide timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn present(&self, kind: MessageKind, text: impl Into<String>) {
        let mut state = self.lock();

        if let Some(timer) = state.hide_timer.take() {
            timer.abort();
        }

        state.generation += 1;
        state.message = Some(UiMessage {
            kind,
            text: text.into(),
            shown_at: Utc::now(),
        });
        state.visible = true;

        let armed_for = state.generation;
        let region = Arc::clone(&self.state);
        let display = self.display;
        state.hide_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(display).await;
            let mut state = region.lock().unwrap_or_else(PoisonError::into_inner);
            if state.generation == armed_for {
                state.visible = false;
                state.hide_timer = None;
            }
        }));

        debug!(kind = kind.as_str(), generation = armed_for, "Status message shown");
    }

    /// The message currently on screen, if any
    pub fn visible(&self) -> Option<UiMessage> {
        let state = self.lock();
        if state.visible {
            state.message.clone()
        } else {
            None
        }
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    /// Class string in the host page's convention: `message`, `message success`
    /// or `message error`
    pub fn class_name(&self) -> String {
        match self.lock().message {
            Some(ref msg) => format!("message {}", msg.kind.as_str()),
            None => "message".to_string(),
        }
    }
}
