//! Page feedback returned by every form endpoint.
//!
//! The pages are static; a `FormFeedback` tells them what to show
//! (a transient notification), which state the submit button ends in,
//! which inputs to clear and where to go next.

use serde::Serialize;
use std::time::Duration;

pub const ERROR_DISPLAY: Duration = Duration::from_secs(5);
pub const RESET_SUCCESS_DISPLAY: Duration = Duration::from_secs(10);
pub const SIGNUP_SUCCESS_DISPLAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Error,
    Success,
    Info,
}

/// A message that hides itself after `display_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
    pub display_ms: u64,
}

impl Notification {
    pub fn new(kind: NoticeKind, message: impl Into<String>, display_for: Duration) -> Self {
        Self {
            kind,
            message: message.into(),
            display_ms: u64::try_from(display_for.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, message, ERROR_DISPLAY)
    }

    pub fn success(message: impl Into<String>, display_for: Duration) -> Self {
        Self::new(NoticeKind::Success, message, display_for)
    }

    pub fn info(message: impl Into<String>, display_for: Duration) -> Self {
        Self::new(NoticeKind::Info, message, display_for)
    }
}

/// Visual state of a submit button: `idle -> loading -> (success | idle)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonState {
    Idle,
    Loading,
    Success,
}

impl ButtonState {
    /// Button state once a submission has been pressed.
    pub fn press(self) -> Self {
        match self {
            ButtonState::Idle | ButtonState::Success => ButtonState::Loading,
            ButtonState::Loading => ButtonState::Loading,
        }
    }

    /// Failed or rejected submission: back to `idle`.
    pub fn release(self) -> Self {
        match self {
            ButtonState::Success => ButtonState::Success,
            _ => ButtonState::Idle,
        }
    }

    /// Completed submission with a terminal visual state.
    pub fn succeed(self) -> Self {
        match self {
            ButtonState::Loading => ButtonState::Success,
            other => other,
        }
    }
}

/// Navigation the page performs after `after_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRedirect {
    pub to: String,
    pub after_ms: u64,
}

/// A notification the page shows later, `after_ms` from now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledNotice {
    pub after_ms: u64,
    pub notification: Notification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormFeedback {
    pub ok: bool,
    pub button: ButtonState,
    /// Label to restore on the button, when it changed during the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followup: Option<ScheduledNotice>,
    /// Blocking alert dialog text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<PageRedirect>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clear_fields: Vec<&'static str>,
}

impl FormFeedback {
    /// Failed attempt: error notification, button back to `idle`.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            button: ButtonState::Idle.press().release(),
            button_label: None,
            notification: Some(Notification::error(message)),
            followup: None,
            alert: None,
            redirect: None,
            clear_fields: Vec::new(),
        }
    }

    /// Successful attempt ending in navigation; the button stays `loading`.
    pub fn redirecting(to: &str, after: Duration) -> Self {
        Self {
            ok: true,
            button: ButtonState::Idle.press(),
            button_label: None,
            notification: None,
            followup: None,
            alert: None,
            redirect: Some(PageRedirect {
                to: to.to_string(),
                after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
            }),
            clear_fields: Vec::new(),
        }
    }

    /// Blocking alert; the button goes back to `idle` showing `label`.
    pub fn alert(message: impl Into<String>, label: &str) -> Self {
        Self {
            ok: false,
            button: ButtonState::Idle.press().release(),
            button_label: Some(label.to_string()),
            notification: None,
            followup: None,
            alert: Some(message.into()),
            redirect: None,
            clear_fields: Vec::new(),
        }
    }

    /// A second submission arrived while the first is still running.
    pub fn busy() -> Self {
        Self {
            ok: false,
            button: ButtonState::Loading,
            button_label: None,
            notification: Some(Notification::info(
                "A request is already in progress. Please wait.",
                ERROR_DISPLAY,
            )),
            followup: None,
            alert: None,
            redirect: None,
            clear_fields: Vec::new(),
        }
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }

    pub fn with_followup(mut self, after: Duration, notification: Notification) -> Self {
        self.followup = Some(ScheduledNotice {
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
            notification,
        });
        self
    }

    pub fn with_button(mut self, button: ButtonState) -> Self {
        self.button = button;
        self
    }

    pub fn clearing(mut self, fields: &[&'static str]) -> Self {
        self.clear_fields = fields.to_vec();
        self
    }
}
