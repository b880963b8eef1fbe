use anyhow::Result;
use colored::*;
use importguard_core::{prompt_confirm, NonInteractiveMode};
use serde::Serialize;
use std::sync::Mutex;

/// Label of the action offered with a non-compliance warning
pub const FIX_NOW: &str = "Fix now";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Warning,
    Information,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl Notification {
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, title)
    }

    pub fn information(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Information, title)
    }

    fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            lines: Vec::new(),
            action: None,
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Delivers notifications to the user
pub trait Notifier {
    /// Show `notification`; returns whether its action was accepted.
    /// Notifications without an action always return `false`.
    fn notify(&self, notification: &Notification) -> Result<bool>;
}

/// Coloured terminal output with a confirmation prompt for the action
pub struct TerminalNotifier {
    non_interactive: NonInteractiveMode,
}

impl TerminalNotifier {
    pub fn new(non_interactive: NonInteractiveMode) -> Self {
        Self { non_interactive }
    }

    pub fn render(notification: &Notification) -> String {
        let title = match notification.kind {
            NotificationKind::Warning => format!("⚠️  {}", notification.title).yellow().bold(),
            NotificationKind::Information => format!("✅ {}", notification.title).green().bold(),
        };

        let mut out = title.to_string();
        for line in &notification.lines {
            out.push_str(&format!("\n  {} {}", "•".bright_black(), line));
        }
        out
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) -> Result<bool> {
        println!("{}", Self::render(notification));

        match &notification.action {
            Some(action) => prompt_confirm(&format!("{}?", action), false, self.non_interactive),
            None => Ok(false),
        }
    }
}

/// Prints notifications as JSON lines. The action is accepted only in
/// auto-fix mode since nobody is there to answer.
pub struct JsonNotifier {
    auto_fix: bool,
}

#[derive(Serialize)]
struct JsonNotification<'a> {
    #[serde(flatten)]
    notification: &'a Notification,
    accepted: bool,
}

impl JsonNotifier {
    pub fn new(auto_fix: bool) -> Self {
        Self { auto_fix }
    }

    fn accepts(&self, notification: &Notification) -> bool {
        self.auto_fix && notification.action.is_some()
    }

    pub fn render(&self, notification: &Notification) -> Result<String> {
        let json = JsonNotification {
            notification,
            accepted: self.accepts(notification),
        };
        Ok(serde_json::to_string(&json)?)
    }
}

impl Notifier for JsonNotifier {
    fn notify(&self, notification: &Notification) -> Result<bool> {
        println!("{}", self.render(notification)?);
        Ok(self.accepts(notification))
    }
}

/// Keeps every notification instead of showing it
pub struct RecordingNotifier {
    accept: bool,
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new(accept: bool) -> Self {
        Self {
            accept,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<Notification> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<bool> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification.clone());
        }
        Ok(self.accept && notification.action.is_some())
    }
}
