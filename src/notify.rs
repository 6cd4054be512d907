//! User-facing notices.
//!
//! One [`Notifier`] is built at startup and used for every message the user
//! has to see: usage and validation errors, the conversion error that ends a
//! run, and the final success notice.

use clap::ValueEnum;
use console::style;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::json_output::JsonMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Info,
}

/// Where notices go
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    /// Styled messages on the terminal
    #[value(name = "console")]
    Console,
    /// Native modal message boxes (requires the `gui` feature)
    #[value(name = "dialog")]
    Dialog,
}

impl Default for NotifyMode {
    fn default() -> Self {
        if cfg!(feature = "gui") {
            NotifyMode::Dialog
        } else {
            NotifyMode::Console
        }
    }
}

pub trait Notifier {
    /// Show a notice. Modal implementations return once it is acknowledged.
    fn show(&self, severity: Severity, title: &str, message: &str);

    fn error(&self, title: &str, message: &str) {
        self.show(Severity::Error, title, message);
    }

    fn info(&self, title: &str, message: &str) {
        self.show(Severity::Info, title, message);
    }
}

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show(&self, severity: Severity, title: &str, message: &str) {
        match severity {
            Severity::Error => eprintln!("{} {}", style(format!("{}:", title)).red().bold(), message),
            Severity::Info => println!("{} {}", style(format!("{}:", title)).green().bold(), message),
        }
    }
}

/// Emits notices as `notice` JSON lines
#[derive(Debug, Default)]
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn show(&self, severity: Severity, title: &str, message: &str) {
        JsonMessage::Notice {
            severity: severity.to_string(),
            title: title.to_string(),
            message: message.to_string(),
        }
        .emit();
    }
}

#[cfg(feature = "gui")]
#[derive(Debug, Default)]
pub struct DialogNotifier;

#[cfg(feature = "gui")]
impl Notifier for DialogNotifier {
    fn show(&self, severity: Severity, title: &str, message: &str) {
        use rfd::{MessageButtons, MessageDialog, MessageLevel};

        let level = match severity {
            Severity::Error => MessageLevel::Error,
            Severity::Info => MessageLevel::Info,
        };

        MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

/// Build the process-wide notifier. JSON mode wins over `mode`.
pub fn build_notifier(mode: NotifyMode, json_progress: bool) -> Box<dyn Notifier> {
    if json_progress {
        return Box::new(JsonNotifier);
    }

    match mode {
        NotifyMode::Console => Box::new(ConsoleNotifier),
        NotifyMode::Dialog => dialog_notifier(),
    }
}

#[cfg(feature = "gui")]
fn dialog_notifier() -> Box<dyn Notifier> {
    Box::new(DialogNotifier)
}

#[cfg(not(feature = "gui"))]
fn dialog_notifier() -> Box<dyn Notifier> {
    crate::utils::warn_println("Dialog notices are not available in this build (rebuild with --features gui); using the console");
    Box::new(ConsoleNotifier)
}
