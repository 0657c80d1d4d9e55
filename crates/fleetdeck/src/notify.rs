//! Terminal surfaces for component signals: notifications on stderr and a
//! spinner driven by the boat list's loading events.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use fleetdeck_core::{ListEvent, Notification, Notifier, Severity};

/// Prints notifications to stderr. Errors are shown even in quiet mode.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    color: bool,
    quiet: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool, quiet: bool) -> Self {
        Self { color, quiet }
    }

    fn render(&self, notification: &Notification) -> String {
        let Notification {
            title,
            message,
            severity,
        } = notification;
        match (severity, self.color) {
            (Severity::Success, true) => {
                format!("{} {}: {message}", "✓".green().bold(), title.green())
            }
            (Severity::Error, true) => format!("{} {}: {message}", "✗".red().bold(), title.red()),
            (Severity::Success, false) => format!("✓ {title}: {message}"),
            (Severity::Error, false) => format!("✗ {title}: {message}"),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        if self.quiet && notification.severity == Severity::Success {
            return;
        }
        eprintln!("{}", self.render(&notification));
    }
}

// ── Spinner ──────────────────────────────────────────────────────────

/// Show a spinner between `Loading` and `DoneLoading`. The task ends when
/// the list (the sender) is dropped.
pub fn spawn_spinner(
    mut events: mpsc::UnboundedReceiver<ListEvent>,
    quiet: bool,
) -> JoinHandle<()> {
    let enabled = !quiet && io::stderr().is_terminal();
    tokio::spawn(async move {
        let mut bar: Option<ProgressBar> = None;
        while let Some(event) = events.recv().await {
            match event {
                ListEvent::Loading if enabled && bar.is_none() => {
                    let spinner = ProgressBar::new_spinner();
                    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}")
                    {
                        spinner.set_style(style);
                    }
                    spinner.set_message("Loading boats…");
                    spinner.enable_steady_tick(Duration::from_millis(80));
                    bar = Some(spinner);
                }
                ListEvent::DoneLoading => {
                    if let Some(spinner) = bar.take() {
                        spinner.finish_and_clear();
                    }
                }
                ListEvent::Loading => {}
            }
        }
        if let Some(spinner) = bar.take() {
            spinner.finish_and_clear();
        }
    })
}
