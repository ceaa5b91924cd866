//! Event handling and user feedback

use console::Style;
use morphsweep_events::{AppEvent, CascadeEvent, EventMessage, GeneralEvent, SweepEvent};

/// Turns events into log records and short status lines on stderr
pub struct EventHandler {
    colors_enabled: bool,
    /// Status lines are suppressed when stdout carries JSON
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, quiet: bool) -> Self {
        Self {
            colors_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);
        if self.quiet {
            return;
        }

        match &message.event {
            AppEvent::General(GeneralEvent::ConfigurationValidated { warnings, .. }) => {
                for warning in warnings {
                    self.show_warning(warning);
                }
            }
            AppEvent::Sweep(SweepEvent::EntityStarted { entity }) => {
                self.show_status(&format!("Scanning {entity}"));
            }
            AppEvent::Sweep(SweepEvent::AccessorSkipped {
                entity,
                accessor,
                reason,
            }) => {
                self.show_warning(&format!("{entity}: skipping `{accessor}` ({reason})"));
            }
            AppEvent::Sweep(SweepEvent::LabelPurged {
                table,
                label,
                rows,
                dry_run,
                ..
            }) if *rows > 0 => {
                let verb = if *dry_run { "would remove" } else { "removed" };
                let label = label.as_deref().unwrap_or("NULL");
                self.show_status(&format!("  {table}: {verb} {rows} row(s) for {label}"));
            }
            AppEvent::Cascade(CascadeEvent::NoKey { entity }) => {
                self.show_warning(&format!("{entity} has no key; nothing to delete"));
            }
            _ => {}
        }
    }

    fn show_status(&self, message: &str) {
        eprintln!("{}", self.style(Style::new().dim(), message));
    }

    fn show_warning(&self, message: &str) {
        eprintln!("{} {message}", self.style(Style::new().yellow().bold(), "warning:"));
    }

    fn style(&self, style: Style, text: &str) -> String {
        if self.colors_enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}
