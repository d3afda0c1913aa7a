use crate::utils::ui::Ui;
use chrono::Local;
use owo_colors::OwoColorize;
use std::fmt::Write;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Routes log events through [`Ui`] so they do not tear up status lines.
pub struct UiLayer {
    ui: Arc<Ui>,
    show_location: bool,
}

impl UiLayer {
    pub fn new(ui: Arc<Ui>) -> Self {
        UiLayer {
            ui,
            show_location: false,
        }
    }

    /// Appends `file:line` of the call site to every line.
    pub fn with_location(mut self, show_location: bool) -> Self {
        self.show_location = show_location;
        self
    }
}

fn colorize_level(level: &Level) -> String {
    match *level {
        Level::ERROR => level.to_string().bright_red().to_string(),
        Level::WARN => level.to_string().yellow().to_string(),
        Level::INFO => level.to_string().green().to_string(),
        Level::DEBUG => level.to_string().bright_blue().to_string(),
        Level::TRACE => level.to_string().dimmed().to_string(),
    }
}

impl<S> Layer<S> for UiLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let mut line = format!(
            "{} {} [{}] {}",
            Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
            colorize_level(metadata.level()),
            metadata.target().cyan(),
            visitor.message
        );
        if !visitor.fields.is_empty() {
            let _ = write!(line, " {}", visitor.fields.join(" ").dimmed());
        }
        if self.show_location {
            let _ = write!(
                line,
                " {}",
                format!(
                    "({}:{})",
                    metadata.file().unwrap_or("<unknown>"),
                    metadata.line().unwrap_or(0)
                )
                .dimmed()
            );
        }

        // Logs never end up in stdout, it carries command output
        self.ui.eprintln(line);
    }
}

/// Collects the message and the remaining fields as `key=value`.
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<String>,
}

impl EventVisitor {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, value.to_string());
    }
}
