mod json;
mod text;

use chrono::Utc;

pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

use crate::navigation::{NavEvent, TurnGuidance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub trait Formatter: Send {
    fn format_event(&self, event: &NavEvent) -> String;

    fn format_guidance(&self, guidance: &TurnGuidance) -> String;
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
