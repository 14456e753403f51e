use serde::Serialize;
use serde_json::{Map, Value};

use super::{Formatter, iso8601_timestamp};
use crate::navigation::{NavEvent, TurnGuidance};

/// One JSON object per line, stamped with wall-clock time
pub struct JsonFormatter;

fn to_line<T: Serialize>(body: &T, event: Option<&str>) -> String {
    let mut line = match serde_json::to_value(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
        Err(e) => {
            log::error!("Failed to serialize output: {}", e);
            return String::new();
        }
    };
    line.insert("ts".to_string(), Value::String(iso8601_timestamp()));
    if let Some(event) = event {
        line.insert("event".to_string(), Value::String(event.to_string()));
    }
    Value::Object(line).to_string()
}

impl Formatter for JsonFormatter {
    fn format_event(&self, event: &NavEvent) -> String {
        to_line(event, None)
    }

    fn format_guidance(&self, guidance: &TurnGuidance) -> String {
        to_line(guidance, Some("guidance"))
    }
}
