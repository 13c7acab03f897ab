//! Extraction of calendar events out of free text, with the help of a language model

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{extraction_error, Error, Result};
use crate::event::CalendarEvent;
use crate::llm::LanguageModel;
use crate::time::{Normalizer, TimeValue};

const PROMPT_TEMPLATE: &str = "
You are a helpful assistant that creates calendar events based on user input.

Given the following user input about their schedule, create a list of events in JSON format. Each event should have a \"summary\", \"start\", and \"end\" property. The \"start\" and \"end\" should be in ISO 8601 format (e.g., \"YYYY-MM-DDTHH:MM:SS\"). Assume all events are for today ({today}) unless specified otherwise. Set the duration of each event to 1 hour if not specified.

User input: {input}

Please provide only the JSON array of events, without any additional text.
";

/// Build the prompt sent to the language model
pub fn build_prompt(user_input: &str, reference_date: NaiveDate) -> String {
    PROMPT_TEMPLATE
        .replace("{today}", &reference_date.format("%Y-%m-%d").to_string())
        .replace("{input}", user_input)
}

/// Turns free text into [`CalendarEvent`]s
pub struct Extractor<M: LanguageModel> {
    model: M,
    normalizer: Normalizer,
}

impl<M: LanguageModel> Extractor<M> {
    pub fn new(model: M, normalizer: Normalizer) -> Self {
        Self { model, normalizer }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Ask the model for the events described by `user_input`.
    ///
    /// Dates that are not specified default to `reference_date`.
    /// This performs exactly one request; an unusable answer is an [`Error::Extraction`].
    pub async fn extract_events(&self, user_input: &str, reference_date: NaiveDate) -> Result<Vec<CalendarEvent>> {
        let prompt = build_prompt(user_input, reference_date);
        log::debug!("LLM prompt: {}", prompt);

        let response = match self.model.generate(&prompt).await {
            Ok(r) => r,
            Err(err) => {
                log::error!("Language model request failed: {}", err);
                return Err(Error::Extraction(format!("Language model request failed: {}", err)));
            },
        };
        log::debug!("Raw LLM response: {}", response);

        let raw_events = parse_response(&response)?;
        log::info!("Successfully parsed {} events from LLM response", raw_events.len());

        Ok(raw_events.iter()
            .map(|raw| to_calendar_event(raw, &self.normalizer))
            .collect())
    }
}

/// Recover a JSON array out of a model answer.
///
/// The whole text is tried first. Failing that, the widest `[...]` span (first `[` to last `]`) is tried.
pub fn parse_response(response: &str) -> Result<Vec<Value>> {
    log::debug!("Attempting to parse LLM response as JSON");
    let err = match serde_json::from_str::<Vec<Value>>(response) {
        Ok(events) => return Ok(events),
        Err(err) => err,
    };
    log::warn!("Initial JSON parse failed: {}", err);

    let json_str = match bracketed_span(response) {
        Some(s) => s,
        None => {
            log::error!("No JSON array found in the LLM response");
            log::debug!("LLM response content that failed to parse: {}", response);
            return Err(extraction_error());
        },
    };

    log::debug!("Extracted JSON string from LLM response");
    match serde_json::from_str::<Vec<Value>>(json_str) {
        Ok(events) => Ok(events),
        Err(err) => {
            log::error!("Failed to parse JSON array from LLM response: {}", err);
            log::debug!("LLM response content that failed to parse: {}", response);
            Err(extraction_error())
        },
    }
}

fn bracketed_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Map one loosely-shaped JSON value to an event.
///
/// Nothing is rejected here: missing or unreadable fields end up as empty strings, and are caught by [`crate::validation`].
pub fn to_calendar_event(raw: &Value, normalizer: &Normalizer) -> CalendarEvent {
    if raw.is_object() == false {
        log::warn!("LLM returned a non-object event: {}", raw);
    }

    let summary = match raw.get("summary") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let start = time_field(raw, "start", normalizer);
    let end = time_field(raw, "end", normalizer);

    CalendarEvent::new(summary, start, end)
}

fn time_field(raw: &Value, name: &str, normalizer: &Normalizer) -> String {
    let text = match raw.get(name) {
        Some(Value::String(s)) if s.is_empty() => return String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => return String::new(),
        Some(other) => {
            log::warn!("Unexpected value for \"{}\": {}", name, other);
            return String::new();
        },
    };

    match normalizer.normalize(&TimeValue::from(text.as_str())) {
        Some(normalized) => normalized,
        None => {
            log::warn!("Unable to read \"{}\" time {:?}", name, text);
            String::new()
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc() -> Normalizer {
        Normalizer::new(chrono_tz::UTC)
    }

    #[test]
    fn test_prompt() {
        let prompt = build_prompt("gym at 6pm", NaiveDate::from_ymd_opt(2024, 9, 25).unwrap());
        assert!(prompt.contains("today (2024-09-25)"));
        assert!(prompt.contains("User input: gym at 6pm"));
        assert!(prompt.contains("1 hour"));
    }

    #[test]
    fn test_strict_parse() {
        let events = parse_response(r#"[{"summary":"A"},{"summary":"B"}]"#).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_fallback_parse() {
        let events = parse_response("Here you go:\n[{\"summary\":\"A\"}]\nEnjoy").unwrap();
        assert_eq!(events, vec![json!({"summary": "A"})]);
    }

    #[test]
    fn test_greedy_span() {
        // The span goes from the first '[' to the last ']', so two separate arrays cannot be recovered
        assert!(parse_response("[1] and [2]").is_err());
        assert_eq!(bracketed_span("x [a] y [b] z"), Some("[a] y [b]"));
        assert_eq!(bracketed_span("] backwards ["), None);
    }

    #[test]
    fn test_no_array() {
        let err = parse_response("I'm not sure what you mean.").unwrap_err();
        assert_eq!(err.to_string(), "Failed to process events");

        // A JSON object is not an event list
        assert!(parse_response(r#"{"summary":"A"}"#).is_err());
    }

    #[test]
    fn test_mapping() {
        let raw = json!({"summary": "Meeting", "start": "2024-09-25T09:00:00.000Z", "end": "2024-09-25T10:00"});
        let event = to_calendar_event(&raw, &utc());
        assert_eq!(event, CalendarEvent::new("Meeting", "2024-09-25T09:00:00", "2024-09-25T10:00:00"));
    }

    #[test]
    fn test_mapping_missing_fields() {
        let event = to_calendar_event(&json!({"summary": "Lunch"}), &utc());
        assert_eq!(event, CalendarEvent::new("Lunch", "", ""));

        let event = to_calendar_event(&json!({"summary": "Lunch", "start": "at noon", "end": 12}), &utc());
        assert_eq!(event, CalendarEvent::new("Lunch", "", ""));

        let event = to_calendar_event(&json!("not an object"), &utc());
        assert_eq!(event, CalendarEvent::new("", "", ""));
    }
}
