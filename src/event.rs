//! Calendar events

use serde::{Deserialize, Serialize};

/// A calendar event, as extracted from the user input.
///
/// `start` and `end` are ISO-8601 strings, usually without any UTC offset (see [`crate::time`]).
/// This type does not carry any identifier: a new one is generated every time the event is uploaded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarEvent {
    summary: String,
    start: String,
    end: String,
}

impl CalendarEvent {
    pub fn new<S: ToString, T: ToString, U: ToString>(summary: S, start: T, end: U) -> Self {
        Self {
            summary: summary.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}
