//! Shape checks on events, before they are serialized

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use crate::error::Error;
use crate::event::CalendarEvent;

/// The reason an event was rejected
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingSummary,
    InvalidStart(String),
    InvalidEnd(String),
    /// `end` is not strictly after `start`
    NonPositiveDuration { start: String, end: String },
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::MissingSummary => write!(f, "\"summary\" is not allowed to be empty"),
            Self::InvalidStart(s) => write!(f, "\"start\" must be in ISO 8601 date format (got {:?})", s),
            Self::InvalidEnd(s) => write!(f, "\"end\" must be in ISO 8601 date format (got {:?})", s),
            Self::NonPositiveDuration { start, end } => write!(f, "\"end\" ({}) must be after \"start\" ({})", end, start),
        }
    }
}

/// Check a single event. The first issue found is returned.
pub fn check(event: &CalendarEvent) -> Result<(), ValidationIssue> {
    if event.summary().trim().is_empty() {
        return Err(ValidationIssue::MissingSummary);
    }
    if !crate::time::is_iso_date(event.start()) {
        return Err(ValidationIssue::InvalidStart(event.start().to_string()));
    }
    if !crate::time::is_iso_date(event.end()) {
        return Err(ValidationIssue::InvalidEnd(event.end().to_string()));
    }
    match crate::time::compare(event.start(), event.end()) {
        Some(Ordering::Less) => Ok(()),
        _ => Err(ValidationIssue::NonPositiveDuration {
            start: event.start().to_string(),
            end: event.end().to_string(),
        }),
    }
}

/// Split a batch into valid events and rejected ones.
///
/// Rejected events are logged, the order of valid events is preserved.
pub fn validate(events: Vec<CalendarEvent>) -> (Vec<CalendarEvent>, Vec<(CalendarEvent, Error)>) {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();

    for event in events {
        match check(&event) {
            Ok(()) => valid.push(event),
            Err(issue) => {
                let err = Error::Validation { summary: event.summary().to_string(), issue };
                log::error!("{}", err);
                rejected.push((event, err));
            },
        }
    }

    (valid, rejected)
}
