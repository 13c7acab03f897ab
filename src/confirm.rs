//! Interactive confirmation of the extracted events

use std::io::{self, BufRead, Write};

use chrono::{Locale, TimeZone, Utc};
use colored::Colorize;

use crate::event::CalendarEvent;

/// Asks an operator a question, and returns the line they typed
pub trait Prompter {
    fn ask_line(&mut self, question: &str) -> io::Result<String>;
}

/// A [`Prompter`] that reads from the standard input.
///
/// Stdin is locked for the duration of a single question only.
#[derive(Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask_line(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        stdout.write_all(question.as_bytes())?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}

/// Whether an answer means "yes". Only a literal (case-insensitive) `yes` does.
pub fn is_yes(answer: &str) -> bool {
    answer.trim().to_lowercase() == "yes"
}

/// Short, locale-aware rendering of an ISO-8601 string. Unreadable strings are returned as-is.
pub fn localized_short(iso: &str, locale: Locale) -> String {
    match crate::time::parse_naive(iso) {
        None => iso.to_string(),
        Some(naive) => Utc.from_utc_datetime(&naive)
            .format_localized("%x %R", locale)
            .to_string(),
    }
}

/// One `summary: start - end` line per event
pub fn event_list(events: &[CalendarEvent], locale: Locale) -> String {
    events.iter()
        .map(|event| format!("{}: {} - {}",
            event.summary(),
            localized_short(event.start(), locale),
            localized_short(event.end(), locale)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Show the events and ask whether they should be added to the calendar.
///
/// Exactly one question is asked. Anything but `yes` is a refusal.
pub fn confirm<P: Prompter + ?Sized>(events: &[CalendarEvent], prompter: &mut P, locale: Locale) -> io::Result<bool> {
    let list = event_list(events, locale);
    log::info!("\n=== Events to be Confirmed ===\n{}\n================================", list);

    println!("{}", "\nThe following events have been generated based on your input:".cyan());
    println!("{}", list.green());
    println!("{}", "\n================================".cyan());

    let question = "\nDo you want to add these events to your calendar? (yes/no) ".yellow().to_string();
    let answer = prompter.ask_line(&question)?;
    Ok(is_yes(&answer))
}
