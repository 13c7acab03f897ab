//! The interactive session: gather events, have them confirmed, publish them

use chrono::{Locale, NaiveDate};

use crate::confirm::{confirm, is_yes, Prompter};
use crate::config::Config;
use crate::error::Result;
use crate::event::CalendarEvent;
use crate::extractor::Extractor;
use crate::ical::Serializer;
use crate::llm::LanguageModel;
use crate::publisher::{PublishReport, Publisher};
use crate::time::{Normalizer, TimeValue};
use crate::traits::CalendarPublisher;

pub const MODE_QUESTION: &str = "Do you want to use natural language input? (yes/no) ";
pub const SCHEDULE_QUESTION: &str = "Please describe your schedule for the day: ";
pub const SUMMARY_QUESTION: &str = "Event summary (leave empty to finish): ";
pub const START_QUESTION: &str = "Start (YYYY-MM-DDTHH:MM:SS): ";
pub const END_QUESTION: &str = "End (YYYY-MM-DDTHH:MM:SS): ";

/// How a session ended
#[derive(Debug)]
pub enum Outcome {
    Published(PublishReport),
    /// The user refused the extracted events
    Declined,
    /// No event was entered
    NothingToDo,
}

pub struct App<M: LanguageModel, T: CalendarPublisher> {
    extractor: Extractor<M>,
    publisher: Publisher<T>,
    normalizer: Normalizer,
    locale: Locale,
}

impl<M: LanguageModel, T: CalendarPublisher> App<M, T> {
    pub fn new(config: &Config, model: M, target: T) -> Self {
        let normalizer = Normalizer::new(config.timezone);
        let serializer = Serializer::new(normalizer, config.prod_id());
        Self {
            extractor: Extractor::new(model, normalizer),
            publisher: Publisher::new(target, serializer, normalizer, &config.backup_path),
            normalizer,
            locale: config.locale,
        }
    }

    pub fn publisher(&self) -> &Publisher<T> {
        &self.publisher
    }

    /// Run a full session. `today` is the date events default to.
    pub async fn run<P: Prompter + ?Sized>(&mut self, prompter: &mut P, today: NaiveDate) -> Result<Outcome> {
        let use_llm = is_yes(&prompter.ask_line(MODE_QUESTION)?);

        let events = if use_llm {
            let input = prompter.ask_line(SCHEDULE_QUESTION)?;
            let events = self.extractor.extract_events(&input, today).await?;
            if confirm(&events, prompter, self.locale)? == false {
                log::info!("Events not confirmed. Nothing will be added to the calendar.");
                return Ok(Outcome::Declined);
            }
            events
        } else {
            self.manual_entry(prompter)?
        };

        if events.is_empty() {
            log::info!("No events to add");
            return Ok(Outcome::NothingToDo);
        }

        log::info!("Processing {} events", events.len());
        let report = self.publisher.publish(events).await?;
        log::info!("All events have been processed ({} added, {} failed, {} invalid)",
            report.published.len(), report.failed.len(), report.rejected.len());
        Ok(Outcome::Published(report))
    }

    /// Ask for events one by one, until an empty summary is given
    fn manual_entry<P: Prompter + ?Sized>(&self, prompter: &mut P) -> Result<Vec<CalendarEvent>> {
        let mut events = Vec::new();
        loop {
            let summary = prompter.ask_line(SUMMARY_QUESTION)?;
            if summary.trim().is_empty() {
                break;
            }
            let start = self.read_time(prompter, START_QUESTION)?;
            let end = self.read_time(prompter, END_QUESTION)?;
            events.push(CalendarEvent::new(summary.trim(), start, end));
        }
        Ok(events)
    }

    /// Unreadable times are kept verbatim, so that validation can report them
    fn read_time<P: Prompter + ?Sized>(&self, prompter: &mut P, question: &str) -> Result<String> {
        let answer = prompter.ask_line(question)?;
        let answer = answer.trim();
        Ok(self.normalizer.normalize(&TimeValue::from(answer)).unwrap_or_else(|| answer.to_string()))
    }
}
