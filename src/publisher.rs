//! Publication of a batch of events: upload to a calendar, and local backup

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::event::CalendarEvent;
use crate::ical::{filename_for, Serializer};
use crate::time::Normalizer;
use crate::traits::CalendarPublisher;

/// What happened to a batch of events
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Events that did not pass validation
    pub rejected: Vec<(CalendarEvent, Error)>,
    /// File names of the events that have been uploaded
    pub published: Vec<String>,
    /// Events that could not be serialized or uploaded
    pub failed: Vec<Error>,
    /// Where the backup has been written, if it has
    pub backup_path: Option<PathBuf>,
}

impl PublishReport {
    /// Whether every event made it to the calendar
    pub fn is_success(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty() && self.published.is_empty() == false
    }
}

/// Uploads events one at a time, then writes all of them to a backup file
pub struct Publisher<P: CalendarPublisher> {
    target: P,
    serializer: Serializer,
    normalizer: Normalizer,
    backup_path: PathBuf,
}

impl<P: CalendarPublisher> Publisher<P> {
    pub fn new<Q: AsRef<Path>>(target: P, serializer: Serializer, normalizer: Normalizer, backup_path: Q) -> Self {
        Self {
            target,
            serializer,
            normalizer,
            backup_path: backup_path.as_ref().to_path_buf(),
        }
    }

    pub fn target(&self) -> &P {
        &self.target
    }

    /// Validate, upload and back up a batch of events.
    ///
    /// Invalid events are dropped, and an upload failure does not prevent the next events from being uploaded.
    /// Only a failure to initialize the target is returned as an error.
    pub async fn publish(&mut self, events: Vec<CalendarEvent>) -> Result<PublishReport> {
        let (valid, rejected) = crate::validation::validate(events);
        let mut report = PublishReport { rejected, ..PublishReport::default() };

        if valid.is_empty() {
            log::error!("No valid events to process");
            return Ok(report);
        }

        for duplicate in find_duplicates(&valid) {
            log::warn!("Event '{}' ({} - {}) appears more than once in this batch, and will be added several times",
                duplicate.summary(), duplicate.start(), duplicate.end());
        }

        self.target.init().await?;

        for event in &valid {
            match self.publish_one(event).await {
                Ok(filename) => report.published.push(filename),
                Err(err) => {
                    log::error!("{}", err);
                    report.failed.push(err);
                },
            }
        }

        report.backup_path = self.write_backup(&valid);
        Ok(report)
    }

    async fn publish_one(&mut self, event: &CalendarEvent) -> Result<String> {
        let serialization_error = |err: Box<dyn std::error::Error>| Error::Serialization {
            summary: event.summary().to_string(),
            reason: err.to_string(),
        };
        let filename = filename_for(event, &self.normalizer).map_err(serialization_error)?;
        let ical_text = self.serializer.build_from(event, &Uuid::new_v4()).map_err(serialization_error)?;

        let outcome = self.target.add_event(ical_text, &filename).await
            .map_err(|err| err.to_string());
        match outcome {
            Ok(()) => Ok(filename),
            Err(reason) => Err(Error::Publish { filename, reason }),
        }
    }

    /// Overwrite the backup file with every event of the batch.
    /// Failures are logged only.
    fn write_backup(&self, events: &[CalendarEvent]) -> Option<PathBuf> {
        let content = self.serializer.build_calendar(events);
        match std::fs::write(&self.backup_path, content) {
            Ok(()) => {
                log::info!("ICS file generated successfully: {}", self.backup_path.display());
                Some(self.backup_path.clone())
            },
            Err(err) => {
                log::error!("Error writing ICS file {}: {}", self.backup_path.display(), err);
                None
            },
        }
    }
}

/// Events that appear more than once, in order of their second appearance
pub fn find_duplicates(events: &[CalendarEvent]) -> Vec<&CalendarEvent> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    events.iter()
        .filter(|event| seen.insert(*event) == false && reported.insert(*event))
        .collect()
}
