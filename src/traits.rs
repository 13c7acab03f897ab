use std::error::Error;

use async_trait::async_trait;

/// Something iCal documents can be uploaded to, usually a CalDAV calendar
#[async_trait]
pub trait CalendarPublisher: Send {
    /// Get ready to receive events (e.g. discover the remote calendar).
    ///
    /// A failure here is fatal for the whole batch, and should be a [`crate::error::Error::TransportInit`].
    async fn init(&mut self) -> crate::error::Result<()> {
        Ok(())
    }

    /// Store a single iCal document.
    ///
    /// `file_name` describes the document in logs; implementors are free to store it under another name.
    async fn add_event(&mut self, ical_text: String, file_name: &str) -> Result<(), Box<dyn Error>>;
}
