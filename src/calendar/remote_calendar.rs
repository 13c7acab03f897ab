use std::error::Error;

use reqwest::StatusCode;
use reqwest::{header::CONTENT_TYPE, header::CONTENT_LENGTH};

use crate::calendar::CalendarId;
use crate::calendar::SupportedComponents;
use crate::resource::Resource;

/// A CalDAV calendar discovered by a [`Client`](crate::client::Client).
#[derive(Clone, Debug)]
pub struct RemoteCalendar {
    name: String,
    resource: Resource,
    supported_components: SupportedComponents,
}

impl RemoteCalendar {
    pub fn new(name: String, resource: Resource, supported_components: SupportedComponents) -> Self {
        Self { name, resource, supported_components }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn id(&self) -> &CalendarId { self.resource.url() }
    pub fn supported_components(&self) -> SupportedComponents {
        self.supported_components
    }

    /// Upload an iCal document as `<calendar URL>/<file_name>`, and return the HTTP status of the server reply
    pub async fn put_item(&self, ical_text: String, file_name: &str) -> Result<StatusCode, Box<dyn Error>> {
        let item = self.resource.child(file_name)?;

        let response = reqwest::Client::new()
            .put(item.url().clone())
            .header("If-None-Match", "*")
            .header(CONTENT_TYPE, "text/calendar; charset=utf-8")
            .header(CONTENT_LENGTH, ical_text.len())
            .basic_auth(self.resource.username(), Some(self.resource.password()))
            .body(ical_text)
            .send()
            .await?;

        let status = response.status();
        log::info!("Server response status: {}", status);
        let text = response.text().await?;
        log::debug!("Server response: {}", text);

        Ok(status)
    }
}
