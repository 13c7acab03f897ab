//! This module provides a client to connect to a CalDAV server

use std::convert::TryFrom;
use std::error::Error;

use async_trait::async_trait;
use minidom::Element;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use url::Url;
use uuid::Uuid;

use crate::calendar::remote_calendar::RemoteCalendar;
use crate::calendar::SupportedComponents;
use crate::error::{transport_init_error, Result as DaybookResult};
use crate::resource::Resource;
use crate::traits::CalendarPublisher;
use crate::utils::{find_elem, find_elems};


static DAVCLIENT_BODY: &str = r#"
    <d:propfind xmlns:d="DAV:">
       <d:prop>
           <d:current-user-principal />
       </d:prop>
    </d:propfind>
"#;

static HOMESET_BODY: &str = r#"
    <d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav" >
      <d:self/>
      <d:prop>
        <c:calendar-home-set />
      </d:prop>
    </d:propfind>
"#;

static CAL_BODY: &str = r#"
    <d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav" >
       <d:prop>
         <d:displayname />
         <d:resourcetype />
         <c:supported-calendar-component-set />
       </d:prop>
    </d:propfind>
"#;


pub(crate) async fn sub_request(resource: &Resource, method: &str, body: String, depth: u32) -> Result<String, Box<dyn Error>> {
    let method = Method::from_bytes(method.as_bytes())?;

    let res = reqwest::Client::new()
        .request(method, resource.url().clone())
        .header("Depth", depth)
        .header(CONTENT_TYPE, "application/xml")
        .basic_auth(resource.username(), Some(resource.password()))
        .body(body)
        .send()
        .await?;

    if res.status().is_success() == false {
        return Err(format!("Unexpected HTTP status code {:?}", res.status()).into());
    }

    let text = res.text().await?;
    Ok(text)
}

async fn sub_request_and_extract_elem(resource: &Resource, body: String, items: &[&str]) -> Result<String, Box<dyn Error>> {
    let text = sub_request(resource, "PROPFIND", body, 0).await?;
    extract_elem(&text, items)
}

/// Walks down a multistatus reply, following the successive element names in `items`
fn extract_elem(xml: &str, items: &[&str]) -> Result<String, Box<dyn Error>> {
    let root: Element = xml.parse()?;
    let mut current_element: &Element = &root;
    for item in items {
        current_element = match find_elem(current_element, item) {
            Some(elem) => elem,
            None => return Err(format!("missing element {}", item).into()),
        }
    }

    Ok(current_element.text())
}

/// Extract the calendars out of a `PROPFIND` reply on a calendar home set.
///
/// Collections that are not calendars, and the root calendar collection, are skipped.
pub fn parse_calendars(xml: &str, base: &Resource) -> Result<Vec<RemoteCalendar>, Box<dyn Error>> {
    let root: Element = xml.parse()?;
    let reps = find_elems(&root, "response");
    let mut calendars = Vec::new();
    for rep in reps {
        let display_name = find_elem(rep, "displayname").map(|e| e.text()).unwrap_or("<no name>".to_string());
        log::debug!("Considering calendar {}", display_name);

        // We filter out non-calendar items
        let resource_types = match find_elem(rep, "resourcetype") {
            None => continue,
            Some(rt) => rt,
        };
        let found_calendar_type = resource_types.children().any(|rt| rt.name() == "calendar");
        if found_calendar_type == false {
            continue;
        }

        // We filter out the root calendar collection, that has an empty supported-calendar-component-set
        let el_supported_comps = match find_elem(rep, "supported-calendar-component-set") {
            None => continue,
            Some(comps) => comps,
        };
        if el_supported_comps.children().count() == 0 {
            continue;
        }

        let calendar_href = match find_elem(rep, "href") {
            None => {
                log::warn!("Calendar {} has no URL! Ignoring it.", display_name);
                continue;
            },
            Some(h) => h.text(),
        };

        let this_calendar_url = base.combine(&calendar_href);

        let supported_components = match SupportedComponents::try_from(el_supported_comps.clone()) {
            Err(err) => {
                log::warn!("Calendar {} has invalid supported components ({})! Ignoring it.", display_name, err);
                continue;
            },
            Ok(sc) => sc,
        };
        let this_calendar = RemoteCalendar::new(display_name, this_calendar_url, supported_components);
        log::info!("Found calendar {}", this_calendar.name());
        calendars.push(this_calendar);
    }

    Ok(calendars)
}


/// A CalDAV client, that uploads events into a single calendar
pub struct Client {
    resource: Resource,
    calendar_name: String,

    /// Filled by [`Client::discover`]
    calendars: Option<Vec<RemoteCalendar>>,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>, T: ToString, U: ToString, V: ToString>(url: S, username: T, password: U, calendar_name: V) -> Result<Self, Box<dyn Error>> {
        let url = Url::parse(url.as_ref())?;

        Ok(Self{
            resource: Resource::new(url, username.to_string(), password.to_string()),
            calendar_name: calendar_name.to_string(),
            calendars: None,
        })
    }

    /// Return the Principal URL
    async fn get_principal(&self) -> Result<Resource, Box<dyn Error>> {
        let href = sub_request_and_extract_elem(&self.resource, DAVCLIENT_BODY.into(), &["current-user-principal", "href"]).await?;
        let principal_url = self.resource.combine(&href);
        log::debug!("Principal URL is {}", href);
        Ok(principal_url)
    }

    /// Return the Homeset URL
    async fn get_cal_home_set(&self) -> Result<Resource, Box<dyn Error>> {
        let principal_url = self.get_principal().await?;

        let href = sub_request_and_extract_elem(&principal_url, HOMESET_BODY.into(), &["calendar-home-set", "href"]).await?;
        let chs_url = self.resource.combine(&href);
        log::debug!("Calendar home set URL is {:?}", chs_url.url().path());
        Ok(chs_url)
    }

    async fn fetch_calendars(&self) -> Result<Vec<RemoteCalendar>, Box<dyn Error>> {
        let cal_home_set = self.get_cal_home_set().await?;
        let text = sub_request(&cal_home_set, "PROPFIND", CAL_BODY.into(), 1).await?;
        parse_calendars(&text, &self.resource)
    }

    /// Discover the calendars of the account, and check the configured one exists
    pub async fn discover(&mut self) -> DaybookResult<()> {
        log::info!("Initializing CalDAV client...");
        let calendars = match self.fetch_calendars().await {
            Ok(cals) => cals,
            Err(err) => {
                log::error!("Unable to fetch calendars from {}: {}", self.resource.url(), err);
                return Err(transport_init_error(format!("Unable to fetch calendars: {}", err)));
            },
        };
        log::info!("Fetched {} calendars.", calendars.len());
        self.calendars = Some(calendars);

        let calendar = self.calendar()?;
        log::info!("Selected calendar: {}", calendar.name());
        if calendar.supported_components().contains(SupportedComponents::EVENT) == false {
            log::warn!("Calendar {} does not advertise support for events", calendar.name());
        }
        Ok(())
    }

    /// The calendars found by [`Client::discover`]
    pub fn list_calendars(&self) -> DaybookResult<&[RemoteCalendar]> {
        match &self.calendars {
            None => Err(transport_init_error("CalDAV client not initialized or calendars not fetched.")),
            Some(cals) => Ok(cals),
        }
    }

    /// The calendar events are uploaded to
    pub fn calendar(&self) -> DaybookResult<&RemoteCalendar> {
        select_calendar(self.list_calendars()?, &self.calendar_name)
    }
}

/// Pick a calendar by its display name
pub fn select_calendar<'a>(calendars: &'a [RemoteCalendar], name: &str) -> DaybookResult<&'a RemoteCalendar> {
    calendars.iter()
        .find(|cal| cal.name() == name)
        .ok_or_else(|| transport_init_error(format!("Calendar '{}' not found.", name)))
}

#[async_trait]
impl CalendarPublisher for Client {
    async fn init(&mut self) -> DaybookResult<()> {
        self.discover().await
    }

    async fn add_event(&mut self, ical_text: String, file_name: &str) -> Result<(), Box<dyn Error>> {
        let calendar = self.calendar()?.clone();
        let event_uid = Uuid::new_v4().to_hyphenated().to_string();

        log::info!("Attempting to add event with filename: {}", file_name);
        log::debug!("Event data: {}", ical_text);

        let status = calendar.put_item(ical_text, &format!("{}.ics", event_uid)).await?;
        if status.is_success() {
            log::info!("Event successfully added with UID: {}", event_uid);
            Ok(())
        } else {
            log::warn!("Unexpected response status {} when adding event: {}", status, file_name);
            Err(format!("Unexpected HTTP status code {:?}", status).into())
        }
    }
}
