//! A module to build iCal files

use std::error::Error;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use ics::parameters::TzIDParam;
use ics::properties::{DtEnd, DtStart, Summary};
use ics::components::Property;
use ics::ICalendar;
use uuid::Uuid;

use crate::event::CalendarEvent;
use crate::time::Normalizer;

/// Turns [`CalendarEvent`]s into iCal documents, in a given timezone
#[derive(Clone, Debug)]
pub struct Serializer {
    normalizer: Normalizer,
    prod_id: String,
}

impl Serializer {
    pub fn new<S: ToString>(normalizer: Normalizer, prod_id: S) -> Self {
        Self { normalizer, prod_id: prod_id.to_string() }
    }

    pub fn prod_id(&self) -> &str {
        &self.prod_id
    }

    /// A `VCALENDAR` that contains this single event
    pub fn build_from(&self, event: &CalendarEvent, uid: &Uuid) -> Result<String, Box<dyn Error>> {
        let s_now = format_date_time(&Utc::now());
        let mut calendar = self.new_calendar();
        calendar.add_event(self.build_event(event, uid, &s_now)?);
        Ok(calendar.to_string())
    }

    /// A `VCALENDAR` that contains every event, each with a fresh UID.
    ///
    /// Events whose times cannot be read are logged and left out, the others are still written.
    pub fn build_calendar(&self, events: &[CalendarEvent]) -> String {
        let s_now = format_date_time(&Utc::now());
        let mut calendar = self.new_calendar();

        for event in events {
            match self.build_event(event, &Uuid::new_v4(), &s_now) {
                Ok(vevent) => calendar.add_event(vevent),
                Err(err) => log::error!("Leaving event '{}' out of the calendar: {}", event.summary(), err),
            }
        }

        calendar.to_string()
    }

    fn new_calendar(&self) -> ICalendar<'static> {
        let mut calendar = ICalendar::new("2.0", self.prod_id.clone());
        calendar.push(Property::new("X-WR-TIMEZONE", self.normalizer.timezone().name().to_string()));
        calendar
    }

    fn build_event(&self, event: &CalendarEvent, uid: &Uuid, s_now: &str) -> Result<ics::Event<'static>, Box<dyn Error>> {
        let timezone = self.normalizer.timezone();
        let start = self.zoned(event.start(), "start", event)?;
        let end = self.zoned(event.end(), "end", event)?;

        let mut vevent = ics::Event::new(uid.to_hyphenated().to_string(), s_now.to_string());
        vevent.push(Summary::new(event.summary().to_string()));
        vevent.push(zoned_property(DtStart::new(format_zoned(&start)), timezone));
        vevent.push(zoned_property(DtEnd::new(format_zoned(&end)), timezone));
        Ok(vevent)
    }

    fn zoned(&self, value: &str, field: &str, event: &CalendarEvent) -> Result<DateTime<Tz>, Box<dyn Error>> {
        self.normalizer.to_zoned(value)
            .ok_or_else(|| format!("Invalid {} time {:?} for event '{}'", field, value, event.summary()).into())
    }
}

/// Attach a `TZID` to a date-time property, unless times are written in UTC
fn zoned_property<'a, P: Into<Property<'a>>>(property: P, timezone: Tz) -> Property<'a> {
    let mut property = property.into();
    if timezone != chrono_tz::UTC {
        property.add(TzIDParam::new(timezone.name().to_string()));
    }
    property
}

fn format_zoned(dt: &DateTime<Tz>) -> String {
    if dt.timezone() == chrono_tz::UTC {
        format_date_time(&dt.with_timezone(&Utc))
    } else {
        dt.format("%Y%m%dT%H%M%S").to_string()
    }
}

fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// A filesystem-safe name for the iCal file of an event, e.g. `20240925T090000-Team-meeting.ics`
pub fn filename_for(event: &CalendarEvent, normalizer: &Normalizer) -> Result<String, Box<dyn Error>> {
    let start = normalizer.to_zoned(event.start())
        .ok_or_else(|| format!("Invalid start time {:?} for event '{}'", event.start(), event.summary()))?;
    let stamp: String = start.format("%Y-%m-%dT%H:%M:%S").to_string()
        .chars()
        .filter(|c| !matches!(c, ':' | '.' | '-'))
        .collect();
    let summary = event.summary().split_whitespace().collect::<Vec<_>>().join("-");

    Ok(sanitize_filename::sanitize(format!("{}-{}.ics", stamp, summary)))
}


#[cfg(test)]
mod tests {
    use super::*;

    const PROD_ID: &str = "-//Your Company//Your Product//EN";

    fn meeting() -> CalendarEvent {
        CalendarEvent::new("Meeting with ÜTF-8 characters", "2024-09-25T09:00:00", "2024-09-25T10:00:00")
    }

    #[test]
    fn test_ical_from_event_in_utc() {
        let serializer = Serializer::new(Normalizer::new(chrono_tz::UTC), PROD_ID);
        let uid = Uuid::new_v4();

        let ical = serializer.build_from(&meeting(), &uid).unwrap();

        assert!(ical.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Your Company//Your Product//EN\r\n"));
        assert!(ical.contains("X-WR-TIMEZONE:UTC\r\n"));
        assert!(ical.contains(&format!("UID:{}\r\n", uid.to_hyphenated())));
        assert!(ical.contains("SUMMARY:Meeting with ÜTF-8 characters\r\n"));
        assert!(ical.contains("DTSTART:20240925T090000Z\r\n"));
        assert!(ical.contains("DTEND:20240925T100000Z\r\n"));
        assert!(ical.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
    }

    #[test]
    fn test_ical_from_event_with_tzid() {
        let serializer = Serializer::new(Normalizer::new(chrono_tz::Europe::Helsinki), PROD_ID);
        let ical = serializer.build_from(&meeting(), &Uuid::new_v4()).unwrap();

        assert!(ical.contains("DTSTART;TZID=Europe/Helsinki:20240925T090000\r\n"));
        assert!(ical.contains("DTEND;TZID=Europe/Helsinki:20240925T100000\r\n"));
    }

    #[test]
    fn test_ical_with_several_events() {
        let serializer = Serializer::new(Normalizer::new(chrono_tz::UTC), PROD_ID);
        let events = vec![
            meeting(),
            CalendarEvent::new("Workout", "2024-09-25T11:00:00", "2024-09-25T12:00:00"),
        ];
        let ical = serializer.build_calendar(&events);

        assert_eq!(ical.matches("BEGIN:VEVENT").count(), 2);
        assert_eq!(ical.matches("BEGIN:VCALENDAR").count(), 1);
        assert!(ical.contains("SUMMARY:Workout\r\n"));
    }

    #[test]
    fn test_invalid_time() {
        let serializer = Serializer::new(Normalizer::new(chrono_tz::UTC), PROD_ID);
        let event = CalendarEvent::new("Broken", "", "2024-09-25T10:00:00");
        assert!(serializer.build_from(&event, &Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_unreadable_event_is_left_out_of_the_calendar() {
        let _ = env_logger::builder().is_test(true).try_init();
        let serializer = Serializer::new(Normalizer::new(chrono_tz::UTC), PROD_ID);
        let events = vec![
            meeting(),
            CalendarEvent::new("Broken", "whenever", "2024-09-25T10:00:00"),
            CalendarEvent::new("Workout", "2024-09-25T11:00:00", "2024-09-25T12:00:00"),
        ];
        let ical = serializer.build_calendar(&events);

        assert_eq!(ical.matches("BEGIN:VEVENT").count(), 2);
        assert!(ical.contains("SUMMARY:Workout\r\n"));
        assert!(!ical.contains("SUMMARY:Broken"));
    }

    #[test]
    fn test_ical_on_dst_days() {
        let serializer = Serializer::new(Normalizer::new(chrono_tz::America::New_York), PROD_ID);

        // 02:30 does not exist on this day, clocks jump from 02:00 to 03:00
        let gap = CalendarEvent::new("Gap", "2024-03-10T02:30:00", "2024-03-10T04:00:00");
        let ical = serializer.build_from(&gap, &Uuid::new_v4()).unwrap();
        assert!(ical.contains("DTSTART;TZID=America/New_York:20240310T033000\r\n"));
        assert!(ical.contains("DTEND;TZID=America/New_York:20240310T040000\r\n"));

        // 01:30 happens twice on this day
        let overlap = CalendarEvent::new("Overlap", "2024-11-03T01:30:00", "2024-11-03T02:30:00");
        let ical = serializer.build_from(&overlap, &Uuid::new_v4()).unwrap();
        assert!(ical.contains("DTSTART;TZID=America/New_York:20241103T013000\r\n"));
    }

    #[test]
    fn test_filename_on_dst_gap() {
        let normalizer = Normalizer::new(chrono_tz::America::New_York);
        let event = CalendarEvent::new("Gap", "2024-03-10T02:30:00", "2024-03-10T04:00:00");
        assert_eq!(filename_for(&event, &normalizer).unwrap(), "20240310T033000-Gap.ics");
    }

    #[test]
    fn test_filename() {
        let normalizer = Normalizer::new(chrono_tz::UTC);
        let event = CalendarEvent::new("Take  Ava to school", "2024-10-25T07:30:00", "2024-10-25T08:00:00");
        assert_eq!(filename_for(&event, &normalizer).unwrap(), "20241025T073000-Take-Ava-to-school.ics");
    }

    #[test]
    fn test_filename_is_safe() {
        let normalizer = Normalizer::new(chrono_tz::UTC);
        let event = CalendarEvent::new("../../etc/passwd or a:b", "2024-10-25T07:30:00", "2024-10-25T08:00:00");
        let filename = filename_for(&event, &normalizer).unwrap();
        assert!(!filename.contains('/'));
        assert!(!filename.contains(':'));
        assert!(filename.ends_with(".ics"));
    }
}
