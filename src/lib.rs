//! This crate turns a free-text description of a day into events on a CalDAV calendar.
//!
//! The text is sent to a language model (see [`llm`]), whose answer is turned into [`CalendarEvent`]s by the [`extractor`]. \
//! Once the user has [`confirm`]ed them, events are [`validation`]-checked, serialized into iCal files (see [`ical`])
//! and uploaded by a [`Publisher`](publisher::Publisher), usually to a CalDAV server through a [`Client`](client::Client). \
//! A copy of every event is also kept in a local backup file.

pub mod traits;

pub mod calendar;
mod event;
pub use event::CalendarEvent;
pub mod error;
pub use error::Error;

pub mod app;
pub mod client;
pub mod config;
pub mod confirm;
pub mod extractor;
pub mod ical;
pub mod llm;
pub mod publisher;
pub mod resource;
pub mod time;
pub mod utils;
pub mod validation;
