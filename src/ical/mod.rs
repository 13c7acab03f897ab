//! This module handles conversion from events to iCal files
//!
//! It is a wrapper around the `ics` crate, which does the actual RFC5545 formatting.

mod builder;
pub use builder::Serializer;
pub use builder::filename_for;
