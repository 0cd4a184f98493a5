//! Upcoming financial events for held positions.
//!
//! Provides the event types and the builder that lays them out as a
//! date-ordered calendar from current ticker data.

mod event_calendar;
mod events_model;

pub use event_calendar::build_event_calendar;
pub use events_model::*;
