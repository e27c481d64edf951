//! Error taxonomy for event parsing.
//!
//! Two tiers: [`EventParsingError`] is recoverable (the offending event is
//! logged and dropped, rendering continues), [`EventLogError`] is fatal (the
//! whole document is unusable).

use thiserror::Error;

/// A single event could not be parsed. The event is skipped.
#[derive(Debug, Error)]
pub enum EventParsingError {
    #[error("failed to parse event {eventname}: missing XML subelement: {name}")]
    MissingSubElement { eventname: String, name: String },

    #[error("failed to parse event {0}: unknown event")]
    UnknownEvent(String),

    #[error("failed to parse event {eventname}: unknown shape '{shape}'")]
    UnknownShape { eventname: String, shape: String },

    #[error("shape {shape} in {eventname} with status {status} is invalid: no dataPoints")]
    ShapeNoDataPoints {
        eventname: String,
        shape: String,
        status: String,
    },

    #[error("failed to parse event {eventname}: bad number in {name}: {value:?}")]
    InvalidNumber {
        eventname: String,
        name: String,
        value: String,
    },

    #[error("failed to parse event {eventname}: bad JSON in {name}: {source}")]
    InvalidJson {
        eventname: String,
        name: String,
        source: serde_json::Error,
    },

    #[error("failed to parse event {eventname}: unknown shape status {status:?}")]
    UnknownShapeStatus { eventname: String, status: String },
}

/// The whole events document is unusable; rendering aborts before it starts.
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("could not read events file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse events XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("events XML has malformed attributes: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("event element is missing the {0} attribute")]
    MissingAttribute(&'static str),

    #[error("event timestamp is not an integer: {0:?}")]
    BadTimestamp(String),

    #[error("recording length could not be determined (no events)")]
    NoEvents,
}
