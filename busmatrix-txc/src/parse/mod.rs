//! reading TransXChange documents: the streaming reader, its element tree,
//! and the small text and duration parsers the model layers share.
mod document_reader;
mod duration_ops;
mod element;
pub mod text_ops;

pub use document_reader::{
    read_document, RawPattern, RawService, RawStopUsage, RawTimingLink, RawVehicleJourney,
    TransXChangeDocument,
};
pub use duration_ops::{parse_duration, DurationParseError};
pub use element::{read_subtree, Element};

pub(crate) use element::element_from_start;
