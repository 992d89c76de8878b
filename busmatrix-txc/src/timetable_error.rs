use crate::parse::DurationParseError;

#[derive(thiserror::Error, Debug)]
pub enum TimetableError {
    #[error("Malformed TransXChange document: {0}")]
    MalformedDocumentError(String),
    #[error("Unable to read '{0}' as a date: {1}")]
    InvalidDateError(String, String),
    #[error("Unable to read '{0}' as a time of day: {1}")]
    InvalidTimeError(String, String),
    #[error(transparent)]
    DurationError(#[from] DurationParseError),
    #[error(transparent)]
    XmlError(#[from] quick_xml::Error),
    #[error(transparent)]
    CsvError(#[from] csv::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Failure building timetable grid: {0}")]
    TableError(String),
    #[error("Error: {0}")]
    OtherError(String),
}
