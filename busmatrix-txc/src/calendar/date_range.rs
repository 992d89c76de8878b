use std::fmt::Display;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::parse::Element;
use crate::TimetableError;

/// inclusive span of calendar days. an open range has no end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && self.end.map_or(true, |end| end >= date)
    }

    pub(crate) fn from_element(element: &Element) -> Result<DateRange, TimetableError> {
        let start = element.find_text("StartDate").ok_or_else(|| {
            TimetableError::MalformedDocumentError("DateRange without a StartDate".to_string())
        })?;
        Ok(DateRange {
            start: parse_date(start)?,
            end: element.find_text("EndDate").map(parse_date).transpose()?,
        })
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) if end == self.start => write!(f, "{}", self.start.format("%-d %B %Y")),
            Some(end) => write!(f, "{} to {}", self.start, end),
            None => write!(f, "from {}", self.start),
        }
    }
}

pub(crate) fn parse_date(text: &str) -> Result<NaiveDate, TimetableError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| TimetableError::InvalidDateError(text.to_string(), e.to_string()))
}

/// the period a service is registered to run, described in prose relative to
/// a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingPeriod(pub DateRange);

impl OperatingPeriod {
    pub(crate) fn from_element(element: &Element) -> Result<OperatingPeriod, TimetableError> {
        DateRange::from_element(element).map(OperatingPeriod)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(date)
    }

    /// a phrase like `from 23 July to 2 September 2017`, or an empty string
    /// for long-running periods already under way.
    pub fn describe(&self, today: NaiveDate) -> String {
        let start = self.0.start;
        if let Some(end) = self.0.end {
            if end == start {
                return format!("on {}", start.format("%-d %B %Y"));
            }
        }
        if start > today {
            return match self.0.end {
                Some(end) if end.year() <= today.year() + 1 => {
                    let start_text = if start.year() == end.year() && start.month() == end.month()
                    {
                        start.format("%-d").to_string()
                    } else if start.year() == end.year() {
                        start.format("%-d %B").to_string()
                    } else {
                        start.format("%-d %B %Y").to_string()
                    };
                    format!("from {} to {}", start_text, end.format("%-d %B %Y"))
                }
                _ => format!("from {}", start.format("%-d %B %Y")),
            };
        }
        match self.0.end {
            Some(end) if (end - start).num_days() < 7 => {
                format!("until {}", end.format("%-d %B %Y"))
            }
            _ => String::new(),
        }
    }
}
