//! per-instance overrides for known-bad registered data. the engine's
//! algorithms stay generic; anything true of only one service or journey
//! lives here as data, loaded from JSON alongside the other collaborators.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::TimetableError;

fn default_stitch_columns() -> usize {
    2
}

/// one kind of override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fix {
    /// replace a journey's departure time, optionally only when the
    /// registered time matches `expected`.
    DepartureTime {
        #[serde(default)]
        expected: Option<NaiveTime>,
        departure_time: NaiveTime,
    },
    /// rewrite the start of a non-operation date range registered with the
    /// wrong year.
    NonOperationStart { expected: NaiveDate, start: NaiveDate },
    /// hide a service's journeys departing after this time, whatever their
    /// profiles say.
    HideAfter { time: NaiveTime },
    /// copy the first `columns` entries of the row at `stop_code` into the
    /// preceding row when that row is blank there.
    StitchRow {
        stop_code: String,
        #[serde(default = "default_stitch_columns")]
        columns: usize,
    },
    /// assign patterns whose route description equals `route_description`
    /// to their own grouping instead of the direction's shared one.
    ForkGrouping {
        route_description: String,
        key: String,
        direction: String,
        description_parts: Vec<String>,
    },
}

/// a fix scoped to a service and/or a journey. an absent code matches
/// anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    #[serde(default)]
    pub service_code: Option<String>,
    #[serde(default)]
    pub journey_code: Option<String>,
    #[serde(flatten)]
    pub fix: Fix,
}

impl CorrectionEntry {
    fn applies_to(&self, service_code: Option<&str>, journey_code: Option<&str>) -> bool {
        let service_matches = self
            .service_code
            .as_deref()
            .map_or(true, |code| Some(code) == service_code);
        let journey_matches = self
            .journey_code
            .as_deref()
            .map_or(true, |code| Some(code) == journey_code);
        service_matches && journey_matches
    }
}

/// the override table. lookups scan in file order and the first matching
/// entry wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corrections {
    entries: Vec<CorrectionEntry>,
}

impl Corrections {
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Corrections, TimetableError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// corrected departure time for a journey, if an entry matches.
    pub fn departure_time(
        &self,
        service_code: &str,
        journey_code: &str,
        current: NaiveTime,
    ) -> Option<NaiveTime> {
        self.entries.iter().find_map(|entry| match &entry.fix {
            Fix::DepartureTime {
                expected,
                departure_time,
            } if entry.applies_to(Some(service_code), Some(journey_code))
                && expected.map_or(true, |expected| expected == current) =>
            {
                Some(*departure_time)
            }
            _ => None,
        })
    }

    /// corrected start for a non-operation range currently starting at
    /// `current`, if an entry matches.
    pub fn non_operation_start(
        &self,
        service_code: &str,
        journey_code: &str,
        current: NaiveDate,
    ) -> Option<NaiveDate> {
        self.entries.iter().find_map(|entry| match &entry.fix {
            Fix::NonOperationStart { expected, start }
                if entry.applies_to(Some(service_code), Some(journey_code))
                    && *expected == current =>
            {
                Some(*start)
            }
            _ => None,
        })
    }

    /// curfew time for a service, if an entry matches. journey-scoped
    /// entries are ignored here.
    pub fn hide_after(&self, service_code: &str) -> Option<NaiveTime> {
        self.entries.iter().find_map(|entry| match &entry.fix {
            Fix::HideAfter { time } if entry.applies_to(Some(service_code), None) => Some(*time),
            _ => None,
        })
    }

    /// all row stitches for a service, as (stop code, column count) pairs.
    pub fn stitches(&self, service_code: &str) -> Vec<(&str, usize)> {
        self.entries
            .iter()
            .filter_map(|entry| match &entry.fix {
                Fix::StitchRow { stop_code, columns }
                    if entry.applies_to(Some(service_code), None) =>
                {
                    Some((stop_code.as_str(), *columns))
                }
                _ => None,
            })
            .collect()
    }

    /// grouping assignment for a forked route, as (grouping key, direction,
    /// description parts).
    pub fn fork(
        &self,
        service_code: &str,
        route_description: &str,
    ) -> Option<(&str, &str, &[String])> {
        self.entries.iter().find_map(|entry| match &entry.fix {
            Fix::ForkGrouping {
                route_description: wanted,
                key,
                direction,
                description_parts,
            } if entry.applies_to(Some(service_code), None) && wanted == route_description => {
                Some((key.as_str(), direction.as_str(), description_parts.as_slice()))
            }
            _ => None,
        })
    }
}
