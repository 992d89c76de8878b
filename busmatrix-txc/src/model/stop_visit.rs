use std::sync::Arc;

use chrono::Duration;
use crate::matrix::RowId;
use crate::model::Stop;

/// what the vehicle does at a stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activity {
    #[default]
    PickUpAndSetDown,
    PickUp,
    SetDown,
    Pass,
}

impl Activity {
    pub fn from_code(code: &str) -> Activity {
        match code {
            "pickUp" => Activity::PickUp,
            "setDown" => Activity::SetDown,
            "pass" => Activity::Pass,
            _ => Activity::PickUpAndSetDown,
        }
    }
}

/// whether a stop is a principal timing point or a minor one, shown
/// de-emphasized in the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimingStatus {
    #[default]
    Principal,
    Other,
}

impl TimingStatus {
    /// `OTH` marks a minor timing point; everything else is principal.
    pub fn from_code(code: &str) -> TimingStatus {
        if code == "OTH" {
            TimingStatus::Other
        } else {
            TimingStatus::Principal
        }
    }

    pub fn is_minor(&self) -> bool {
        matches!(self, TimingStatus::Other)
    }
}

/// one appearance of a stop at either end of a timing link.
#[derive(Debug, Clone)]
pub struct StopVisit {
    pub stop: Arc<Stop>,
    pub activity: Activity,
    pub timing_status: TimingStatus,
    /// layover before departing this stop.
    pub wait: Option<Duration>,
    /// grid row this visit was bound to when its pattern was merged.
    pub row: Option<RowId>,
}

impl StopVisit {
    pub fn new(stop: Arc<Stop>) -> StopVisit {
        StopVisit {
            stop,
            activity: Activity::default(),
            timing_status: TimingStatus::default(),
            wait: None,
            row: None,
        }
    }
}

/// a timed hop between two consecutive stop visits.
#[derive(Debug, Clone)]
pub struct TimingLink {
    pub id: Option<String>,
    pub origin: StopVisit,
    pub destination: StopVisit,
    pub run_time: Duration,
}
