use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveTime};
use crate::calendar::OperatingProfile;
use crate::model::{JourneyPattern, PatternId, StopVisit};

/// arena index of a vehicle journey within its timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JourneyId(pub usize);

/// one timed departure over a journey pattern.
#[derive(Debug, Clone)]
pub struct VehicleJourney {
    pub code: String,
    pub private_code: Option<String>,
    pub departure_time: NaiveTime,
    pub pattern: PatternId,
    pub operating_profile: Option<OperatingProfile>,
    /// timing link id where the vehicle enters service, when the journey
    /// starts with a dead run.
    pub start_deadrun: Option<String>,
    /// timing link id after which the vehicle runs empty to the depot.
    pub end_deadrun: Option<String>,
    pub notes: BTreeMap<String, String>,
    pub sequence_number: Option<u32>,
    pub operator_ref: Option<String>,
}

impl VehicleJourney {
    /// walks the pattern's links from this journey's departure time, yielding
    /// each stop visit with the clock time the vehicle reaches it. visits
    /// inside a dead run are suppressed; the stop where the vehicle comes
    /// back into service is the first one yielded.
    pub fn times<'a>(&'a self, pattern: &'a JourneyPattern) -> JourneyTimes<'a> {
        JourneyTimes {
            journey: self,
            pattern,
            next_link: 0,
            time: self.departure_time,
            dead: self.start_deadrun.is_some(),
            emitted_origin: false,
        }
    }
}

/// lazy iterator over a journey's (stop visit, time) pairs. restartable:
/// calling [`VehicleJourney::times`] again walks the pattern afresh.
pub struct JourneyTimes<'a> {
    journey: &'a VehicleJourney,
    pattern: &'a JourneyPattern,
    next_link: usize,
    time: NaiveTime,
    dead: bool,
    emitted_origin: bool,
}

fn link_matches(reference: &Option<String>, link_id: &Option<String>) -> bool {
    match (reference, link_id) {
        (Some(reference), Some(id)) => reference == id,
        _ => false,
    }
}

fn advance(time: NaiveTime, duration: Duration) -> NaiveTime {
    time.overflowing_add_signed(duration).0
}

impl<'a> Iterator for JourneyTimes<'a> {
    type Item = (&'a StopVisit, NaiveTime);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.emitted_origin {
            self.emitted_origin = true;
            if !self.dead {
                let origin = &self.pattern.links.first()?.origin;
                return Some((origin, self.time));
            }
        }
        while self.next_link < self.pattern.links.len() {
            let link = &self.pattern.links[self.next_link];
            self.next_link += 1;
            if let Some(wait) = link.origin.wait {
                self.time = advance(self.time, wait);
            }
            self.time = advance(self.time, link.run_time);
            let mut emit = false;
            let mut resumed = false;
            if self.dead {
                if link_matches(&self.journey.start_deadrun, &link.id) {
                    self.dead = false;
                    emit = true;
                    resumed = true;
                }
            } else {
                emit = true;
            }
            if !resumed && link_matches(&self.journey.end_deadrun, &link.id) {
                self.dead = true;
            }
            let reached = self.time;
            if let Some(wait) = link.destination.wait {
                self.time = advance(self.time, wait);
            }
            if emit {
                return Some((&link.destination, reached));
            }
        }
        None
    }
}

/// display order of two journeys. an explicit sequence number on both wins;
/// otherwise departure times are compared, using a common stop's times as
/// proxies when the journeys start at different stops. the fallback is not
/// necessarily transitive, so callers should sort with a method that
/// tolerates an inconsistent comparator.
pub fn display_order(
    a: &VehicleJourney,
    b: &VehicleJourney,
    patterns: &[JourneyPattern],
) -> Ordering {
    match (a.sequence_number, b.sequence_number) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => compare_departures(a, b, patterns),
    }
}

fn compare_departures(
    x: &VehicleJourney,
    y: &VehicleJourney,
    patterns: &[JourneyPattern],
) -> Ordering {
    let x_pattern = &patterns[x.pattern.0];
    let y_pattern = &patterns[y.pattern.0];
    let mut x_time = x.departure_time;
    let mut y_time = y.departure_time;
    let x_first = x_pattern
        .links
        .first()
        .map(|link| link.origin.stop.atco_code.as_str());
    let y_first = y_pattern
        .links
        .first()
        .map(|link| link.origin.stop.atco_code.as_str());
    if x_first != y_first {
        let times: HashMap<&str, NaiveTime> = x
            .times(x_pattern)
            .map(|(visit, time)| (visit.stop.atco_code.as_str(), time))
            .collect();
        let mut found = false;
        for (visit, time) in y.times(y_pattern) {
            if let Some(shared) = times.get(visit.stop.atco_code.as_str()) {
                found = true;
                if time >= y.departure_time && *shared >= x.departure_time {
                    x_time = *shared;
                    y_time = time;
                }
                break;
            }
        }
        if !found {
            return Ordering::Equal;
        }
    }
    x_time.cmp(&y_time)
}

/// stable insertion sort of journey ids into display order. the fallback
/// comparator above is not a total order, which the standard sort rejects.
pub(crate) fn sort_for_display(
    ids: &mut [JourneyId],
    journeys: &[VehicleJourney],
    patterns: &[JourneyPattern],
) {
    for sorted in 1..ids.len() {
        let mut at = sorted;
        while at > 0
            && display_order(&journeys[ids[at - 1].0], &journeys[ids[at].0], patterns)
                == Ordering::Greater
        {
            ids.swap(at - 1, at);
            at -= 1;
        }
    }
}
