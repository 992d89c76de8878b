use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use itertools::Itertools;
use log::{debug, warn};

use crate::calendar::{
    BankHolidayCalendar, CalendarContext, OperatingPeriod, OperatingProfile, ServicedOrganisation,
};
use crate::corrections::Corrections;
use crate::matrix::{
    abbreviate_columns, append_column, build_column_feet, merge_visits, Grouping, GroupingId,
    RowEntry, RowList,
};
use crate::model::{
    sort_for_display, JourneyId, JourneyPattern, Operator, OperatorDirectory, PatternId, Stop,
    StopDirectory, StopVisit, TimingLink, TimingStatus, VehicleJourney,
};
use crate::parse::{
    read_document, text_ops, RawStopUsage, RawVehicleJourney, TransXChangeDocument,
};
use crate::TimetableError;

/// the injected collaborators a timetable is built against. every field is
/// optional; an absent one falls back to document data or an empty table.
#[derive(Clone, Copy, Default)]
pub struct TimetableSources<'a> {
    pub stops: Option<&'a dyn StopDirectory>,
    pub operators: Option<&'a dyn OperatorDirectory>,
    pub bank_holidays: Option<&'a BankHolidayCalendar>,
    pub corrections: Option<&'a Corrections>,
}

/// one compiled TransXChange document: service metadata, the pattern and
/// journey structure, and per-direction groupings whose grids are projected
/// onto a date with [`set_date`](Timetable::set_date).
#[derive(Debug, Clone)]
pub struct Timetable {
    pub service_code: String,
    pub mode: Option<String>,
    pub description: String,
    pub description_parts: Vec<String>,
    pub via: Option<String>,
    pub operator: Option<Operator>,
    pub operating_period: Option<OperatingPeriod>,
    /// the document level profile, inherited by journeys without their own.
    pub operating_profile: Option<OperatingProfile>,
    /// the prefix before `:` shared by every journey's private code.
    pub private_code_prefix: Option<String>,
    pub modified: Option<NaiveDate>,
    pub patterns: Vec<JourneyPattern>,
    pub journeys: Vec<VehicleJourney>,
    pub groupings: Vec<Grouping>,
    pub organisations: HashMap<String, ServicedOrganisation>,
    /// the date the grids currently show, once one has been set.
    pub date: Option<NaiveDate>,
    /// count of stops whose position could not be reconciled across
    /// patterns; nonzero means a duplicate row stands somewhere.
    pub alignment_conflicts: u32,
    bank_holidays: BankHolidayCalendar,
    corrections: Corrections,
    hide_after: Option<NaiveTime>,
}

impl Timetable {
    pub fn from_path(
        path: impl AsRef<Path>,
        sources: &TimetableSources,
        date: Option<NaiveDate>,
    ) -> Result<Timetable, TimetableError> {
        Timetable::from_reader(BufReader::new(File::open(path)?), sources, date)
    }

    pub fn from_reader<R: BufRead>(
        reader: R,
        sources: &TimetableSources,
        date: Option<NaiveDate>,
    ) -> Result<Timetable, TimetableError> {
        Timetable::from_document(read_document(reader)?, sources, date)
    }

    /// builds the timetable structure: stops are resolved, patterns are
    /// flattened and merged into grouping rows, journeys are bound to their
    /// patterns and sorted into display order. when `date` is given the
    /// grids are populated for it; otherwise they stay empty until the first
    /// [`set_date`](Timetable::set_date).
    pub fn from_document(
        document: TransXChangeDocument,
        sources: &TimetableSources,
        date: Option<NaiveDate>,
    ) -> Result<Timetable, TimetableError> {
        let TransXChangeDocument {
            stops: document_stops,
            routes,
            operators,
            sections,
            organisations,
            journeys: raw_journeys,
            service,
            modified,
        } = document;
        let corrections = sources.corrections.cloned().unwrap_or_default();
        let service_code = service.service_code.unwrap_or_default();

        let mut stops: HashMap<String, Arc<Stop>> = HashMap::new();
        for stop in document_stops {
            let record = sources
                .stops
                .and_then(|directory| directory.find(&stop.atco_code))
                .unwrap_or_else(|| Arc::new(stop));
            stops.insert(record.atco_code.clone(), record);
        }

        let operator = service.registered_operator_ref.as_deref().map(|reference| {
            operators
                .iter()
                .find(|operator| {
                    operator.id == reference || operator.code.as_deref() == Some(reference)
                })
                .cloned()
                .or_else(|| sources.operators.and_then(|directory| directory.find(reference)))
                .unwrap_or_else(|| {
                    debug!("synthesizing a stub for unknown operator {}", reference);
                    Operator::stub(reference)
                })
        });

        let description = service
            .description
            .as_deref()
            .map(text_ops::normalize_description)
            .unwrap_or_default();
        let (description_parts, via) = if description.is_empty() {
            (Vec::new(), None)
        } else {
            text_ops::description_parts(&description)
        };

        let mut groupings = vec![Grouping::new("outbound"), Grouping::new("inbound")];
        let mut grouping_keys: HashMap<String, GroupingId> =
            HashMap::from([("outbound".to_string(), GroupingId(0)), ("inbound".to_string(), GroupingId(1))]);

        let mut patterns: Vec<JourneyPattern> = Vec::new();
        let mut pattern_ids: HashMap<String, PatternId> = HashMap::new();
        let mut alignment_conflicts = 0u32;
        for raw in service.patterns {
            let route_description = raw
                .route_ref
                .as_deref()
                .and_then(|reference| routes.get(reference))
                .map(String::as_str);
            let grouping = grouping_for(
                &mut groupings,
                &mut grouping_keys,
                &corrections,
                &service_code,
                raw.direction.as_deref(),
                route_description,
            );
            let mut links: Vec<TimingLink> = Vec::new();
            for section_ref in &raw.section_refs {
                match sections.get(section_ref) {
                    Some(section) => {
                        for raw_link in section {
                            links.push(TimingLink {
                                id: raw_link.id.clone(),
                                origin: resolve_visit(&raw_link.from, &mut stops, sources.stops),
                                destination: resolve_visit(&raw_link.to, &mut stops, sources.stops),
                                run_time: raw_link.run_time,
                            });
                        }
                    }
                    None => warn!(
                        "journey pattern {} references missing section {}",
                        raw.id, section_ref
                    ),
                }
            }
            let mut pattern = JourneyPattern {
                id: raw.id,
                direction: raw.direction,
                route_ref: raw.route_ref,
                links,
                grouping,
            };
            let visits: Vec<(Arc<Stop>, TimingStatus)> = pattern
                .visits()
                .map(|visit| (Arc::clone(&visit.stop), visit.timing_status))
                .collect();
            let outcome = merge_visits(&mut groupings[grouping.0].rows, &visits);
            alignment_conflicts += outcome.conflicts;
            for (index, row) in outcome.bindings.iter().enumerate() {
                pattern.set_visit_row(index, *row);
            }
            let id = PatternId(patterns.len());
            pattern_ids.insert(pattern.id.clone(), id);
            patterns.push(pattern);
        }

        let resolved = resolve_pattern_refs(&raw_journeys, &pattern_ids);
        let mut journeys: Vec<VehicleJourney> = Vec::new();
        for (raw, pattern) in raw_journeys.into_iter().zip(resolved) {
            let pattern = match pattern {
                Some(pattern) => pattern,
                None => {
                    warn!("dropping journey {}: no resolvable journey pattern", raw.code);
                    continue;
                }
            };
            let mut departure_time = raw.departure_time;
            if let Some(fixed) = corrections.departure_time(&service_code, &raw.code, departure_time)
            {
                debug!("correcting departure of {} to {}", raw.code, fixed);
                departure_time = fixed;
            }
            let mut operating_profile = raw.operating_profile;
            if let Some(profile) = operating_profile.as_mut() {
                for range in profile.nonoperation_days.iter_mut() {
                    if let Some(start) =
                        corrections.non_operation_start(&service_code, &raw.code, range.start)
                    {
                        debug!("correcting non-operation start of {} to {}", raw.code, start);
                        range.start = start;
                    }
                }
            }
            journeys.push(VehicleJourney {
                code: raw.code,
                private_code: raw.private_code,
                departure_time,
                pattern,
                operating_profile,
                start_deadrun: raw.start_deadrun,
                end_deadrun: raw.end_deadrun,
                notes: raw.notes,
                sequence_number: raw.sequence_number,
                operator_ref: raw.operator_ref,
            });
        }

        let private_code_prefix = journeys
            .iter()
            .map(|journey| {
                journey
                    .private_code
                    .as_deref()
                    .and_then(|code| code.split(':').next())
            })
            .dedup()
            .exactly_one()
            .ok()
            .flatten()
            .map(String::from);

        for (index, journey) in journeys.iter().enumerate() {
            let grouping = patterns[journey.pattern.0].grouping;
            groupings[grouping.0].journeys.push(JourneyId(index));
        }
        for grouping in &mut groupings {
            sort_for_display(&mut grouping.journeys, &journeys, &patterns);
        }

        let mut timetable = Timetable {
            hide_after: corrections.hide_after(&service_code),
            service_code,
            mode: service.mode,
            description,
            description_parts,
            via,
            operator,
            operating_period: service.operating_period,
            operating_profile: service.operating_profile,
            private_code_prefix,
            modified,
            patterns,
            journeys,
            groupings,
            organisations,
            date: None,
            alignment_conflicts,
            bank_holidays: sources.bank_holidays.cloned().unwrap_or_default(),
            corrections,
        };
        if let Some(date) = date {
            timetable.set_date(date);
        }
        Ok(timetable)
    }

    /// projects every grouping's grid onto `date`: column layout, times,
    /// frequency cells and footnotes are recomputed from scratch, so calling
    /// with the same date always reproduces the same grid. not safe to call
    /// concurrently on one instance.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
        let context = CalendarContext {
            bank_holidays: &self.bank_holidays,
            organisations: &self.organisations,
        };
        for grouping in &mut self.groupings {
            grouping.rows.clear_times();
            grouping.columns.clear();
            grouping.column_feet.clear();
            for id in grouping.journeys.clone() {
                let journey = &self.journeys[id.0];
                let shown = journey_runs(
                    journey,
                    self.operating_profile.as_ref(),
                    self.operating_period.as_ref(),
                    self.hide_after,
                    date,
                    &context,
                );
                if shown {
                    grouping.columns.push(id);
                    append_column(
                        &mut grouping.rows,
                        journey,
                        &self.patterns[journey.pattern.0],
                    );
                }
            }
            for (stop_code, width) in self.corrections.stitches(&self.service_code) {
                stitch_row(&mut grouping.rows, stop_code, width);
            }
            abbreviate_columns(&mut grouping.rows, &grouping.columns, &self.journeys);
            grouping.column_feet = build_column_feet(&grouping.columns, &self.journeys);
        }
    }

    /// heading for a grouping, oriented against this service's description.
    pub fn label(&self, grouping: &Grouping) -> String {
        let parts = (!self.description_parts.is_empty()).then_some(self.description_parts.as_slice());
        grouping.label(parts, self.via.as_deref())
    }

    /// groupings with at least one journey, in document order.
    pub fn active_groupings(&self) -> impl Iterator<Item = &Grouping> + '_ {
        self.groupings
            .iter()
            .filter(|grouping| !grouping.journeys.is_empty())
    }
}

/// the grouping a pattern belongs to: a corrected fork when one matches its
/// route description, else the shared grouping for its direction.
fn grouping_for(
    groupings: &mut Vec<Grouping>,
    keys: &mut HashMap<String, GroupingId>,
    corrections: &Corrections,
    service_code: &str,
    direction: Option<&str>,
    route_description: Option<&str>,
) -> GroupingId {
    if let Some((key, direction, parts)) =
        route_description.and_then(|description| corrections.fork(service_code, description))
    {
        if let Some(id) = keys.get(key) {
            return *id;
        }
        let id = GroupingId(groupings.len());
        groupings.push(Grouping::named(direction, parts.to_vec()));
        keys.insert(key.to_string(), id);
        return id;
    }
    if direction == Some("inbound") {
        GroupingId(1)
    } else {
        GroupingId(0)
    }
}

fn resolve_visit(
    raw: &RawStopUsage,
    stops: &mut HashMap<String, Arc<Stop>>,
    directory: Option<&dyn StopDirectory>,
) -> StopVisit {
    let stop = match stops.get(&raw.stop_ref) {
        Some(stop) => Arc::clone(stop),
        None => {
            let stop = directory
                .and_then(|directory| directory.find(&raw.stop_ref))
                .unwrap_or_else(|| {
                    debug!("synthesizing a stub for unknown stop {}", raw.stop_ref);
                    Arc::new(Stop::stub(&raw.stop_ref))
                });
            stops.insert(raw.stop_ref.clone(), Arc::clone(&stop));
            stop
        }
    };
    StopVisit {
        stop,
        activity: raw.activity,
        timing_status: raw.timing_status,
        wait: raw.wait,
        row: None,
    }
}

/// resolves each journey's pattern reference, chasing VehicleJourneyRef
/// chains with cycle detection.
fn resolve_pattern_refs(
    raw_journeys: &[RawVehicleJourney],
    pattern_ids: &HashMap<String, PatternId>,
) -> Vec<Option<PatternId>> {
    let by_code: HashMap<&str, usize> = raw_journeys
        .iter()
        .enumerate()
        .map(|(index, journey)| (journey.code.as_str(), index))
        .collect();
    raw_journeys
        .iter()
        .map(|raw| {
            let mut current = raw;
            let mut seen: HashSet<&str> = HashSet::new();
            loop {
                if let Some(reference) = current.pattern_ref.as_deref() {
                    return pattern_ids.get(reference).copied();
                }
                let reference = current.journey_ref.as_deref()?;
                if !seen.insert(reference) {
                    return None;
                }
                current = &raw_journeys[*by_code.get(reference)?];
            }
        })
        .collect()
}

fn journey_runs(
    journey: &VehicleJourney,
    default_profile: Option<&OperatingProfile>,
    period: Option<&OperatingPeriod>,
    hide_after: Option<NaiveTime>,
    date: NaiveDate,
    context: &CalendarContext,
) -> bool {
    if period.map_or(false, |period| !period.contains(date)) {
        return false;
    }
    if hide_after.map_or(false, |curfew| journey.departure_time > curfew) {
        return false;
    }
    match journey.operating_profile.as_ref().or(default_profile) {
        Some(profile) => profile.operates_on(date, context),
        None => false,
    }
}

/// copies the leading entries of the row at `stop_code` into the row above
/// it, where that row is blank. repairs documents whose first stop was
/// registered on a disconnected row.
fn stitch_row(rows: &mut RowList, stop_code: &str, width: usize) {
    let position = match rows
        .iter()
        .position(|row| row.stop.atco_code == stop_code)
    {
        Some(position) if position > 0 => position,
        _ => return,
    };
    let source = rows.order()[position];
    let target = rows.order()[position - 1];
    for column in 0..width {
        let entry = match rows.row(source).times.get(column) {
            Some(entry) => entry.clone(),
            None => break,
        };
        let row = rows.row_mut(target);
        if let Some(slot) = row.times.get_mut(column) {
            if *slot == RowEntry::Blank {
                *slot = entry;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::matrix::{Cell, ColumnFoot};
    use chrono::Duration;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<TransXChange xmlns="http://www.transxchange.org.uk/" ModificationDateTime="2017-06-24T09:30:00">
  <StopPoints>
    <AnnotatedStopPointRef>
      <StopPointRef>A</StopPointRef><CommonName>Quay</CommonName><LocalityName>Looe</LocalityName>
    </AnnotatedStopPointRef>
    <AnnotatedStopPointRef>
      <StopPointRef>B</StopPointRef><CommonName>Crumplehorn</CommonName>
    </AnnotatedStopPointRef>
    <AnnotatedStopPointRef>
      <StopPointRef>C</StopPointRef><CommonName>Big Green</CommonName><LocalityName>Polperro</LocalityName>
    </AnnotatedStopPointRef>
    <AnnotatedStopPointRef>
      <StopPointRef>D</StopPointRef><CommonName>Trenant Cross</CommonName>
    </AnnotatedStopPointRef>
  </StopPoints>
  <JourneyPatternSections>
    <JourneyPatternSection id="JPS_1">
      <JourneyPatternTimingLink id="L1">
        <From><StopPointRef>A</StopPointRef></From>
        <To><StopPointRef>B</StopPointRef></To>
        <RunTime>PT5M</RunTime>
      </JourneyPatternTimingLink>
      <JourneyPatternTimingLink id="L2">
        <From><StopPointRef>B</StopPointRef></From>
        <To><StopPointRef>C</StopPointRef></To>
        <RunTime>PT5M</RunTime>
      </JourneyPatternTimingLink>
    </JourneyPatternSection>
    <JourneyPatternSection id="JPS_2">
      <JourneyPatternTimingLink id="L3">
        <From><StopPointRef>A</StopPointRef></From>
        <To><StopPointRef>D</StopPointRef></To>
        <RunTime>PT4M</RunTime>
      </JourneyPatternTimingLink>
      <JourneyPatternTimingLink id="L4">
        <From><StopPointRef>D</StopPointRef></From>
        <To><StopPointRef>C</StopPointRef></To>
        <RunTime>PT6M</RunTime>
      </JourneyPatternTimingLink>
    </JourneyPatternSection>
  </JourneyPatternSections>
  <Operators>
    <Operator id="O_1">
      <NationalOperatorCode>FCWL</NationalOperatorCode>
      <OperatorShortName>First Kernow</OperatorShortName>
    </Operator>
  </Operators>
  <Services>
    <Service>
      <ServiceCode>PF0000459:134</ServiceCode>
      <OperatingPeriod><StartDate>2017-04-23</StartDate></OperatingPeriod>
      <OperatingProfile>
        <RegularDayType><DaysOfWeek><MondayToFriday/></DaysOfWeek></RegularDayType>
      </OperatingProfile>
      <RegisteredOperatorRef>O_1</RegisteredOperatorRef>
      <StandardService>
        <JourneyPattern id="JP_1">
          <Direction>outbound</Direction>
          <JourneyPatternSectionRefs>JPS_1</JourneyPatternSectionRefs>
        </JourneyPattern>
        <JourneyPattern id="JP_2">
          <Direction>outbound</Direction>
          <JourneyPatternSectionRefs>JPS_2</JourneyPatternSectionRefs>
        </JourneyPattern>
      </StandardService>
      <Mode>bus</Mode>
      <Description>Looe - Polperro</Description>
    </Service>
  </Services>
  <VehicleJourneys>
    <VehicleJourney>
      <PrivateCode>fcwl:134:1</PrivateCode>
      <VehicleJourneyCode>VJ_1</VehicleJourneyCode>
      <JourneyPatternRef>JP_1</JourneyPatternRef>
      <DepartureTime>10:00:00</DepartureTime>
    </VehicleJourney>
    <VehicleJourney>
      <PrivateCode>fcwl:134:2</PrivateCode>
      <VehicleJourneyCode>VJ_2</VehicleJourneyCode>
      <JourneyPatternRef>JP_1</JourneyPatternRef>
      <DepartureTime>10:05:00</DepartureTime>
    </VehicleJourney>
    <VehicleJourney>
      <PrivateCode>fcwl:134:3</PrivateCode>
      <VehicleJourneyCode>VJ_3</VehicleJourneyCode>
      <JourneyPatternRef>JP_1</JourneyPatternRef>
      <DepartureTime>10:10:00</DepartureTime>
    </VehicleJourney>
    <VehicleJourney>
      <PrivateCode>fcwl:134:4</PrivateCode>
      <VehicleJourneyCode>VJ_4</VehicleJourneyCode>
      <JourneyPatternRef>JP_1</JourneyPatternRef>
      <DepartureTime>10:15:00</DepartureTime>
    </VehicleJourney>
    <VehicleJourney>
      <PrivateCode>fcwl:134:5</PrivateCode>
      <OperatingProfile>
        <RegularDayType><DaysOfWeek><Saturday/></DaysOfWeek></RegularDayType>
      </OperatingProfile>
      <VehicleJourneyCode>VJ_5</VehicleJourneyCode>
      <VehicleJourneyRef>VJ_1</VehicleJourneyRef>
      <DepartureTime>11:00:00</DepartureTime>
    </VehicleJourney>
    <VehicleJourney>
      <PrivateCode>fcwl:134:6</PrivateCode>
      <VehicleJourneyCode>VJ_6</VehicleJourneyCode>
      <JourneyPatternRef>JP_2</JourneyPatternRef>
      <DepartureTime>09:00:00</DepartureTime>
    </VehicleJourney>
    <VehicleJourney>
      <PrivateCode>fcwl:134:7</PrivateCode>
      <VehicleJourneyCode>VJ_7</VehicleJourneyCode>
      <JourneyPatternRef>JP_1</JourneyPatternRef>
      <DepartureTime>19:00:00</DepartureTime>
    </VehicleJourney>
  </VehicleJourneys>
</TransXChange>"#;

    fn friday() -> NaiveDate {
        "2017-09-01".parse().expect("failure parsing date")
    }

    fn saturday() -> NaiveDate {
        "2017-09-02".parse().expect("failure parsing date")
    }

    fn build(date: Option<NaiveDate>) -> Timetable {
        Timetable::from_reader(DOCUMENT.as_bytes(), &TimetableSources::default(), date)
            .expect("failure building timetable")
    }

    fn outbound(timetable: &Timetable) -> &Grouping {
        &timetable.groupings[0]
    }

    fn row_codes(grouping: &Grouping) -> Vec<String> {
        grouping
            .rows
            .iter()
            .map(|row| row.stop.atco_code.clone())
            .collect()
    }

    fn row_times(grouping: &Grouping) -> Vec<Vec<RowEntry>> {
        grouping.rows.iter().map(|row| row.times.clone()).collect()
    }

    fn time(text: &str) -> RowEntry {
        RowEntry::Time(text.parse().expect("failure parsing time"))
    }

    #[test]
    fn test_service_metadata() {
        let timetable = build(None);
        assert_eq!(timetable.service_code, "PF0000459:134");
        assert_eq!(timetable.mode.as_deref(), Some("bus"));
        assert_eq!(timetable.description, "Looe - Polperro");
        assert_eq!(timetable.description_parts, ["Looe", "Polperro"]);
        assert_eq!(timetable.via, None);
        assert_eq!(timetable.private_code_prefix.as_deref(), Some("fcwl"));
        assert_eq!(timetable.modified, "2017-06-24".parse().ok());
        let operator = timetable.operator.as_ref().expect("operator should resolve");
        assert_eq!(operator.name.as_deref(), Some("First Kernow"));
    }

    #[test]
    fn test_rows_merge_detour_pattern() {
        let timetable = build(None);
        assert_eq!(row_codes(outbound(&timetable)), vec!["A", "D", "B", "C"]);
        assert_eq!(timetable.alignment_conflicts, 0);
        // no journeys were registered inbound
        assert_eq!(timetable.active_groupings().count(), 1);
    }

    #[test]
    fn test_rows_restricted_to_one_pattern_keep_its_order() {
        let timetable = build(None);
        let grouping = outbound(&timetable);
        for pattern in &timetable.patterns {
            let positions: Vec<usize> = pattern
                .visits()
                .map(|visit| {
                    grouping
                        .rows
                        .position(visit.row.expect("visit should be bound"))
                        .expect("row should be present")
                })
                .collect();
            let mut sorted = positions.clone();
            sorted.sort_unstable();
            assert_eq!(positions, sorted, "pattern {} was reordered", pattern.id);
        }
    }

    #[test]
    fn test_unset_date_leaves_grid_empty() {
        let timetable = build(None);
        assert_eq!(timetable.date, None);
        assert!(outbound(&timetable).columns.is_empty());
        assert!(outbound(&timetable).rows.iter().all(|row| row.times.is_empty()));
    }

    #[test]
    fn test_weekday_columns_in_display_order() {
        let timetable = build(Some(friday()));
        let codes: Vec<&str> = outbound(&timetable)
            .columns
            .iter()
            .map(|id| timetable.journeys[id.0].code.as_str())
            .collect();
        // the Saturday journey is left out; VJ_6 departs first
        assert_eq!(codes, vec!["VJ_6", "VJ_1", "VJ_2", "VJ_3", "VJ_4", "VJ_7"]);
    }

    #[test]
    fn test_saturday_journey_inherits_pattern_through_journey_ref() {
        let timetable = build(Some(saturday()));
        let grouping = outbound(&timetable);
        let codes: Vec<&str> = grouping
            .columns
            .iter()
            .map(|id| timetable.journeys[id.0].code.as_str())
            .collect();
        assert_eq!(codes, vec!["VJ_5"]);
        let times = row_times(grouping);
        assert_eq!(times[0], vec![time("11:00:00")]);
        assert_eq!(times[1], vec![RowEntry::Blank]); // D is not on JP_1
        assert_eq!(times[2], vec![time("11:05:00")]);
        assert_eq!(times[3], vec![time("11:10:00")]);
    }

    #[test]
    fn test_weekday_grid_collapses_even_run() {
        let timetable = build(Some(friday()));
        let times = row_times(outbound(&timetable));
        assert_eq!(times[0][0], time("09:00:00"));
        assert_eq!(
            times[0][1],
            RowEntry::Frequency(Cell {
                colspan: 4,
                rowspan: 4,
                interval: Duration::minutes(5),
            })
        );
        for column in 2..=4 {
            for row in &times {
                assert_eq!(row[column], RowEntry::Blank);
            }
        }
        assert_eq!(times[0][5], time("19:00:00"));
        assert_eq!(times[1][0], time("09:04:00"));
        assert_eq!(times[3][0], time("09:10:00"));
    }

    #[test]
    fn test_set_date_is_idempotent() {
        let mut timetable = build(Some(friday()));
        let times = row_times(outbound(&timetable));
        let columns = outbound(&timetable).columns.clone();
        let feet = outbound(&timetable).column_feet.clone();
        timetable.set_date(saturday());
        assert_ne!(row_times(outbound(&timetable)), times);
        timetable.set_date(friday());
        assert_eq!(row_times(outbound(&timetable)), times);
        assert_eq!(outbound(&timetable).columns, columns);
        assert_eq!(outbound(&timetable).column_feet, feet);
    }

    #[test]
    fn test_label_orients_description() {
        let timetable = build(None);
        assert_eq!(timetable.label(outbound(&timetable)), "Looe - Polperro");
    }

    #[test]
    fn test_stop_directory_overrides_document_records() {
        let mut directory: HashMap<String, Arc<Stop>> = HashMap::new();
        directory.insert(
            "B".to_string(),
            Arc::new(Stop {
                atco_code: "B".to_string(),
                common_name: Some("Crumplehorn Mill".to_string()),
                locality: Some("Polperro".to_string()),
            }),
        );
        let sources = TimetableSources {
            stops: Some(&directory),
            ..Default::default()
        };
        let timetable =
            Timetable::from_reader(DOCUMENT.as_bytes(), &sources, None).expect("failure building");
        let grouping = outbound(&timetable);
        let row = grouping
            .rows
            .iter()
            .find(|row| row.stop.atco_code == "B")
            .expect("row B should exist");
        assert_eq!(row.stop.common_name.as_deref(), Some("Crumplehorn Mill"));
    }

    #[test]
    fn test_sources_carry_both_directories() {
        let mut stops: HashMap<String, Arc<Stop>> = HashMap::new();
        stops.insert("A".to_string(), Arc::new(Stop::stub("A")));
        let mut operators: HashMap<String, Operator> = HashMap::new();
        operators.insert(
            "O_1".to_string(),
            Operator {
                id: "O_1".to_string(),
                code: Some("FCWL".to_string()),
                name: Some("First Kernow".to_string()),
            },
        );
        let sources = TimetableSources {
            stops: Some(&stops),
            operators: Some(&operators),
            ..Default::default()
        };
        let copied = sources;
        let stripped = DOCUMENT.replace(
            "<Operators>\n    <Operator id=\"O_1\">\n      <NationalOperatorCode>FCWL</NationalOperatorCode>\n      <OperatorShortName>First Kernow</OperatorShortName>\n    </Operator>\n  </Operators>",
            "",
        );
        let timetable = Timetable::from_reader(stripped.as_bytes(), &copied, None)
            .expect("failure building");
        // with the document's Operators block gone, the reference resolves
        // through the injected directory
        let operator = timetable.operator.as_ref().expect("operator should resolve");
        assert_eq!(operator.name.as_deref(), Some("First Kernow"));
    }

    #[test]
    fn test_hide_after_correction_drops_late_journeys() {
        let corrections: Corrections = serde_json::from_str(
            r#"[{"service_code": "PF0000459:134", "type": "hide_after", "time": "18:00:00"}]"#,
        )
        .expect("failure reading corrections");
        let sources = TimetableSources {
            corrections: Some(&corrections),
            ..Default::default()
        };
        let timetable = Timetable::from_reader(DOCUMENT.as_bytes(), &sources, Some(friday()))
            .expect("failure building");
        let codes: Vec<&str> = outbound(&timetable)
            .columns
            .iter()
            .map(|id| timetable.journeys[id.0].code.as_str())
            .collect();
        assert!(!codes.contains(&"VJ_7"));
    }

    #[test]
    fn test_departure_time_correction_applies_before_sorting() {
        let corrections: Corrections = serde_json::from_str(
            r#"[{
                "service_code": "PF0000459:134",
                "journey_code": "VJ_6",
                "type": "departure_time",
                "expected": "09:00:00",
                "departure_time": "20:00:00"
            }]"#,
        )
        .expect("failure reading corrections");
        let sources = TimetableSources {
            corrections: Some(&corrections),
            ..Default::default()
        };
        let timetable = Timetable::from_reader(DOCUMENT.as_bytes(), &sources, Some(friday()))
            .expect("failure building");
        let codes: Vec<&str> = outbound(&timetable)
            .columns
            .iter()
            .map(|id| timetable.journeys[id.0].code.as_str())
            .collect();
        assert_eq!(codes.last(), Some(&"VJ_6"));
    }

    #[test]
    fn test_notes_become_column_feet() {
        let noted = DOCUMENT.replace(
            "<VehicleJourneyCode>VJ_7</VehicleJourneyCode>",
            "<VehicleJourneyCode>VJ_7</VehicleJourneyCode>\
             <Note><NoteCode>SD</NoteCode><NoteText>schooldays only</NoteText></Note>",
        );
        let timetable =
            Timetable::from_reader(noted.as_bytes(), &TimetableSources::default(), Some(friday()))
                .expect("failure building");
        let feet = &outbound(&timetable).column_feet;
        assert_eq!(
            feet["SD"],
            vec![ColumnFoot::spacer(5), ColumnFoot::noted("schooldays only", 1)]
        );
    }

    #[test]
    fn test_journey_with_dangling_pattern_is_dropped() {
        let broken = DOCUMENT.replace(
            "<JourneyPatternRef>JP_2</JourneyPatternRef>",
            "<JourneyPatternRef>JP_9</JourneyPatternRef>",
        );
        let timetable =
            Timetable::from_reader(broken.as_bytes(), &TimetableSources::default(), Some(friday()))
                .expect("failure building");
        assert!(timetable.journeys.iter().all(|journey| journey.code != "VJ_6"));
    }

    #[test]
    fn test_bank_holiday_closes_service() {
        let mut holidays = BankHolidayCalendar::default();
        // 2017-05-01 was a Monday
        let may_day: NaiveDate = "2017-05-01".parse().expect("failure parsing date");
        holidays.insert(may_day, "MayDay");
        let closed = DOCUMENT.replace(
            "<RegularDayType><DaysOfWeek><MondayToFriday/></DaysOfWeek></RegularDayType>\n      </OperatingProfile>\n      <RegisteredOperatorRef>",
            "<RegularDayType><DaysOfWeek><MondayToFriday/></DaysOfWeek></RegularDayType>\
             <BankHolidayOperation><DaysOfNonOperation><AllBankHolidays/></DaysOfNonOperation></BankHolidayOperation>\n      </OperatingProfile>\n      <RegisteredOperatorRef>",
        );
        let sources = TimetableSources {
            bank_holidays: Some(&holidays),
            ..Default::default()
        };
        let timetable = Timetable::from_reader(closed.as_bytes(), &sources, Some(may_day))
            .expect("failure building");
        assert!(outbound(&timetable).columns.is_empty());
    }

    #[test]
    fn test_stitch_correction_fills_blank_leading_row() {
        let corrections: Corrections = serde_json::from_str(
            r#"[{"service_code": "PF0000459:134", "type": "stitch_row", "stop_code": "B", "columns": 1}]"#,
        )
        .expect("failure reading corrections");
        let sources = TimetableSources {
            corrections: Some(&corrections),
            ..Default::default()
        };
        let timetable = Timetable::from_reader(DOCUMENT.as_bytes(), &sources, Some(saturday()))
            .expect("failure building");
        // on Saturday only VJ_5 runs (pattern JP_1: A, B, C); row D above B
        // is blank and receives B's 11:05
        let times = row_times(outbound(&timetable));
        assert_eq!(times[1][0], time("11:05:00"));
    }

    #[test]
    fn test_fork_correction_splits_grouping() {
        let corrections: Corrections = serde_json::from_str(
            r#"[{
                "service_code": "PF0000459:134",
                "type": "fork_grouping",
                "route_description": "Looe - Trenant Cross",
                "key": "outbound-trenant",
                "direction": "outbound",
                "description_parts": ["Looe", "Trenant Cross"]
            }]"#,
        )
        .expect("failure reading corrections");
        let forked = DOCUMENT
            .replace(
                "<JourneyPatternSections>",
                "<Routes><Route id=\"R_2\"><Description>Looe - Trenant Cross</Description></Route></Routes>\n  <JourneyPatternSections>",
            )
            .replace(
                "<Direction>outbound</Direction>\n          <JourneyPatternSectionRefs>JPS_2</JourneyPatternSectionRefs>",
                "<Direction>outbound</Direction>\n          <RouteRef>R_2</RouteRef>\n          <JourneyPatternSectionRefs>JPS_2</JourneyPatternSectionRefs>",
            );
        let sources = TimetableSources {
            corrections: Some(&corrections),
            ..Default::default()
        };
        let timetable = Timetable::from_reader(forked.as_bytes(), &sources, Some(friday()))
            .expect("failure building");
        assert_eq!(timetable.groupings.len(), 3);
        let fork = &timetable.groupings[2];
        assert_eq!(row_codes(fork), vec!["A", "D", "C"]);
        assert_eq!(fork.journeys.len(), 1);
        assert_eq!(row_codes(outbound(&timetable)), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_journeys_without_any_profile_never_run() {
        let bare = DOCUMENT.replace(
            "<OperatingProfile>\n        <RegularDayType><DaysOfWeek><MondayToFriday/></DaysOfWeek></RegularDayType>\n      </OperatingProfile>\n      <RegisteredOperatorRef>",
            "<RegisteredOperatorRef>",
        );
        let timetable =
            Timetable::from_reader(bare.as_bytes(), &TimetableSources::default(), Some(friday()))
                .expect("failure building");
        // only VJ_5 carries its own profile, and it is Saturday-only
        assert!(outbound(&timetable).columns.is_empty());
    }
}
