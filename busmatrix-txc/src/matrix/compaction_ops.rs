use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;

use crate::matrix::{Cell, ColumnFoot, RowEntry, RowList};
use crate::model::{JourneyId, JourneyPattern, VehicleJourney};

/// writes one journey's times into the grid as a new rightmost column,
/// padding every row to the new width so unvisited stops show a blank.
pub fn append_column(rows: &mut RowList, journey: &VehicleJourney, pattern: &JourneyPattern) {
    let column = rows.first().map_or(0, |row| row.times.len());
    for (visit, time) in journey.times(pattern) {
        if let Some(id) = visit.row {
            let row = rows.row_mut(id);
            while row.times.len() <= column {
                row.times.push(RowEntry::Blank);
            }
            row.times[column] = RowEntry::Time(time);
        }
    }
    for row in rows.rows_mut() {
        while row.times.len() <= column {
            row.times.push(RowEntry::Blank);
        }
    }
}

/// run-length encodes each footnote across the journey columns: contiguous
/// columns carrying the same text share one foot, and columns without the
/// note become spacers.
pub fn build_column_feet(
    columns: &[JourneyId],
    journeys: &[VehicleJourney],
) -> BTreeMap<String, Vec<ColumnFoot>> {
    let keys: BTreeSet<&String> = columns
        .iter()
        .flat_map(|id| journeys[id.0].notes.keys())
        .collect();
    let mut feet = BTreeMap::new();
    for key in keys {
        let mut column_feet: Vec<ColumnFoot> = Vec::new();
        for id in columns {
            match journeys[id.0].notes.get(key) {
                Some(text) => match column_feet.last_mut() {
                    Some(foot) if foot.notes.as_deref() == Some(text.as_str()) => foot.span += 1,
                    _ => column_feet.push(ColumnFoot::noted(text.clone(), 1)),
                },
                None => match column_feet.last_mut() {
                    Some(foot) if foot.notes.is_none() => foot.span += 1,
                    _ => column_feet.push(ColumnFoot::spacer(1)),
                },
            }
        }
        feet.insert(key.clone(), column_feet);
    }
    feet
}

fn same_run(a: &VehicleJourney, b: &VehicleJourney) -> bool {
    a.pattern == b.pattern && a.notes == b.notes
}

fn interval_between(earlier: &VehicleJourney, later: &VehicleJourney) -> Duration {
    later.departure_time.signed_duration_since(earlier.departure_time)
}

/// an interval reads well as a frequency only when it divides an hour or is
/// a whole number of hours.
fn eligible_interval(interval: Duration) -> bool {
    let seconds = interval.num_seconds();
    seconds > 0 && (3600 % seconds == 0 || seconds % 3600 == 0)
}

fn collapse_run(rows: &mut RowList, start: usize, length: usize, interval: Duration) {
    let rowspan = rows.len();
    let order: Vec<_> = rows.order().to_vec();
    for (position, id) in order.iter().enumerate() {
        let row = rows.row_mut(*id);
        for column in start..start + length {
            if let Some(entry) = row.times.get_mut(column) {
                *entry = if position == 0 && column == start {
                    RowEntry::Frequency(Cell {
                        colspan: length,
                        rowspan,
                        interval,
                    })
                } else {
                    RowEntry::Blank
                };
            }
        }
    }
}

/// single left-to-right pass collapsing maximal runs of evenly-spaced
/// journeys that share a pattern and footnotes. an eligible run's columns
/// are replaced by one frequency cell at the run's start; the column after
/// the run keeps its times, so the cell reads "then every ... until" them.
pub fn abbreviate_columns(rows: &mut RowList, columns: &[JourneyId], journeys: &[VehicleJourney]) {
    let mut start = 0;
    while start + 1 < columns.len() {
        let first = &journeys[columns[start].0];
        let second = &journeys[columns[start + 1].0];
        let mut length = 1;
        let interval = interval_between(first, second);
        if same_run(first, second) {
            length = 2;
            while start + length < columns.len() {
                let previous = &journeys[columns[start + length - 1].0];
                let next = &journeys[columns[start + length].0];
                if !same_run(previous, next) || interval_between(previous, next) != interval {
                    break;
                }
                length += 1;
            }
        }
        if length >= 2 && eligible_interval(interval) {
            collapse_run(rows, start, length, interval);
            start += length;
        } else {
            // the run's last journey may begin the next run
            start += (length - 1).max(1);
        }
    }
}
