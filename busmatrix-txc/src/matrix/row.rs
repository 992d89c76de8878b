use std::fmt::Display;
use std::sync::Arc;

use chrono::NaiveTime;
use crate::matrix::Cell;
use crate::model::{Stop, TimingStatus};

/// arena index of a row within its grouping. rows keep their identity while
/// pattern merging inserts neighbours around them, so patterns bind stop
/// visits to rows once and reuse the binding for every date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub usize);

/// one slot in the grid: empty, a departure time, or a frequency cell
/// covering the collapsed columns to its right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEntry {
    Blank,
    Time(NaiveTime),
    Frequency(Cell),
}

impl Display for RowEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowEntry::Blank => Ok(()),
            RowEntry::Time(time) => write!(f, "{}", time.format("%H:%M")),
            RowEntry::Frequency(cell) => write!(f, "{}", cell),
        }
    }
}

/// one stop's row across all columns of a grouping.
#[derive(Debug, Clone)]
pub struct Row {
    pub stop: Arc<Stop>,
    pub timing_status: TimingStatus,
    pub times: Vec<RowEntry>,
}

impl Row {
    pub fn new(stop: Arc<Stop>, timing_status: TimingStatus) -> Row {
        Row {
            stop,
            timing_status,
            times: Vec::new(),
        }
    }

    pub fn is_minor(&self) -> bool {
        self.timing_status.is_minor()
    }
}

/// rows stored in creation order with a separate display order, so the
/// [`RowId`]s held by journey patterns stay valid as merging inserts rows
/// between existing ones.
#[derive(Debug, Clone, Default)]
pub struct RowList {
    rows: Vec<Row>,
    order: Vec<RowId>,
}

impl RowList {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Row> + '_ {
        self.order.iter().map(|id| &self.rows[id.0])
    }

    /// row ids in display order.
    pub fn order(&self) -> &[RowId] {
        &self.order
    }

    pub fn row(&self, id: RowId) -> &Row {
        &self.rows[id.0]
    }

    pub fn row_mut(&mut self, id: RowId) -> &mut Row {
        &mut self.rows[id.0]
    }

    /// display position of a row, if it is present.
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    /// inserts a row at a display position, returning its id.
    pub fn insert_at(&mut self, position: usize, row: Row) -> RowId {
        let id = RowId(self.rows.len());
        self.rows.push(row);
        let position = position.min(self.order.len());
        self.order.insert(position, id);
        id
    }

    pub fn push(&mut self, row: Row) -> RowId {
        let position = self.order.len();
        self.insert_at(position, row)
    }

    pub fn first(&self) -> Option<&Row> {
        self.order.first().map(|id| &self.rows[id.0])
    }

    pub fn last(&self) -> Option<&Row> {
        self.order.last().map(|id| &self.rows[id.0])
    }

    /// all rows in arena order, for whole-grid passes where display order
    /// does not matter.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> + '_ {
        self.rows.iter_mut()
    }

    pub fn clear_times(&mut self) {
        for row in &mut self.rows {
            row.times.clear();
        }
    }
}
