use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::TimetableError;

/// named holidays by date, supplied as configuration rather than built in.
/// operating profiles reference entries by name, such as `GoodFriday`, or via
/// the `AllBankHolidays` wildcard matching any listed date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankHolidayCalendar {
    dates: HashMap<NaiveDate, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct HolidayRow {
    date: NaiveDate,
    name: String,
}

impl BankHolidayCalendar {
    pub fn insert(&mut self, date: NaiveDate, name: impl Into<String>) {
        self.dates.entry(date).or_default().push(name.into());
    }

    /// holiday names observed on `date`; empty when it is an ordinary day.
    pub fn names_for(&self, date: NaiveDate) -> &[String] {
        self.dates.get(&date).map_or(&[], Vec::as_slice)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// loads `date,name` rows from a headed CSV file. a date listed under
    /// several names appears once with all of them.
    pub fn from_csv_path(path: &Path) -> Result<BankHolidayCalendar, TimetableError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut calendar = BankHolidayCalendar::default();
        for row in reader.deserialize() {
            let row: HolidayRow = row?;
            calendar.insert(row.date, row.name);
        }
        Ok(calendar)
    }
}
