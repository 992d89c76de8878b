use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use log::debug;

use crate::calendar::{
    BankHolidayCalendar, DateRange, ServicedOrganisation, ServicedOrganisationDayType,
};
use crate::parse::Element;
use crate::TimetableError;

/// everything needed to evaluate operating profiles for one document: the
/// injected bank holiday calendar and the document's serviced organisations.
#[derive(Debug, Clone, Copy)]
pub struct CalendarContext<'a> {
    pub bank_holidays: &'a BankHolidayCalendar,
    pub organisations: &'a HashMap<String, ServicedOrganisation>,
}

/// the days a journey or service runs: a regular weekday set refined by
/// special date ranges, bank holiday names and serviced organisation terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatingProfile {
    pub regular_days: Vec<Weekday>,
    pub operation_days: Vec<DateRange>,
    pub nonoperation_days: Vec<DateRange>,
    pub operation_bank_holidays: Vec<String>,
    pub nonoperation_bank_holidays: Vec<String>,
    pub serviced_organisations: Option<ServicedOrganisationDayType>,
}

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("Monday", Weekday::Mon),
    ("Tuesday", Weekday::Tue),
    ("Wednesday", Weekday::Wed),
    ("Thursday", Weekday::Thu),
    ("Friday", Weekday::Fri),
    ("Saturday", Weekday::Sat),
    ("Sunday", Weekday::Sun),
];

fn weekday_named(name: &str) -> Option<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, day)| *day)
}

fn weekday_at(index: u32) -> Weekday {
    match index {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// expands one DaysOfWeek child: a single day, a `MondayToFriday` style
/// range, or `Weekend`. unrecognized names are ignored.
fn push_days(days: &mut Vec<Weekday>, name: &str) {
    if let Some((start, end)) = name.split_once("To") {
        if let (Some(start), Some(end)) = (weekday_named(start), weekday_named(end)) {
            for index in start.num_days_from_monday()..=end.num_days_from_monday() {
                days.push(weekday_at(index));
            }
            return;
        }
    }
    if name == "Weekend" {
        days.push(Weekday::Sat);
        days.push(Weekday::Sun);
    } else if let Some(day) = weekday_named(name) {
        days.push(day);
    } else {
        debug!("ignoring unrecognized day of week element {}", name);
    }
}

impl OperatingProfile {
    pub(crate) fn from_element(element: &Element) -> Result<OperatingProfile, TimetableError> {
        let mut profile = OperatingProfile::default();
        if let Some(days) = element.find("RegularDayType/DaysOfWeek") {
            for day in &days.children {
                push_days(&mut profile.regular_days, &day.name);
            }
        }
        if let Some(container) = element.find("SpecialDaysOperation/DaysOfOperation") {
            for range in container.children_named("DateRange") {
                profile.operation_days.push(DateRange::from_element(range)?);
            }
        }
        if let Some(container) = element.find("SpecialDaysOperation/DaysOfNonOperation") {
            for range in container.children_named("DateRange") {
                profile.nonoperation_days.push(DateRange::from_element(range)?);
            }
        }
        if let Some(container) = element.find("BankHolidayOperation/DaysOfOperation") {
            for child in &container.children {
                profile.operation_bank_holidays.push(child.name.clone());
            }
        }
        if let Some(container) = element.find("BankHolidayOperation/DaysOfNonOperation") {
            for child in &container.children {
                profile.nonoperation_bank_holidays.push(child.name.clone());
            }
        }
        if let Some(organisations) = element.find("ServicedOrganisationDayType") {
            let day_type = ServicedOrganisationDayType::from_element(organisations);
            if !day_type.is_empty() {
                profile.serviced_organisations = Some(day_type);
            }
        }
        Ok(profile)
    }

    /// decides whether a journey with this profile runs on `date`. the rules
    /// apply in order: special non-operation dates, special operation dates,
    /// the regular weekday set, bank holiday names, an empty weekday set,
    /// serviced organisation terms, then a default of operating.
    pub fn operates_on(&self, date: NaiveDate, calendar: &CalendarContext) -> bool {
        if self.nonoperation_days.iter().any(|range| range.contains(date)) {
            return false;
        }
        if self.operation_days.iter().any(|range| range.contains(date)) {
            return true;
        }
        if !self.regular_days.is_empty() && !self.regular_days.contains(&date.weekday()) {
            return false;
        }
        let holidays = calendar.bank_holidays.names_for(date);
        if !holidays.is_empty() {
            if self
                .operation_bank_holidays
                .iter()
                .any(|name| name == "AllBankHolidays")
            {
                return true;
            }
            if self
                .nonoperation_bank_holidays
                .iter()
                .any(|name| name == "AllBankHolidays")
            {
                return false;
            }
            for name in holidays {
                if self.operation_bank_holidays.contains(name) {
                    return true;
                }
                if self.nonoperation_bank_holidays.contains(name) {
                    return false;
                }
            }
        }
        if self.regular_days.is_empty() {
            return false;
        }
        if let Some(day_type) = &self.serviced_organisations {
            if day_type
                .nonoperation_ranges(calendar.organisations)
                .iter()
                .any(|range| range.contains(date))
            {
                return false;
            }
            if day_type
                .operation_ranges(calendar.organisations)
                .iter()
                .any(|range| range.contains(date))
            {
                return true;
            }
        }
        true
    }
}
