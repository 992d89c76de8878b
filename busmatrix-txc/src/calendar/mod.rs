//! calendar evaluation: which journeys run on which dates.
mod bank_holidays;
mod date_range;
mod operating_profile;
mod serviced_organisation;

pub use bank_holidays::BankHolidayCalendar;
pub use date_range::{DateRange, OperatingPeriod};
pub use operating_profile::{CalendarContext, OperatingProfile};
pub use serviced_organisation::{ServicedOrganisation, ServicedOrganisationDayType};

pub(crate) use date_range::parse_date;
