use std::collections::HashMap;

use crate::calendar::DateRange;
use crate::parse::Element;
use crate::TimetableError;

/// a school or college whose term pattern gates when journeys run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicedOrganisation {
    pub code: String,
    pub name: Option<String>,
    pub working_days: Vec<DateRange>,
    pub holidays: Vec<DateRange>,
}

impl ServicedOrganisation {
    pub(crate) fn from_element(element: &Element) -> Result<ServicedOrganisation, TimetableError> {
        let code = element
            .find_text("OrganisationCode")
            .ok_or_else(|| {
                TimetableError::MalformedDocumentError(
                    "ServicedOrganisation without an OrganisationCode".to_string(),
                )
            })?
            .to_string();
        Ok(ServicedOrganisation {
            code,
            name: element.find_text("Name").map(String::from),
            working_days: ranges_under(element, "WorkingDays")?,
            holidays: ranges_under(element, "Holidays")?,
        })
    }
}

fn ranges_under(element: &Element, container: &str) -> Result<Vec<DateRange>, TimetableError> {
    let mut ranges = Vec::new();
    if let Some(container) = element.find(container) {
        for range in container.children_named("DateRange") {
            ranges.push(DateRange::from_element(range)?);
        }
    }
    Ok(ranges)
}

/// serviced organisation references attached to an operating profile, split
/// by whether the organisation's working days or its holidays drive
/// operation and non-operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicedOrganisationDayType {
    pub operation_working_days: Option<String>,
    pub operation_holidays: Option<String>,
    pub nonoperation_working_days: Option<String>,
    pub nonoperation_holidays: Option<String>,
}

impl ServicedOrganisationDayType {
    pub(crate) fn from_element(element: &Element) -> ServicedOrganisationDayType {
        let reference = |path: &str| element.find_text(path).map(String::from);
        ServicedOrganisationDayType {
            operation_working_days: reference("DaysOfOperation/WorkingDays/ServicedOrganisationRef"),
            operation_holidays: reference("DaysOfOperation/Holidays/ServicedOrganisationRef"),
            nonoperation_working_days: reference(
                "DaysOfNonOperation/WorkingDays/ServicedOrganisationRef",
            ),
            nonoperation_holidays: reference("DaysOfNonOperation/Holidays/ServicedOrganisationRef"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operation_working_days.is_none()
            && self.operation_holidays.is_none()
            && self.nonoperation_working_days.is_none()
            && self.nonoperation_holidays.is_none()
    }

    /// date ranges blocking operation: the referenced organisation's working
    /// days when the reference is working-days-based, else its holidays.
    pub(crate) fn nonoperation_ranges<'a>(
        &self,
        organisations: &'a HashMap<String, ServicedOrganisation>,
    ) -> &'a [DateRange] {
        resolve(
            organisations,
            &self.nonoperation_working_days,
            &self.nonoperation_holidays,
        )
    }

    /// date ranges enabling operation, resolved the same way.
    pub(crate) fn operation_ranges<'a>(
        &self,
        organisations: &'a HashMap<String, ServicedOrganisation>,
    ) -> &'a [DateRange] {
        resolve(
            organisations,
            &self.operation_working_days,
            &self.operation_holidays,
        )
    }
}

fn resolve<'a>(
    organisations: &'a HashMap<String, ServicedOrganisation>,
    working_days_ref: &Option<String>,
    holidays_ref: &Option<String>,
) -> &'a [DateRange] {
    let working_days = working_days_ref
        .as_ref()
        .and_then(|code| organisations.get(code))
        .map(|organisation| organisation.working_days.as_slice())
        .filter(|ranges| !ranges.is_empty());
    if let Some(ranges) = working_days {
        return ranges;
    }
    holidays_ref
        .as_ref()
        .and_then(|code| organisations.get(code))
        .map(|organisation| organisation.holidays.as_slice())
        .unwrap_or(&[])
}
