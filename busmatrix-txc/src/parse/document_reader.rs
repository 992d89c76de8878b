use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;

use chrono::{Duration, NaiveDate, NaiveTime};
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::calendar::{parse_date, OperatingPeriod, OperatingProfile, ServicedOrganisation};
use crate::model::{Activity, Operator, Stop, TimingStatus};
use crate::parse::{element_from_start, parse_duration, read_subtree, Element};
use crate::TimetableError;

/// one end of a timing link as registered, before stop references are
/// resolved against the document and the injected directory.
#[derive(Debug, Clone)]
pub struct RawStopUsage {
    pub stop_ref: String,
    pub activity: Activity,
    pub timing_status: TimingStatus,
    pub wait: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct RawTimingLink {
    pub id: Option<String>,
    pub from: RawStopUsage,
    pub to: RawStopUsage,
    pub run_time: Duration,
}

/// a journey pattern as registered under the service's StandardService:
/// a direction and an ordered list of section references to flatten.
#[derive(Debug, Clone)]
pub struct RawPattern {
    pub id: String,
    pub direction: Option<String>,
    pub route_ref: Option<String>,
    pub section_refs: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RawVehicleJourney {
    pub code: String,
    pub private_code: Option<String>,
    pub departure_time: NaiveTime,
    pub pattern_ref: Option<String>,
    pub journey_ref: Option<String>,
    pub operating_profile: Option<OperatingProfile>,
    pub start_deadrun: Option<String>,
    pub end_deadrun: Option<String>,
    pub notes: BTreeMap<String, String>,
    pub sequence_number: Option<u32>,
    pub operator_ref: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawService {
    pub service_code: Option<String>,
    pub mode: Option<String>,
    pub description: Option<String>,
    pub registered_operator_ref: Option<String>,
    pub operating_period: Option<OperatingPeriod>,
    pub operating_profile: Option<OperatingProfile>,
    pub patterns: Vec<RawPattern>,
}

/// the typed contents of one TransXChange document, with each top-level
/// block reduced to the fields the timetable builder needs.
#[derive(Debug, Clone, Default)]
pub struct TransXChangeDocument {
    pub stops: Vec<Stop>,
    /// route descriptions by route id, for labelling forked groupings.
    pub routes: HashMap<String, String>,
    pub operators: Vec<Operator>,
    /// timing links by journey pattern section id.
    pub sections: HashMap<String, Vec<RawTimingLink>>,
    pub organisations: HashMap<String, ServicedOrganisation>,
    pub journeys: Vec<RawVehicleJourney>,
    pub service: RawService,
    /// the later of the document's creation and modification dates.
    pub modified: Option<NaiveDate>,
}

/// streams a TransXChange document into a [`TransXChangeDocument`]. each
/// block child is materialized on its own and dropped once its data has been
/// lifted out, so memory stays bounded on documents with thousands of
/// journeys. unknown top-level blocks are skipped without materializing.
pub fn read_document<R: BufRead>(source: R) -> Result<TransXChangeDocument, TimetableError> {
    let mut reader = Reader::from_reader(source);
    let mut document = TransXChangeDocument::default();
    let mut buf: Vec<u8> = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                let opened = element_from_start(&start)?;
                match opened.name.as_str() {
                    // the root: record its dates and descend
                    "TransXChange" => document.modified = modification_date(&opened),
                    "StopPoints" => each_child(&mut reader, |child| {
                        document.stops.push(Stop::from_element(&child)?);
                        Ok(())
                    })?,
                    "Routes" => each_child(&mut reader, |child| {
                        if let (Some(id), Some(description)) =
                            (child.attribute("id"), child.find_text("Description"))
                        {
                            document.routes.insert(id.to_string(), description.to_string());
                        }
                        Ok(())
                    })?,
                    "Operators" => each_child(&mut reader, |child| {
                        document.operators.push(Operator::from_element(&child));
                        Ok(())
                    })?,
                    "JourneyPatternSections" => each_child(&mut reader, |child| {
                        let (id, links) = extract_section(&child)?;
                        document.sections.insert(id, links);
                        Ok(())
                    })?,
                    "ServicedOrganisations" => each_child(&mut reader, |child| {
                        let organisation = ServicedOrganisation::from_element(&child)?;
                        document.organisations.insert(organisation.code.clone(), organisation);
                        Ok(())
                    })?,
                    "VehicleJourneys" => each_child(&mut reader, |child| {
                        document.journeys.push(extract_journey(&child)?);
                        Ok(())
                    })?,
                    "Services" => each_child(&mut reader, |child| {
                        document.service = extract_service(&child)?;
                        Ok(())
                    })?,
                    other => {
                        debug!("skipping block {}", other);
                        skip_subtree(&mut reader)?;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(document)
}

/// materializes each child element of the block whose opening tag was just
/// consumed, handing it to `extract` and dropping it before the next one is
/// read. returns once the block's closing tag is consumed.
fn each_child<R: BufRead>(
    reader: &mut Reader<R>,
    mut extract: impl FnMut(Element) -> Result<(), TimetableError>,
) -> Result<(), TimetableError> {
    let mut buf: Vec<u8> = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                let root = element_from_start(&start)?;
                let child = read_subtree(reader, root)?;
                extract(child)?;
            }
            Event::Empty(start) => extract(element_from_start(&start)?)?,
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(TimetableError::MalformedDocumentError(
                    "document ended inside a block".to_string(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }
}

/// consumes events up to and including the closing tag of the element whose
/// opening tag was just consumed, discarding everything inside.
fn skip_subtree<R: BufRead>(reader: &mut Reader<R>) -> Result<(), TimetableError> {
    let mut depth = 1usize;
    let mut buf: Vec<u8> = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(TimetableError::MalformedDocumentError(
                    "document ended inside a skipped block".to_string(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }
}

fn modification_date(root: &Element) -> Option<NaiveDate> {
    ["CreationDateTime", "ModificationDateTime"]
        .iter()
        .filter_map(|name| root.attribute(name))
        .filter_map(|text| parse_date(text.get(..10).unwrap_or(text)).ok())
        .max()
}

fn extract_usage(element: &Element, link: &str) -> Result<RawStopUsage, TimetableError> {
    let stop_ref = element
        .find_text("StopPointRef")
        .ok_or_else(|| {
            TimetableError::MalformedDocumentError(format!(
                "{} without a StopPointRef in timing link {}",
                element.name, link
            ))
        })?
        .to_string();
    Ok(RawStopUsage {
        stop_ref,
        activity: element
            .find_text("Activity")
            .map_or_else(Activity::default, Activity::from_code),
        timing_status: element
            .find_text("TimingStatus")
            .map_or_else(TimingStatus::default, TimingStatus::from_code),
        wait: element.find_text("WaitTime").map(parse_duration).transpose()?,
    })
}

fn extract_section(element: &Element) -> Result<(String, Vec<RawTimingLink>), TimetableError> {
    let id = element
        .attribute("id")
        .ok_or_else(|| {
            TimetableError::MalformedDocumentError(
                "JourneyPatternSection without an id".to_string(),
            )
        })?
        .to_string();
    let mut links = Vec::new();
    for link in element.children_named("JourneyPatternTimingLink") {
        let link_id = link.attribute("id").unwrap_or(&id);
        let from = link.find("From").ok_or_else(|| {
            TimetableError::MalformedDocumentError(format!("timing link {} without a From", link_id))
        })?;
        let to = link.find("To").ok_or_else(|| {
            TimetableError::MalformedDocumentError(format!("timing link {} without a To", link_id))
        })?;
        let run_time = link.find_text("RunTime").ok_or_else(|| {
            TimetableError::MalformedDocumentError(format!(
                "timing link {} without a RunTime",
                link_id
            ))
        })?;
        links.push(RawTimingLink {
            id: link.attribute("id").map(String::from),
            from: extract_usage(from, link_id)?,
            to: extract_usage(to, link_id)?,
            run_time: parse_duration(run_time)?,
        });
    }
    Ok((id, links))
}

fn parse_time(text: &str) -> Result<NaiveTime, TimetableError> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .map_err(|e| TimetableError::InvalidTimeError(text.to_string(), e.to_string()))
}

fn extract_journey(element: &Element) -> Result<RawVehicleJourney, TimetableError> {
    let code = element
        .find_text("VehicleJourneyCode")
        .ok_or_else(|| {
            TimetableError::MalformedDocumentError(
                "VehicleJourney without a VehicleJourneyCode".to_string(),
            )
        })?
        .to_string();
    let departure = element.find_text("DepartureTime").ok_or_else(|| {
        TimetableError::MalformedDocumentError(format!(
            "VehicleJourney {} without a DepartureTime",
            code
        ))
    })?;
    let mut notes = BTreeMap::new();
    for note in element.children_named("Note") {
        if let (Some(note_code), Some(text)) = (note.find_text("NoteCode"), note.find_text("NoteText"))
        {
            notes.insert(note_code.to_string(), text.to_string());
        }
    }
    Ok(RawVehicleJourney {
        departure_time: parse_time(departure)?,
        private_code: element.find_text("PrivateCode").map(String::from),
        pattern_ref: element.find_text("JourneyPatternRef").map(String::from),
        journey_ref: element.find_text("VehicleJourneyRef").map(String::from),
        operating_profile: element
            .find("OperatingProfile")
            .map(OperatingProfile::from_element)
            .transpose()?,
        start_deadrun: deadrun_ref(element, "StartDeadRun"),
        end_deadrun: deadrun_ref(element, "EndDeadRun"),
        sequence_number: element
            .attribute("SequenceNumber")
            .and_then(|text| text.parse().ok()),
        operator_ref: element.find_text("OperatorRef").map(String::from),
        notes,
        code,
    })
}

/// dead run bounds carry their timing link reference under a ShortWorking
/// wrapper in most documents, directly in a few older ones.
fn deadrun_ref(element: &Element, name: &str) -> Option<String> {
    let bound = element.find(name)?;
    bound
        .find_text("ShortWorking/JourneyPatternTimingLinkRef")
        .or_else(|| bound.find_text("JourneyPatternTimingLinkRef"))
        .map(String::from)
}

fn extract_service(element: &Element) -> Result<RawService, TimetableError> {
    let mut patterns = Vec::new();
    if let Some(standard) = element.find("StandardService") {
        for pattern in standard.children_named("JourneyPattern") {
            let id = pattern
                .attribute("id")
                .ok_or_else(|| {
                    TimetableError::MalformedDocumentError(
                        "JourneyPattern without an id".to_string(),
                    )
                })?
                .to_string();
            patterns.push(RawPattern {
                id,
                direction: pattern.find_text("Direction").map(String::from),
                route_ref: pattern.find_text("RouteRef").map(String::from),
                section_refs: pattern
                    .children_named("JourneyPatternSectionRefs")
                    .filter_map(Element::own_text)
                    .map(String::from)
                    .collect(),
            });
        }
    }
    Ok(RawService {
        service_code: element.find_text("ServiceCode").map(String::from),
        mode: element.find_text("Mode").map(String::from),
        description: element.find_text("Description").map(String::from),
        registered_operator_ref: element.find_text("RegisteredOperatorRef").map(String::from),
        operating_period: element
            .find("OperatingPeriod")
            .map(OperatingPeriod::from_element)
            .transpose()?,
        operating_profile: element
            .find("OperatingProfile")
            .map(OperatingProfile::from_element)
            .transpose()?,
        patterns,
    })
}
