use busmatrix_txc::Timetable;
use itertools::Itertools;

/// renders each active grouping as aligned plain-text columns, with one
/// footnote line per note code beneath the grid. debugging output, not a
/// product surface.
pub fn render(timetable: &Timetable) -> String {
    let mut out = String::new();
    if let Some(date) = timetable.date {
        out.push_str(&format!("{}\n\n", date.format("%A %-d %B %Y")));
    }
    for grouping in timetable.active_groupings() {
        out.push_str(&timetable.label(grouping));
        out.push('\n');
        let names: Vec<String> = grouping
            .rows
            .iter()
            .map(|row| row.stop.to_string())
            .collect();
        let name_width = names.iter().map(String::len).max().unwrap_or(0);
        let entries: Vec<Vec<String>> = grouping
            .rows
            .iter()
            .map(|row| row.times.iter().map(ToString::to_string).collect())
            .collect();
        let widths: Vec<usize> = (0..grouping.columns.len())
            .map(|column| {
                entries
                    .iter()
                    .filter_map(|row| row.get(column))
                    .map(String::len)
                    .max()
                    .unwrap_or(0)
                    .max(5)
            })
            .collect();
        for (name, row) in names.iter().zip(&entries) {
            let cells = row
                .iter()
                .enumerate()
                .map(|(column, text)| {
                    format!("{:>width$}", text, width = widths.get(column).copied().unwrap_or(5))
                })
                .join("  ");
            out.push_str(format!("{:<name_width$}  {}", name, cells).trim_end());
            out.push('\n');
        }
        for (code, feet) in &grouping.column_feet {
            let spans = feet
                .iter()
                .map(|foot| match &foot.notes {
                    Some(text) => format!("{} (x{})", text, foot.span),
                    None => format!("- (x{})", foot.span),
                })
                .join("  ");
            out.push_str(&format!("{}: {}\n", code, spans));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use busmatrix_txc::TimetableSources;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<TransXChange xmlns="http://www.transxchange.org.uk/">
  <StopPoints>
    <AnnotatedStopPointRef>
      <StopPointRef>A</StopPointRef><CommonName>Quay</CommonName><LocalityName>Looe</LocalityName>
    </AnnotatedStopPointRef>
    <AnnotatedStopPointRef>
      <StopPointRef>B</StopPointRef><CommonName>Big Green</CommonName><LocalityName>Polperro</LocalityName>
    </AnnotatedStopPointRef>
  </StopPoints>
  <JourneyPatternSections>
    <JourneyPatternSection id="JPS_1">
      <JourneyPatternTimingLink id="L1">
        <From><StopPointRef>A</StopPointRef></From>
        <To><StopPointRef>B</StopPointRef></To>
        <RunTime>PT10M</RunTime>
      </JourneyPatternTimingLink>
    </JourneyPatternSection>
  </JourneyPatternSections>
  <Services>
    <Service>
      <ServiceCode>PF0000459:134</ServiceCode>
      <OperatingProfile>
        <RegularDayType><DaysOfWeek><MondayToSunday/></DaysOfWeek></RegularDayType>
      </OperatingProfile>
      <StandardService>
        <JourneyPattern id="JP_1">
          <Direction>outbound</Direction>
          <JourneyPatternSectionRefs>JPS_1</JourneyPatternSectionRefs>
        </JourneyPattern>
      </StandardService>
      <Description>Looe - Polperro</Description>
    </Service>
  </Services>
  <VehicleJourneys>
    <VehicleJourney>
      <VehicleJourneyCode>VJ_1</VehicleJourneyCode>
      <JourneyPatternRef>JP_1</JourneyPatternRef>
      <DepartureTime>10:00:00</DepartureTime>
    </VehicleJourney>
    <VehicleJourney>
      <VehicleJourneyCode>VJ_2</VehicleJourneyCode>
      <JourneyPatternRef>JP_1</JourneyPatternRef>
      <DepartureTime>11:30:00</DepartureTime>
    </VehicleJourney>
  </VehicleJourneys>
</TransXChange>"#;

    #[test]
    fn test_render_aligns_columns() {
        let date = "2017-09-01".parse().expect("failure parsing date");
        let timetable =
            Timetable::from_reader(DOCUMENT.as_bytes(), &TimetableSources::default(), Some(date))
                .expect("failure building timetable");
        let text = render(&timetable);
        assert!(text.starts_with("Friday 1 September 2017\n"));
        assert!(text.contains("Looe - Polperro\n"));
        assert!(text.contains("Looe Quay           10:00  11:30"));
        assert!(text.contains("Polperro Big Green  10:10  11:40"));
    }
}
