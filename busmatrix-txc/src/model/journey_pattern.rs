use crate::matrix::{GroupingId, RowId};
use crate::model::{StopVisit, TimingLink};

/// arena index of a journey pattern within its timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(pub usize);

/// an ordered run of timing links shared by one or more vehicle journeys.
/// links are flattened from the pattern's section references at build time,
/// so each pattern owns its stop visits and their row bindings.
#[derive(Debug, Clone)]
pub struct JourneyPattern {
    pub id: String,
    pub direction: Option<String>,
    pub route_ref: Option<String>,
    pub links: Vec<TimingLink>,
    pub grouping: GroupingId,
}

impl JourneyPattern {
    /// stop visits in travel order: the first link's origin followed by each
    /// link's destination.
    pub fn visits(&self) -> impl Iterator<Item = &StopVisit> + '_ {
        self.links
            .first()
            .map(|link| &link.origin)
            .into_iter()
            .chain(self.links.iter().map(|link| &link.destination))
    }

    pub fn visit_count(&self) -> usize {
        if self.links.is_empty() {
            0
        } else {
            self.links.len() + 1
        }
    }

    /// binds the visit at `index` (in [`visits`](Self::visits) order) to a
    /// grid row.
    pub(crate) fn set_visit_row(&mut self, index: usize, row: RowId) {
        if index == 0 {
            if let Some(link) = self.links.first_mut() {
                link.origin.row = Some(row);
            }
        } else if let Some(link) = self.links.get_mut(index - 1) {
            link.destination.row = Some(row);
        }
    }
}
