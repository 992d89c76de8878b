use std::collections::BTreeMap;

use crate::matrix::{ColumnFoot, RowList};
use crate::model::JourneyId;
use crate::parse::text_ops;

/// arena index of a grouping within its timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupingId(pub usize);

/// one direction of a service: the merged stop rows and the journey columns
/// projected onto the current date.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    pub direction: String,
    /// terminus names overriding the service description, for groupings
    /// split out of a shared document.
    pub description_parts: Option<Vec<String>>,
    pub rows: RowList,
    /// journeys assigned to this grouping, in display order.
    pub journeys: Vec<JourneyId>,
    /// journeys visible on the current date, one per grid column.
    pub columns: Vec<JourneyId>,
    pub column_feet: BTreeMap<String, Vec<ColumnFoot>>,
}

impl Grouping {
    pub fn new(direction: &str) -> Grouping {
        Grouping {
            direction: direction.to_string(),
            ..Default::default()
        }
    }

    pub fn named(direction: &str, description_parts: Vec<String>) -> Grouping {
        Grouping {
            direction: direction.to_string(),
            description_parts: Some(description_parts),
            ..Default::default()
        }
    }

    /// true when any row is a minor timing point, rendered de-emphasized.
    pub fn has_minor_stops(&self) -> bool {
        self.rows.iter().any(|row| row.is_minor())
    }

    fn starts_at(&self, text: &str) -> u32 {
        self.rows.first().map_or(0, |row| row.stop.is_at(text))
    }

    fn ends_at(&self, text: &str) -> u32 {
        self.rows.last().map_or(0, |row| row.stop.is_at(text))
    }

    /// heading for this grouping. description parts are oriented by scoring
    /// the first and last stops against the terminus names; when neither
    /// orientation wins the capitalized direction is used instead.
    pub fn label(&self, service_parts: Option<&[String]>, via: Option<&str>) -> String {
        let parts = self.description_parts.as_deref().or(service_parts);
        if let Some(parts) = parts {
            if !parts.is_empty() {
                let start = text_ops::slugify(&parts[0]);
                let end = text_ops::slugify(&parts[parts.len() - 1]);
                let same = self.starts_at(&start) + self.ends_at(&end);
                let reverse = self.starts_at(&end) + self.ends_at(&start);
                let description = if same > reverse || (same == 4 && reverse == 4) {
                    Some(parts.join(" - "))
                } else if same < reverse {
                    Some(
                        parts
                            .iter()
                            .rev()
                            .cloned()
                            .collect::<Vec<String>>()
                            .join(" - "),
                    )
                } else {
                    None
                };
                if let Some(mut description) = description {
                    if let Some(via) = via {
                        description.push_str(" via ");
                        description.push_str(via);
                    }
                    return description;
                }
            }
        }
        text_ops::capitalize(&self.direction)
    }
}
