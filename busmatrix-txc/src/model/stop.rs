use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::parse::text_ops;
use crate::parse::Element;
use crate::TimetableError;

/// one stop point, keyed by its ATCO code. records come from the document's
/// own StopPoints block, or from a richer external directory when one is
/// supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub atco_code: String,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
}

impl Stop {
    /// builds a record from either stop form: an `AnnotatedStopPointRef` or
    /// a full `StopPoint` with its descriptor and place.
    pub(crate) fn from_element(element: &Element) -> Result<Stop, TimetableError> {
        let atco_code = element
            .find_text("StopPointRef")
            .or_else(|| element.find_text("AtcoCode"))
            .ok_or_else(|| {
                TimetableError::MalformedDocumentError(format!(
                    "{} without a StopPointRef or AtcoCode",
                    element.name
                ))
            })?
            .to_string();
        Ok(Stop {
            atco_code,
            common_name: element
                .find_text("CommonName")
                .or_else(|| element.find_text("Descriptor/CommonName"))
                .map(String::from),
            locality: element
                .find_text("LocalityName")
                .or_else(|| element.find_text("Place/LocalityName"))
                .map(String::from),
        })
    }

    /// a minimal record for a stop referenced by a timing link but absent
    /// from both the document's StopPoints block and the directory.
    pub(crate) fn stub(atco_code: &str) -> Stop {
        Stop {
            atco_code: atco_code.to_string(),
            common_name: None,
            locality: None,
        }
    }

    /// scores how well this stop matches a slugified place name: 2 for an
    /// exact match on locality or common name, 1 when one contains the
    /// other, 0 otherwise.
    pub fn is_at(&self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        let locality_slug = text_ops::slugify(self.locality.as_deref().unwrap_or(""));
        if !locality_slug.is_empty()
            && locality_slug != "none"
            && (text.contains(&locality_slug) || locality_slug.contains(text))
        {
            return if locality_slug == text { 2 } else { 1 };
        }
        let name_slug = text_ops::slugify(self.common_name.as_deref().unwrap_or(""));
        if !name_slug.is_empty() && (text.contains(&name_slug) || name_slug.contains(text)) {
            return if name_slug == text { 2 } else { 1 };
        }
        0
    }
}

impl Display for Stop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let common_name = self.common_name.as_deref().unwrap_or("");
        let locality = self.locality.as_deref().unwrap_or("");
        if locality.is_empty() || common_name.contains(locality) {
            if common_name.is_empty() {
                write!(f, "{}", self.atco_code)
            } else {
                write!(f, "{}", common_name)
            }
        } else {
            write!(f, "{} {}", locality, common_name)
        }
    }
}

/// external source of richer stop records, keyed by ATCO code.
pub trait StopDirectory {
    fn find(&self, atco_code: &str) -> Option<Arc<Stop>>;
}

impl StopDirectory for HashMap<String, Arc<Stop>> {
    fn find(&self, atco_code: &str) -> Option<Arc<Stop>> {
        self.get(atco_code).map(Arc::clone)
    }
}

/// a directory with no records, for building timetables from a document
/// alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDirectory;

impl StopDirectory for EmptyDirectory {
    fn find(&self, _atco_code: &str) -> Option<Arc<Stop>> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn stop(common_name: &str, locality: &str) -> Stop {
        Stop {
            atco_code: "3290YYA00385".to_string(),
            common_name: (!common_name.is_empty()).then(|| common_name.to_string()),
            locality: (!locality.is_empty()).then(|| locality.to_string()),
        }
    }

    #[test]
    fn test_display_prefixes_locality() {
        assert_eq!(stop("Crellow Fields", "Stithians").to_string(), "Stithians Crellow Fields");
    }

    #[test]
    fn test_display_skips_locality_already_in_name() {
        assert_eq!(stop("Stithians Church", "Stithians").to_string(), "Stithians Church");
    }

    #[test]
    fn test_display_falls_back_to_atco_code() {
        assert_eq!(stop("", "").to_string(), "3290YYA00385");
    }

    #[test]
    fn test_is_at_exact_locality() {
        assert_eq!(stop("Crellow Fields", "Stithians").is_at("stithians"), 2);
    }

    #[test]
    fn test_is_at_partial_match() {
        assert_eq!(stop("Bus Station", "King's Lynn").is_at("kings-lynn-south"), 1);
        assert_eq!(stop("Penzance Harbour", "").is_at("penzance"), 1);
    }

    #[test]
    fn test_is_at_no_match() {
        assert_eq!(stop("Crellow Fields", "Stithians").is_at("truro"), 0);
    }
}
