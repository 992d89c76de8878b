use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::stop::EmptyDirectory;
use crate::parse::Element;

/// an operating company, from the document's Operators block or an external
/// directory keyed by operator code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Operator {
    pub(crate) fn from_element(element: &Element) -> Operator {
        let code = element
            .find_text("NationalOperatorCode")
            .or_else(|| element.find_text("OperatorCode"))
            .map(String::from);
        let id = element
            .attribute("id")
            .map(String::from)
            .or_else(|| code.clone())
            .unwrap_or_default();
        Operator {
            id,
            code,
            name: element
                .find_text("OperatorShortName")
                .or_else(|| element.find_text("TradingName"))
                .map(String::from),
        }
    }

    /// a stand-in for an operator reference nothing resolves.
    pub(crate) fn stub(code: &str) -> Operator {
        Operator {
            id: code.to_string(),
            code: None,
            name: None,
        }
    }
}

/// external source of operator records.
pub trait OperatorDirectory {
    fn find(&self, code: &str) -> Option<Operator>;
}

impl OperatorDirectory for HashMap<String, Operator> {
    fn find(&self, code: &str) -> Option<Operator> {
        self.get(code).cloned()
    }
}

impl OperatorDirectory for EmptyDirectory {
    fn find(&self, _code: &str) -> Option<Operator> {
        None
    }
}
