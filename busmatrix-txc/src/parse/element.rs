use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::TimetableError;

/// one XML element lifted out of the document stream. element and attribute
/// names are stored without their namespace prefix, so lookups use the local
/// TransXChange names such as `StopPointRef` rather than qualified ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn named(name: impl Into<String>) -> Element {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Element {
        Element {
            name: name.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// descends through children along a `/`-separated path, taking the first
    /// child matching each segment.
    pub fn find(&self, path: &str) -> Option<&Element> {
        let mut current = self;
        for segment in path.split('/') {
            current = current.children.iter().find(|child| child.name == segment)?;
        }
        Some(current)
    }

    /// trimmed, non-empty text content of the element at `path`.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(Element::own_text)
    }

    /// trimmed, non-empty text content of this element.
    pub fn own_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// copies the name and attributes of an opening tag into an owned [`Element`]
/// so the borrow on the reader's buffer can be released.
pub(crate) fn element_from_start(start: &BytesStart) -> Result<Element, TimetableError> {
    let name = String::from_utf8_lossy(start.name().local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

/// reads the remainder of the subtree whose opening tag produced `root`,
/// returning the completed element once its closing tag is consumed.
pub fn read_subtree<R: BufRead>(
    reader: &mut Reader<R>,
    root: Element,
) -> Result<Element, TimetableError> {
    let root_name = root.name.clone();
    let mut stack: Vec<Element> = vec![root];
    let mut buf: Vec<u8> = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                let child = element_from_start(&start)?;
                stack.push(child);
            }
            Event::Empty(start) => {
                let child = element_from_start(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(child);
                }
            }
            Event::Text(text) => {
                let unescaped = text.unescape().map_err(quick_xml::Error::from)?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                let finished = match stack.pop() {
                    Some(element) => element,
                    None => {
                        return Err(TimetableError::MalformedDocumentError(
                            "unbalanced closing tag".to_string(),
                        ))
                    }
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(finished),
                    None => return Ok(finished),
                }
            }
            Event::Eof => {
                return Err(TimetableError::MalformedDocumentError(format!(
                    "document ended inside <{}>",
                    root_name
                )))
            }
            _ => {}
        }
        buf.clear();
    }
}
