use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Map;

use super::DecodeError;
use crate::types::AnyValue;

/// Convert an XML document into a nested mapping.
///
/// The root element is the single top-level key. Attributes become `@name` keys, repeated
/// sibling elements become a sequence, and text-only elements become strings. Text of an
/// element that also has attributes or children is kept under `#text`. Empty elements are
/// null.
pub fn xml_to_value(input: &str) -> Result<AnyValue, DecodeError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, AnyValue)> = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => stack.push(Element::open(&e)?),
            Event::Empty(e) => {
                let element = Element::open(&e)?;
                close(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DecodeError::Xml("unexpected closing tag".to_string()))?;
                close(element, &mut stack, &mut root)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(xml_err)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                let bytes = c.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| DecodeError::Utf8(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::Xml(format!("unclosed element <{}>", open.name)));
    }
    let (name, value) = root.ok_or_else(|| DecodeError::Xml("document has no root element".to_string()))?;
    let mut map = Map::new();
    map.insert(name, value);
    Ok(AnyValue::Object(map))
}

struct Element {
    name: String,
    attributes: Map<String, AnyValue>,
    children: Map<String, AnyValue>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(xml_err)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_err)?;
            attributes.insert(format!("@{key}"), AnyValue::String(value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, value: AnyValue) {
        match self.children.get_mut(&name) {
            // Element values are never sequences themselves, so a sequence here means the
            // name already repeated.
            Some(AnyValue::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = AnyValue::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    fn finish(self) -> (String, AnyValue) {
        if self.attributes.is_empty() && self.children.is_empty() {
            let value = if self.text.is_empty() {
                AnyValue::Null
            } else {
                AnyValue::String(self.text)
            };
            return (self.name, value);
        }
        let mut map = self.attributes;
        map.extend(self.children);
        if !self.text.is_empty() {
            map.insert("#text".to_string(), AnyValue::String(self.text));
        }
        (self.name, AnyValue::Object(map))
    }
}

fn close(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<(String, AnyValue)>,
) -> Result<(), DecodeError> {
    let (name, value) = element.finish();
    if let Some(parent) = stack.last_mut() {
        parent.add_child(name, value);
        return Ok(());
    }
    if root.is_some() {
        return Err(DecodeError::Xml(format!(
            "more than one root element (found <{name}>)"
        )));
    }
    *root = Some((name, value));
    Ok(())
}

fn xml_err(e: impl std::fmt::Display) -> DecodeError {
    DecodeError::Xml(e.to_string())
}
