//! XML to generic tree conversion and back.
//!
//! # Design
//! Responses have no schema on this side of the wire, so the decoder maps
//! elements onto `serde_json::Value` using the usual xml-to-dict rules:
//!
//! - an element with no attributes and no children becomes its text, or
//!   `null` when it has none;
//! - otherwise it becomes an object: attributes under `@name`, children
//!   under their tag name, text under `#text`;
//! - repeated sibling tags collapse into an array in document order.
//!
//! The document itself is `{ "<root tag>": <root value> }`. `encode`
//! performs the inverse mapping and exists for fixtures and round-trip
//! checks.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::map::Entry;
use serde_json::{Map, Value};

use crate::error::ApiError;

const TEXT_KEY: &str = "#text";

fn xml_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::Xml(err.to_string())
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl OpenElement {
    fn open(start: &BytesStart<'_>) -> Result<Self, ApiError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(xml_error)?
            .to_string();
        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(xml_error)?;
            let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_error)?;
            let value = attr.unescape_value().map_err(xml_error)?;
            attributes.insert(format!("@{key}"), Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self.children.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(items) => items.push(value),
                existing => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            },
        }
    }

    /// Text pieces are joined first and trimmed once, so whitespace next to
    /// a child element survives inside mixed content.
    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            let value = if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            };
            return (self.name, value);
        }
        let mut object = self.attributes;
        object.extend(self.children);
        if !text.is_empty() {
            object.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        (self.name, Value::Object(object))
    }
}

fn finish(element: OpenElement, stack: &mut [OpenElement], root: &mut Option<Value>) {
    let (name, value) = element.close();
    match stack.last_mut() {
        Some(parent) => parent.push_child(name, value),
        None => {
            let mut document = Map::new();
            document.insert(name, value);
            *root = Some(Value::Object(document));
        }
    }
}

fn push_text(stack: &mut [OpenElement], text: &str) -> Result<(), ApiError> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ApiError::Xml(format!("text outside the root element: {text:?}"))),
    }
}

/// Decode a complete XML document. Any syntax error fails the whole call.
pub fn decode(text: &str) -> Result<Value, ApiError> {
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(ApiError::Xml("more than one root element".to_string()));
                }
                stack.push(OpenElement::open(&start)?);
            }
            Event::Empty(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(ApiError::Xml("more than one root element".to_string()));
                }
                let element = OpenElement::open(&start)?;
                finish(element, &mut stack, &mut root);
            }
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    ApiError::Xml(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(end.name().as_ref())
                    ))
                })?;
                finish(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_error)?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(&data).map_err(xml_error)?;
                push_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ApiError::Xml(format!(
            "document ended inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| ApiError::Xml("document has no root element".to_string()))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<(), ApiError> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
        }
        Value::Object(object) => {
            let mut start = BytesStart::new(name);
            for (key, value) in object {
                if let Some(attr) = key.strip_prefix('@') {
                    start.push_attribute((attr, scalar_text(value).as_str()));
                }
            }
            writer.write_event(Event::Start(start)).map_err(xml_error)?;
            for (key, value) in object {
                if key == TEXT_KEY {
                    let text = scalar_text(value);
                    writer
                        .write_event(Event::Text(BytesText::new(&text)))
                        .map_err(xml_error)?;
                } else if !key.starts_with('@') {
                    write_element(writer, key, value)?;
                }
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_error)?;
        }
        scalar => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_error)?;
            let text = scalar_text(scalar);
            if !text.is_empty() {
                writer
                    .write_event(Event::Text(BytesText::new(&text)))
                    .map_err(xml_error)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_error)?;
        }
    }
    Ok(())
}

/// Encode a `{ "<root tag>": ... }` tree as an XML document.
pub fn encode(document: &Value) -> Result<String, ApiError> {
    let root = match document {
        Value::Object(map) if map.len() == 1 => map,
        _ => {
            return Err(ApiError::Xml(
                "document must be an object with exactly one root key".to_string(),
            ))
        }
    };

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;
    for (name, value) in root {
        if value.is_array() {
            return Err(ApiError::Xml(format!("root <{name}> cannot repeat")));
        }
        write_element(&mut writer, name, value)?;
    }
    String::from_utf8(writer.into_inner()).map_err(xml_error)
}
