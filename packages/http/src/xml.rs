//! XML response bodies as JSON documents.
//!
//! The EC2 Query API answers in XML. Elements become object members named
//! after the tag; repeated tags collect into an array; an element with no
//! child elements becomes its text. `item` elements, which the API uses for
//! every list entry, always collect into an array so one-element lists keep
//! the same shape as longer ones.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

const LIST_ITEM: &str = "item";

struct Element {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            children: Map::new(),
            text: String::new(),
        }
    }

    fn insert(&mut self, name: String, value: Value) {
        if name == LIST_ITEM {
            if let Value::Array(items) = self
                .children
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                items.push(value);
            }
            return;
        }
        match self.children.remove(&name) {
            None => {
                self.children.insert(name, value);
            }
            Some(Value::Array(mut items)) => {
                items.push(value);
                self.children.insert(name, Value::Array(items));
            }
            Some(previous) => {
                self.children.insert(name, Value::Array(vec![previous, value]));
            }
        }
    }

    fn into_value(self) -> Value {
        if self.children.is_empty() {
            Value::String(self.text)
        } else {
            Value::Object(self.children)
        }
    }
}

/// Convert an XML document, or `None` if `text` is not well-formed XML.
pub(crate) fn to_json(text: &str) -> Option<Value> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Element::new(b"")];
    loop {
        match reader.read_event().ok()? {
            Event::Start(start) => stack.push(Element::new(start.name().as_ref())),
            Event::Empty(empty) => {
                let element = Element::new(empty.name().as_ref());
                stack
                    .last_mut()?
                    .insert(element.name.clone(), element.into_value());
            }
            Event::Text(text) => {
                let text = text.unescape().ok()?;
                stack.last_mut()?.text.push_str(&text);
            }
            Event::CData(data) => {
                let data = data.into_inner();
                stack
                    .last_mut()?
                    .text
                    .push_str(&String::from_utf8_lossy(&data));
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return None;
                }
                let element = stack.pop()?;
                stack
                    .last_mut()?
                    .insert(element.name.clone(), element.into_value());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match stack.pop() {
        Some(document) if stack.is_empty() && !document.children.is_empty() => {
            Some(Value::Object(document.children))
        }
        _ => None,
    }
}
