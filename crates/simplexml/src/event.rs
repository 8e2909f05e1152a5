//! Pull-based XML event source.
//!
//! The decoder consumes a flat sequence of [`XmlEvent`]s. [`XmlEvents`] produces
//! that sequence from a [`quick_xml::Reader`]; any other
//! `Iterator<Item = Result<XmlEvent>>` works just as well, which is how tests
//! feed hand-built (and deliberately broken) streams.

use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::BufRead;

/// One parse event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// An element was opened.
    Start(ElementStart),

    /// An element was closed. Carries the qualified name of the closing tag.
    End(String),

    /// Character data, already unescaped. CDATA sections arrive as text too.
    Text(String),
}

/// The opening tag of an element.
///
/// Attributes never reach the decoded value; they are carried so that mixed
/// content can be re-serialized as it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementStart {
    /// Qualified name as written, prefix included (`dc:title`).
    pub name: String,

    /// Attribute names and unescaped values, in document order.
    pub attributes: Vec<(String, String)>,
}

impl XmlEvent {
    /// A start event without attributes.
    pub fn start(name: impl Into<String>) -> Self {
        XmlEvent::Start(ElementStart::new(name))
    }

    /// An end event.
    pub fn end(name: impl Into<String>) -> Self {
        XmlEvent::End(name.into())
    }

    /// A text event.
    pub fn text(text: impl Into<String>) -> Self {
        XmlEvent::Text(text.into())
    }
}

impl ElementStart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }
}

/// Adapts a quick-xml reader into a stream of [`XmlEvent`]s.
///
/// Self-closing elements are expanded into a start/end pair. Comments,
/// processing instructions, the XML declaration and DOCTYPE are dropped.
/// Whitespace is never trimmed; deciding what whitespace means is the
/// decoder's job.
pub struct XmlEvents<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// End event owed for a self-closing element.
    pending_end: Option<String>,
    finished: bool,
}

impl<'a> XmlEvents<&'a [u8]> {
    /// Read events from an in-memory document.
    pub fn from_text(content: &'a str) -> Self {
        Self::from_reader(content.as_bytes())
    }
}

impl<R: BufRead> XmlEvents<R> {
    /// Read events from any buffered reader.
    pub fn from_reader(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        reader.config_mut().expand_empty_elements = true;

        Self {
            reader,
            buf: Vec::new(),
            pending_end: None,
            finished: false,
        }
    }

    fn read_next(&mut self) -> Result<Option<XmlEvent>> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Some(XmlEvent::End(name)));
        }

        loop {
            self.buf.clear();
            let event_start = self.reader.buffer_position();

            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => {
                    return Ok(Some(XmlEvent::Start(element_start(&e, event_start)?)));
                }
                Ok(Event::Empty(e)) => {
                    // Only reachable if expand_empty_elements is turned off.
                    let start = element_start(&e, event_start)?;
                    self.pending_end = Some(start.name.clone());
                    return Ok(Some(XmlEvent::Start(start)));
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Ok(Some(XmlEvent::End(name)));
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|err| Error::XmlSyntax {
                        message: format!("Invalid text content: {}", err),
                        position: Some(event_start),
                    })?;
                    return Ok(Some(XmlEvent::Text(text.into_owned())));
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    return Ok(Some(XmlEvent::Text(text)));
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_)) => {}
                Ok(Event::Eof) => return Ok(None),
                Err(e) => {
                    return Err(Error::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position()),
                    });
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for XmlEvents<R> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let next = self.read_next().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.finished = true;
        }
        next
    }
}

fn element_start(e: &BytesStart<'_>, tag_start: u64) -> Result<ElementStart> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|err| Error::XmlSyntax {
            message: format!("Invalid attribute value: {}", err),
            position: Some(tag_start),
        })?;
        attributes.push((key, value.into_owned()));
    }

    Ok(ElementStart { name, attributes })
}
