//! Value to XML serialization.

use crate::{Document, EncoderOptions, Error, Result, Value};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// Writes [`Value`]s as XML elements.
///
/// A map becomes one child element per key, and a list under a key becomes
/// repeated sibling elements with that tag, so decoding the output gives the
/// original value back. Markup leaves are written verbatim.
///
/// ```rust
/// use simplexml::{Encoder, Value};
///
/// let value = Value::from(serde_json::json!({"x": [1, 2], "y": "a & b"}));
/// let xml = Encoder::default().encode(&value).unwrap();
/// assert_eq!(xml, "<data><x>1</x><x>2</x><y>a &amp; b</y></data>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encode `value` under the configured root tag.
    pub fn encode(&self, value: &Value) -> Result<String> {
        self.encode_with_root(&self.options.root, value)
    }

    /// Encode a decoded document under its own root tag.
    pub fn encode_document(&self, document: &Document) -> Result<String> {
        self.encode_with_root(&document.root, &document.value)
    }

    /// Encode `value` under the configured root tag into `writer`.
    pub fn encode_to_writer<W: Write>(&self, value: &Value, writer: W) -> Result<()> {
        self.write_document(&self.options.root, value, writer)
    }

    fn encode_with_root(&self, root: &str, value: &Value) -> Result<String> {
        let mut buf = Vec::new();
        self.write_document(root, value, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn write_document<W: Write>(&self, root: &str, value: &Value, output: W) -> Result<()> {
        if let Value::List(_) = value {
            return Err(Error::UnsupportedValue {
                message: format!("the value of root <{}> cannot be a list", root),
            });
        }

        let mut writer = match self.options.indent {
            Some(width) => Writer::new_with_indent(output, b' ', width),
            None => Writer::new(output),
        };

        if self.options.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        tracing::debug!(root = %root, kind = value.kind(), "encoding document");
        write_element(&mut writer, root, value)
    }
}

/// Write `<tag>value</tag>`. Lists are expanded by the caller.
fn write_element<W: Write>(writer: &mut Writer<W>, tag: &str, value: &Value) -> Result<()> {
    check_tag(tag)?;

    let text = match value {
        Value::Null => None,
        Value::Map(map) if map.is_empty() => None,
        Value::Map(map) => {
            writer.write_event(Event::Start(BytesStart::new(tag)))?;
            for (key, child) in map {
                match child {
                    Value::List(items) => {
                        for item in items {
                            if let Value::List(_) = item {
                                return Err(Error::UnsupportedValue {
                                    message: format!("<{}> holds a list inside a list", key),
                                });
                            }
                            write_element(writer, key, item)?;
                        }
                    }
                    _ => write_element(writer, key, child)?,
                }
            }
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
            return Ok(());
        }
        Value::List(_) => {
            return Err(Error::UnsupportedValue {
                message: format!("<{}> holds a list inside a list", tag),
            });
        }
        Value::Integer(i) => Some(BytesText::new(&i.to_string()).into_owned()),
        Value::Float(f) => Some(BytesText::new(&format_float(tag, *f)?).into_owned()),
        Value::String(s) => Some(BytesText::new(s)),
        Value::Markup(m) => Some(BytesText::from_escaped(m.as_str())),
    };

    match text {
        Some(text) if !text.is_empty() => {
            writer.write_event(Event::Start(BytesStart::new(tag)))?;
            writer.write_event(Event::Text(text))?;
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        _ => writer.write_event(Event::Empty(BytesStart::new(tag)))?,
    }
    Ok(())
}

/// Render a float so that it reads back as a float: `2.0`, not `2`.
fn format_float(tag: &str, f: f64) -> Result<String> {
    if !f.is_finite() {
        return Err(Error::UnsupportedValue {
            message: format!("<{}> holds the non-finite number {}", tag, f),
        });
    }
    Ok(format!("{:?}", f))
}

/// Reject keys that cannot be written as an element name.
fn check_tag(tag: &str) -> Result<()> {
    let mut chars = tag.chars();
    let valid = match chars.next() {
        Some(first) if is_name_start(first) => chars.all(is_name_char),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::UnsupportedValue {
            message: format!("{:?} is not a valid element name", tag),
        })
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_numeric() || c == '-' || c == '.'
}
