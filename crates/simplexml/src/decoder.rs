//! Streaming decoder: XML events to [`Document`] values.
//!
//! The decoder walks the event stream once, keeping one [`Frame`] per open
//! element. A frame is in one of three modes:
//!
//! - collecting a mapping: children are decoded into their own frames and
//!   folded into this frame's map when they close;
//! - collecting mixed content: the whole subtree is serialized as markup and
//!   nested elements only bump a depth counter;
//! - skipping: like mixed, but nothing is kept.
//!
//! Under [`MixedPolicy::Structural`] an element can only be recognized as mixed
//! once it closes, so its content is recorded in a [`Transcript`] while it
//! streams and the markup is taken from there if it turns out to be needed.

use crate::markup::Transcript;
use crate::value::insert_repeated;
use crate::{
    Document, DecoderOptions, ElementStart, Error, Map, MixedPolicy, Result, Value, XmlEvent,
    XmlEvents,
};
use std::io::BufRead;

/// Converts XML documents into [`Value`]s.
///
/// A decoder is immutable and holds no per-document state, so one instance can
/// decode any number of documents, including concurrently from several threads.
///
/// # Example
///
/// ```rust
/// use simplexml::{Decoder, Value};
///
/// let decoder = Decoder::default();
/// let doc = decoder
///     .decode_str("<book><title>My Book</title><year>2009</year></book>")
///     .unwrap();
///
/// assert_eq!(doc.root, "book");
/// assert_eq!(doc.get("title"), Some(&Value::from("My Book")));
/// assert_eq!(doc.get("year"), Some(&Value::Integer(2009)));
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    options: DecoderOptions,
    policy: MixedPolicy,
}

impl Decoder {
    pub fn new(options: DecoderOptions) -> Self {
        let policy = options.mixed_policy();
        Self { options, policy }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn policy(&self) -> &MixedPolicy {
        &self.policy
    }

    /// Decode an in-memory document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XmlSyntax`] for input quick-xml rejects, and the
    /// decoder errors described on [`Decoder::decode_events`].
    pub fn decode_str(&self, xml: &str) -> Result<Document> {
        self.decode_events(XmlEvents::from_text(xml))
    }

    /// Decode a document read from `reader`.
    pub fn decode_reader<R: BufRead>(&self, reader: R) -> Result<Document> {
        self.decode_events(XmlEvents::from_reader(reader))
    }

    /// Decode a document from any event source.
    ///
    /// Decoding stops as soon as the root element closes; events after it are
    /// never pulled.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedInput`] if the events run out before the root
    ///   closes, or an end event does not match the open element.
    /// - [`Error::MixedContentConflict`] if an element that is not mixed under
    ///   the active policy has both text and children.
    /// - [`Error::UnsupportedInput`] for non-whitespace text outside the root.
    pub fn decode_events<I>(&self, events: I) -> Result<Document>
    where
        I: IntoIterator<Item = Result<XmlEvent>>,
    {
        tracing::debug!(policy = ?self.policy, conversion = ?self.options.conversion, "decoding document");

        let mut state = DecodeState::new(self);
        for event in events {
            if let Some(document) = state.handle(event?)? {
                tracing::debug!(root = %document.root, "decoded document");
                return Ok(document);
            }
        }
        Err(state.unexpected_end())
    }

    /// Mode for a newly opened element.
    fn classify(&self, tag: &str, is_root: bool) -> Mode {
        if self.policy.is_declared_mixed(tag) {
            Mode::Mixed { depth: 0 }
        } else if !is_root && self.options.skip.contains(tag) {
            Mode::Skipping { depth: 0 }
        } else {
            Mode::Mapping
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}

impl From<DecoderOptions> for Decoder {
    fn from(options: DecoderOptions) -> Self {
        Self::new(options)
    }
}

/// What an open element is doing with its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Mapping,
    /// `depth` counts nested elements that are open inside this one.
    Mixed { depth: usize },
    Skipping { depth: usize },
}

/// An open element.
#[derive(Debug)]
struct Frame {
    tag: String,
    mode: Mode,
    /// Direct text, all runs concatenated. Only kept in `Mapping` mode.
    text: String,
    entries: Map,
    has_children: bool,
}

impl Frame {
    fn new(tag: String, mode: Mode) -> Self {
        Self {
            tag,
            mode,
            text: String::new(),
            entries: Map::new(),
            has_children: false,
        }
    }
}

/// Everything one decode call owns.
struct DecodeState<'d> {
    decoder: &'d Decoder,
    stack: Vec<Frame>,
    transcript: Transcript,
}

impl<'d> DecodeState<'d> {
    fn new(decoder: &'d Decoder) -> Self {
        Self {
            decoder,
            stack: Vec::new(),
            transcript: Transcript::default(),
        }
    }

    /// Feed one event. Returns the document once the root element closes.
    fn handle(&mut self, event: XmlEvent) -> Result<Option<Document>> {
        match event {
            XmlEvent::Start(start) => {
                self.start(start)?;
                Ok(None)
            }
            XmlEvent::Text(text) => {
                self.text(&text)?;
                Ok(None)
            }
            XmlEvent::End(name) => self.end(&name),
        }
    }

    /// Whether events are currently written to the transcript.
    fn recording(&self) -> bool {
        self.decoder.policy.is_structural()
            || matches!(
                self.stack.last(),
                Some(Frame {
                    mode: Mode::Mixed { .. },
                    ..
                })
            )
    }

    fn start(&mut self, start: ElementStart) -> Result<()> {
        let decoder = self.decoder;

        match self.stack.last_mut() {
            None => {
                let mode = decoder.classify(&start.name, true);
                self.stack.push(Frame::new(start.name.clone(), mode));
            }
            Some(Frame {
                mode: Mode::Mixed { depth } | Mode::Skipping { depth },
                ..
            }) => *depth += 1,
            Some(parent) => {
                if !decoder.policy.is_structural() && has_content(&parent.text) {
                    let text = parent.text.trim().to_string();
                    return Err(self.conflict(text));
                }
                parent.has_children = true;

                let mode = decoder.classify(&start.name, false);
                if let Mode::Mixed { .. } = mode {
                    tracing::trace!(tag = %start.name, "collecting mixed content");
                }
                self.stack.push(Frame::new(start.name.clone(), mode));
            }
        }

        if self.recording() {
            self.transcript.open(&start);
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        let structural = self.decoder.policy.is_structural();

        match self.stack.last_mut() {
            None if has_content(text) => {
                return Err(Error::UnsupportedInput {
                    message: format!("text {:?} outside the root element", text.trim()),
                    path: Vec::new(),
                });
            }
            None => return Ok(()),
            Some(frame) if frame.mode == Mode::Mapping => {
                if !structural && frame.has_children && has_content(text) {
                    return Err(self.conflict(text.trim().to_string()));
                }
                frame.text.push_str(text);
            }
            Some(_) => {}
        }

        if self.recording() {
            self.transcript.text(text);
        }
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<Option<Document>> {
        let recording = self.recording();

        let Some(frame) = self.pop_frame(name)? else {
            // A nested element inside a mixed or skipped subtree.
            if recording {
                self.transcript.close(name, false);
            }
            return Ok(None);
        };

        let tag = frame.tag.clone();
        let value = self.finish(frame, recording);

        match (self.stack.last_mut(), value) {
            (Some(parent), Some(value)) => {
                insert_repeated(&mut parent.entries, tag, value);
                Ok(None)
            }
            (Some(_), None) => Ok(None),
            (None, value) => Ok(Some(Document {
                root: tag,
                value: value.unwrap_or(Value::Null),
            })),
        }
    }

    /// Pop the frame that `</name>` closes, or return `None` when the end tag
    /// belongs to a nested element of a mixed or skipped frame.
    fn pop_frame(&mut self, name: &str) -> Result<Option<Frame>> {
        match self.stack.last_mut() {
            None => Err(Error::MalformedInput {
                message: format!("closing tag </{}> has no open element", name),
                path: Vec::new(),
            }),
            Some(Frame {
                mode: Mode::Mixed { depth } | Mode::Skipping { depth },
                ..
            }) if *depth > 0 => {
                *depth -= 1;
                Ok(None)
            }
            Some(frame) if frame.tag != name => {
                let message = format!("closing tag </{}> does not match <{}>", name, frame.tag);
                Err(Error::MalformedInput {
                    message,
                    path: self.path(),
                })
            }
            Some(_) => Ok(self.stack.pop()),
        }
    }

    /// Compute a closed frame's value. Skipped elements have none.
    fn finish(&mut self, frame: Frame, recording: bool) -> Option<Value> {
        let conversion = self.decoder.options.conversion;

        match frame.mode {
            Mode::Skipping { .. } => {
                if recording {
                    self.transcript.close(&frame.tag, false);
                }
                tracing::trace!(tag = %frame.tag, "skipped element");
                None
            }
            Mode::Mixed { .. } => {
                let markup = self.transcript.close(&frame.tag, true).unwrap_or_default();
                tracing::debug!(tag = %frame.tag, "folded explicit mixed content");
                Some(conversion.apply_markup(&markup))
            }
            Mode::Mapping => {
                let mixed = self.decoder.policy.is_structural()
                    && frame.has_children
                    && has_content(&frame.text);
                let markup = if recording {
                    self.transcript.close(&frame.tag, mixed)
                } else {
                    None
                };

                if mixed {
                    tracing::debug!(tag = %frame.tag, "detected mixed content");
                    Some(conversion.apply_markup(&markup.unwrap_or_default()))
                } else if frame.has_children {
                    Some(Value::Map(frame.entries))
                } else {
                    Some(conversion.apply(Some(&frame.text)))
                }
            }
        }
    }

    fn path(&self) -> Vec<String> {
        self.stack.iter().map(|frame| frame.tag.clone()).collect()
    }

    /// The innermost open element holds both text and children.
    fn conflict(&self, text: String) -> Error {
        let tag = self
            .stack
            .last()
            .map(|frame| frame.tag.clone())
            .unwrap_or_default();
        Error::MixedContentConflict {
            tag,
            text,
            path: self.path(),
        }
    }

    /// Error for an event stream that ran out before the root closed.
    fn unexpected_end(&self) -> Error {
        let message = match self.stack.last() {
            Some(frame) => format!("input ended before </{}> was closed", frame.tag),
            None => "input contains no root element".to_string(),
        };
        Error::MalformedInput {
            message,
            path: self.path(),
        }
    }
}

fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}
