//! Re-serialization of element content for mixed-content leaves.

use crate::ElementStart;
use quick_xml::escape::{escape, partial_escape};

/// Append-only serialization of the events seen while recording.
///
/// Each open element remembers where its content starts, so closing it can
/// hand back exactly the markup between its tags. Elements closed with no
/// content are written self-closing. The buffer is released whenever the
/// outermost recorded element closes.
#[derive(Debug, Default)]
pub(crate) struct Transcript {
    buf: String,
    /// Content start offset of each open element, outermost first.
    open: Vec<usize>,
}

impl Transcript {
    pub(crate) fn open(&mut self, start: &ElementStart) {
        self.buf.push('<');
        self.buf.push_str(&start.name);
        for (name, value) in &start.attributes {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape(value.as_str()));
            self.buf.push('"');
        }
        self.buf.push('>');
        self.open.push(self.buf.len());
    }

    pub(crate) fn text(&mut self, text: &str) {
        self.buf.push_str(&partial_escape(text));
    }

    /// Close the innermost open element, returning its inner markup when
    /// `capture` is set.
    pub(crate) fn close(&mut self, name: &str, capture: bool) -> Option<String> {
        let start = self.open.pop()?;
        let inner = capture.then(|| self.buf[start..].to_string());

        if self.buf.len() == start {
            // Nothing was written since the start tag's '>'.
            self.buf.pop();
            self.buf.push_str("/>");
        } else {
            self.buf.push_str("</");
            self.buf.push_str(name);
            self.buf.push('>');
        }

        if self.open.is_empty() {
            self.buf.clear();
        }
        inner
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        self.open.is_empty() && self.buf.is_empty()
    }
}
