//! Convert simple-content XML to nested maps and back.
//!
//! "Simple content" means XML where data lives in element text and nesting:
//! attributes are ignored, and an element with children becomes a map from
//! child tag to child value. A tag that repeats among siblings becomes a list,
//! and leaf text goes through a configurable [`Conversion`].
//!
//! Prose elements that mix text and markup (`<p>Some <em>very</em> important
//! text</p>`) cannot be represented as maps. The decoder recognizes them,
//! either from their structure or from an explicit tag list, and keeps their
//! content as serialized [`Value::Markup`].
//!
//! # Example
//!
//! ```rust
//! use simplexml::{Decoder, DecoderOptions, Value};
//!
//! let xml = r#"<node>
//!   <title>My Book</title>
//!   <author>Me</author>
//!   <content>
//!     <h1>Chapter 1</h1>
//!     <p>Some <em>very</em> important text</p>
//!   </content>
//!   <endnote>note 1</endnote>
//!   <endnote>note 2</endnote>
//! </node>"#;
//!
//! let doc = Decoder::new(DecoderOptions::document()).decode_str(xml).unwrap();
//!
//! assert_eq!(doc.root, "node");
//! assert_eq!(doc.get("title"), Some(&Value::from("My Book")));
//! assert_eq!(doc.value.get_all("endnote").len(), 2);
//! assert_eq!(
//!     doc.get("content").and_then(Value::as_str),
//!     Some("<h1>Chapter 1</h1> <p>Some <em>very</em> important text</p>")
//! );
//! ```
//!
//! Encoding goes the other way:
//!
//! ```rust
//! let value = simplexml::decode("<a><x>1</x><x>2.5</x></a>").unwrap().value;
//! assert_eq!(simplexml::encode(&value, "a").unwrap(), "<a><x>1</x><x>2.5</x></a>");
//! ```

pub mod convert;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod event;
mod markup;
pub mod options;
pub mod value;

// Re-export main types
pub use convert::Conversion;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use event::{ElementStart, XmlEvent, XmlEvents};
pub use options::{DEFAULT_ROOT, DecoderOptions, EncoderOptions, MixedPolicy};
pub use value::{Document, Map, Value};

/// Decode a document with default options.
pub fn decode(xml: &str) -> Result<Document> {
    Decoder::default().decode_str(xml)
}

/// Encode `value` under the `root` tag with default options.
pub fn encode(value: &Value, root: &str) -> Result<String> {
    Encoder::new(EncoderOptions::new().with_root(root)).encode(value)
}
