//! Decoder and encoder configuration.
//!
//! Options are plain data: build them in code with the `with_*` methods, or
//! deserialize them from any serde format. A [`Decoder`](crate::Decoder) takes
//! its options by value and never changes them, so "adding a mixed tag" means
//! building new options and a new decoder.
//!
//! ```rust
//! use simplexml::{Conversion, DecoderOptions};
//!
//! let options = DecoderOptions::from_json_str(
//!     r#"{"conversion": "STRING", "mixed": ["body"], "skip": ["comment"]}"#,
//! )
//! .unwrap();
//! assert_eq!(options.conversion, Conversion::Trim);
//! assert!(options.skip.contains("comment"));
//! ```

use crate::{Conversion, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tags treated as mixed content by [`DecoderOptions::document`].
pub const DOCUMENT_MIXED_TAGS: [&str; 2] = ["body", "content"];

/// Root tag used by the encoder unless configured otherwise.
pub const DEFAULT_ROOT: &str = "data";

/// Constructor-time configuration for a [`Decoder`](crate::Decoder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderOptions {
    /// Policy applied to leaf text and to mixed markup.
    pub conversion: Conversion,

    /// Tags that are always mixed. When non-empty this replaces structural
    /// detection entirely.
    pub mixed: BTreeSet<String>,

    /// Tags whose elements are left out of the result.
    pub skip: BTreeSet<String>,

    /// Detect mixed content from the document structure. Only consulted when
    /// `mixed` is empty.
    pub mixed_content: bool,
}

/// How a decoder decides that an element is mixed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixedPolicy {
    /// Mixed when the element has children and non-whitespace text beside them.
    Structural,

    /// Mixed exactly when the tag is in the set.
    Explicit(BTreeSet<String>),

    /// Never mixed; text beside children is an error.
    Disabled,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            conversion: Conversion::default(),
            mixed: BTreeSet::new(),
            skip: BTreeSet::new(),
            mixed_content: true,
        }
    }
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for prose-style documents: `body` and `content` hold literal
    /// markup, everything else is structured.
    pub fn document() -> Self {
        Self::default().with_mixed(DOCUMENT_MIXED_TAGS)
    }

    /// Parse options from a JSON object. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = conversion;
        self
    }

    /// Add tags to the explicit mixed set.
    pub fn with_mixed<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mixed.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Remove tags from the explicit mixed set.
    pub fn without_mixed<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.mixed.remove(tag.as_ref());
        }
        self
    }

    /// Add tags to the skip set.
    pub fn with_skip<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Remove tags from the skip set.
    pub fn without_skip<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.skip.remove(tag.as_ref());
        }
        self
    }

    pub fn with_mixed_content(mut self, enabled: bool) -> Self {
        self.mixed_content = enabled;
        self
    }

    /// The classifier these options select.
    pub fn mixed_policy(&self) -> MixedPolicy {
        if !self.mixed.is_empty() {
            MixedPolicy::Explicit(self.mixed.clone())
        } else if self.mixed_content {
            MixedPolicy::Structural
        } else {
            MixedPolicy::Disabled
        }
    }
}

impl MixedPolicy {
    pub fn is_structural(&self) -> bool {
        matches!(self, MixedPolicy::Structural)
    }

    /// Whether `tag` is mixed before any of its content has been seen.
    pub fn is_declared_mixed(&self, tag: &str) -> bool {
        match self {
            MixedPolicy::Explicit(tags) => tags.contains(tag),
            MixedPolicy::Structural | MixedPolicy::Disabled => false,
        }
    }
}

/// Configuration for an [`Encoder`](crate::Encoder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderOptions {
    /// Tag wrapped around the encoded value.
    pub root: String,

    /// Write `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub declaration: bool,

    /// Indent nested elements by this many spaces.
    pub indent: Option<usize>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            declaration: false,
            indent: None,
        }
    }
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }
}
