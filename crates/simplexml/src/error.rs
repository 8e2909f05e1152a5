//! Error types for decoding and encoding.

use thiserror::Error;

/// Result type alias for simplexml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or encoding a document.
#[derive(Debug, Error)]
pub enum Error {
    /// The XML tokenizer rejected the input.
    #[error("XML syntax error: {message}{}", format_position(.position))]
    XmlSyntax {
        message: String,
        /// Byte offset where the error occurred.
        position: Option<u64>,
    },

    /// The event stream does not describe a complete element tree.
    #[error("Malformed input: {message}{}", format_path(.path))]
    MalformedInput {
        message: String,
        /// Open element tags, outermost first.
        path: Vec<String>,
    },

    /// An element holds both text and child elements but is not mixed.
    #[error(
        "Element <{tag}> has both text ({text:?}) and child elements but is not treated as mixed content{}",
        format_path(.path)
    )]
    MixedContentConflict {
        tag: String,
        /// The offending non-whitespace text, trimmed.
        text: String,
        path: Vec<String>,
    },

    /// An event arrived that the decoder has no rule for.
    #[error("Unsupported input: {message}{}", format_path(.path))]
    UnsupportedInput { message: String, path: Vec<String> },

    /// The encoder was given a value it cannot express as XML.
    #[error("Unsupported value: {message}")]
    UnsupportedValue { message: String },

    /// An options document could not be deserialized.
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    /// Writing encoded output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_position(position: &Option<u64>) -> String {
    match position {
        Some(pos) => format!(" at byte {}", pos),
        None => String::new(),
    }
}

fn format_path(path: &[String]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" (at /{})", path.join("/"))
    }
}

impl Error {
    /// Stable code identifying the error kind, independent of message wording.
    pub fn code(&self) -> &'static str {
        match self {
            Error::XmlSyntax { .. } => "SX-1",
            Error::MalformedInput { .. } => "SX-2",
            Error::MixedContentConflict { .. } => "SX-3",
            Error::UnsupportedInput { .. } => "SX-4",
            Error::UnsupportedValue { .. } => "SX-5",
            Error::InvalidOptions { .. } => "SX-6",
            Error::Io(_) => "SX-7",
        }
    }

    /// A suggestion for fixing the problem, when one exists.
    pub fn hint(&self) -> Option<String> {
        match self {
            Error::MixedContentConflict { tag, .. } => Some(format!(
                "Add \"{}\" to the mixed-content tags (DecoderOptions::with_mixed) and decode again?",
                tag
            )),
            Error::MalformedInput { path, .. } if !path.is_empty() => {
                Some("Check that all opening tags have matching closing tags?".to_string())
            }
            Error::UnsupportedValue { .. } => Some(
                "Lists may only appear as mapping values, one level deep?".to_string(),
            ),
            _ => None,
        }
    }

    /// The open element tags at the point of failure, outermost first.
    pub fn path(&self) -> &[String] {
        match self {
            Error::MalformedInput { path, .. }
            | Error::MixedContentConflict { path, .. }
            | Error::UnsupportedInput { path, .. } => path,
            _ => &[],
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlSyntax {
            message: err.to_string(),
            position: None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlSyntax {
            message: format!("Attribute error: {}", err),
            position: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidOptions {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            Error::XmlSyntax {
                message: "x".to_string(),
                position: None,
            },
            Error::MalformedInput {
                message: "x".to_string(),
                path: vec![],
            },
            Error::MixedContentConflict {
                tag: "a".to_string(),
                text: "x".to_string(),
                path: vec![],
            },
            Error::UnsupportedInput {
                message: "x".to_string(),
                path: vec![],
            },
            Error::UnsupportedValue {
                message: "x".to_string(),
            },
            Error::InvalidOptions {
                message: "x".to_string(),
            },
            Error::Io(std::io::Error::other("x")),
        ];

        let mut codes: Vec<&str> = errors.iter().map(Error::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_includes_path() {
        let err = Error::MalformedInput {
            message: "input ended before </b> was closed".to_string(),
            path: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Malformed input: input ended before </b> was closed (at /a/b)"
        );
    }

    #[test]
    fn test_display_includes_position() {
        let err = Error::XmlSyntax {
            message: "bad".to_string(),
            position: Some(7),
        };
        assert_eq!(err.to_string(), "XML syntax error: bad at byte 7");
    }

    #[test]
    fn test_conflict_hint_names_tag() {
        let err = Error::MixedContentConflict {
            tag: "para".to_string(),
            text: "hello".to_string(),
            path: vec!["doc".to_string(), "para".to_string()],
        };
        let hint = err.hint().unwrap();
        assert!(hint.contains("\"para\""));
        assert_eq!(err.path(), ["doc".to_string(), "para".to_string()]);
    }
}
