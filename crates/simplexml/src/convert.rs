//! Scalar conversion policies.

use crate::Value;
use serde::{Deserialize, Serialize};

/// How the raw text of a leaf (or the markup of a mixed element) becomes a
/// [`Value`].
///
/// Every policy turns absent or empty text into [`Value::Null`]. The trimming
/// policies also return `Null` for whitespace-only text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Conversion {
    /// Integer, then float, else the trimmed string.
    Number,

    /// The trimmed string.
    #[serde(rename = "STRING", alias = "TRIM")]
    Trim,

    /// Whitespace runs collapsed to one space, then trimmed.
    CollapseWhitespace,

    /// Integer, then float, else the whitespace-collapsed string.
    #[default]
    NumberOrCollapse,

    /// The text exactly as it appeared.
    Identity,
}

impl Conversion {
    /// Convert element text.
    pub fn apply(self, text: Option<&str>) -> Value {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Value::Null;
        };

        match self {
            Conversion::Number => {
                let trimmed = text.trim();
                parse_number(trimmed).unwrap_or_else(|| non_empty(trimmed.to_string()))
            }
            Conversion::Trim => non_empty(text.trim().to_string()),
            Conversion::CollapseWhitespace => non_empty(collapse_whitespace(text)),
            Conversion::NumberOrCollapse => {
                parse_number(text.trim()).unwrap_or_else(|| non_empty(collapse_whitespace(text)))
            }
            Conversion::Identity => Value::String(text.to_string()),
        }
    }

    /// Convert the serialized content of a mixed element.
    ///
    /// The markup is trimmed once, then converted like text; a string result
    /// is tagged as [`Value::Markup`].
    pub fn apply_markup(self, markup: &str) -> Value {
        match self.apply(Some(markup.trim())) {
            Value::String(s) => Value::Markup(s),
            other => other,
        }
    }
}

/// Parse a decimal integer or floating-point literal.
///
/// Integers too large for `i64` come back as floats. Spellings such as `inf`
/// or `NaN` that `f64::from_str` would accept are not numbers here.
pub fn parse_number(text: &str) -> Option<Value> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Value::Integer(i));
    }

    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }

    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Value::Float)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::String(text)
    }
}
