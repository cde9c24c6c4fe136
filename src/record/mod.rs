//! Review records and their line-level decoding.

mod parser;

pub use parser::RecordParser;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// One product review, decoded from a single NDJSON line.
///
/// Only `text` and `rating` are required; everything else is pass-through
/// metadata that the pipeline carries but never inspects. A metadata value
/// that is `null` or of an unexpected type decodes to the field's default
/// and never rejects the line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Review {
    pub rating: f64,
    pub text: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub asin: String,
    #[serde(default, deserialize_with = "lenient")]
    pub parent_asin: String,
    #[serde(default, deserialize_with = "lenient")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub helpful_vote: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub verified_purchase: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Vec<Value>,
    /// Keys this struct does not name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed review: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rating must be finite, got {0}")]
    Rating(f64),
}

impl Review {
    /// Build a review with empty metadata.
    pub fn new(text: impl Into<String>, rating: f64) -> Self {
        Self {
            rating,
            text: text.into(),
            title: String::new(),
            asin: String::new(),
            parent_asin: String::new(),
            user_id: String::new(),
            timestamp: None,
            helpful_vote: 0,
            verified_purchase: false,
            images: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let review: Review = serde_json::from_str(line)?;
        if !review.rating.is_finite() {
            return Err(ParseError::Rating(review.rating));
        }
        Ok(review)
    }

    /// Decode a raw line, rejecting invalid UTF-8 before touching JSON.
    pub fn parse_bytes(line: &[u8]) -> Result<Self, ParseError> {
        let line = std::str::from_utf8(line)?;
        Self::parse(line)
    }
}

#[cfg(feature = "tracing")]
pub(crate) fn preview(line: &[u8]) -> String {
    const PREVIEW_LEN: usize = 80;
    let text = String::from_utf8_lossy(line);
    let escaped = text.replace('\n', "\\n").replace('\r', "\\r");
    let mut short = escaped.chars().take(PREVIEW_LEN).collect::<String>();
    if escaped.chars().count() > PREVIEW_LEN {
        short.push_str("...");
    }
    short
}
