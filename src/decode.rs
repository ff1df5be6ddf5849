//! `paper.bin` payload decoder.
//!
//! A `paper.bin` file is a msgpack document produced by an external corpus generator.
//! Two top-level shapes are accepted:
//!
//! - a bare array of paper maps
//! - a map with a `papers` array and optional `filename` and `stats` entries
//!
//! # Example
//!
//! ```
//! use paperlens::PaperBinDecoder;
//!
//! // fixarray(1) [ fixmap(1) { "title": "Example" } ]
//! let bytes = [
//!     0x91, 0x81, 0xa5, b't', b'i', b't', b'l', b'e', 0xa7, b'E', b'x', b'a', b'm', b'p', b'l', b'e',
//! ];
//!
//! let payload = PaperBinDecoder::new().decode(&bytes).unwrap();
//! assert_eq!(payload.papers[0].title.as_deref(), Some("Example"));
//! assert!(payload.filename.is_none());
//! ```

use rmpv::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::RawPaper;

/// Errors raised while decoding a `paper.bin` payload.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The bytes are not a valid msgpack document.
    #[error("Invalid msgpack payload: {0}")]
    InvalidFormat(String),

    /// The document decoded, but is neither a paper array nor a map holding one.
    #[error("Unexpected payload shape: {0}")]
    UnexpectedShape(String),

    /// An element of the paper array does not have the paper record shape.
    #[error("Invalid paper record at index {index}: {message}")]
    InvalidRecord { index: usize, message: String },
}

impl From<rmpv::decode::Error> for DecodeError {
    fn from(err: rmpv::decode::Error) -> Self {
        DecodeError::InvalidFormat(err.to_string())
    }
}

/// The decoded contents of a `paper.bin` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPayload {
    pub papers: Vec<RawPaper>,
    /// Name of the source dump the papers were extracted from
    pub filename: Option<String>,
    /// Global word statistics, in payload order
    pub stats: Option<Vec<(String, i64)>>,
}

/// Decoder for `paper.bin` payloads.
#[derive(Debug, Clone, Default)]
pub struct PaperBinDecoder;

impl PaperBinDecoder {
    /// Creates a new decoder instance.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decodes a `paper.bin` byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidFormat`] for bytes that are not a single msgpack
    /// document, [`DecodeError::UnexpectedShape`] when the top-level value is not one
    /// of the accepted shapes, and [`DecodeError::InvalidRecord`] when a paper element is
    /// not a paper map.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedPayload, DecodeError> {
        let mut reader = bytes;
        let value = rmpv::decode::read_value(&mut reader)?;
        if !reader.is_empty() {
            return Err(DecodeError::InvalidFormat(format!(
                "{} trailing bytes after the payload",
                reader.len()
            )));
        }

        let payload = match value {
            Value::Array(items) => DecodedPayload {
                papers: decode_papers(items)?,
                ..Default::default()
            },
            Value::Map(entries) => decode_wrapped(entries)?,
            other => {
                return Err(DecodeError::UnexpectedShape(format!(
                    "expected an array or a map, found {}",
                    value_kind(&other)
                )));
            }
        };

        debug!(
            papers = payload.papers.len(),
            filename = payload.filename.as_deref(),
            "decoded paper.bin payload"
        );
        Ok(payload)
    }
}

/// Decodes a `paper.bin` byte buffer with the default decoder.
pub fn decode_paper_bin(bytes: &[u8]) -> Result<DecodedPayload, DecodeError> {
    PaperBinDecoder::new().decode(bytes)
}

fn decode_papers(items: Vec<Value>) -> Result<Vec<RawPaper>, DecodeError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_map() {
                return Err(DecodeError::InvalidRecord {
                    index,
                    message: format!("expected a map, found {}", value_kind(&item)),
                });
            }
            rmpv::ext::from_value(item).map_err(|e| DecodeError::InvalidRecord {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

fn decode_wrapped(entries: Vec<(Value, Value)>) -> Result<DecodedPayload, DecodeError> {
    let mut papers = None;
    let mut filename = None;
    let mut stats = None;

    for (key, value) in entries {
        match key.as_str() {
            Some("papers") => match value {
                Value::Array(items) => papers = Some(decode_papers(items)?),
                other => {
                    return Err(DecodeError::UnexpectedShape(format!(
                        "`papers` must be an array, found {}",
                        value_kind(&other)
                    )));
                }
            },
            Some("filename") => filename = decode_filename(value),
            Some("stats") => stats = decode_stats(value),
            _ => {}
        }
    }

    let papers = papers.ok_or_else(|| {
        DecodeError::UnexpectedShape("map payload has no `papers` array".to_string())
    })?;

    Ok(DecodedPayload {
        papers,
        filename,
        stats,
    })
}

fn decode_filename(value: Value) -> Option<String> {
    match value {
        Value::Nil => None,
        Value::String(s) => s.into_str(),
        other => {
            warn!(kind = value_kind(&other), "ignoring non-string `filename`");
            None
        }
    }
}

fn decode_stats(value: Value) -> Option<Vec<(String, i64)>> {
    let entries = match value {
        Value::Nil => return None,
        Value::Map(entries) => entries,
        other => {
            warn!(kind = value_kind(&other), "ignoring non-map `stats`");
            return None;
        }
    };

    let stats = entries
        .into_iter()
        .filter_map(|(word, count)| match (word.as_str(), count.as_i64()) {
            (Some(word), Some(count)) => Some((word.to_string(), count)),
            _ => {
                warn!("skipping malformed `stats` entry");
                None
            }
        })
        .collect();
    Some(stats)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Nil => "nil",
        Value::Boolean(_) => "a boolean",
        Value::Integer(_) => "an integer",
        Value::F32(_) | Value::F64(_) => "a float",
        Value::String(_) => "a string",
        Value::Binary(_) => "binary data",
        Value::Array(_) => "an array",
        Value::Map(_) => "a map",
        Value::Ext(..) => "an extension value",
    }
}
