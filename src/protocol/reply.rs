//! Reply definitions
//!
//! Represents one decoded server response.

use std::fmt;

use bytes::Bytes;

/// Reply kinds, one per wire form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Error,
    Status,
    Integer,
    Bulk,
    Nil,
    Array,
}

impl ReplyKind {
    /// Lower-case name used in logs and error messages
    pub fn name(self) -> &'static str {
        match self {
            ReplyKind::Error => "error",
            ReplyKind::Status => "status",
            ReplyKind::Integer => "integer",
            ReplyKind::Bulk => "bulk",
            ReplyKind::Nil => "nil",
            ReplyKind::Array => "array",
        }
    }
}

/// A decoded server reply
///
/// Replies form a tree: an `Array` owns its elements outright, so dropping
/// the root releases every nested reply exactly once. Nothing else keeps a
/// reference into the tree once the decoder hands it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `-<line>`: error reported by the server
    ///
    /// Decoding is lossy: invalid UTF-8 in the line is replaced with
    /// U+FFFD, so re-encoding may not reproduce the bytes received.
    Error(String),

    /// `+<line>`: single-line status such as `OK` or `PONG`
    ///
    /// Decoded lossily, like `Error`.
    Status(String),

    /// `:<n>`: signed 64-bit integer
    Integer(i64),

    /// `$<len>`: binary-safe payload of exactly the declared length
    Bulk(Bytes),

    /// `$-1` or `*-1`: absent value. Never the same as an empty bulk or array
    Nil,

    /// `*<count>`: ordered elements, each a full reply of any kind
    Array(Vec<Reply>),
}

impl Reply {
    /// Get the reply kind
    pub fn kind(&self) -> ReplyKind {
        match self {
            Reply::Error(_) => ReplyKind::Error,
            Reply::Status(_) => ReplyKind::Status,
            Reply::Integer(_) => ReplyKind::Integer,
            Reply::Bulk(_) => ReplyKind::Bulk,
            Reply::Nil => ReplyKind::Nil,
            Reply::Array(_) => ReplyKind::Array,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Raw bytes of a bulk, status or error reply
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Reply::Bulk(data) => Some(data),
            Reply::Status(text) | Reply::Error(text) => Some(text.as_bytes()),
            _ => None,
        }
    }

    /// Text of a status reply, or of a bulk reply holding valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Status(text) => Some(text),
            Reply::Bulk(data) => std::str::from_utf8(data).ok(),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Take ownership of the elements of an array reply
    pub fn into_array(self) -> Option<Vec<Reply>> {
        match self {
            Reply::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Take ownership of the payload of a bulk reply
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            Reply::Bulk(data) => Some(data),
            _ => None,
        }
    }
}

// =============================================================================
// Display (interactive client style)
// =============================================================================

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_reply(f, self, 0)
    }
}

/// Writes `reply`; continuation lines of arrays are indented by `indent`
fn write_reply(f: &mut fmt::Formatter<'_>, reply: &Reply, indent: usize) -> fmt::Result {
    match reply {
        Reply::Error(text) => write!(f, "(error) {}", text),
        Reply::Status(text) => f.write_str(text),
        Reply::Integer(value) => write!(f, "(integer) {}", value),
        Reply::Bulk(data) => {
            f.write_str("\"")?;
            for byte in data.iter() {
                write!(f, "{}", std::ascii::escape_default(*byte))?;
            }
            f.write_str("\"")
        }
        Reply::Nil => f.write_str("(nil)"),
        Reply::Array(elements) if elements.is_empty() => f.write_str("(empty array)"),
        Reply::Array(elements) => {
            for (i, element) in elements.iter().enumerate() {
                let prefix = format!("{}) ", i + 1);
                if i > 0 {
                    write!(f, "\n{:indent$}", "", indent = indent)?;
                }
                f.write_str(&prefix)?;
                write_reply(f, element, indent + prefix.len())?;
            }
            Ok(())
        }
    }
}
