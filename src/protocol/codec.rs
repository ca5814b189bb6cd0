//! Protocol codec
//!
//! Encoding of requests and decoding of replies.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<len raw bytes>\r\n      (once per argument)
//! ```
//!
//! ### Reply (first byte selects the form)
//! ```text
//! +<line>\r\n                         status
//! -<line>\r\n                         error
//! :<signed integer>\r\n               integer
//! $<len>\r\n<len bytes>\r\n           bulk string    ($-1\r\n = nil)
//! *<count>\r\n<count replies>         array          (*-1\r\n = nil)
//! ```

use std::io::{self, Cursor, Read, Write};

use bytes::{BufMut, Bytes};

use super::command::decimal_len;
use super::{Arg, Command, Reply};
use crate::error::{RespError, Result};

pub const TAG_STATUS: u8 = b'+';
pub const TAG_ERROR: u8 = b'-';
pub const TAG_INTEGER: u8 = b':';
pub const TAG_BULK: u8 = b'$';
pub const TAG_ARRAY: u8 = b'*';

pub const CRLF: &[u8] = b"\r\n";

/// Default largest bulk string (512 MB)
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Default largest array element count
pub const DEFAULT_MAX_ARRAY_LEN: usize = 16 * 1024 * 1024;

/// Default deepest array nesting
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default longest status, error, integer or length line (64 KB)
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Bulk payloads are read in chunks of this size so memory use follows
/// the bytes actually received rather than the declared length
const BULK_READ_CHUNK: usize = 64 * 1024;

/// Upper bound on up-front element slots reserved for an array
const ARRAY_PREALLOC: usize = 1024;

/// Bounds applied to lengths and counts read from the server before they
/// are trusted for allocation or recursion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest bulk string payload, in bytes
    pub max_bulk_len: usize,

    /// Longest single-line reply or header, in bytes, not counting CRLF
    pub max_line_len: usize,

    /// Largest declared array count
    pub max_array_len: usize,

    /// Deepest array nesting (an array inside an array is depth 2)
    pub max_depth: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: `*<argc>\r\n` then `$<len>\r\n<arg>\r\n` per argument. Lengths
/// are byte lengths, so arguments may hold any byte including NUL.
pub fn encode_command(command: &Command) -> Result<Bytes> {
    if command.is_empty() {
        return Err(RespError::Format("command has no arguments".to_string()));
    }

    let total = command.encoded_len();
    let mut buf = reserve_buffer(total, "encoded command")?;

    buf.put_u8(TAG_ARRAY);
    put_decimal(&mut buf, command.len() as i64);
    buf.put_slice(CRLF);
    for arg in command.args() {
        buf.put_u8(TAG_BULK);
        put_decimal(&mut buf, arg.len() as i64);
        buf.put_slice(CRLF);
        buf.put_slice(arg);
        buf.put_slice(CRLF);
    }

    debug_assert_eq!(buf.len(), total);
    Ok(Bytes::from(buf))
}

/// Parse a template and encode the resulting command in one step
pub fn format_command(template: &str, args: &[Arg<'_>]) -> Result<Bytes> {
    let command = Command::format(template, args)?;
    encode_command(&command)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Reply Encoding
// =============================================================================

/// Encode a reply to bytes
///
/// Status and error text cannot contain CR or LF since they are framed by
/// the line terminator.
pub fn encode_reply(reply: &Reply) -> Result<Bytes> {
    let mut buf = Vec::new();
    put_reply(&mut buf, reply)?;
    Ok(Bytes::from(buf))
}

fn put_reply(buf: &mut Vec<u8>, reply: &Reply) -> Result<()> {
    match reply {
        Reply::Status(text) => put_line(buf, TAG_STATUS, text),
        Reply::Error(text) => put_line(buf, TAG_ERROR, text),
        Reply::Integer(value) => {
            grow(buf, 1 + 20 + 2)?;
            buf.put_u8(TAG_INTEGER);
            put_decimal(buf, *value);
            buf.put_slice(CRLF);
            Ok(())
        }
        Reply::Nil => {
            grow(buf, 5)?;
            buf.put_slice(b"$-1\r\n");
            Ok(())
        }
        Reply::Bulk(data) => {
            grow(buf, 1 + decimal_len(data.len()) + 2 + data.len() + 2)?;
            buf.put_u8(TAG_BULK);
            put_decimal(buf, data.len() as i64);
            buf.put_slice(CRLF);
            buf.put_slice(data);
            buf.put_slice(CRLF);
            Ok(())
        }
        Reply::Array(elements) => {
            grow(buf, 1 + decimal_len(elements.len()) + 2)?;
            buf.put_u8(TAG_ARRAY);
            put_decimal(buf, elements.len() as i64);
            buf.put_slice(CRLF);
            for element in elements {
                put_reply(buf, element)?;
            }
            Ok(())
        }
    }
}

fn put_line(buf: &mut Vec<u8>, tag: u8, text: &str) -> Result<()> {
    if text.bytes().any(|b| b == b'\r' || b == b'\n') {
        return Err(RespError::Format(format!(
            "line reply {:?} contains CR or LF",
            text
        )));
    }
    grow(buf, 1 + text.len() + 2)?;
    buf.put_u8(tag);
    buf.put_slice(text.as_bytes());
    buf.put_slice(CRLF);
    Ok(())
}

// =============================================================================
// Reply Decoding
// =============================================================================

/// Read one complete reply from a stream using the default limits
///
/// Blocks until the whole reply (including every nested element) has been
/// received or an error occurs.
pub fn read_reply<R: Read>(reader: &mut R) -> Result<Reply> {
    read_reply_with_limits(reader, &DecodeLimits::default())
}

/// Read one complete reply from a stream
pub fn read_reply_with_limits<R: Read>(reader: &mut R, limits: &DecodeLimits) -> Result<Reply> {
    let reply = ReplyReader { reader, limits }.read(0)?;
    tracing::trace!(kind = reply.kind().name(), "Decoded reply");
    Ok(reply)
}

/// Decode one reply from the front of a byte slice
///
/// Returns the reply and the number of bytes it occupied. Bytes after the
/// reply are left untouched.
pub fn decode_reply(bytes: &[u8]) -> Result<(Reply, usize)> {
    let mut cursor = Cursor::new(bytes);
    let reply = read_reply(&mut cursor)?;
    Ok((reply, cursor.position() as usize))
}

/// Recursive-descent reader over one reply
struct ReplyReader<'a, R> {
    reader: &'a mut R,
    limits: &'a DecodeLimits,
}

impl<R: Read> ReplyReader<'_, R> {
    /// `depth` is the number of arrays enclosing the reply being read
    fn read(&mut self, depth: usize) -> Result<Reply> {
        let mut tag = [0u8; 1];
        self.reader.read_exact(&mut tag).map_err(|e| eof_context(e, "reply type byte"))?;

        match tag[0] {
            TAG_ERROR => Ok(Reply::Error(self.read_text_line()?)),
            TAG_STATUS => Ok(Reply::Status(self.read_text_line()?)),
            TAG_INTEGER => {
                let line = self.read_line()?;
                Ok(Reply::Integer(parse_integer_lenient(&line)))
            }
            TAG_BULK => self.read_bulk(),
            TAG_ARRAY => self.read_array(depth),
            other => Err(RespError::UnknownReplyType(other)),
        }
    }

    fn read_bulk(&mut self) -> Result<Reply> {
        let line = self.read_line()?;
        let len = match parse_length(&line, "bulk")? {
            Some(len) => len,
            None => return Ok(Reply::Nil),
        };
        if len > self.limits.max_bulk_len {
            return Err(RespError::LimitExceeded(format!(
                "bulk length {} exceeds limit {}",
                len, self.limits.max_bulk_len
            )));
        }

        let mut payload: Vec<u8> = Vec::new();
        while payload.len() < len {
            let chunk = (len - payload.len()).min(BULK_READ_CHUNK);
            payload.try_reserve(chunk).map_err(|e| {
                RespError::OutOfMemory(format!("bulk payload of {} bytes: {}", len, e))
            })?;
            let start = payload.len();
            payload.resize(start + chunk, 0);
            self.reader
                .read_exact(&mut payload[start..])
                .map_err(|e| eof_context(e, "bulk payload"))?;
        }

        // The declared length, not the terminator, delimits the payload
        let mut terminator = [0u8; 2];
        self.reader
            .read_exact(&mut terminator)
            .map_err(|e| eof_context(e, "bulk terminator"))?;
        if terminator != *b"\r\n" {
            return Err(RespError::Protocol(format!(
                "bulk string of {} bytes not followed by CRLF (got {:?})",
                len,
                String::from_utf8_lossy(&terminator)
            )));
        }

        Ok(Reply::Bulk(Bytes::from(payload)))
    }

    fn read_array(&mut self, depth: usize) -> Result<Reply> {
        let line = self.read_line()?;
        let count = match parse_length(&line, "array")? {
            Some(count) => count,
            None => return Ok(Reply::Nil),
        };
        if count > self.limits.max_array_len {
            return Err(RespError::LimitExceeded(format!(
                "array length {} exceeds limit {}",
                count, self.limits.max_array_len
            )));
        }
        if depth >= self.limits.max_depth {
            return Err(RespError::LimitExceeded(format!(
                "array nesting exceeds depth limit {}",
                self.limits.max_depth
            )));
        }

        let mut elements: Vec<Reply> = Vec::new();
        elements
            .try_reserve_exact(count.min(ARRAY_PREALLOC))
            .map_err(|e| RespError::OutOfMemory(format!("array of {} elements: {}", count, e)))?;
        for _ in 0..count {
            let element = self.read(depth + 1)?;
            elements
                .try_reserve(1)
                .map_err(|e| RespError::OutOfMemory(format!("array of {} elements: {}", count, e)))?;
            elements.push(element);
        }

        Ok(Reply::Array(elements))
    }

    /// Read up to LF, dropping the CR bytes right before it
    ///
    /// Only the content counts against `max_line_len`. A CR is held back
    /// until a following byte shows it is not part of the terminator.
    fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        let mut pending_cr = 0usize;
        let mut byte = [0u8; 1];
        loop {
            self.reader
                .read_exact(&mut byte)
                .map_err(|e| eof_context(e, "reply line"))?;
            match byte[0] {
                b'\n' => break,
                b'\r' => pending_cr += 1,
                other => {
                    let len = line.len() + pending_cr + 1;
                    if len > self.limits.max_line_len {
                        return Err(RespError::LimitExceeded(format!(
                            "reply line longer than {} bytes",
                            self.limits.max_line_len
                        )));
                    }
                    line.try_reserve(pending_cr + 1)
                        .map_err(|e| RespError::OutOfMemory(format!("reply line: {}", e)))?;
                    line.resize(line.len() + pending_cr, b'\r');
                    line.push(other);
                    pending_cr = 0;
                }
            }
        }
        Ok(line)
    }

    /// Invalid UTF-8 sequences become U+FFFD
    fn read_text_line(&mut self) -> Result<String> {
        let line = self.read_line()?;
        Ok(match String::from_utf8(line) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse a `$`/`*` header: an optional `-` then digits only. `-1` means
/// nil; any other negative is an error.
fn parse_length(line: &[u8], what: &str) -> Result<Option<usize>> {
    let invalid = || {
        RespError::Protocol(format!(
            "invalid {} length line {:?}",
            what,
            String::from_utf8_lossy(line)
        ))
    };
    let digits = line.strip_prefix(b"-").unwrap_or(line);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let value: i64 = std::str::from_utf8(line)
        .map_err(|_| invalid())?
        .parse()
        .map_err(|_| invalid())?;
    match value {
        -1 => Ok(None),
        v if v < 0 => Err(invalid()),
        v => usize::try_from(v).map(Some).map_err(|_| invalid()),
    }
}

/// Parse an integer reply the way C's `strtoll` does: skip leading
/// whitespace, take an optional sign and the digits up to the first
/// non-digit. No digits gives 0; overflow saturates.
fn parse_integer_lenient(line: &[u8]) -> i64 {
    let mut bytes = line
        .iter()
        .copied()
        .skip_while(u8::is_ascii_whitespace)
        .peekable();
    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for byte in bytes.take_while(u8::is_ascii_digit) {
        let digit = i64::from(byte - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// Replace std's generic short-read message with what was being read
fn eof_context(err: io::Error, what: &str) -> RespError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        RespError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("connection closed while reading {}", what),
        ))
    } else {
        RespError::Io(err)
    }
}

fn reserve_buffer(len: usize, what: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| RespError::OutOfMemory(format!("{} of {} bytes: {}", what, len, e)))?;
    Ok(buf)
}

fn grow(buf: &mut Vec<u8>, additional: usize) -> Result<()> {
    buf.try_reserve(additional)
        .map_err(|e| RespError::OutOfMemory(format!("encoded reply: {}", e)))
}

/// Append the ASCII decimal form of `value`
fn put_decimal(buf: &mut Vec<u8>, value: i64) {
    let mut digits = [0u8; 20];
    let mut pos = digits.len();
    let mut rest = value.unsigned_abs();
    loop {
        pos -= 1;
        digits[pos] = b'0' + (rest % 10) as u8;
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    if value < 0 {
        buf.put_u8(b'-');
    }
    buf.put_slice(&digits[pos..]);
}
