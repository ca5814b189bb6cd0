//! Protocol Module
//!
//! The RESP wire protocol as spoken by the client.
//!
//! ## Request Format
//! Every request is an array of binary-safe bulk strings:
//! ```text
//! *3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$11\r\nhello\0world\r\n
//! ```
//!
//! ## Reply Types
//! - `+` Status  - single line
//! - `-` Error   - single line
//! - `:` Integer - signed 64-bit
//! - `$` Bulk    - length-prefixed bytes, `$-1` is nil
//! - `*` Array   - count-prefixed replies, `*-1` is nil

mod command;
mod reply;
mod codec;

pub use command::{Arg, Command};
pub use reply::{Reply, ReplyKind};
pub use codec::{
    decode_reply, encode_command, encode_reply, format_command, read_reply,
    read_reply_with_limits, write_command, DecodeLimits,
};
pub use codec::{
    DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_BULK_LEN, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LINE_LEN,
    TAG_ARRAY, TAG_BULK, TAG_ERROR, TAG_INTEGER, TAG_STATUS,
};
