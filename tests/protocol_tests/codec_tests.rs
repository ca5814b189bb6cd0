//! Reply Codec Tests
//!
//! Tests for reply decoding, decode limits and reply encoding.

use std::io::Cursor;

use bytes::Bytes;
use respwire::protocol::{
    decode_reply, encode_reply, read_reply, read_reply_with_limits, DecodeLimits, Reply,
    ReplyKind,
};
use respwire::RespError;

fn decode(bytes: &[u8]) -> Reply {
    let (reply, consumed) = decode_reply(bytes).unwrap();
    assert_eq!(consumed, bytes.len(), "reply did not consume all input");
    reply
}

fn bulk(data: &[u8]) -> Reply {
    Reply::Bulk(Bytes::copy_from_slice(data))
}

fn nested_arrays(depth: usize) -> Vec<u8> {
    let mut bytes = b"*1\r\n".repeat(depth);
    bytes.extend_from_slice(b":7\r\n");
    bytes
}

// =============================================================================
// Single Line Reply Tests
// =============================================================================

#[test]
fn test_decode_status() {
    assert_eq!(decode(b"+OK\r\n"), Reply::Status("OK".to_string()));
}

#[test]
fn test_decode_error() {
    let reply = decode(b"-ERR unknown command 'FOO'\r\n");

    assert_eq!(reply, Reply::Error("ERR unknown command 'FOO'".to_string()));
    assert!(reply.is_error());
}

#[test]
fn test_decode_line_without_carriage_return() {
    assert_eq!(decode(b"+PONG\n"), Reply::Status("PONG".to_string()));
}

#[test]
fn test_decode_empty_status() {
    assert_eq!(decode(b"+\r\n"), Reply::Status(String::new()));
}

#[test]
fn test_decode_status_with_invalid_utf8_is_lossy() {
    let reply = decode(b"+ab\xffcd\r\n");

    assert_eq!(reply, Reply::Status("ab\u{fffd}cd".to_string()));
    assert_ne!(&encode_reply(&reply).unwrap()[..], b"+ab\xffcd\r\n");
}

// =============================================================================
// Integer Reply Tests
// =============================================================================

#[test]
fn test_decode_integers() {
    assert_eq!(decode(b":1\r\n"), Reply::Integer(1));
    assert_eq!(decode(b":-7\r\n"), Reply::Integer(-7));
    assert_eq!(decode(b":0\r\n"), Reply::Integer(0));
    assert_eq!(
        decode(b":9223372036854775807\r\n"),
        Reply::Integer(i64::MAX)
    );
}

#[test]
fn test_decode_integer_is_lenient() {
    assert_eq!(decode(b":  42abc\r\n"), Reply::Integer(42));
    assert_eq!(decode(b":+5\r\n"), Reply::Integer(5));
    assert_eq!(decode(b":abc\r\n"), Reply::Integer(0));
    assert_eq!(decode(b":\r\n"), Reply::Integer(0));
}

#[test]
fn test_decode_integer_overflow_saturates() {
    assert_eq!(decode(b":99999999999999999999\r\n"), Reply::Integer(i64::MAX));
    assert_eq!(decode(b":-99999999999999999999\r\n"), Reply::Integer(i64::MIN));
}

// =============================================================================
// Bulk Reply Tests
// =============================================================================

#[test]
fn test_decode_binary_bulk() {
    let reply = decode(b"$11\r\nhello\x00world\r\n");

    let data = reply.as_bytes().unwrap();
    assert_eq!(data.len(), 11);
    assert_eq!(data, b"hello\x00world");
}

#[test]
fn test_decode_bulk_with_embedded_crlf() {
    assert_eq!(decode(b"$4\r\na\r\nb\r\n"), bulk(b"a\r\nb"));
}

#[test]
fn test_nil_bulk_is_not_empty_bulk() {
    let nil = decode(b"$-1\r\n");
    let empty = decode(b"$0\r\n\r\n");

    assert_eq!(nil, Reply::Nil);
    assert!(nil.is_nil());
    assert_eq!(empty, bulk(b""));
    assert!(!empty.is_nil());
    assert_ne!(nil, empty);
}

#[test]
fn test_decode_bulk_larger_than_read_chunk() {
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let mut wire = format!("${}\r\n", payload.len()).into_bytes();
    wire.extend_from_slice(&payload);
    wire.extend_from_slice(b"\r\n");

    assert_eq!(decode(&wire), Reply::Bulk(Bytes::from(payload)));
}

// =============================================================================
// Array Reply Tests
// =============================================================================

#[test]
fn test_decode_array_of_bulks() {
    let reply = decode(b"*2\r\n$3\r\nbar\r\n$3\r\nfoo\r\n");

    let elements = reply.into_array().unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0], bulk(b"bar"));
    assert_eq!(elements[1], bulk(b"foo"));
}

#[test]
fn test_nil_array_is_not_empty_array() {
    let nil = decode(b"*-1\r\n");
    let empty = decode(b"*0\r\n");

    assert_eq!(nil, Reply::Nil);
    assert_eq!(empty, Reply::Array(vec![]));
    assert_eq!(empty.kind(), ReplyKind::Array);
}

#[test]
fn test_decode_mixed_nested_array() {
    let reply = decode(b"*4\r\n:1\r\n*2\r\n+OK\r\n$-1\r\n-ERR x\r\n$0\r\n\r\n");

    assert_eq!(
        reply,
        Reply::Array(vec![
            Reply::Integer(1),
            Reply::Array(vec![Reply::Status("OK".to_string()), Reply::Nil]),
            Reply::Error("ERR x".to_string()),
            bulk(b""),
        ])
    );
}

#[test]
fn test_deeply_nested_tree_is_released() {
    let reply = decode(&nested_arrays(100));

    let mut depth = 0;
    let mut node = &reply;
    while let Reply::Array(elements) = node {
        assert_eq!(elements.len(), 1);
        node = &elements[0];
        depth += 1;
    }
    assert_eq!(depth, 100);
    assert_eq!(node, &Reply::Integer(7));

    drop(reply);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_unknown_type_byte() {
    let result = decode_reply(b"?what\r\n");

    match result {
        Err(RespError::UnknownReplyType(byte)) => assert_eq!(byte, b'?'),
        other => panic!("Expected unknown reply type, got {:?}", other),
    }
}

#[test]
fn test_unknown_type_inside_array() {
    let err = decode_reply(b"*2\r\n:1\r\n!oops\r\n").unwrap_err();

    assert!(err.is_protocol());
    assert!(err.is_fatal());
}

#[test]
fn test_closed_stream_is_io_error() {
    let err = decode_reply(b"").unwrap_err();

    match err {
        RespError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[test]
fn test_truncated_replies_are_io_errors() {
    let truncated: [&[u8]; 5] = [
        b"+OK",
        b"$5\r\nhel",
        b"$5\r\nhello",
        b"*2\r\n:1\r\n",
        b":12",
    ];

    for bytes in truncated {
        let result = decode_reply(bytes);
        assert!(
            matches!(result, Err(RespError::Io(_))),
            "{:?} gave {:?}",
            String::from_utf8_lossy(bytes),
            result
        );
    }
}

#[test]
fn test_bulk_without_terminator() {
    let result = decode_reply(b"$3\r\nfooXY");

    assert!(matches!(result, Err(RespError::Protocol(_))));
}

#[test]
fn test_malformed_length_lines() {
    let malformed: [&[u8]; 8] = [
        b"$abc\r\n",
        b"$-2\r\n",
        b"*-5\r\n",
        b"*\r\n",
        b"$12x\r\n",
        b"$+3\r\nfoo\r\n",
        b"*+1\r\n:1\r\n",
        b"$-\r\n",
    ];

    for bytes in malformed {
        let result = decode_reply(bytes);
        assert!(
            matches!(result, Err(RespError::Protocol(_))),
            "{:?} gave {:?}",
            String::from_utf8_lossy(bytes),
            result
        );
    }
}

// =============================================================================
// Decode Limit Tests
// =============================================================================

#[test]
fn test_bulk_length_limit() {
    let limits = DecodeLimits {
        max_bulk_len: 4,
        ..DecodeLimits::default()
    };

    let ok = read_reply_with_limits(&mut Cursor::new(b"$4\r\nabcd\r\n"), &limits).unwrap();
    assert_eq!(ok, bulk(b"abcd"));

    let result = read_reply_with_limits(&mut Cursor::new(b"$5\r\nabcde\r\n"), &limits);
    assert!(matches!(result, Err(RespError::LimitExceeded(_))));
}

#[test]
fn test_huge_declared_bulk_rejected_before_reading() {
    let result = decode_reply(b"$999999999999\r\n");

    assert!(matches!(result, Err(RespError::LimitExceeded(_))));
}

#[test]
fn test_array_length_limit() {
    let limits = DecodeLimits {
        max_array_len: 2,
        ..DecodeLimits::default()
    };

    let result = read_reply_with_limits(&mut Cursor::new(b"*3\r\n:1\r\n:2\r\n:3\r\n"), &limits);
    assert!(matches!(result, Err(RespError::LimitExceeded(_))));
}

#[test]
fn test_nesting_depth_limit() {
    let limits = DecodeLimits {
        max_depth: 3,
        ..DecodeLimits::default()
    };

    let at_limit = read_reply_with_limits(&mut Cursor::new(nested_arrays(3)), &limits);
    assert!(at_limit.is_ok());

    let too_deep = read_reply_with_limits(&mut Cursor::new(nested_arrays(4)), &limits);
    assert!(matches!(too_deep, Err(RespError::LimitExceeded(_))));
}

#[test]
fn test_bulk_at_single_digit_limit() {
    let limits = DecodeLimits {
        max_bulk_len: 1,
        ..DecodeLimits::default()
    };

    let ok = read_reply_with_limits(&mut Cursor::new(b"$1\r\nx\r\n"), &limits).unwrap();
    assert_eq!(ok, bulk(b"x"));

    let result = read_reply_with_limits(&mut Cursor::new(b"$2\r\nxy\r\n"), &limits);
    assert!(matches!(result, Err(RespError::LimitExceeded(_))));
}

#[test]
fn test_bulk_limit_does_not_bound_lines() {
    let limits = DecodeLimits {
        max_bulk_len: 4,
        ..DecodeLimits::default()
    };

    let integer = read_reply_with_limits(&mut Cursor::new(b":12345\r\n"), &limits).unwrap();
    assert_eq!(integer, Reply::Integer(12345));

    let status = read_reply_with_limits(&mut Cursor::new(b"+ABCDEFGH\r\n"), &limits).unwrap();
    assert_eq!(status, Reply::Status("ABCDEFGH".to_string()));
}

#[test]
fn test_line_length_limit() {
    let limits = DecodeLimits {
        max_line_len: 4,
        ..DecodeLimits::default()
    };

    // The CRLF terminator does not count toward the limit
    let at_limit = read_reply_with_limits(&mut Cursor::new(b"+ABCD\r\n"), &limits).unwrap();
    assert_eq!(at_limit, Reply::Status("ABCD".to_string()));

    let over = read_reply_with_limits(&mut Cursor::new(b"+ABCDE\r\n"), &limits);
    assert!(matches!(over, Err(RespError::LimitExceeded(_))));

    let header = read_reply_with_limits(&mut Cursor::new(b"$12345\r\n"), &limits);
    assert!(matches!(header, Err(RespError::LimitExceeded(_))));
}

#[test]
fn test_line_keeps_interior_carriage_return() {
    assert_eq!(decode(b"+a\rb\r\n"), Reply::Status("a\rb".to_string()));
    assert_eq!(decode(b"+OK\r\r\n"), Reply::Status("OK".to_string()));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_decode_reports_consumed_bytes() {
    let (reply, consumed) = decode_reply(b":5\r\n+extra\r\n").unwrap();

    assert_eq!(reply, Reply::Integer(5));
    assert_eq!(consumed, 4);
}

#[test]
fn test_stream_multiple_replies() {
    let mut cursor = Cursor::new(b"+OK\r\n$3\r\nbar\r\n:3\r\n*0\r\n".to_vec());

    assert_eq!(read_reply(&mut cursor).unwrap(), Reply::Status("OK".to_string()));
    assert_eq!(read_reply(&mut cursor).unwrap(), bulk(b"bar"));
    assert_eq!(read_reply(&mut cursor).unwrap(), Reply::Integer(3));
    assert_eq!(read_reply(&mut cursor).unwrap(), Reply::Array(vec![]));
    assert!(matches!(read_reply(&mut cursor), Err(RespError::Io(_))));
}

// =============================================================================
// Reply Encoding Tests
// =============================================================================

#[test]
fn test_encode_reply_wire_format() {
    let reply = Reply::Array(vec![
        Reply::Status("OK".to_string()),
        Reply::Integer(-12),
        bulk(b"a\x00b"),
        Reply::Nil,
        Reply::Error("ERR bad".to_string()),
    ]);

    let bytes = encode_reply(&reply).unwrap();
    assert_eq!(
        &bytes[..],
        b"*5\r\n+OK\r\n:-12\r\n$3\r\na\x00b\r\n$-1\r\n-ERR bad\r\n"
    );
    assert_eq!(decode(&bytes), reply);
}

#[test]
fn test_encode_integer_extremes() {
    assert_eq!(
        &encode_reply(&Reply::Integer(i64::MIN)).unwrap()[..],
        b":-9223372036854775808\r\n"
    );
    assert_eq!(&encode_reply(&Reply::Integer(0)).unwrap()[..], b":0\r\n");
}

#[test]
fn test_encode_reply_rejects_line_breaks() {
    let result = encode_reply(&Reply::Status("two\r\nlines".to_string()));

    assert!(matches!(result, Err(RespError::Format(_))));
}

// =============================================================================
// Reply Model Tests
// =============================================================================

#[test]
fn test_reply_accessors() {
    let status = Reply::Status("PONG".to_string());
    assert_eq!(status.as_str(), Some("PONG"));
    assert_eq!(status.kind(), ReplyKind::Status);

    let number = Reply::Integer(3);
    assert_eq!(number.as_integer(), Some(3));
    assert_eq!(number.as_bytes(), None);

    let binary = bulk(b"\xff\x00");
    assert_eq!(binary.as_str(), None);
    assert_eq!(binary.clone().into_bytes(), Some(Bytes::from_static(b"\xff\x00")));

    let array = Reply::Array(vec![Reply::Nil]);
    assert_eq!(array.as_array(), Some(&[Reply::Nil][..]));
    assert_eq!(ReplyKind::Nil.name(), "nil");
}

#[test]
fn test_reply_display() {
    let reply = Reply::Array(vec![
        bulk(b"bar"),
        Reply::Array(vec![Reply::Integer(1), Reply::Nil]),
        bulk(b"a\x00\"b"),
    ]);

    assert_eq!(
        reply.to_string(),
        "1) \"bar\"\n2) 1) (integer) 1\n   2) (nil)\n3) \"a\\x00\\\"b\""
    );
    assert_eq!(Reply::Error("ERR x".to_string()).to_string(), "(error) ERR x");
    assert_eq!(Reply::Array(vec![]).to_string(), "(empty array)");
}
