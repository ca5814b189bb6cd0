//! Byte stream abstraction
//!
//! The session only needs blocking reads and writes on one stream and a way
//! to ask for low-latency sends. Everything else about transport is up to
//! the implementor.

use std::io::{self, Read, Write};
use std::net::TcpStream;

/// A blocking, bidirectional byte stream
///
/// `Read::read_exact` and `Write::write_all` are the only I/O the codec
/// performs. Timeouts, if any, belong to the implementor.
pub trait ByteStream: Read + Write {
    /// Disable send coalescing (Nagle's algorithm on TCP)
    fn set_low_latency(&self) -> io::Result<()>;

    /// Peer description for logging
    fn peer_label(&self) -> String {
        "unknown".to_string()
    }
}

impl ByteStream for TcpStream {
    fn set_low_latency(&self) -> io::Result<()> {
        self.set_nodelay(true)
    }

    fn peer_label(&self) -> String {
        self.peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }
}
