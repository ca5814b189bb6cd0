//! Network Module
//!
//! Byte streams, connecting, and the client session.
//!
//! ## Architecture
//! - `ByteStream`: blocking read/write plus the low-latency socket option
//! - `Connector`: opens streams; the session retries it a bounded number of times
//! - `Client`: one command in flight, reply fully decoded before returning

mod stream;
mod connector;
mod client;

pub use stream::ByteStream;
pub use connector::{connect_with_retry, Connector, TcpConnector};
pub use client::{Client, SharedClient};
