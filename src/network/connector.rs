//! Connectors
//!
//! Opens byte streams and applies the bounded connect retry policy.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::ByteStream;
use crate::config::Config;
use crate::error::{RespError, Result};

/// Opens a stream to `host:port`
pub trait Connector {
    type Stream: ByteStream;

    fn connect(&self, host: &str, port: u16) -> io::Result<Self::Stream>;
}

/// TCP connector with optional connect/read/write timeouts
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl TcpConnector {
    /// Connector without any timeouts
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector using the timeouts from `config` (0 means none)
    pub fn from_config(config: &Config) -> Self {
        Self {
            connect_timeout: millis(config.connect_timeout_ms),
            read_timeout: millis(config.read_timeout_ms),
            write_timeout: millis(config.write_timeout_ms),
        }
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let stream = match self.connect_timeout {
            None => TcpStream::connect((host, port))?,
            Some(timeout) => {
                // connect_timeout takes one address, so try each resolved one
                let mut last_err = None;
                let mut connected = None;
                for addr in (host, port).to_socket_addrs()? {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(stream) => {
                            connected = Some(stream);
                            break;
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                match connected {
                    Some(stream) => stream,
                    None => {
                        return Err(last_err.unwrap_or_else(|| {
                            io::Error::new(
                                io::ErrorKind::NotFound,
                                format!("{}:{} resolved to no addresses", host, port),
                            )
                        }))
                    }
                }
            }
        };

        stream.set_read_timeout(self.read_timeout)?;
        stream.set_write_timeout(self.write_timeout)?;
        Ok(stream)
    }
}

/// Connect with up to `config.connect_attempts` attempts
///
/// Each failed attempt is logged and retried after
/// `config.connect_retry_delay_ms`. When every attempt fails the last I/O
/// error is returned inside [`RespError::Connect`].
pub fn connect_with_retry<C: Connector>(connector: &C, config: &Config) -> Result<C::Stream> {
    config.validate()?;

    let addr = config.addr();
    let delay = millis(config.connect_retry_delay_ms);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match connector.connect(&config.host, config.port) {
            Ok(stream) => {
                tracing::debug!(%addr, attempt, "Connected");
                return Ok(stream);
            }
            Err(e) if attempt >= config.connect_attempts => {
                tracing::error!(%addr, attempts = attempt, "Giving up connecting: {}", e);
                return Err(RespError::Connect {
                    addr,
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!(
                    %addr,
                    attempt,
                    max_attempts = config.connect_attempts,
                    "Connect failed, retrying: {}",
                    e
                );
                if let Some(delay) = delay {
                    std::thread::sleep(delay);
                }
            }
        }
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
