//! Client Session
//!
//! Sends one command at a time and waits for its reply.

use std::io::{BufReader, Write};
use std::net::TcpStream;

use parking_lot::Mutex;

use super::{connect_with_retry, ByteStream, Connector, TcpConnector};
use crate::config::Config;
use crate::error::{RespError, Result};
use crate::protocol::{encode_command, read_reply_with_limits, Arg, Command, DecodeLimits, Reply};

/// A client session over one byte stream
///
/// Requests and replies are strictly lock-step: `execute` writes one
/// command and returns only once its reply is fully decoded. After an I/O
/// or protocol error the stream position is unknown, so the session is
/// marked broken and refuses further commands.
pub struct Client<S: ByteStream = TcpStream> {
    /// Stream with buffered reads; writes go to the inner stream
    reader: BufReader<S>,

    /// Bounds applied while decoding replies
    limits: DecodeLimits,

    /// Peer address for logging
    peer: String,

    /// Set after a fatal error
    broken: bool,
}

impl Client<TcpStream> {
    /// Connect over TCP to `config.host:config.port`
    pub fn connect(config: &Config) -> Result<Self> {
        Self::connect_with(&TcpConnector::from_config(config), config)
    }
}

impl<S: ByteStream> Client<S> {
    /// Connect through `connector`, retrying per `config`
    ///
    /// On success the stream is asked for low-latency mode when
    /// `config.nodelay` is set; failing to set it is logged, not fatal.
    pub fn connect_with<C>(connector: &C, config: &Config) -> Result<Self>
    where
        C: Connector<Stream = S>,
    {
        let stream = connect_with_retry(connector, config)?;

        if config.nodelay {
            if let Err(e) = stream.set_low_latency() {
                tracing::warn!(addr = %config.addr(), "Could not enable low-latency mode: {}", e);
            }
        }

        Ok(Self::from_stream(stream, config))
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: S, config: &Config) -> Self {
        let peer = stream.peer_label();
        tracing::debug!("Session opened to {}", peer);
        Self {
            reader: BufReader::new(stream),
            limits: config.decode_limits(),
            peer,
            broken: false,
        }
    }

    /// Send a templated command and wait for its reply
    ///
    /// ```no_run
    /// # use respwire::{Client, Config};
    /// # use respwire::protocol::Arg;
    /// let mut client = Client::connect(&Config::default())?;
    /// client.send("SET %s %b", &[Arg::Str("foo"), Arg::Bin(b"hello\0world")])?;
    /// let reply = client.send("GET foo", &[])?;
    /// # Ok::<(), respwire::RespError>(())
    /// ```
    ///
    /// Template errors are reported before anything is written and leave the
    /// session usable.
    pub fn send(&mut self, template: &str, args: &[Arg<'_>]) -> Result<Reply> {
        let command = Command::format(template, args)?;
        self.execute(&command)
    }

    /// Send a prepared command and wait for its reply
    pub fn execute(&mut self, command: &Command) -> Result<Reply> {
        if self.broken {
            return Err(RespError::ConnectionBroken);
        }

        let frame = encode_command(command)?;
        tracing::trace!(
            peer = %self.peer,
            command = %String::from_utf8_lossy(command.name().unwrap_or_default()),
            args = command.len(),
            bytes = frame.len(),
            "Sending command"
        );

        match self.round_trip(&frame) {
            Ok(reply) => Ok(reply),
            Err(e) => {
                tracing::warn!("Session to {} is broken: {}", self.peer, e);
                self.broken = true;
                Err(e)
            }
        }
    }

    fn round_trip(&mut self, frame: &[u8]) -> Result<Reply> {
        let stream = self.reader.get_mut();
        stream.write_all(frame)?;
        stream.flush()?;
        read_reply_with_limits(&mut self.reader, &self.limits)
    }

    /// Get the peer address string
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// True once a fatal error has made the session unusable
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    pub fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    /// Give back the stream. Buffered but unread reply bytes are discarded.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

/// A client session usable from several threads
///
/// Each call holds the lock for a whole request/reply exchange, so
/// commands from different threads never interleave on the stream.
pub struct SharedClient<S: ByteStream = TcpStream> {
    inner: Mutex<Client<S>>,
}

impl<S: ByteStream> SharedClient<S> {
    pub fn new(client: Client<S>) -> Self {
        Self {
            inner: Mutex::new(client),
        }
    }

    /// See [`Client::send`]
    pub fn send(&self, template: &str, args: &[Arg<'_>]) -> Result<Reply> {
        self.inner.lock().send(template, args)
    }

    /// See [`Client::execute`]
    pub fn execute(&self, command: &Command) -> Result<Reply> {
        self.inner.lock().execute(command)
    }

    pub fn is_broken(&self) -> bool {
        self.inner.lock().is_broken()
    }

    pub fn into_inner(self) -> Client<S> {
        self.inner.into_inner()
    }
}

impl SharedClient<TcpStream> {
    /// Connect over TCP and wrap the session
    pub fn connect(config: &Config) -> Result<Self> {
        Ok(Self::new(Client::connect(config)?))
    }
}
