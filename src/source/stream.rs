//! Stream-based transport.
//!
//! Reads newline-delimited frames from an async byte stream. The
//! [`TcpConnector`] opens a TCP connection, writes the subscription request
//! as one JSON line and hands the socket to a [`LineTransport`].

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use super::{Connector, SubscriptionTarget, Transport};
use crate::error::TransportError;

/// A transport that yields one frame per line of an async reader.
///
/// Lines are returned as raw bytes without the line terminator. Blank
/// lines are skipped.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use groupwatch::{LineTransport, Transport};
///
/// # tokio_test::block_on(async {
/// let mut transport = LineTransport::new(Cursor::new(b"{\"type\":\"heartbeat\"}\n".to_vec()));
/// assert!(transport.next_frame().await.unwrap().is_some());
/// assert!(transport.next_frame().await.unwrap().is_none());
/// # });
/// ```
#[derive(Debug)]
pub struct LineTransport<R> {
    reader: BufReader<R>,
    line: Vec<u8>,
}

impl<R> LineTransport<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: Vec::new(),
        }
    }
}

#[async_trait]
impl<R> Transport for LineTransport<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            self.line.clear();
            // EOF
            if self.reader.read_until(b'\n', &mut self.line).await? == 0 {
                return Ok(None);
            }

            let trimmed = trim_line(&self.line);
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_vec()));
            }
        }
    }
}

fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &line[start..end]
}

/// Connects to a feed over TCP.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
    description: String,
}

impl TcpConnector {
    /// Create a connector for a `host:port` address.
    pub fn new(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let description = format!("tcp: {}", addr);
        Self { addr, description }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, target: &SubscriptionTarget) -> Result<Box<dyn Transport>, TransportError> {
        let mut stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| TransportError::Connect(format!("{}: {}", self.addr, e)))?;

        let mut request = target.request_line();
        request.push('\n');
        stream.write_all(request.as_bytes()).await?;
        debug!(addr = %self.addr, subscription = %target, "subscription request sent");

        Ok(Box::new(LineTransport::new(stream)))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
