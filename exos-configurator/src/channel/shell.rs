//! PTY shell over an SSH channel.

use std::time::Duration;

use log::{debug, trace, warn};
use regex::bytes::Regex;
use russh::Channel;
use russh::client::Msg;
use tokio::time::{Instant, timeout, timeout_at};

use super::buffer::PatternBuffer;
use super::stream::ShellStream;
use crate::error::{ChannelError, Result};

/// Output must pause this long, ending in a prompt, before a resync succeeds.
const RESYNC_QUIET: Duration = Duration::from_millis(250);

/// An interactive shell session with prompt-delimited reads.
///
/// A read that times out leaves the switch's late output in flight. Before
/// the timeout is reported the channel sends an empty line and drains output
/// until it is quiet at a prompt. If that does not happen the channel is
/// marked desynchronized and refuses further use.
pub struct ShellChannel<S = Channel<Msg>> {
    stream: S,
    prompt: Regex,
    buffer: PatternBuffer,
    timeout: Duration,
    desynchronized: bool,
}

impl<S: ShellStream> ShellChannel<S> {
    pub fn new(stream: S, prompt: Regex, search_depth: usize, timeout: Duration) -> Self {
        Self {
            stream,
            prompt,
            buffer: PatternBuffer::new(search_depth),
            timeout,
            desynchronized: false,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn is_desynchronized(&self) -> bool {
        self.desynchronized
    }

    /// Send one line followed by a newline.
    pub async fn send(&mut self, line: &str) -> Result<()> {
        if self.desynchronized {
            return Err(ChannelError::Desynchronized.into());
        }
        self.write_line(line).await
    }

    /// Read until the tail of the output matches one of `patterns`, using
    /// the channel timeout.
    pub async fn read_until(&mut self, patterns: &[&Regex]) -> Result<(Vec<u8>, usize)> {
        self.read_until_within(patterns, self.timeout).await
    }

    /// Read until the tail of the output matches one of `patterns`.
    ///
    /// Returns everything read, and the index of the first pattern that
    /// matches it.
    pub async fn read_until_within(
        &mut self,
        patterns: &[&Regex],
        limit: Duration,
    ) -> Result<(Vec<u8>, usize)> {
        if self.desynchronized {
            return Err(ChannelError::Desynchronized.into());
        }
        let deadline = Instant::now() + limit;

        loop {
            if let Some(index) = patterns
                .iter()
                .position(|p| self.buffer.find_tail(p).is_some())
            {
                return Ok((self.buffer.take(), index));
            }

            match timeout_at(deadline, self.stream.read()).await {
                Ok(Ok(Some(data))) => {
                    trace!("read {} bytes", data.len());
                    self.buffer.extend(&data);
                }
                Ok(Ok(None)) => return Err(ChannelError::Closed.into()),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    debug!("no prompt after {limit:?}, {} bytes buffered", self.buffer.len());
                    self.resync(limit).await?;
                    return Err(ChannelError::PatternTimeout(limit).into());
                }
            }
        }
    }

    /// Bring the stream back to a known prompt after a timeout.
    async fn resync(&mut self, limit: Duration) -> Result<()> {
        self.write_line("").await?;
        let deadline = Instant::now() + limit;

        loop {
            match timeout(RESYNC_QUIET, self.stream.read()).await {
                Ok(Ok(Some(data))) => self.buffer.extend(&data),
                Ok(Ok(None)) => return Err(ChannelError::Closed.into()),
                Ok(Err(e)) => return Err(e),
                Err(_) if self.buffer.find_tail(&self.prompt).is_some() => {
                    debug!("resynchronized, dropping {} bytes", self.buffer.len());
                    self.buffer.clear();
                    return Ok(());
                }
                Err(_) => {}
            }

            if Instant::now() >= deadline {
                warn!("shell did not return to a prompt, giving up on this session");
                self.buffer.clear();
                self.desynchronized = true;
                return Err(ChannelError::Desynchronized.into());
            }
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.stream.write(&data).await
    }
}

impl ShellChannel<Channel<Msg>> {
    pub async fn close(self) -> Result<()> {
        self.stream.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
