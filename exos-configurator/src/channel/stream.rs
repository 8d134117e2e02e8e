//! Raw byte stream under a shell.

use std::future::Future;

use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use crate::error::{ChannelError, Result};

/// Bidirectional byte stream to a switch CLI.
pub trait ShellStream: Send {
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Next chunk of output, or `None` once the remote side has closed.
    ///
    /// Must be cancel safe: it is raced against read deadlines.
    fn read(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;
}

impl ShellStream for Channel<Msg> {
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.data(data).await.map_err(ChannelError::Ssh)?;
            Ok(())
        }
    }

    fn read(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
        async move {
            loop {
                match self.wait().await {
                    Some(ChannelMsg::Data { data }) | Some(ChannelMsg::ExtendedData { data, .. }) => {
                        return Ok(Some(data.to_vec()));
                    }
                    Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => return Ok(None),
                    Some(_) => {}
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// What the fake switch does after a line is written.
    #[derive(Debug, Clone)]
    pub(crate) enum Event {
        Data(Vec<u8>),
        Close,
    }

    pub(crate) fn data(text: &str) -> Event {
        Event::Data(text.as_bytes().to_vec())
    }

    /// Stream whose every write releases the next scripted reply.
    ///
    /// With nothing left to read, `read` never completes.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedStream {
        replies: VecDeque<Vec<Event>>,
        pending: VecDeque<Event>,
        written: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedStream {
        pub(crate) fn reply(mut self, events: Vec<Event>) -> Self {
            self.replies.push_back(events);
            self
        }

        /// Handle to the lines written so far, without line terminators.
        pub(crate) fn written(&self) -> Arc<Mutex<Vec<String>>> {
            self.written.clone()
        }
    }

    impl ShellStream for ScriptedStream {
        fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
            let line = String::from_utf8_lossy(data).trim_end_matches('\n').to_string();
            self.written.lock().unwrap().push(line);
            if let Some(events) = self.replies.pop_front() {
                self.pending.extend(events);
            }
            std::future::ready(Ok(()))
        }

        fn read(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
            let next = self.pending.pop_front();
            async move {
                match next {
                    Some(Event::Data(data)) => Ok(Some(data)),
                    Some(Event::Close) => Ok(None),
                    None => std::future::pending().await,
                }
            }
        }
    }
}
