//! Record sinks

use crate::engine::Message;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::Write;
use tokio::sync::mpsc::Sender;

/// Where the engine hands messages, in traversal order
///
/// The engine awaits every `emit`, so a slow sink slows the run down.
/// A sink error aborts the run.
#[async_trait]
pub trait RecordSink: Send {
    /// Accept one message
    async fn emit(&mut self, message: Message) -> Result<()>;

    /// Flush buffered output
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// JSON Lines
// ============================================================================

/// Writes one protocol message per line
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    pretty: bool,
    written: usize,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Create a compact JSON lines sink
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
            written: 0,
        }
    }

    /// Pretty-print each message instead
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Messages written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Consume the sink, returning the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    async fn emit(&mut self, message: Message) -> Result<()> {
        let value = message.to_json();
        let line = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        writeln!(self.writer, "{line}")?;
        self.written += 1;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Keeps every message, for tests and embedding
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Vec<Message>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in emission order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Record messages for one stream
    pub fn records(&self, stream: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.stream() == Some(stream))
            .collect()
    }

    /// Stream names of record messages, in emission order
    pub fn record_streams(&self) -> Vec<&str> {
        self.messages.iter().filter_map(Message::stream).collect()
    }

    /// Log messages only
    pub fn logs(&self) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.is_log()).collect()
    }

    /// Consume into the messages
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn emit(&mut self, message: Message) -> Result<()> {
        self.messages.push(message);
        Ok(())
    }
}

// ============================================================================
// Channel
// ============================================================================

/// Forwards messages to a receiver running on another task
///
/// Backed by a bounded channel: once the buffer is full, `emit` waits for
/// the receiver, which pauses the run.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Sender<Result<Message>>,
}

impl ChannelSink {
    /// Wrap a sender
    pub fn new(sender: Sender<Result<Message>>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl RecordSink for ChannelSink {
    async fn emit(&mut self, message: Message) -> Result<()> {
        self.sender
            .send(Ok(message))
            .await
            .map_err(|_| Error::output("message receiver dropped"))
    }
}
