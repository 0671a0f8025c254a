//! Output module
//!
//! Sinks the engine writes messages to.
//!
//! # Overview
//!
//! - `RecordSink` - accepts messages one at a time, in traversal order
//! - `JsonLinesSink` - connector protocol on any `Write` (stdout in the CLI)
//! - `MemorySink` - collects messages in memory
//! - `ChannelSink` - forwards messages to a `MessageStream` consumer

mod sink;

pub use sink::{ChannelSink, JsonLinesSink, MemorySink, RecordSink};
