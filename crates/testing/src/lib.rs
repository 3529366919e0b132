//! Test doubles for the callwatch interceptor layer.
//!
//! Provides an in-memory recording logger, sample payload message types, and
//! a scripted channel for driving streaming scenarios without a transport.

pub mod channel;
pub mod messages;
pub mod recorder;

pub use channel::ScriptedChannel;
pub use messages::{EchoRequest, EchoResponse, RawFrame};
pub use recorder::{LogEntry, RecordingLogger};
