//! Structured logging vocabulary for the callwatch interceptor layer.
//!
//! This crate provides the leaf building blocks shared by every interceptor:
//! - Ordered, precedence-aware field collections
//! - The call-scoped context carrying the shared field bag
//! - The logger sink abstraction and its `tracing` implementation
//! - Payload capability traits for message-content logging

pub mod context;
pub mod duration;
pub mod fields;
pub mod keys;
pub mod logger;
pub mod payload;
pub mod telemetry;

pub use context::CallContext;
pub use duration::{duration_to_duration_field, duration_to_time_millis_fields};
pub use fields::{FieldValue, Fields};
pub use logger::{Level, Logger, TracingLogger};
pub use payload::{JsonPayload, Payload, Serializable};
