//! Logger sink abstraction and the default `tracing` implementation.

use crate::context::CallContext;
use crate::fields::Fields;

/// Severity of an emitted log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// Structured logger sink consumed by the interceptor layer.
///
/// Implementations receive a severity, a message, and the fully composed
/// field set. The call is fire-and-forget and assumed cheap enough not to
/// need backpressure handling.
pub trait Logger: Send + Sync {
    fn log(&self, ctx: &CallContext, level: Level, message: &str, fields: Fields);
}

/// `Logger` forwarding to the `tracing` ecosystem.
///
/// `tracing` requires field names to be known statically, so the composed
/// field set is rendered into a single JSON object under the `fields` key.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, _ctx: &CallContext, level: Level, message: &str, fields: Fields) {
        let fields = fields.to_json();
        match level {
            Level::Debug => tracing::debug!(target: "callwatch", fields = %fields, "{}", message),
            Level::Info => tracing::info!(target: "callwatch", fields = %fields, "{}", message),
            Level::Warn => tracing::warn!(target: "callwatch", fields = %fields, "{}", message),
            Level::Error => tracing::error!(target: "callwatch", fields = %fields, "{}", message),
        }
    }
}
