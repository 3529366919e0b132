//! Selective call instrumentation for unary and streaming RPCs.
//!
//! A [`CallLogging`] installation decides, per call and per message inside a
//! streaming call, whether to emit structured log events, and assembles a
//! consistent, deduplicated field set describing the call's identity, timing,
//! outcome, and optionally payload content.

pub mod adapter;
pub mod channel;
pub mod interceptor;
pub mod matcher;
pub mod meta;
pub mod options;
pub mod reporter;
pub mod stream;

pub use adapter::TonicServerChannel;
pub use channel::CallChannel;
pub use interceptor::CallLogging;
pub use matcher::{MatchAll, Matcher};
pub use meta::{CallKind, CallMeta, MethodType};
pub use options::{
    code_str, default_client_code_to_level, default_error_to_code, default_server_code_to_level,
    LoggableEvent, Options, OptionsBuilder,
};
pub use reporter::Reporter;
pub use stream::LoggedStream;
