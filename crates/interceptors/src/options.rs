//! Installation-time configuration for the logging interceptors.

use crate::meta::{CallKind, CallMeta};
use callwatch_logging::{duration_to_time_millis_fields, CallContext, Fields, Level};
use std::sync::Arc;
use std::time::Duration;
use tonic::{Code, Status};

/// Events a log line can be emitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoggableEvent {
    /// Start of the call, deferred to the first message activity.
    StartCall,
    /// Finish of the call.
    FinishCall,
    /// Received request (server) or response (client). The log line carries
    /// the message content, which can get verbose on streams.
    PayloadReceived,
    /// Sent response (server) or request (client). The log line carries the
    /// message content, which can get verbose on streams.
    PayloadSent,
}

type LevelFn = Arc<dyn Fn(Code) -> Level + Send + Sync>;
type CodeFn = Arc<dyn Fn(Option<&Status>) -> Code + Send + Sync>;
type DurationFn = Arc<dyn Fn(Duration) -> Fields + Send + Sync>;
type ContextFieldsFn = Arc<dyn Fn(&CallContext, &CallMeta) -> Fields + Send + Sync>;

/// Immutable configuration shared by every call of an installation.
///
/// All mapping functions have defaults, so a reporter can never observe a
/// missing one. The side-dependent severity mapping is resolved lazily: when
/// no override is installed, client calls use
/// [`default_client_code_to_level`] and server calls
/// [`default_server_code_to_level`].
#[derive(Clone)]
pub struct Options {
    loggable_events: Vec<LoggableEvent>,
    level_fn: Option<LevelFn>,
    code_fn: CodeFn,
    duration_fn: DurationFn,
    timestamp_format: String,
    fields_from_context: Option<ContextFieldsFn>,
    disabled_fields: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            loggable_events: vec![LoggableEvent::StartCall, LoggableEvent::FinishCall],
            level_fn: None,
            code_fn: Arc::new(default_error_to_code),
            duration_fn: Arc::new(duration_to_time_millis_fields),
            // chrono's `%+` is RFC 3339 / ISO 8601.
            timestamp_format: "%+".to_string(),
            fields_from_context: None,
            disabled_fields: Vec::new(),
        }
    }
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder {
            options: Options::default(),
        }
    }

    pub(crate) fn logs_event(&self, event: LoggableEvent) -> bool {
        self.loggable_events.contains(&event)
    }

    pub(crate) fn level_for(&self, kind: CallKind, code: Code) -> Level {
        match &self.level_fn {
            Some(f) => f(code),
            None => match kind {
                CallKind::Client => default_client_code_to_level(code),
                CallKind::Server => default_server_code_to_level(code),
            },
        }
    }

    pub(crate) fn code_of(&self, err: Option<&Status>) -> Code {
        (self.code_fn)(err)
    }

    pub(crate) fn duration_fields(&self, duration: Duration) -> Fields {
        (self.duration_fn)(duration)
    }

    pub(crate) fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    pub(crate) fn context_fields(&self, ctx: &CallContext, meta: &CallMeta) -> Option<Fields> {
        self.fields_from_context.as_ref().map(|f| f(ctx, meta))
    }

    pub(crate) fn disabled_fields(&self) -> &[String] {
        &self.disabled_fields
    }
}

/// Builder for [`Options`].
#[derive(Clone)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Customize on which events log lines are emitted.
    pub fn log_on_events(mut self, events: impl IntoIterator<Item = LoggableEvent>) -> Self {
        self.options.loggable_events = events.into_iter().collect();
        self
    }

    /// Override the code-to-severity mapping for both call sides.
    pub fn levels(mut self, f: impl Fn(Code) -> Level + Send + Sync + 'static) -> Self {
        self.options.level_fn = Some(Arc::new(f));
        self
    }

    /// Override the error-to-code classification.
    pub fn codes(mut self, f: impl Fn(Option<&Status>) -> Code + Send + Sync + 'static) -> Self {
        self.options.code_fn = Arc::new(f);
        self
    }

    /// Override the duration-to-fields encoding.
    pub fn duration_fields(mut self, f: impl Fn(Duration) -> Fields + Send + Sync + 'static) -> Self {
        self.options.duration_fn = Arc::new(f);
        self
    }

    /// Override the chrono format string used for the start-time and
    /// deadline fields.
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.options.timestamp_format = format.into();
        self
    }

    /// Derive extra per-call fields from the context and call identity.
    /// These take precedence over fields accumulated before them.
    pub fn fields_from_context_and_meta(
        mut self,
        f: impl Fn(&CallContext, &CallMeta) -> Fields + Send + Sync + 'static,
    ) -> Self {
        self.options.fields_from_context = Some(Arc::new(f));
        self
    }

    /// Context-only convenience form of
    /// [`OptionsBuilder::fields_from_context_and_meta`].
    pub fn fields_from_context(
        mut self,
        f: impl Fn(&CallContext) -> Fields + Send + Sync + 'static,
    ) -> Self {
        self.options.fields_from_context = Some(Arc::new(move |ctx, _| f(ctx)));
        self
    }

    /// Suppress keys from the default identity field set. Context-injected
    /// and dynamic fields are unaffected.
    pub fn disable_fields(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.disabled_fields = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Options {
        self.options
    }
}

/// Default error classification: the status code of the error, `Ok` when
/// there is none.
pub fn default_error_to_code(err: Option<&Status>) -> Code {
    err.map(|status| status.code()).unwrap_or(Code::Ok)
}

/// Default client-side severity mapping: routine outcomes stay at debug.
pub fn default_client_code_to_level(code: Code) -> Level {
    match code {
        Code::Ok
        | Code::Cancelled
        | Code::InvalidArgument
        | Code::NotFound
        | Code::AlreadyExists
        | Code::Unauthenticated => Level::Debug,
        Code::DeadlineExceeded
        | Code::PermissionDenied
        | Code::ResourceExhausted
        | Code::FailedPrecondition
        | Code::Aborted
        | Code::OutOfRange
        | Code::Unavailable => Level::Warn,
        _ => Level::Error,
    }
}

/// Default server-side severity mapping: routine outcomes are worth info.
pub fn default_server_code_to_level(code: Code) -> Level {
    match code {
        Code::Ok
        | Code::Cancelled
        | Code::InvalidArgument
        | Code::NotFound
        | Code::AlreadyExists
        | Code::Unauthenticated => Level::Info,
        Code::DeadlineExceeded
        | Code::PermissionDenied
        | Code::ResourceExhausted
        | Code::FailedPrecondition
        | Code::Aborted
        | Code::OutOfRange
        | Code::Unavailable => Level::Warn,
        _ => Level::Error,
    }
}

/// Canonical gRPC name of a status code, as emitted under `grpc.code`.
pub fn code_str(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "Canceled",
        Code::Unknown => "Unknown",
        Code::InvalidArgument => "InvalidArgument",
        Code::DeadlineExceeded => "DeadlineExceeded",
        Code::NotFound => "NotFound",
        Code::AlreadyExists => "AlreadyExists",
        Code::PermissionDenied => "PermissionDenied",
        Code::ResourceExhausted => "ResourceExhausted",
        Code::FailedPrecondition => "FailedPrecondition",
        Code::Aborted => "Aborted",
        Code::OutOfRange => "OutOfRange",
        Code::Unimplemented => "Unimplemented",
        Code::Internal => "Internal",
        Code::Unavailable => "Unavailable",
        Code::DataLoss => "DataLoss",
        Code::Unauthenticated => "Unauthenticated",
    }
}
