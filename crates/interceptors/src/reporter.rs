//! Per-call stateful engine turning lifecycle events into log emissions.

use crate::meta::{CallKind, CallMeta};
use crate::options::{code_str, LoggableEvent, Options};
use callwatch_logging::{keys, CallContext, FieldValue, Fields, Level, Logger, Payload};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tonic::Status;

/// Per-call reporter advancing `NotStarted -> Started -> Finished`.
///
/// The latches are atomic so the send and receive paths of a bidirectional
/// stream may report concurrently; identity and base fields are immutable
/// after construction. One instance exists per call and is dropped after the
/// terminal event.
pub struct Reporter {
    meta: Arc<CallMeta>,
    ctx: CallContext,
    options: Arc<Options>,
    logger: Arc<dyn Logger>,
    fields: Fields,
    start_logged: AtomicBool,
    finished: AtomicBool,
}

impl Reporter {
    /// Build the reporter and seed the call's base fields.
    ///
    /// The composed identity set is injected back into the context bag so
    /// user code and nested instrumentation observe the same fields; the
    /// single-use timestamp fields stay out of the bag and only appear on
    /// emitted lines.
    pub(crate) fn new(
        logger: Arc<dyn Logger>,
        options: Arc<Options>,
        meta: Arc<CallMeta>,
        ctx: CallContext,
    ) -> Self {
        let mut fields = meta.identity_fields();
        for key in options.disabled_fields() {
            fields.delete(key);
        }

        let mut fields = fields.with_unique(&ctx.extract_fields());
        if meta.kind == CallKind::Server {
            if let Some(peer) = ctx.peer_addr() {
                fields.push(keys::PEER_ADDRESS, peer.to_string());
            }
        }
        if let Some(extra) = options.context_fields(&ctx, &meta) {
            // Extractor output takes precedence over the accumulated set.
            fields = extra.append_unique(fields);
        }

        ctx.inject_fields(fields.clone());

        let mut single_use = Fields::new();
        single_use.push(
            keys::START_TIME,
            Utc::now().format(options.timestamp_format()).to_string(),
        );
        if let Some(deadline) = ctx.deadline() {
            single_use.push(
                keys::REQUEST_DEADLINE,
                deadline.format(options.timestamp_format()).to_string(),
            );
        }
        let fields = fields.append_unique(single_use);

        Self {
            meta,
            ctx,
            options,
            logger,
            fields,
            start_logged: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    /// Report one outbound message. `err` is the transport error when the
    /// send failed; an errored send never produces a payload line.
    pub fn post_msg_send(&self, payload: Option<&dyn Payload>, err: Option<&Status>, duration: Duration) {
        let code = self.options.code_of(err);
        let level = self.options.level_for(self.meta.kind, code);
        let mut fields = self.fields.with_unique(&self.ctx.extract_fields());
        if let Some(err) = err {
            fields = fields.append_unique(Fields::new().with(keys::ERROR, err.to_string()));
        }
        self.log_start_once(level, &fields, duration);

        if err.is_some() || !self.options.logs_event(LoggableEvent::PayloadSent) {
            return;
        }
        let Some(payload) = payload else { return };
        let (message, content_key, type_key) = match self.meta.kind {
            CallKind::Client => ("request sent", keys::REQUEST_CONTENT, keys::REQUEST_TYPE),
            CallKind::Server => ("response sent", keys::RESPONSE_CONTENT, keys::RESPONSE_TYPE),
        };
        match payload.as_serializable() {
            Some(content) => {
                let fields = fields
                    .append_unique(
                        Fields::new()
                            .with(keys::SEND_DURATION, format!("{:?}", duration))
                            .with(content_key, FieldValue::Json(content.to_log_value())),
                    )
                    .append_unique(self.options.duration_fields(duration));
                self.logger.log(&self.ctx, level, message, fields);
            }
            None => self.log_capability_mismatch(fields, type_key, payload),
        }
    }

    /// Report one inbound message. Terminal conditions (end-of-stream or a
    /// receive error) carry no payload.
    pub fn post_msg_receive(&self, payload: Option<&dyn Payload>, err: Option<&Status>, duration: Duration) {
        let code = self.options.code_of(err);
        let level = self.options.level_for(self.meta.kind, code);
        let mut fields = self.fields.with_unique(&self.ctx.extract_fields());
        if let Some(err) = err {
            fields = fields.append_unique(Fields::new().with(keys::ERROR, err.to_string()));
        }
        self.log_start_once(level, &fields, duration);

        if err.is_some() || !self.options.logs_event(LoggableEvent::PayloadReceived) {
            return;
        }
        let Some(payload) = payload else { return };
        let (message, content_key, type_key) = match self.meta.kind {
            CallKind::Client => ("response received", keys::RESPONSE_CONTENT, keys::RESPONSE_TYPE),
            CallKind::Server => ("request received", keys::REQUEST_CONTENT, keys::REQUEST_TYPE),
        };
        match payload.as_serializable() {
            Some(content) => {
                let fields = fields
                    .append_unique(
                        Fields::new()
                            .with(keys::RECV_DURATION, format!("{:?}", duration))
                            .with(content_key, FieldValue::Json(content.to_log_value())),
                    )
                    .append_unique(self.options.duration_fields(duration));
                self.logger.log(&self.ctx, level, message, fields);
            }
            None => self.log_capability_mismatch(fields, type_key, payload),
        }
    }

    /// Report call termination. At most one `finished call` line is ever
    /// emitted; later invocations are no-ops. End-of-stream terminations are
    /// reported by passing no error.
    pub fn post_call(&self, err: Option<&Status>, duration: Duration) {
        if self.finished.swap(true, Ordering::Relaxed) {
            return;
        }
        if !self.options.logs_event(LoggableEvent::FinishCall) {
            return;
        }
        let code = self.options.code_of(err);
        let level = self.options.level_for(self.meta.kind, code);
        let mut fields = self
            .fields
            .with_unique(&self.ctx.extract_fields())
            .append_unique(Fields::new().with(keys::CODE, code_str(code)));
        if let Some(err) = err {
            fields = fields.append_unique(Fields::new().with(keys::ERROR, err.to_string()));
        }
        self.logger.log(
            &self.ctx,
            level,
            "finished call",
            fields.append_unique(self.options.duration_fields(duration)),
        );
    }

    fn log_start_once(&self, level: Level, fields: &Fields, duration: Duration) {
        if !self.options.logs_event(LoggableEvent::StartCall) {
            return;
        }
        if self.start_logged.swap(true, Ordering::Relaxed) {
            return;
        }
        self.logger.log(
            &self.ctx,
            level,
            "started call",
            fields.clone().append_unique(self.options.duration_fields(duration)),
        );
    }

    fn log_capability_mismatch(&self, fields: Fields, type_key: &'static str, payload: &dyn Payload) {
        self.logger.log(
            &self.ctx,
            Level::Error,
            "payload does not implement Serializable; programmatic error?",
            fields.append_unique(Fields::new().with(type_key, payload.payload_type())),
        );
    }
}
