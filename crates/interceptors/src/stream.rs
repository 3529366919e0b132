//! Transparent per-message instrumentation wrapper for streaming calls.

use crate::channel::CallChannel;
use crate::matcher::Matcher;
use crate::meta::CallMeta;
use crate::reporter::Reporter;
use async_trait::async_trait;
use callwatch_logging::{CallContext, Payload};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tonic::Status;

/// State shared by both directions of a wrapped stream.
struct StreamState {
    reporter: Arc<Reporter>,
    matcher: Arc<dyn Matcher>,
    meta: Arc<CallMeta>,
    started_at: Instant,
    ignored: AtomicBool,
    /// Client-side wrappers terminate the call on the receive path, since
    /// only that path observes end-of-stream. Server-side wrappers leave the
    /// terminal report to the interceptor once the handler returns.
    report_terminal_on_recv: bool,
}

/// Channel wrapper reporting matched messages while forwarding the
/// underlying channel's observable behavior unchanged.
pub struct LoggedStream<C> {
    inner: C,
    state: Arc<StreamState>,
}

impl<C: CallChannel> LoggedStream<C> {
    pub(crate) fn new(
        inner: C,
        reporter: Arc<Reporter>,
        matcher: Arc<dyn Matcher>,
        meta: Arc<CallMeta>,
        started_at: Instant,
        report_terminal_on_recv: bool,
    ) -> Self {
        Self {
            inner,
            state: Arc::new(StreamState {
                reporter,
                matcher,
                meta,
                started_at,
                ignored: AtomicBool::new(false),
                report_terminal_on_recv,
            }),
        }
    }

    /// Whether receive-side message reporting has been switched off for the
    /// remainder of the stream.
    pub fn is_ignored(&self) -> bool {
        self.state.ignored.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<C: CallChannel> CallChannel for LoggedStream<C> {
    type Outbound = C::Outbound;
    type Inbound = C::Inbound;

    fn context(&self) -> &CallContext {
        self.inner.context()
    }

    async fn send(&mut self, msg: &Self::Outbound) -> Result<(), Status> {
        let start = Instant::now();
        let result = self.inner.send(msg).await;
        if self
            .state
            .matcher
            .matches(self.inner.context(), &self.state.meta, Some(msg))
        {
            self.state
                .reporter
                .post_msg_send(Some(msg), result.as_ref().err(), start.elapsed());
        } else {
            // A rejected send switches off receive-side reporting for the
            // stream rest.
            self.state.ignored.store(true, Ordering::Relaxed);
        }
        result
    }

    async fn recv(&mut self) -> Result<Option<Self::Inbound>, Status> {
        let start = Instant::now();
        let result = self.inner.recv().await;
        match &result {
            Ok(Some(msg)) => {
                if !self.state.ignored.load(Ordering::Relaxed)
                    && self.state.matcher.matches(
                        self.inner.context(),
                        &self.state.meta,
                        Some(msg as &dyn Payload),
                    )
                {
                    self.state
                        .reporter
                        .post_msg_receive(Some(msg), None, start.elapsed());
                }
            }
            // Terminal conditions report the call exactly once, whether or
            // not message reporting was suppressed. End-of-stream counts as
            // success; the caller still sees the original signal.
            Ok(None) => {
                if self.state.report_terminal_on_recv {
                    self.state
                        .reporter
                        .post_call(None, self.state.started_at.elapsed());
                }
            }
            Err(status) => {
                if self.state.report_terminal_on_recv {
                    self.state
                        .reporter
                        .post_call(Some(status), self.state.started_at.elapsed());
                }
            }
        }
        result
    }
}
