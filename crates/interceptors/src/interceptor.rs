//! Interceptor entry points for the four call shapes.

use crate::channel::CallChannel;
use crate::matcher::Matcher;
use crate::meta::{CallMeta, MethodType};
use crate::options::Options;
use crate::reporter::Reporter;
use crate::stream::LoggedStream;
use callwatch_logging::{CallContext, Logger, Payload};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tonic::Status;

/// Selective logging installation shared by every call it instruments.
///
/// Construction is the only configuration surface; nothing is mutable once
/// the installation is handed to call sites. Cloning is cheap and shares the
/// logger, matcher, and options.
#[derive(Clone)]
pub struct CallLogging {
    logger: Arc<dyn Logger>,
    matcher: Arc<dyn Matcher>,
    options: Arc<Options>,
}

impl CallLogging {
    pub fn new(logger: impl Logger + 'static, matcher: impl Matcher + 'static) -> Self {
        Self {
            logger: Arc::new(logger),
            matcher: Arc::new(matcher),
            options: Arc::new(Options::default()),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Arc::new(options);
        self
    }

    fn reporter(&self, meta: &Arc<CallMeta>, ctx: &CallContext) -> Arc<Reporter> {
        Arc::new(Reporter::new(
            Arc::clone(&self.logger),
            Arc::clone(&self.options),
            Arc::clone(meta),
            ctx.clone(),
        ))
    }

    /// Instrument a unary call issued by this process.
    ///
    /// The matcher is consulted once with the request; a non-match leaves the
    /// invocation entirely unobserved. The invocation's error is returned
    /// unchanged either way.
    pub async fn unary_client<Req, Res, F, Fut>(
        &self,
        ctx: CallContext,
        full_method: &str,
        req: &Req,
        invoke: F,
    ) -> Result<Res, Status>
    where
        Req: Payload,
        Res: Payload,
        F: FnOnce(CallContext) -> Fut,
        Fut: Future<Output = Result<Res, Status>>,
    {
        let meta = Arc::new(CallMeta::client(full_method, MethodType::Unary));
        if !self.matcher.matches(&ctx, &meta, Some(req)) {
            return invoke(ctx).await;
        }

        let started_at = Instant::now();
        let reporter = self.reporter(&meta, &ctx);
        reporter.post_msg_send(Some(req), None, started_at.elapsed());

        let result = invoke(ctx).await;

        match &result {
            Ok(reply) => reporter.post_msg_receive(Some(reply), None, started_at.elapsed()),
            Err(status) => reporter.post_msg_receive(None, Some(status), started_at.elapsed()),
        }
        reporter.post_call(result.as_ref().err(), started_at.elapsed());
        result
    }

    /// Instrument a unary call handled by this process.
    pub async fn unary_server<Req, Res, F, Fut>(
        &self,
        ctx: CallContext,
        full_method: &str,
        req: &Req,
        handler: F,
    ) -> Result<Res, Status>
    where
        Req: Payload,
        Res: Payload,
        F: FnOnce(CallContext) -> Fut,
        Fut: Future<Output = Result<Res, Status>>,
    {
        let meta = Arc::new(CallMeta::server(full_method, MethodType::Unary));
        if !self.matcher.matches(&ctx, &meta, Some(req)) {
            return handler(ctx).await;
        }

        let started_at = Instant::now();
        let reporter = self.reporter(&meta, &ctx);
        reporter.post_msg_receive(Some(req), None, started_at.elapsed());

        let result = handler(ctx).await;

        match &result {
            Ok(resp) => reporter.post_msg_send(Some(resp), None, started_at.elapsed()),
            Err(status) => reporter.post_msg_send(None, Some(status), started_at.elapsed()),
        }
        reporter.post_call(result.as_ref().err(), started_at.elapsed());
        result
    }

    /// Open and instrument a streaming call issued by this process.
    ///
    /// `open` receives the context with the base fields already injected.
    /// Open failures propagate unchanged with no events emitted; a call that
    /// never exchanged a message is never reported as started.
    pub async fn stream_client<C, F, Fut>(
        &self,
        ctx: CallContext,
        full_method: &str,
        method_type: MethodType,
        open: F,
    ) -> Result<LoggedStream<C>, Status>
    where
        C: CallChannel,
        F: FnOnce(CallContext) -> Fut,
        Fut: Future<Output = Result<C, Status>>,
    {
        let meta = Arc::new(CallMeta::client(full_method, method_type));
        let started_at = Instant::now();
        let reporter = self.reporter(&meta, &ctx);

        let inner = open(ctx).await?;

        Ok(LoggedStream::new(
            inner,
            reporter,
            Arc::clone(&self.matcher),
            meta,
            started_at,
            true,
        ))
    }

    /// Instrument a streaming call handled by this process.
    ///
    /// The handler receives the wrapped channel; the terminal report fires
    /// exactly once when the handler returns, with its result as the
    /// terminal signal.
    pub async fn stream_server<C, F, Fut>(
        &self,
        full_method: &str,
        method_type: MethodType,
        channel: C,
        handler: F,
    ) -> Result<(), Status>
    where
        C: CallChannel,
        F: FnOnce(LoggedStream<C>) -> Fut,
        Fut: Future<Output = Result<(), Status>>,
    {
        let meta = Arc::new(CallMeta::server(full_method, method_type));
        let ctx = channel.context().clone();
        let started_at = Instant::now();
        let reporter = self.reporter(&meta, &ctx);

        let stream = LoggedStream::new(
            channel,
            Arc::clone(&reporter),
            Arc::clone(&self.matcher),
            meta,
            started_at,
            false,
        );

        let result = handler(stream).await;

        reporter.post_call(result.as_ref().err(), started_at.elapsed());
        result
    }
}
