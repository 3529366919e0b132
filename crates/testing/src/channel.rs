//! Scripted in-memory channel for driving streaming scenarios.

use async_trait::async_trait;
use callwatch_interceptors::CallChannel;
use callwatch_logging::{CallContext, Payload};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use tonic::Status;

/// In-memory [`CallChannel`] driven by a scripted sequence of inbound
/// results.
///
/// Outbound messages are appended to the shared `sent` buffer; sends can be
/// scripted to fail. Once the inbound script is exhausted, `recv` keeps
/// returning end-of-stream.
pub struct ScriptedChannel<Out, In> {
    ctx: CallContext,
    inbound: VecDeque<Result<Option<In>, Status>>,
    /// Messages delivered to the channel so far. Clone the `Arc` before
    /// handing the channel to a wrapper to keep access for assertions.
    pub sent: Arc<RwLock<Vec<Out>>>,
    send_error: Option<Status>,
}

impl<Out, In> ScriptedChannel<Out, In> {
    pub fn new(ctx: CallContext) -> Self {
        Self {
            ctx,
            inbound: VecDeque::new(),
            sent: Arc::new(RwLock::new(Vec::new())),
            send_error: None,
        }
    }

    /// Queue a message for delivery.
    pub fn push_inbound(&mut self, msg: In) {
        self.inbound.push_back(Ok(Some(msg)));
    }

    /// Queue a terminal receive error.
    pub fn push_inbound_error(&mut self, status: Status) {
        self.inbound.push_back(Err(status));
    }

    /// Make every subsequent send fail with `status`.
    pub fn fail_sends_with(&mut self, status: Status) {
        self.send_error = Some(status);
    }
}

#[async_trait]
impl<Out, In> CallChannel for ScriptedChannel<Out, In>
where
    Out: Payload + Clone,
    In: Payload,
{
    type Outbound = Out;
    type Inbound = In;

    fn context(&self) -> &CallContext {
        &self.ctx
    }

    async fn send(&mut self, msg: &Out) -> Result<(), Status> {
        if let Some(status) = &self.send_error {
            return Err(status.clone());
        }
        self.sent.write().push(msg.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<In>, Status> {
        self.inbound.pop_front().unwrap_or(Ok(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{EchoRequest, EchoResponse};

    #[tokio::test]
    async fn test_scripted_delivery_then_end_of_stream() {
        let mut channel: ScriptedChannel<EchoResponse, EchoRequest> =
            ScriptedChannel::new(CallContext::new());
        channel.push_inbound(EchoRequest::new("one"));

        assert_eq!(
            channel.recv().await.unwrap(),
            Some(EchoRequest::new("one"))
        );
        assert_eq!(channel.recv().await.unwrap(), None);
        assert_eq!(channel.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sends_are_recorded() {
        let mut channel: ScriptedChannel<EchoResponse, EchoRequest> =
            ScriptedChannel::new(CallContext::new());
        let sent = Arc::clone(&channel.sent);

        channel.send(&EchoResponse::new("out")).await.unwrap();

        assert_eq!(sent.read().as_slice(), &[EchoResponse::new("out")]);
    }

    #[tokio::test]
    async fn test_scripted_send_failure() {
        let mut channel: ScriptedChannel<EchoResponse, EchoRequest> =
            ScriptedChannel::new(CallContext::new());
        channel.fail_sends_with(Status::unavailable("down"));

        let err = channel.send(&EchoResponse::new("out")).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::Unavailable);
    }
}
