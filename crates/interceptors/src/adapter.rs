//! Channel adapters bridging concrete transports.

use crate::channel::CallChannel;
use async_trait::async_trait;
use callwatch_logging::{CallContext, Payload};
use tokio::sync::mpsc;
use tonic::{Status, Streaming};

/// Server-side channel over a `tonic` streaming call.
///
/// Inbound messages come from the request [`Streaming`]; outbound responses
/// go to an `mpsc` channel, typically drained into the response stream the
/// service returns. Dropping the drain surfaces as a cancelled send, which
/// the wrapper propagates like any other transport error.
pub struct TonicServerChannel<In, Out> {
    ctx: CallContext,
    inbound: Streaming<In>,
    outbound: mpsc::Sender<Result<Out, Status>>,
}

impl<In, Out> TonicServerChannel<In, Out> {
    pub fn new(
        ctx: CallContext,
        inbound: Streaming<In>,
        outbound: mpsc::Sender<Result<Out, Status>>,
    ) -> Self {
        Self {
            ctx,
            inbound,
            outbound,
        }
    }
}

#[async_trait]
impl<In, Out> CallChannel for TonicServerChannel<In, Out>
where
    In: Payload,
    Out: Payload + Clone,
{
    type Outbound = Out;
    type Inbound = In;

    fn context(&self) -> &CallContext {
        &self.ctx
    }

    async fn send(&mut self, msg: &Out) -> Result<(), Status> {
        self.outbound
            .send(Ok(msg.clone()))
            .await
            .map_err(|_| Status::cancelled("response stream closed"))
    }

    async fn recv(&mut self) -> Result<Option<In>, Status> {
        self.inbound.message().await
    }
}
