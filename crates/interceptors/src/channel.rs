//! Bidirectional message channel abstraction over the hosting transport.

use async_trait::async_trait;
use callwatch_logging::{CallContext, Payload};
use tonic::Status;

/// Message channel of an in-flight streaming call.
///
/// `recv` returning `Ok(None)` is the natural end-of-stream signal; any
/// `Err` is a transport error. Implementations bridge one concrete transport
/// and must not reorder, drop, or synthesize messages. Send and receive block
/// only as long as the transport itself does.
#[async_trait]
pub trait CallChannel: Send {
    type Outbound: Payload;
    type Inbound: Payload;

    /// Ambient context of the call this channel belongs to.
    fn context(&self) -> &CallContext;

    /// Send one message.
    async fn send(&mut self, msg: &Self::Outbound) -> Result<(), Status>;

    /// Receive the next message, `Ok(None)` at end of stream.
    async fn recv(&mut self) -> Result<Option<Self::Inbound>, Status>;
}
