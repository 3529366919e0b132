//! End-to-end wiring of the selective logging interceptors with the
//! `tracing` sink, an in-memory channel standing in for the transport.
//!
//! Run with: cargo run --example echo

use async_trait::async_trait;
use callwatch_interceptors::{
    CallChannel, CallLogging, LoggableEvent, MatchAll, MethodType, Options,
};
use callwatch_logging::{telemetry, CallContext, JsonPayload, TracingLogger};
use serde::Serialize;
use tokio::sync::mpsc;
use tonic::Status;

#[derive(Debug, Clone, Serialize)]
struct EchoRequest {
    message: String,
}

#[derive(Debug, Clone, Serialize)]
struct EchoResponse {
    message: String,
}

/// Loopback channel: requests arrive over an mpsc receiver, responses are
/// collected in place.
struct LoopbackChannel {
    ctx: CallContext,
    inbound: mpsc::Receiver<JsonPayload<EchoRequest>>,
    sent: Vec<JsonPayload<EchoResponse>>,
}

#[async_trait]
impl CallChannel for LoopbackChannel {
    type Outbound = JsonPayload<EchoResponse>;
    type Inbound = JsonPayload<EchoRequest>;

    fn context(&self) -> &CallContext {
        &self.ctx
    }

    async fn send(&mut self, msg: &Self::Outbound) -> Result<(), Status> {
        self.sent.push(msg.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Self::Inbound>, Status> {
        Ok(self.inbound.recv().await)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing(false, "debug")?;

    let interceptor = CallLogging::new(TracingLogger::new(), MatchAll).with_options(
        Options::builder()
            .log_on_events([
                LoggableEvent::StartCall,
                LoggableEvent::FinishCall,
                LoggableEvent::PayloadSent,
                LoggableEvent::PayloadReceived,
            ])
            .build(),
    );

    // A unary client call.
    let reply = interceptor
        .unary_client(
            CallContext::new(),
            "/demo.Echo/Say",
            &JsonPayload(EchoRequest {
                message: "hello".to_string(),
            }),
            |_ctx| async {
                Ok(JsonPayload(EchoResponse {
                    message: "hello back".to_string(),
                }))
            },
        )
        .await?;
    println!("unary reply: {}", reply.0.message);

    // A server-side bidi stream handled locally.
    let (tx, rx) = mpsc::channel(4);
    for message in ["first", "second"] {
        tx.send(JsonPayload(EchoRequest {
            message: message.to_string(),
        }))
        .await
        .expect("loopback receiver dropped");
    }
    drop(tx);

    let channel = LoopbackChannel {
        ctx: CallContext::new(),
        inbound: rx,
        sent: Vec::new(),
    };

    interceptor
        .stream_server(
            "/demo.Echo/Chat",
            MethodType::BidiStream,
            channel,
            |mut stream| async move {
                while let Some(request) = stream.recv().await? {
                    let reply = JsonPayload(EchoResponse {
                        message: format!("echo: {}", request.0.message),
                    });
                    stream.send(&reply).await?;
                }
                Ok(())
            },
        )
        .await?;

    Ok(())
}
