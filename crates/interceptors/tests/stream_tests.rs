//! Streaming call instrumentation scenarios.

use callwatch_interceptors::{
    CallChannel, CallLogging, CallMeta, LoggableEvent, MatchAll, MethodType, Options,
};
use callwatch_logging::{keys, CallContext, Payload, Serializable};
use callwatch_testing::{EchoRequest, EchoResponse, RecordingLogger, ScriptedChannel};
use std::sync::Arc;
use tonic::{Code, Status};

fn reject_all(_: &CallContext, _: &CallMeta, _: Option<&dyn Payload>) -> bool {
    false
}

/// Rejects messages whose content is marked `skip`; everything else passes.
fn skip_marked(_: &CallContext, _: &CallMeta, payload: Option<&dyn Payload>) -> bool {
    match payload.and_then(|p| p.as_serializable()) {
        Some(content) => content.to_log_value()["message"] != "skip",
        None => true,
    }
}

fn all_events() -> Options {
    Options::builder()
        .log_on_events([
            LoggableEvent::StartCall,
            LoggableEvent::FinishCall,
            LoggableEvent::PayloadSent,
            LoggableEvent::PayloadReceived,
        ])
        .build()
}

#[tokio::test]
async fn test_stream_client_full_flow() {
    let logger = RecordingLogger::new();
    let interceptor = CallLogging::new(logger.clone(), MatchAll).with_options(all_events());

    let mut channel: ScriptedChannel<EchoRequest, EchoResponse> =
        ScriptedChannel::new(CallContext::new());
    channel.push_inbound(EchoResponse::new("r1"));
    let sent = Arc::clone(&channel.sent);

    let mut stream = interceptor
        .stream_client(
            CallContext::new(),
            "/Echo/Chat",
            MethodType::BidiStream,
            |_ctx| async move { Ok(channel) },
        )
        .await
        .unwrap();

    stream.send(&EchoRequest::new("m1")).await.unwrap();
    assert_eq!(stream.recv().await.unwrap(), Some(EchoResponse::new("r1")));
    assert_eq!(stream.recv().await.unwrap(), None);
    // Receiving past end-of-stream must not double the terminal report.
    assert_eq!(stream.recv().await.unwrap(), None);

    assert_eq!(sent.read().as_slice(), &[EchoRequest::new("m1")]);
    assert_eq!(logger.count_message("started call"), 1);
    assert_eq!(logger.count_message("request sent"), 1);
    assert_eq!(logger.count_message("response received"), 1);
    assert_eq!(logger.count_message("finished call"), 1);

    let finished = logger.find("finished call").unwrap();
    assert_eq!(finished.fields.get(keys::CODE).unwrap().to_string(), "OK");
    assert!(!finished.fields.contains_key(keys::ERROR));
    assert_eq!(
        finished.fields.get(keys::METHOD_TYPE).unwrap().to_string(),
        "bidi_stream"
    );
}

#[tokio::test]
async fn test_send_rejection_is_sticky_for_the_receive_side() {
    let logger = RecordingLogger::new();
    let interceptor = CallLogging::new(logger.clone(), reject_all).with_options(all_events());

    let mut channel: ScriptedChannel<EchoRequest, EchoResponse> =
        ScriptedChannel::new(CallContext::new());
    channel.push_inbound(EchoResponse::new("r1"));

    let mut stream = interceptor
        .stream_client(
            CallContext::new(),
            "/Echo/Chat",
            MethodType::BidiStream,
            |_ctx| async move { Ok(channel) },
        )
        .await
        .unwrap();

    stream.send(&EchoRequest::new("m1")).await.unwrap();
    assert!(stream.is_ignored());

    // The transport still delivers; reporting stays off.
    assert_eq!(stream.recv().await.unwrap(), Some(EchoResponse::new("r1")));
    assert_eq!(stream.recv().await.unwrap(), None);

    assert_eq!(logger.count_message("started call"), 0);
    assert_eq!(logger.count_message("request sent"), 0);
    assert_eq!(logger.count_message("response received"), 0);
    // Termination is still reported exactly once for ignored streams.
    assert_eq!(logger.count_message("finished call"), 1);
}

#[tokio::test]
async fn test_recv_rejection_is_per_message_only() {
    let logger = RecordingLogger::new();
    let interceptor = CallLogging::new(logger.clone(), skip_marked).with_options(all_events());

    let mut channel: ScriptedChannel<EchoRequest, EchoResponse> =
        ScriptedChannel::new(CallContext::new());
    channel.push_inbound(EchoResponse::new("skip"));
    channel.push_inbound(EchoResponse::new("keep"));

    let mut stream = interceptor
        .stream_client(
            CallContext::new(),
            "/Echo/Watch",
            MethodType::ServerStream,
            |_ctx| async move { Ok(channel) },
        )
        .await
        .unwrap();

    assert_eq!(stream.recv().await.unwrap(), Some(EchoResponse::new("skip")));
    assert!(!stream.is_ignored());
    assert_eq!(stream.recv().await.unwrap(), Some(EchoResponse::new("keep")));
    assert_eq!(stream.recv().await.unwrap(), None);

    assert_eq!(logger.count_message("started call"), 1);
    assert_eq!(logger.count_message("response received"), 1);
    assert_eq!(logger.count_message("finished call"), 1);
}

#[tokio::test]
async fn test_recv_error_finishes_with_that_error() {
    let logger = RecordingLogger::new();
    let interceptor = CallLogging::new(logger.clone(), MatchAll).with_options(all_events());

    let mut channel: ScriptedChannel<EchoRequest, EchoResponse> =
        ScriptedChannel::new(CallContext::new());
    channel.push_inbound_error(Status::unavailable("link down"));

    let mut stream = interceptor
        .stream_client(
            CallContext::new(),
            "/Echo/Watch",
            MethodType::ServerStream,
            |_ctx| async move { Ok(channel) },
        )
        .await
        .unwrap();

    let err = stream.recv().await.unwrap_err();
    assert_eq!(err.code(), Code::Unavailable);
    assert_eq!(err.message(), "link down");

    // No message was ever exchanged, so the call never started.
    assert_eq!(logger.count_message("started call"), 0);
    let finished = logger.find("finished call").unwrap();
    assert_eq!(
        finished.fields.get(keys::CODE).unwrap().to_string(),
        "Unavailable"
    );
    assert!(finished.fields.contains_key(keys::ERROR));
}

#[tokio::test]
async fn test_send_error_propagates_without_terminating_the_call() {
    let logger = RecordingLogger::new();
    let interceptor = CallLogging::new(logger.clone(), MatchAll).with_options(all_events());

    let mut channel: ScriptedChannel<EchoRequest, EchoResponse> =
        ScriptedChannel::new(CallContext::new());
    channel.fail_sends_with(Status::internal("broken pipe"));

    let mut stream = interceptor
        .stream_client(
            CallContext::new(),
            "/Echo/Chat",
            MethodType::BidiStream,
            |_ctx| async move { Ok(channel) },
        )
        .await
        .unwrap();

    let err = stream.send(&EchoRequest::new("m1")).await.unwrap_err();
    assert_eq!(err.code(), Code::Internal);

    let started = logger.find("started call").unwrap();
    assert!(started.fields.contains_key(keys::ERROR));
    assert_eq!(logger.count_message("request sent"), 0);
    // Only the receive path terminates a client stream.
    assert_eq!(logger.count_message("finished call"), 0);
}

#[tokio::test]
async fn test_stream_server_reports_both_directions() {
    let logger = RecordingLogger::new();
    let interceptor = CallLogging::new(logger.clone(), MatchAll).with_options(all_events());

    let mut channel: ScriptedChannel<EchoResponse, EchoRequest> =
        ScriptedChannel::new(CallContext::new());
    channel.push_inbound(EchoRequest::new("q"));
    let sent = Arc::clone(&channel.sent);

    interceptor
        .stream_server(
            "/Echo/Watch",
            MethodType::ServerStream,
            channel,
            |mut stream| async move {
                while let Some(request) = stream.recv().await? {
                    let reply = EchoResponse::new(format!("echo: {}", request.message));
                    stream.send(&reply).await?;
                }
                Ok(())
            },
        )
        .await
        .unwrap();

    assert_eq!(sent.read().as_slice(), &[EchoResponse::new("echo: q")]);
    assert_eq!(logger.count_message("started call"), 1);
    assert_eq!(logger.count_message("request received"), 1);
    assert_eq!(logger.count_message("response sent"), 1);
    assert_eq!(logger.count_message("finished call"), 1);

    let started = logger.find("started call").unwrap();
    assert_eq!(
        started.fields.get(keys::COMPONENT).unwrap().to_string(),
        "server"
    );
}

#[tokio::test]
async fn test_stream_server_all_messages_rejected_still_finishes() {
    let logger = RecordingLogger::new();
    let interceptor = CallLogging::new(logger.clone(), reject_all).with_options(all_events());

    let mut channel: ScriptedChannel<EchoResponse, EchoRequest> =
        ScriptedChannel::new(CallContext::new());
    channel.push_inbound(EchoRequest::new("one"));
    channel.push_inbound(EchoRequest::new("two"));

    interceptor
        .stream_server(
            "/Echo/Upload",
            MethodType::ClientStream,
            channel,
            |mut stream| async move {
                while let Some(_request) = stream.recv().await? {}
                Ok(())
            },
        )
        .await
        .unwrap();

    assert_eq!(logger.count_message("started call"), 0);
    assert_eq!(logger.count_message("request received"), 0);
    assert_eq!(logger.count_message("finished call"), 1);
    let finished = logger.find("finished call").unwrap();
    assert_eq!(finished.fields.get(keys::CODE).unwrap().to_string(), "OK");
}

#[tokio::test]
async fn test_stream_server_handler_error_is_the_terminal_signal() {
    let logger = RecordingLogger::new();
    let interceptor = CallLogging::new(logger.clone(), MatchAll).with_options(all_events());

    let channel: ScriptedChannel<EchoResponse, EchoRequest> =
        ScriptedChannel::new(CallContext::new());

    let result = interceptor
        .stream_server(
            "/Echo/Upload",
            MethodType::ClientStream,
            channel,
            |_stream| async move { Err(Status::failed_precondition("rejected")) },
        )
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.code(), Code::FailedPrecondition);

    let finished = logger.find("finished call").unwrap();
    assert_eq!(
        finished.fields.get(keys::CODE).unwrap().to_string(),
        "FailedPrecondition"
    );
    assert_eq!(logger.count_message("finished call"), 1);
}

#[tokio::test]
async fn test_misuse_payload_on_stream_send() {
    use callwatch_testing::RawFrame;

    let logger = RecordingLogger::new();
    let interceptor = CallLogging::new(logger.clone(), MatchAll).with_options(all_events());

    let mut channel: ScriptedChannel<RawFrame, EchoResponse> =
        ScriptedChannel::new(CallContext::new());
    channel.push_inbound(EchoResponse::new("r1"));

    let mut stream = interceptor
        .stream_client(
            CallContext::new(),
            "/Echo/Chat",
            MethodType::BidiStream,
            |_ctx| async move { Ok(channel) },
        )
        .await
        .unwrap();

    // The send itself must still succeed; only the payload line is replaced
    // by a diagnostic.
    stream.send(&RawFrame::new(&[0x01])).await.unwrap();

    assert_eq!(logger.count_message("request sent"), 0);
    let diagnostic = logger
        .find("payload does not implement Serializable; programmatic error?")
        .unwrap();
    assert!(diagnostic
        .fields
        .get(keys::REQUEST_TYPE)
        .unwrap()
        .to_string()
        .contains("RawFrame"));
}
