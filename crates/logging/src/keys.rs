//! Well-known field keys emitted by the interceptor layer.

/// System tag key identifying the instrumented protocol.
pub const SYSTEM: &str = "protocol";
/// System tag value for gRPC-shaped calls.
pub const SYSTEM_VALUE: &str = "grpc";

/// Side of the call: `client` or `server`.
pub const COMPONENT: &str = "grpc.component";
/// Fully qualified service name.
pub const SERVICE: &str = "grpc.service";
/// Method name within the service.
pub const METHOD: &str = "grpc.method";
/// Call shape: unary or one of the streaming variants.
pub const METHOD_TYPE: &str = "grpc.method_type";

/// Remote peer address, server side only.
pub const PEER_ADDRESS: &str = "peer.address";
/// Formatted wall-clock time at which the call was first observed.
pub const START_TIME: &str = "grpc.start_time";
/// Formatted deadline carried by the call context, when present.
pub const REQUEST_DEADLINE: &str = "grpc.request.deadline";

/// Terminal status code of the call.
pub const CODE: &str = "grpc.code";
/// Terminal error message, only present on errored calls.
pub const ERROR: &str = "grpc.error";

/// Elapsed time in float milliseconds.
pub const TIME_MS: &str = "grpc.time_ms";
/// Elapsed time in humane duration notation.
pub const DURATION: &str = "grpc.duration";
/// Elapsed time of a single outbound message.
pub const SEND_DURATION: &str = "grpc.send.duration";
/// Elapsed time of a single inbound message.
pub const RECV_DURATION: &str = "grpc.recv.duration";

/// Request message content on payload lines.
pub const REQUEST_CONTENT: &str = "grpc.request.content";
/// Response message content on payload lines.
pub const RESPONSE_CONTENT: &str = "grpc.response.content";
/// Request payload type reported when the capability check fails.
pub const REQUEST_TYPE: &str = "grpc.request.type";
/// Response payload type reported when the capability check fails.
pub const RESPONSE_TYPE: &str = "grpc.response.type";
