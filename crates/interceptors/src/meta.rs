//! Immutable call identity metadata.

use callwatch_logging::{keys, Fields};

/// Shape of an RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodType {
    Unary,
    ClientStream,
    ServerStream,
    BidiStream,
}

impl MethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodType::Unary => "unary",
            MethodType::ClientStream => "client_stream",
            MethodType::ServerStream => "server_stream",
            MethodType::BidiStream => "bidi_stream",
        }
    }
}

/// Side of the call being instrumented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Client,
    Server,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Client => "client",
            CallKind::Server => "server",
        }
    }
}

/// Call identity captured once at call entry.
///
/// Never mutated after construction and shared behind `Arc`, so the send and
/// receive paths of a bidirectional stream can read it concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMeta {
    pub service: String,
    pub method: String,
    pub method_type: MethodType,
    pub kind: CallKind,
}

impl CallMeta {
    pub fn new(kind: CallKind, full_method: &str, method_type: MethodType) -> Self {
        let (service, method) = split_full_method(full_method);
        Self {
            service: service.to_string(),
            method: method.to_string(),
            method_type,
            kind,
        }
    }

    /// Identity for a call issued by this process.
    pub fn client(full_method: &str, method_type: MethodType) -> Self {
        Self::new(CallKind::Client, full_method, method_type)
    }

    /// Identity for a call handled by this process.
    pub fn server(full_method: &str, method_type: MethodType) -> Self {
        Self::new(CallKind::Server, full_method, method_type)
    }

    pub fn full_method(&self) -> String {
        format!("/{}/{}", self.service, self.method)
    }

    /// Default identity field set for this call.
    pub fn identity_fields(&self) -> Fields {
        Fields::new()
            .with(keys::SYSTEM, keys::SYSTEM_VALUE)
            .with(keys::COMPONENT, self.kind.as_str())
            .with(keys::SERVICE, self.service.clone())
            .with(keys::METHOD, self.method.clone())
            .with(keys::METHOD_TYPE, self.method_type.as_str())
    }
}

/// Split a full method path `"/package.Service/Method"` into service and
/// method. Malformed input yields `("unknown", "unknown")` rather than an
/// error.
fn split_full_method(full_method: &str) -> (&str, &str) {
    let trimmed = full_method.strip_prefix('/').unwrap_or(full_method);
    match trimmed.split_once('/') {
        Some((service, method)) => (service, method),
        None => ("unknown", "unknown"),
    }
}
