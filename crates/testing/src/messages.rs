//! Sample payload message types.

use callwatch_logging::{Payload, Serializable};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable request message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoRequest {
    pub message: String,
}

impl EchoRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Serializable for EchoRequest {
    fn to_log_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Payload for EchoRequest {
    fn as_serializable(&self) -> Option<&dyn Serializable> {
        Some(self)
    }

    fn payload_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Serializable response message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoResponse {
    pub message: String,
}

impl EchoResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Serializable for EchoResponse {
    fn to_log_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Payload for EchoResponse {
    fn as_serializable(&self) -> Option<&dyn Serializable> {
        Some(self)
    }

    fn payload_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Opaque message without the `Serializable` capability, for exercising the
/// payload-type diagnostic path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub bytes: Vec<u8>,
}

impl RawFrame {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl Payload for RawFrame {
    fn as_serializable(&self) -> Option<&dyn Serializable> {
        None
    }

    fn payload_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
