//! Payload capability traits for message-content logging.

use serde::Serialize;
use serde_json::Value;

/// Capability for messages whose content can be attached to a payload line.
pub trait Serializable {
    /// Render the message content for inclusion in a log field.
    fn to_log_value(&self) -> Value;
}

/// A message travelling through an instrumented call.
///
/// The capability check mirrors a safe downcast: messages that can be logged
/// return themselves from [`Payload::as_serializable`], everything else
/// yields `None` and produces a diagnostic line instead of a payload line.
pub trait Payload: Send + Sync {
    fn as_serializable(&self) -> Option<&dyn Serializable>;

    /// Concrete type name reported when the capability check fails.
    fn payload_type(&self) -> &'static str;
}

/// Adapter granting the `Serializable` capability to any `serde`-serializable
/// message.
///
/// # Examples
///
/// ```
/// use callwatch_logging::{JsonPayload, Payload};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Note {
///     text: String,
/// }
///
/// let payload = JsonPayload(Note { text: "hi".to_string() });
/// assert!(payload.as_serializable().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPayload<T>(pub T);

impl<T: Serialize> Serializable for JsonPayload<T> {
    fn to_log_value(&self) -> Value {
        // Serialization failures degrade to null rather than aborting the line.
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }
}

impl<T: Serialize + Send + Sync> Payload for JsonPayload<T> {
    fn as_serializable(&self) -> Option<&dyn Serializable> {
        Some(self)
    }

    fn payload_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Greeting {
        message: String,
    }

    #[test]
    fn test_json_payload_has_capability() {
        let payload = JsonPayload(Greeting {
            message: "hello".to_string(),
        });

        let serializable = payload.as_serializable().expect("capability expected");
        assert_eq!(serializable.to_log_value()["message"], "hello");
    }

    #[test]
    fn test_payload_type_names_inner_type() {
        let payload = JsonPayload(Greeting {
            message: String::new(),
        });

        assert!(payload.payload_type().contains("Greeting"));
    }
}
