//! Duration-to-field encoders.

use crate::fields::{FieldValue, Fields};
use crate::keys;
use std::time::Duration;

/// Encode a duration as float milliseconds under `grpc.time_ms`.
///
/// This is the default encoder; millisecond floats keep sub-millisecond
/// precision while staying easy to aggregate.
pub fn duration_to_time_millis_fields(duration: Duration) -> Fields {
    let millis = duration.as_micros() as f64 / 1000.0;
    Fields::new().with(keys::TIME_MS, FieldValue::Float(millis))
}

/// Encode a duration under `grpc.duration` in humane notation, leaving the
/// rendering to the sink.
pub fn duration_to_duration_field(duration: Duration) -> Fields {
    Fields::new().with(keys::DURATION, format!("{:?}", duration))
}
