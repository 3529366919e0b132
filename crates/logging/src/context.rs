//! Call-scoped context carrying the shared log field bag.

use crate::fields::Fields;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;

/// Ambient state threaded alongside an instrumented call.
///
/// Clones share the same field bag: fields injected by the interceptor at
/// call start are observed by user code holding any clone, and fields added
/// mid-call show up on subsequently emitted log lines. The deadline and peer
/// address are fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    bag: Arc<RwLock<Fields>>,
    deadline: Option<DateTime<Utc>>,
    peer_addr: Option<SocketAddr>,
}

impl CallContext {
    /// Create an empty context with no deadline or peer address.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a call deadline.
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach the remote peer address.
    pub fn with_peer_addr(mut self, addr: SocketAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Replace the field bag with `fields`.
    pub fn inject_fields(&self, fields: Fields) {
        *self.bag.write() = fields;
    }

    /// Merge `fields` into the bag. Keys already present win.
    pub fn add_fields(&self, fields: Fields) {
        let mut bag = self.bag.write();
        let merged = std::mem::take(&mut *bag).append_unique(fields);
        *bag = merged;
    }

    /// Snapshot copy of the current bag.
    pub fn extract_fields(&self) -> Fields {
        self.bag.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldValue;

    #[test]
    fn test_clones_share_the_bag() {
        let ctx = CallContext::new();
        let clone = ctx.clone();

        ctx.inject_fields(Fields::new().with("request_id", "abc"));

        assert_eq!(
            clone.extract_fields().get("request_id"),
            Some(&FieldValue::Str("abc".to_string().into()))
        );
    }

    #[test]
    fn test_add_fields_existing_keys_win() {
        let ctx = CallContext::new();
        ctx.inject_fields(Fields::new().with("tenant", "alpha"));

        ctx.add_fields(Fields::new().with("tenant", "beta").with("region", "eu"));

        let bag = ctx.extract_fields();
        assert_eq!(bag.get("tenant"), Some(&FieldValue::Str("alpha".into())));
        assert_eq!(bag.get("region"), Some(&FieldValue::Str("eu".into())));
    }

    #[test]
    fn test_deadline_and_peer_are_immutable_attachments() {
        let deadline = Utc::now();
        let addr: SocketAddr = "127.0.0.1:4242".parse().unwrap();
        let ctx = CallContext::new().with_deadline(deadline).with_peer_addr(addr);

        assert_eq!(ctx.deadline(), Some(deadline));
        assert_eq!(ctx.peer_addr(), Some(addr));

        let clone = ctx.clone();
        assert_eq!(clone.deadline(), Some(deadline));
        assert_eq!(clone.peer_addr(), Some(addr));
    }
}
