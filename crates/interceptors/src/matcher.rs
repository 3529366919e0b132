//! Predicates deciding whether calls and messages are logged.

use crate::meta::CallMeta;
use callwatch_logging::{CallContext, Payload};

/// Predicate deciding whether a call, or a single message within a stream,
/// should be logged.
///
/// For whole-call decisions the payload is the request when one is at hand;
/// for per-message decisions it is the outgoing or incoming message.
/// Implementations must be side-effect-free and safe to call repeatedly with
/// the same arguments.
pub trait Matcher: Send + Sync {
    fn matches(&self, ctx: &CallContext, meta: &CallMeta, payload: Option<&dyn Payload>) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&CallContext, &CallMeta, Option<&dyn Payload>) -> bool + Send + Sync,
{
    fn matches(&self, ctx: &CallContext, meta: &CallMeta, payload: Option<&dyn Payload>) -> bool {
        self(ctx, meta, payload)
    }
}

/// Matcher accepting every call and message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAll;

impl Matcher for MatchAll {
    fn matches(&self, _: &CallContext, _: &CallMeta, _: Option<&dyn Payload>) -> bool {
        true
    }
}
