//! Session-layer contracts invoked once a handshake produces an identity.

// self
use crate::auth::{Identity, Properties};

/// Sign-in operation exposed by the hosting session layer.
///
/// Dispatch calls it at most once per request, after the return hook has run and only when an
/// identity is present and a sign-in scheme is configured. Implementations must be safe for
/// concurrent use; the relay shares one sink across all in-flight requests.
pub trait SessionSink: Send + Sync {
	/// Registers the granted identity and its round-trip properties with the session layer.
	fn sign_in(&self, properties: &Properties, identity: Identity);
}

/// Sink for hosts that complete sign-in outside the relay.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSessionSink;
impl SessionSink for NullSessionSink {
	fn sign_in(&self, _properties: &Properties, _identity: Identity) {}
}
