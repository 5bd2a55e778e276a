//! Optional observability helpers for relay flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `signin_relay.flow` with the `flow`
//!   (handshake stage group) and `stage` (call site) fields, plus discrete events for
//!   remote-reported errors, rejected state, and exchange failures.
//! - Enable `metrics` to increment the `signin_relay_handshake_total` counter for every
//!   attempt/success/denial/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Handshake flows observed by the relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeFlow {
	/// Challenge Initiator: 401 plus pending challenge into an authorization redirect.
	Challenge,
	/// Callback Processor: inbound callback into a ticket or an unhandled verdict.
	Callback,
	/// Dispatch/Completion: ticket into sign-in, redirect, or server error.
	Completion,
}
impl HandshakeFlow {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakeFlow::Challenge => "challenge",
			HandshakeFlow::Callback => "callback",
			HandshakeFlow::Completion => "completion",
		}
	}
}
impl Display for HandshakeFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeOutcome {
	/// Entry to a relay flow.
	Attempt,
	/// Flow completed with an authenticated result.
	Success,
	/// Handshake resolved without an identity (remote denial, missing code or token).
	Denied,
	/// Request was not consumed by the relay.
	Unhandled,
	/// Flow failed terminally for this request.
	Failure,
}
impl HandshakeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakeOutcome::Attempt => "attempt",
			HandshakeOutcome::Success => "success",
			HandshakeOutcome::Denied => "denied",
			HandshakeOutcome::Unhandled => "unhandled",
			HandshakeOutcome::Failure => "failure",
		}
	}
}
impl Display for HandshakeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
