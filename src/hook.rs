//! Extension hook contracts that let hosts observe or rewrite handshake stages.

// self
use crate::{
	_prelude::*,
	auth::{Identity, Properties, Ticket},
};

/// Capability set invoked at each handshake stage.
///
/// Hosts substitute their own value to audit or rewrite a stage's output before it takes
/// effect; no subclassing is involved, the hook travels as an injected `Arc<dyn SigninEvents>`
/// on the relay. Every operation defaults to a no-op, so implementors override only what they
/// need. Returning an error aborts the stage: dispatch answers with a server error instead of
/// completing the handshake.
pub trait SigninEvents: Send + Sync {
	/// Observes the composed authorization redirect before the host emits it.
	fn on_redirect(&self, _ctx: &RedirectContext) -> Result<()> {
		Ok(())
	}

	/// Runs after a successful exchange, before the final ticket is emitted; may rewrite the
	/// identity or the recovered properties.
	fn on_authenticated(&self, _ctx: &mut AuthenticatedContext) -> Result<()> {
		Ok(())
	}

	/// Runs at the return endpoint; may rewrite the identity, change the redirect target, or
	/// mark the request already completed to short-circuit dispatch.
	fn on_return(&self, _ctx: &mut ReturnContext) -> Result<()> {
		Ok(())
	}
}

/// No-op hook used when hosts do not substitute their own.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSigninEvents;
impl Display for DefaultSigninEvents {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-signin-events")
	}
}
impl SigninEvents for DefaultSigninEvents {}

/// Context passed to [`SigninEvents::on_redirect`] when a challenge composes the
/// authorization redirect.
#[derive(Clone, Debug)]
pub struct RedirectContext<'a> {
	/// Composed authorization redirect location.
	pub location: &'a Url,
	/// Challenge properties protected into the `state` parameter.
	pub properties: &'a Properties,
}

/// Context passed to [`SigninEvents::on_authenticated`] once the exchange has produced an
/// identity.
#[derive(Clone, Debug)]
pub struct AuthenticatedContext {
	/// Identity built from the exchanged attributes.
	pub identity: Identity,
	/// Properties recovered from the state round trip.
	pub properties: Properties,
}

/// Context passed to [`SigninEvents::on_return`] at the return endpoint.
#[derive(Clone, Debug)]
pub struct ReturnContext {
	/// Identity carried by the ticket, absent when the handshake did not succeed.
	pub identity: Option<Identity>,
	/// Properties recovered from the state round trip.
	pub properties: Properties,
	/// Scheme of the middleware that issues the session, when configured.
	pub sign_in_scheme: Option<String>,
	/// Redirect target applied at completion, defaulted from the properties bag.
	pub redirect_uri: Option<String>,
	completed: bool,
}
impl ReturnContext {
	pub(crate) fn new(ticket: Ticket, sign_in_scheme: Option<String>) -> Self {
		let redirect_uri = ticket.properties.redirect_uri.clone();

		Self {
			identity: ticket.identity,
			properties: ticket.properties,
			sign_in_scheme,
			redirect_uri,
			completed: false,
		}
	}

	/// Marks the request as already answered; dispatch will not emit a redirect.
	pub fn mark_completed(&mut self) {
		self.completed = true;
	}

	/// Whether a hook already answered the request.
	pub fn is_completed(&self) -> bool {
		self.completed
	}
}
