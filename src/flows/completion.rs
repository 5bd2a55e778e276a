//! Dispatch/Completion: routes the callback path, signs in, and finishes the request.

// self
use crate::{
	flows::{CallbackOutcome, Relay},
	hook::ReturnContext,
	http::ExchangeHttpClient,
	obs::{self, HandshakeFlow, HandshakeOutcome},
	request::RequestSnapshot,
};

/// Disposition returned by [`Relay::handle_request`].
///
/// The request counts as handled for every variant except [`Unhandled`](Self::Unhandled);
/// hosts map the variants onto their pipeline's response primitives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
	/// Request was not consumed; the pipeline should try other routes.
	Unhandled,
	/// Terminal failure; the host must answer with a server error status and stop routing.
	ServerError,
	/// Redirect the user agent to the target and stop routing. The target is the
	/// caller-supplied return location and may be a relative reference.
	Redirect(String),
	/// A hook answered the request already; stop routing without a redirect.
	Completed,
}
impl DispatchOutcome {
	/// Whether the relay consumed the request.
	pub fn is_handled(&self) -> bool {
		!matches!(self, DispatchOutcome::Unhandled)
	}
}

impl<C> Relay<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	/// Handles an inbound request addressed to the callback path.
	///
	/// The path comparison is byte-for-byte, trailing characters included; anything else is
	/// [`DispatchOutcome::Unhandled`] without touching the protector or the transport. For a
	/// matching path the Callback Processor runs, the return hook gets a chance to rewrite
	/// the outcome, a present identity is handed to the session sink under the configured
	/// sign-in scheme, and the user agent is sent back to the recovered return target, with
	/// `error=access_denied` appended when the handshake produced no identity.
	pub async fn handle_request(&self, request: &RequestSnapshot) -> DispatchOutcome {
		if request.path != self.options.callback_path {
			return DispatchOutcome::Unhandled;
		}

		let span = obs::HandshakeSpan::new(HandshakeFlow::Completion, "handle_request");

		span.instrument(self.complete_callback(request)).await
	}

	async fn complete_callback(&self, request: &RequestSnapshot) -> DispatchOutcome {
		obs::record_handshake_outcome(HandshakeFlow::Completion, HandshakeOutcome::Attempt);

		let outcome = match self.process_callback(request).await {
			Ok(outcome) => outcome,
			Err(err) => {
				obs::processor_failed(&err);
				obs::record_handshake_outcome(
					HandshakeFlow::Completion,
					HandshakeOutcome::Failure,
				);

				return DispatchOutcome::ServerError;
			},
		};
		let ticket = match outcome {
			CallbackOutcome::Unhandled => {
				obs::record_handshake_outcome(
					HandshakeFlow::Completion,
					HandshakeOutcome::Unhandled,
				);

				return DispatchOutcome::Unhandled;
			},
			CallbackOutcome::Ticket(ticket) => ticket,
		};
		let mut ctx = ReturnContext::new(ticket, self.options.sign_in_scheme.clone());

		if let Err(err) = self.events.on_return(&mut ctx) {
			obs::processor_failed(&err);
			obs::record_handshake_outcome(HandshakeFlow::Completion, HandshakeOutcome::Failure);

			return DispatchOutcome::ServerError;
		}

		let authenticated = ctx.identity.is_some();

		if let Some(scheme) = ctx.sign_in_scheme.clone()
			&& let Some(identity) = ctx.identity.take()
		{
			let granted =
				if identity.scheme() == scheme { identity } else { identity.relabel(scheme) };

			self.sessions.sign_in(&ctx.properties, granted);
		}
		if !ctx.is_completed()
			&& let Some(target) = ctx.redirect_uri.clone()
		{
			// A redirect hint that sign-in failed in some way.
			let target = if authenticated {
				target
			} else {
				append_query_param(&target, "error", "access_denied")
			};

			ctx.mark_completed();
			obs::record_handshake_outcome(
				HandshakeFlow::Completion,
				if authenticated { HandshakeOutcome::Success } else { HandshakeOutcome::Denied },
			);

			return DispatchOutcome::Redirect(target);
		}
		if ctx.is_completed() {
			obs::record_handshake_outcome(HandshakeFlow::Completion, HandshakeOutcome::Success);

			DispatchOutcome::Completed
		} else {
			obs::record_handshake_outcome(HandshakeFlow::Completion, HandshakeOutcome::Unhandled);

			DispatchOutcome::Unhandled
		}
	}
}

/// Appends a query parameter to a caller-supplied target, which may be a relative reference
/// that [`url::Url`] cannot represent.
fn append_query_param(target: &str, name: &str, value: &str) -> String {
	let separator = if target.contains('?') { '&' } else { '?' };

	format!("{target}{separator}{name}={value}")
}


#[cfg(all(test, feature = "reqwest"))]
mod dispatch_tests {
	// std
	use std::sync::Arc;
	// self
	use super::*;
	use crate::{
		_preludet::build_reqwest_test_relay,
		auth::{CLAIM_SUBJECT, Claim, Identity, Properties},
		error::{Error, Result},
		hook::{ReturnContext, SigninEvents},
		options::RelayOptions,
		state::StateProtector,
	};

	fn test_options() -> RelayOptions {
		RelayOptions::new("https://portal.example.com")
			.expect("Options fixture should build successfully.")
			.with_sign_in_scheme("cookies")
	}

	fn state_for(codec: &dyn StateProtector, properties: &Properties) -> String {
		codec.protect(properties).expect("Protecting the test properties should succeed.")
	}

	fn callback_request(path: &str, query: String) -> RequestSnapshot {
		RequestSnapshot::new("https", "app.example.com", path).with_query(query)
	}

	#[tokio::test]
	async fn foreign_paths_are_left_to_the_pipeline() {
		let (relay, sink, _codec) = build_reqwest_test_relay(test_options());
		let request = callback_request("/not-the-callback", String::new());
		let outcome = relay.handle_request(&request).await;

		assert_eq!(outcome, DispatchOutcome::Unhandled);
		assert!(!outcome.is_handled());
		assert!(sink.grants().is_empty());
	}

	#[tokio::test]
	async fn rejected_state_is_unhandled_not_completed() {
		let (relay, sink, _codec) = build_reqwest_test_relay(test_options());
		let query = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("code", "c0de")
			.append_pair("state", "forged")
			.finish();
		let request = callback_request("/signin-remote-account", query);
		let outcome = relay.handle_request(&request).await;

		assert_eq!(outcome, DispatchOutcome::Unhandled);
		assert!(sink.grants().is_empty());
	}

	#[tokio::test]
	async fn denied_ticket_redirects_with_the_access_denied_hint() {
		let (relay, sink, codec) = build_reqwest_test_relay(test_options());
		let properties = Properties::new().with_redirect_uri("/dash?tab=1");
		let query = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("error", "user_cancelled")
			.append_pair("state", &state_for(codec.as_ref(), &properties))
			.finish();
		let request = callback_request("/signin-remote-account", query);
		let outcome = relay.handle_request(&request).await;

		assert_eq!(
			outcome,
			DispatchOutcome::Redirect("/dash?tab=1&error=access_denied".into())
		);
		assert!(sink.grants().is_empty());
	}

	#[tokio::test]
	async fn missing_redirect_target_leaves_the_request_uncompleted() {
		let (relay, _sink, codec) = build_reqwest_test_relay(test_options());
		let query = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("state", &state_for(codec.as_ref(), &Properties::new()))
			.finish();
		let request = callback_request("/signin-remote-account", query);

		assert_eq!(relay.handle_request(&request).await, DispatchOutcome::Unhandled);
	}

	struct ShortCircuitHook;
	impl SigninEvents for ShortCircuitHook {
		fn on_return(&self, ctx: &mut ReturnContext) -> Result<()> {
			ctx.mark_completed();

			Ok(())
		}
	}

	#[tokio::test]
	async fn return_hook_can_short_circuit_the_redirect() {
		let (relay, _sink, codec) = build_reqwest_test_relay(test_options());
		let relay = relay.with_events(Arc::new(ShortCircuitHook));
		let properties = Properties::new().with_redirect_uri("/dash");
		let query = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("state", &state_for(codec.as_ref(), &properties))
			.finish();
		let request = callback_request("/signin-remote-account", query);

		assert_eq!(relay.handle_request(&request).await, DispatchOutcome::Completed);
	}

	struct GrantingHook;
	impl SigninEvents for GrantingHook {
		fn on_return(&self, ctx: &mut ReturnContext) -> Result<()> {
			ctx.identity = Some(
				Identity::new("remote-account").with_claim(Claim::new(CLAIM_SUBJECT, "tok1")),
			);

			Ok(())
		}
	}

	#[tokio::test]
	async fn granted_identity_is_relabeled_and_signed_in() {
		let (relay, sink, codec) = build_reqwest_test_relay(test_options());
		let relay = relay.with_events(Arc::new(GrantingHook));
		let properties = Properties::new().with_redirect_uri("/dash").with_entry("t", "1");
		let query = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("state", &state_for(codec.as_ref(), &properties))
			.finish();
		let request = callback_request("/signin-remote-account", query);
		let outcome = relay.handle_request(&request).await;

		assert_eq!(outcome, DispatchOutcome::Redirect("/dash".into()));

		let grants = sink.grants();

		assert_eq!(grants.len(), 1);
		assert_eq!(grants[0].0.get("t"), Some("1"));
		assert_eq!(grants[0].1.scheme(), "cookies");
		assert_eq!(grants[0].1.find(CLAIM_SUBJECT), Some("tok1"));
	}

	struct RewritingHook;
	impl SigninEvents for RewritingHook {
		fn on_return(&self, ctx: &mut ReturnContext) -> Result<()> {
			ctx.redirect_uri = Some("/elsewhere".into());

			Ok(())
		}
	}

	#[tokio::test]
	async fn return_hook_rewrites_the_redirect_target() {
		let (relay, _sink, codec) = build_reqwest_test_relay(test_options());
		let relay = relay.with_events(Arc::new(RewritingHook));
		let properties = Properties::new().with_redirect_uri("/dash");
		let query = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("state", &state_for(codec.as_ref(), &properties))
			.finish();
		let request = callback_request("/signin-remote-account", query);
		let outcome = relay.handle_request(&request).await;

		assert_eq!(
			outcome,
			DispatchOutcome::Redirect("/elsewhere?error=access_denied".into())
		);
	}

	struct RejectingHook;
	impl SigninEvents for RejectingHook {
		fn on_return(&self, _ctx: &mut ReturnContext) -> Result<()> {
			Err(Error::hook("return", "policy said no"))
		}
	}

	#[tokio::test]
	async fn hook_rejection_is_a_terminal_server_error() {
		let (relay, sink, codec) = build_reqwest_test_relay(test_options());
		let relay = relay.with_events(Arc::new(RejectingHook));
		let properties = Properties::new().with_redirect_uri("/dash");
		let query = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("state", &state_for(codec.as_ref(), &properties))
			.finish();
		let request = callback_request("/signin-remote-account", query);
		let outcome = relay.handle_request(&request).await;

		assert_eq!(outcome, DispatchOutcome::ServerError);
		assert!(outcome.is_handled());
		assert!(sink.grants().is_empty());
	}
}
