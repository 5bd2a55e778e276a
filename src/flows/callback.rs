//! Callback Processor: validates the return state and exchanges the code for an identity.
//!
//! The processor is total with respect to exchange failures: transport errors, hostile
//! status codes, and malformed bodies all resolve to a ticket with an absent identity. The
//! only verdict that produces no ticket at all is a missing or rejected `state`, which marks
//! the request as not belonging to this handshake.

// self
use crate::{
	_prelude::*,
	auth::{CLAIM_EMAIL, CLAIM_NAME, CLAIM_SUBJECT, Claim, Identity, Ticket},
	error::ExchangeError,
	flows::Relay,
	hook::AuthenticatedContext,
	http::{ExchangeHttpClient, UserAttributes, decode_user_attributes},
	obs::{self, HandshakeFlow, HandshakeOutcome},
	request::RequestSnapshot,
};

/// Verdict produced by the Callback Processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
	/// The request does not belong to this handshake; the pipeline should keep routing it.
	Unhandled,
	/// A fully formed ticket, authenticated or not.
	Ticket(Ticket),
}

impl<C> Relay<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	/// Processes an inbound callback request into a ticket or an unhandled verdict.
	///
	/// Query parameters follow the exactly-one-value rule; duplicated `code` or `state`
	/// parameters are treated as absent. Dropping the returned future cancels the in-flight
	/// exchange, which is how the host's request cancellation propagates.
	pub async fn process_callback(&self, request: &RequestSnapshot) -> Result<CallbackOutcome> {
		let span = obs::HandshakeSpan::new(HandshakeFlow::Callback, "process_callback");

		span.instrument(self.assess_callback(request)).await
	}

	async fn assess_callback(&self, request: &RequestSnapshot) -> Result<CallbackOutcome> {
		obs::record_handshake_outcome(HandshakeFlow::Callback, HandshakeOutcome::Attempt);

		if let Some(error) = request.unique_query_value("error") {
			obs::remote_error_reported(&error);
		}

		let code = request.unique_query_value("code");
		let Some(state) = request.unique_query_value("state") else {
			obs::state_rejected();
			obs::record_handshake_outcome(HandshakeFlow::Callback, HandshakeOutcome::Unhandled);

			return Ok(CallbackOutcome::Unhandled);
		};
		let properties = match self.state.unprotect(&state) {
			Ok(properties) => properties,
			Err(_) => {
				obs::state_rejected();
				obs::record_handshake_outcome(
					HandshakeFlow::Callback,
					HandshakeOutcome::Unhandled,
				);

				return Ok(CallbackOutcome::Unhandled);
			},
		};
		// The portal denied or the user aborted; the recovered properties still travel back.
		let Some(code) = code else {
			obs::record_handshake_outcome(HandshakeFlow::Callback, HandshakeOutcome::Denied);

			return Ok(CallbackOutcome::Ticket(Ticket::unauthenticated(properties)));
		};
		let attributes = match self.fetch_user_attributes(&code).await {
			Ok(attributes) => attributes,
			Err(err) => {
				obs::exchange_failed(&err);
				obs::record_handshake_outcome(HandshakeFlow::Callback, HandshakeOutcome::Failure);

				return Ok(CallbackOutcome::Ticket(Ticket::unauthenticated(properties)));
			},
		};
		let token = attributes.access_token.clone().filter(|token| !token.trim().is_empty());
		let Some(token) = token else {
			obs::access_token_missing();
			obs::record_handshake_outcome(HandshakeFlow::Callback, HandshakeOutcome::Denied);

			return Ok(CallbackOutcome::Ticket(Ticket::unauthenticated(properties)));
		};
		let mut ctx = AuthenticatedContext {
			identity: build_identity(&self.options.scheme, &token, &attributes),
			properties,
		};

		self.events.on_authenticated(&mut ctx)?;
		obs::record_handshake_outcome(HandshakeFlow::Callback, HandshakeOutcome::Success);

		Ok(CallbackOutcome::Ticket(Ticket::authenticated(ctx.identity, ctx.properties)))
	}

	async fn fetch_user_attributes(&self, code: &str) -> Result<UserAttributes, ExchangeError> {
		// The portal expects the code escaped once more inside the form payload.
		let form = [("code", urlencoding::encode(code).into_owned())];
		let response = self
			.http_client
			.post_form(&self.options.user_information_endpoint, &form)
			.await?;

		if !response.is_success() {
			return Err(ExchangeError::Status {
				status: response.status,
				body_preview: response.body_preview(),
			});
		}

		decode_user_attributes(&response.body)
	}
}

/// Maps exchanged attributes into the scheme-labeled claim set.
///
/// The claim set is exactly: a subject claim valued at the access token, plus name and email
/// claims when the portal disclosed non-blank values. Nothing else is synthesized.
fn build_identity(scheme: &str, access_token: &str, attributes: &UserAttributes) -> Identity {
	let mut identity =
		Identity::new(scheme).with_claim(Claim::new(CLAIM_SUBJECT, access_token));

	if let Some(name) = non_blank(attributes.default_user_name.as_deref()) {
		identity.push(Claim::new(CLAIM_NAME, name));
	}
	if let Some(email) = non_blank(attributes.email.as_deref()) {
		identity.push(Claim::new(CLAIM_EMAIL, email));
	}

	identity
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		auth::Properties,
		http::{ExchangeFuture, RawExchangeResponse},
		options::RelayOptions,
		session::NullSessionSink,
		state::{KeyedStateCodec, StateKey, StateProtector},
	};

	struct StaticExchangeClient {
		status: u16,
		body: &'static str,
		calls: AtomicUsize,
	}
	impl StaticExchangeClient {
		fn new(status: u16, body: &'static str) -> Self {
			Self { status, body, calls: AtomicUsize::new(0) }
		}
	}
	impl ExchangeHttpClient for StaticExchangeClient {
		fn post_form<'a>(
			&'a self,
			_endpoint: &'a Url,
			form: &'a [(&'static str, String)],
		) -> ExchangeFuture<'a> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			assert_eq!(form.len(), 1, "The exchange form should carry exactly the code pair.");
			assert_eq!(form[0].0, "code");

			Box::pin(async move {
				Ok(RawExchangeResponse { status: self.status, body: self.body.into() })
			})
		}
	}

	struct FailingExchangeClient;
	impl ExchangeHttpClient for FailingExchangeClient {
		fn post_form<'a>(
			&'a self,
			_endpoint: &'a Url,
			_form: &'a [(&'static str, String)],
		) -> ExchangeFuture<'a> {
			Box::pin(async {
				Err(ExchangeError::transport(std::io::Error::other("connection reset")))
			})
		}
	}

	fn codec() -> Arc<KeyedStateCodec> {
		Arc::new(KeyedStateCodec::new(StateKey::new([5; 32])))
	}

	fn build_relay<C>(client: C) -> (Relay<C>, Arc<KeyedStateCodec>)
	where
		C: ExchangeHttpClient,
	{
		let options = RelayOptions::new("https://portal.example.com")
			.expect("Options fixture should build successfully.");
		let codec = codec();
		let state: Arc<dyn StateProtector> = codec.clone();

		(Relay::with_http_client(options, state, Arc::new(NullSessionSink), client), codec)
	}

	fn callback_request(pairs: &[(&str, &str)]) -> RequestSnapshot {
		let mut serializer = url::form_urlencoded::Serializer::new(String::new());

		for (key, value) in pairs {
			serializer.append_pair(key, value);
		}

		RequestSnapshot::new("https", "app.example.com", "/signin-remote-account")
			.with_query(serializer.finish())
	}

	fn protected_state(codec: &KeyedStateCodec) -> String {
		codec
			.protect(&Properties::new().with_redirect_uri("https://app.example.com/dash"))
			.expect("Protecting the test properties should succeed.")
	}

	#[tokio::test]
	async fn successful_exchange_builds_all_three_claims() {
		let (relay, codec) = build_relay(StaticExchangeClient::new(
			200,
			r#"{"access_token":"tok1","Email":"a@b.com","DefaultUserName":"bob"}"#,
		));
		let state = protected_state(&codec);
		let outcome = relay
			.process_callback(&callback_request(&[("code", "c0de"), ("state", &state)]))
			.await
			.expect("Processing should succeed.");
		let CallbackOutcome::Ticket(ticket) = outcome else {
			panic!("A valid callback should produce a ticket.");
		};
		let identity = ticket.identity.expect("The exchange should produce an identity.");

		assert_eq!(identity.scheme(), "remote-account");
		assert_eq!(
			identity.claims(),
			&[
				Claim::new(CLAIM_SUBJECT, "tok1"),
				Claim::new(CLAIM_NAME, "bob"),
				Claim::new(CLAIM_EMAIL, "a@b.com"),
			]
		);
	}

	#[tokio::test]
	async fn blank_username_is_left_out_of_the_claim_set() {
		let (relay, codec) = build_relay(StaticExchangeClient::new(
			200,
			r#"{"access_token":"tok1","Email":"a@b.com","DefaultUserName":"  "}"#,
		));
		let state = protected_state(&codec);
		let outcome = relay
			.process_callback(&callback_request(&[("code", "c0de"), ("state", &state)]))
			.await
			.expect("Processing should succeed.");
		let CallbackOutcome::Ticket(ticket) = outcome else {
			panic!("A valid callback should produce a ticket.");
		};
		let identity = ticket.identity.expect("The exchange should produce an identity.");

		assert_eq!(
			identity.claims(),
			&[Claim::new(CLAIM_SUBJECT, "tok1"), Claim::new(CLAIM_EMAIL, "a@b.com")]
		);
	}

	#[tokio::test]
	async fn missing_code_denies_without_touching_the_transport() {
		let client = StaticExchangeClient::new(200, "{}");
		let (relay, codec) = build_relay(client);
		let state = protected_state(&codec);
		let outcome = relay
			.process_callback(&callback_request(&[("error", "access_denied"), ("state", &state)]))
			.await
			.expect("Processing should succeed.");
		let CallbackOutcome::Ticket(ticket) = outcome else {
			panic!("A valid state without a code should still produce a ticket.");
		};

		assert!(!ticket.is_authenticated());
		assert_eq!(
			ticket.properties.redirect_uri.as_deref(),
			Some("https://app.example.com/dash")
		);
		assert_eq!(relay.http_client.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn missing_and_invalid_states_are_unhandled() {
		let (relay, _codec) = build_relay(StaticExchangeClient::new(200, "{}"));
		let outcome = relay
			.process_callback(&callback_request(&[("code", "c0de")]))
			.await
			.expect("Processing should succeed.");

		assert_eq!(outcome, CallbackOutcome::Unhandled);

		let forged = KeyedStateCodec::new(StateKey::new([6; 32]));
		let state = protected_state(&forged);
		let outcome = relay
			.process_callback(&callback_request(&[("code", "c0de"), ("state", &state)]))
			.await
			.expect("Processing should succeed.");

		assert_eq!(outcome, CallbackOutcome::Unhandled);
		assert_eq!(relay.http_client.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn duplicated_parameters_are_treated_as_absent() {
		let (relay, codec) = build_relay(StaticExchangeClient::new(200, "{}"));
		let state = protected_state(&codec);
		let request = RequestSnapshot::new("https", "app.example.com", "/signin-remote-account")
			.with_query(format!(
				"code=one&code=two&state={}",
				url::form_urlencoded::byte_serialize(state.as_bytes()).collect::<String>()
			));
		let outcome =
			relay.process_callback(&request).await.expect("Processing should succeed.");
		let CallbackOutcome::Ticket(ticket) = outcome else {
			panic!("A valid state with an ambiguous code should produce a denied ticket.");
		};

		assert!(!ticket.is_authenticated());
		assert_eq!(relay.http_client.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn transport_status_and_decode_failures_all_deny() {
		let (relay, codec) = build_relay(FailingExchangeClient);
		let state = protected_state(&codec);
		let request = callback_request(&[("code", "c0de"), ("state", &state)]);
		let outcome =
			relay.process_callback(&request).await.expect("Processing should succeed.");

		assert!(matches!(
			outcome,
			CallbackOutcome::Ticket(Ticket { identity: None, .. })
		));

		for (status, body) in
			[(503, "{}"), (200, "<html>oops</html>"), (200, r#"{"access_token":""}"#)]
		{
			let (relay, codec) = build_relay(StaticExchangeClient::new(status, body));
			let state = protected_state(&codec);
			let outcome = relay
				.process_callback(&callback_request(&[("code", "c0de"), ("state", &state)]))
				.await
				.expect("Processing should succeed.");

			assert!(
				matches!(outcome, CallbackOutcome::Ticket(Ticket { identity: None, .. })),
				"Exchange failure for status {status} should deny, not error."
			);
		}
	}

	#[test]
	fn identity_builder_escapes_nothing_and_synthesizes_nothing() {
		let attributes = UserAttributes {
			access_token: Some("tok1".into()),
			email: None,
			default_user_name: Some("bob".into()),
		};
		let identity = build_identity("portal", "tok1", &attributes);

		assert_eq!(
			identity.claims(),
			&[Claim::new(CLAIM_SUBJECT, "tok1"), Claim::new(CLAIM_NAME, "bob")]
		);
	}
}
