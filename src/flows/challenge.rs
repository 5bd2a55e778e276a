//! Challenge Initiator: turns a pending 401 challenge into an authorization redirect.

// self
use crate::{
	_prelude::*,
	auth::Properties,
	flows::Relay,
	hook::RedirectContext,
	http::ExchangeHttpClient,
	obs::{self, HandshakeFlow, HandshakeOutcome},
	request::RequestSnapshot,
};

const STATUS_UNAUTHORIZED: u16 = 401;

impl<C> Relay<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	/// Builds the authorization redirect for a pending authentication challenge.
	///
	/// Returns `Ok(None)` unless the outgoing response status is exactly 401 and a pending
	/// challenge is supplied; the host emits the returned location as an HTTP redirect. The
	/// challenge properties travel to the portal as a protected `state` parameter, with
	/// `redirect_uri` defaulted to the current request URL when the caller left it unset.
	/// The `redirect_uri` sent to the portal is always the configured callback URL, not the
	/// current path.
	pub fn apply_challenge(
		&self,
		request: &RequestSnapshot,
		response_status: u16,
		challenge: Option<Properties>,
	) -> Result<Option<Url>> {
		if response_status != STATUS_UNAUTHORIZED {
			return Ok(None);
		}

		let Some(mut properties) = challenge else {
			return Ok(None);
		};
		let _guard =
			obs::HandshakeSpan::new(HandshakeFlow::Challenge, "apply_challenge").entered();

		obs::record_handshake_outcome(HandshakeFlow::Challenge, HandshakeOutcome::Attempt);

		if properties.redirect_uri.is_none() {
			properties.redirect_uri = Some(request.current_url());
		}

		let state = self.state.protect(&properties)?;
		let mut location = self.options.authorization_endpoint.clone();

		location
			.query_pairs_mut()
			.append_pair("redirect_uri", &request.callback_url(&self.options.callback_path))
			.append_pair("state", &state);
		self.events.on_redirect(&RedirectContext { location: &location, properties: &properties })?;
		obs::record_handshake_outcome(HandshakeFlow::Challenge, HandshakeOutcome::Success);

		Ok(Some(location))
	}
}
