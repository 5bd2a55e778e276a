//! High-level handshake flows exposed by the relay.

pub mod callback;
pub mod challenge;
pub mod completion;

pub use callback::*;
pub use completion::*;

// self
use crate::{
	_prelude::*,
	hook::{DefaultSigninEvents, SigninEvents},
	http::ExchangeHttpClient,
	options::RelayOptions,
	session::SessionSink,
	state::StateProtector,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestExchangeClient;

#[cfg(feature = "reqwest")]
/// Relay specialized for the crate's default reqwest transport.
pub type ReqwestRelay = Relay<ReqwestExchangeClient>;

/// Coordinates the sign-in handshake against a single remote portal.
///
/// The relay owns the HTTP client, state protector, extension hook, and session sink so the
/// individual flows can focus on protocol logic. Everything here is immutable after
/// construction and safe for concurrent use; each in-flight request owns its own properties
/// bag, ticket, and identity, so no locking is involved anywhere in a handshake.
#[derive(Clone)]
pub struct Relay<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	/// HTTP client used for the outbound user-information exchange.
	pub http_client: Arc<C>,
	/// Immutable endpoint and scheme configuration.
	pub options: RelayOptions,
	/// Extension hook observing or rewriting each handshake stage.
	pub events: Arc<dyn SigninEvents>,
	/// Tamper-evident codec carrying the properties bag through the provider round trip.
	pub state: Arc<dyn StateProtector>,
	/// Session layer receiving the identity once the handshake succeeds.
	pub sessions: Arc<dyn SessionSink>,
}
impl<C> Relay<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	/// Creates a relay that reuses the caller-provided transport.
	pub fn with_http_client(
		options: RelayOptions,
		state: Arc<dyn StateProtector>,
		sessions: Arc<dyn SessionSink>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			options,
			events: Arc::new(DefaultSigninEvents),
			state,
			sessions,
		}
	}

	/// Substitutes the extension hook (defaults to the no-op implementation).
	pub fn with_events(mut self, events: Arc<dyn SigninEvents>) -> Self {
		self.events = events;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Relay<ReqwestExchangeClient> {
	/// Creates a relay with the crate's default reqwest transport.
	///
	/// The default client carries reqwest's standard trust settings. Hosts that need a pinned
	/// certificate, a proxy, or a custom timeout build their own client and use
	/// [`Relay::with_http_client`]; there is no process-wide override to reach for.
	pub fn new(
		options: RelayOptions,
		state: Arc<dyn StateProtector>,
		sessions: Arc<dyn SessionSink>,
	) -> Self {
		Self::with_http_client(options, state, sessions, ReqwestExchangeClient::default())
	}
}
impl<C> Debug for Relay<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay").field("options", &self.options).finish()
	}
}
