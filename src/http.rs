//! Transport primitives for the user-information exchange.
//!
//! The module exposes [`ExchangeHttpClient`] so hosts can integrate custom HTTP clients; the
//! relay only needs "POST a form, give me back status and body". Trust policy belongs to the
//! client a host injects. There is no process-wide TLS override, and the relay never builds a
//! client behind the caller's back except for the plain default used by
//! [`Relay::new`](crate::flows::Relay::new).

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::ExchangeError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Boxed future resolved by [`ExchangeHttpClient::post_form`].
pub type ExchangeFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RawExchangeResponse, ExchangeError>> + 'a + Send>>;

/// Abstraction over HTTP transports able to execute the exchange POST.
///
/// The trait is the relay's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one client can serve every in-flight request, and the returned
/// future must be `Send`. Cancellation is cooperative: dropping the future must abort the
/// underlying request, which is how the relay honors the inbound request's cancellation
/// signal.
pub trait ExchangeHttpClient: Send + Sync + 'static {
	/// Issues a form-encoded POST and resolves to the raw status and body.
	///
	/// Transport-level failures resolve to [`ExchangeError::Transport`]; non-success statuses
	/// are returned as data, not classified here.
	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		form: &'a [(&'static str, String)],
	) -> ExchangeFuture<'a>;
}

/// Raw response captured from the exchange endpoint.
#[derive(Clone, Debug)]
pub struct RawExchangeResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl RawExchangeResponse {
	/// Whether the status code is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	pub(crate) fn body_preview(&self) -> Option<String> {
		if self.body.is_empty() {
			return None;
		}

		let text = String::from_utf8_lossy(&self.body);

		Some(truncate_preview(&text))
	}
}

/// User attributes returned by the user-information endpoint.
///
/// Field names follow the portal's wire format; absent fields deserialize to `None`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserAttributes {
	/// Access token vouching for the subject; blank values are treated as absent.
	#[serde(default)]
	pub access_token: Option<String>,
	/// Account email, when the portal discloses one.
	#[serde(default, rename = "Email")]
	pub email: Option<String>,
	/// Preferred username, when the portal discloses one.
	#[serde(default, rename = "DefaultUserName")]
	pub default_user_name: Option<String>,
}

/// Decodes an exchange response body into [`UserAttributes`].
pub(crate) fn decode_user_attributes(body: &[u8]) -> Result<UserAttributes, ExchangeError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ExchangeError::Decode { source })
}

fn truncate_preview(text: &str) -> String {
	let mut buf = String::new();

	for (idx, ch) in text.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}

		buf.push(ch);
	}

	buf
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Hosts that need a pinned trust anchor, a proxy, or a custom timeout configure their own
/// [`ReqwestClient`] and hand it in via [`with_client`](ReqwestExchangeClient::with_client).
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestExchangeClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestExchangeClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with the given request timeout and default trust settings.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestExchangeClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestExchangeClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ExchangeHttpClient for ReqwestExchangeClient {
	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		form: &'a [(&'static str, String)],
	) -> ExchangeFuture<'a> {
		Box::pin(async move {
			let response = self
				.0
				.post(endpoint.clone())
				.form(&form)
				.send()
				.await
				.map_err(ExchangeError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(ExchangeError::from)?.to_vec();

			Ok(RawExchangeResponse { status, body })
		})
	}
}
