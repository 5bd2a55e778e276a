//! Immutable relay configuration and endpoint resolution.

// self
use crate::{_prelude::*, error::ConfigError};

/// Relative path of the portal page where the user agent authenticates.
const AUTHORIZATION_PATH: &str = "/account/login";
/// Relative path of the portal endpoint that exchanges a code for user attributes.
const USER_INFORMATION_PATH: &str = "/account/info";

/// Default authentication scheme label stamped on issued identities.
pub const DEFAULT_SCHEME: &str = "remote-account";
/// Default display caption for sign-in user interfaces.
pub const DEFAULT_CAPTION: &str = "Remote Account";
/// Default request path that receives the provider callback.
pub const DEFAULT_CALLBACK_PATH: &str = "/signin-remote-account";

/// Immutable endpoint and scheme configuration consumed by the relay.
///
/// Constructed once from a base URL; endpoint validation happens here, at configuration
/// time, never per request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayOptions {
	/// URL where the user agent is redirected to authenticate.
	pub authorization_endpoint: Url,
	/// URL the relay calls to obtain the user information.
	pub user_information_endpoint: Url,
	/// Request path, within the host's base path, where the user agent is returned.
	pub callback_path: String,
	/// Authentication scheme label stamped on issued identities.
	pub scheme: String,
	/// Display label for sign-in user interfaces; never consulted by the protocol.
	pub caption: String,
	/// Scheme of the middleware responsible for actually issuing the session, when the
	/// host wants the relay to hand the identity over.
	pub sign_in_scheme: Option<String>,
}
impl RelayOptions {
	/// Resolves the portal endpoints from a base URL and applies the default labels.
	///
	/// A trailing `/` on the base is trimmed before the fixed relative paths are joined.
	pub fn new(base_url: &str) -> Result<Self, ConfigError> {
		let base = base_url.trim_end_matches('/');

		if base.trim().is_empty() {
			return Err(ConfigError::EmptyBaseUrl);
		}

		Ok(Self {
			authorization_endpoint: resolve_endpoint(base, AUTHORIZATION_PATH)?,
			user_information_endpoint: resolve_endpoint(base, USER_INFORMATION_PATH)?,
			callback_path: DEFAULT_CALLBACK_PATH.into(),
			scheme: DEFAULT_SCHEME.into(),
			caption: DEFAULT_CAPTION.into(),
			sign_in_scheme: None,
		})
	}

	/// Overrides the callback path; the path must begin with `/`.
	pub fn with_callback_path(mut self, path: impl Into<String>) -> Result<Self, ConfigError> {
		let path = path.into();

		if !path.starts_with('/') {
			return Err(ConfigError::RelativeCallbackPath { path });
		}

		self.callback_path = path;

		Ok(self)
	}

	/// Overrides the authentication scheme label.
	pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
		self.scheme = scheme.into();

		self
	}

	/// Overrides the display caption.
	pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
		self.caption = caption.into();

		self
	}

	/// Hands completed identities to the named sign-in scheme instead of leaving the
	/// hand-off to the host.
	pub fn with_sign_in_scheme(mut self, scheme: impl Into<String>) -> Self {
		self.sign_in_scheme = Some(scheme.into());

		self
	}
}

fn resolve_endpoint(base: &str, path: &str) -> Result<Url, ConfigError> {
	Url::parse(&format!("{base}{path}")).map_err(|source| ConfigError::InvalidBaseUrl { source })
}
