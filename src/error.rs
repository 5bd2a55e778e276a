//! Relay error types shared across configuration, state protection, and flows.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
///
/// Exchange-level failures never appear here: the Callback Processor converts every
/// [`ExchangeError`] into a ticket with an absent identity instead of propagating it.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// State protection failure while minting a challenge.
	#[error(transparent)]
	State(#[from] crate::state::StateError),

	/// An extension hook rejected a handshake stage.
	#[error("Extension hook rejected the {stage} stage: {reason}.")]
	Hook {
		/// Stage label (`redirect`, `authenticated`, `return`).
		stage: &'static str,
		/// Hook-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Builds a hook rejection for the given stage.
	pub fn hook(stage: &'static str, reason: impl Into<String>) -> Self {
		Self::Hook { stage, reason: reason.into() }
	}
}

/// Configuration and validation failures raised at relay construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base URL was empty or whitespace.
	#[error("Base URL cannot be empty.")]
	EmptyBaseUrl,
	/// Base URL could not be resolved into endpoint URLs.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Callback path does not start from the application root.
	#[error("Callback path `{path}` must begin with `/`.")]
	RelativeCallbackPath {
		/// Offending path value.
		path: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failure classification for the user-information exchange.
///
/// Every variant resolves to the same handshake outcome (a ticket with an absent identity);
/// the split exists so logs and metrics can tell a dead network from a hostile response.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Transport failure (DNS, TCP, TLS) while calling the endpoint.
	#[error("Network error occurred while calling the user information endpoint.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Endpoint answered with a non-success status code.
	#[error("User information endpoint returned status {status}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Preview of the response body, when one was returned.
		body_preview: Option<String>,
	},
	/// Endpoint body could not be decoded into user attributes.
	#[error("User information endpoint returned a malformed body.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ExchangeError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// Stable label for the failure class, suitable for log and metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			ExchangeError::Transport { .. } => "transport",
			ExchangeError::Status { .. } => "status",
			ExchangeError::Decode { .. } => "decode",
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ExchangeError {
	fn from(e: ReqwestError) -> Self {
		Self::transport(e)
	}
}
