//! Rust's drop-in external-account sign-in relay: challenge redirects, callback validation, and
//! claims identities for any hosting pipeline.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod hook;
pub mod http;
pub mod obs;
pub mod options;
pub mod request;
pub mod session;
pub mod state;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for relay tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::Mutex as StdMutex;
	// self
	use crate::{
		auth::{Identity, Properties},
		flows::{Relay, ReqwestRelay},
		http::ReqwestExchangeClient,
		options::RelayOptions,
		session::SessionSink,
		state::{KeyedStateCodec, StateKey, StateProtector},
	};

	/// Relay type alias used by reqwest-backed tests.
	pub type ReqwestTestRelay = ReqwestRelay;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_exchange_client() -> ReqwestExchangeClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestExchangeClient::with_client(client)
	}

	/// State codec with a fixed key shared by test fixtures.
	pub fn test_state_codec() -> Arc<KeyedStateCodec> {
		Arc::new(KeyedStateCodec::new(StateKey::new([7; 32])))
	}

	/// Session sink that records every grant for later assertions.
	#[derive(Debug, Default)]
	pub struct RecordingSessionSink {
		grants: StdMutex<Vec<(Properties, Identity)>>,
	}
	impl RecordingSessionSink {
		/// Snapshot of the grants recorded so far.
		pub fn grants(&self) -> Vec<(Properties, Identity)> {
			self.grants.lock().expect("Grant log mutex should not be poisoned.").clone()
		}
	}
	impl SessionSink for RecordingSessionSink {
		fn sign_in(&self, properties: &Properties, identity: Identity) {
			self.grants
				.lock()
				.expect("Grant log mutex should not be poisoned.")
				.push((properties.clone(), identity));
		}
	}

	/// Constructs a [`Relay`] backed by the insecure test transport, the fixed-key codec, and a
	/// recording session sink.
	pub fn build_reqwest_test_relay(
		options: RelayOptions,
	) -> (ReqwestTestRelay, Arc<RecordingSessionSink>, Arc<KeyedStateCodec>) {
		let codec = test_state_codec();
		let state: Arc<dyn StateProtector> = codec.clone();
		let sink = Arc::new(RecordingSessionSink::default());
		let sessions: Arc<dyn SessionSink> = sink.clone();
		let relay =
			Relay::with_http_client(options, state, sessions, test_reqwest_exchange_client());

		(relay, sink, codec)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
