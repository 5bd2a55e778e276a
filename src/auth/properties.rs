//! Caller-supplied context carried opaquely through the provider round trip.

// self
use crate::_prelude::*;

/// String map plus the distinguished return target, created per challenge and consumed per
/// callback.
///
/// The bag never reaches the provider in the clear; it travels as a protected state string
/// minted by [`StateProtector`](crate::state::StateProtector).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
	/// Return target restored once the handshake completes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirect_uri: Option<String>,
	/// Free-form entries preserved across the round trip.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub entries: BTreeMap<String, String>,
}
impl Properties {
	/// Creates an empty bag.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the return target.
	pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(uri.into());

		self
	}

	/// Adds a free-form entry.
	pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.entries.insert(key.into(), value.into());

		self
	}

	/// Looks up a free-form entry.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(String::as_str)
	}
}
