//! Properties protection contracts and the keyed tamper-evident codec.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
// self
use crate::{_prelude::*, auth::Properties};

type HmacSha256 = Hmac<Sha256>;

const STATE_KEY_LEN: usize = 32;
const DEFAULT_PURPOSE: &str = "signin-relay.state.v1";

/// Errors raised by state protection implementations.
#[derive(Debug, ThisError)]
pub enum StateError {
	/// Configured key was rejected by the MAC implementation.
	#[error("State key was rejected by the MAC implementation.")]
	Key,
	/// Properties bag could not be serialized into a payload.
	#[error("State payload could not be serialized.")]
	Serialize {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Value was not produced by `protect` under the same key and purpose. Covers malformed
	/// envelopes, MAC mismatches, and expired payloads alike; callers get no distinction.
	#[error("State value was rejected.")]
	Rejected,
}

/// Tamper-evident encoder contract for [`Properties`] round trips.
///
/// Implementations must guarantee `unprotect(protect(p)) == p` for every valid bag and must
/// reject any string not produced by `protect` with the same key, rather than returning
/// garbage. The relay treats a rejected state as "this request does not belong to this
/// handshake".
pub trait StateProtector: Send + Sync {
	/// Seals a properties bag into an opaque string.
	fn protect(&self, properties: &Properties) -> Result<String, StateError>;

	/// Recovers the properties bag from a protected string.
	fn unprotect(&self, value: &str) -> Result<Properties, StateError>;
}

/// 256-bit key for [`KeyedStateCodec`].
#[derive(Clone)]
pub struct StateKey([u8; STATE_KEY_LEN]);
impl StateKey {
	/// Wraps caller-provided key material.
	pub fn new(bytes: [u8; STATE_KEY_LEN]) -> Self {
		Self(bytes)
	}

	/// Generates a fresh random key.
	///
	/// States minted under a random key do not survive a process restart; hosts that need
	/// restart-safe challenges must provision a stable key instead.
	pub fn random() -> Self {
		let mut bytes = [0_u8; STATE_KEY_LEN];

		rand::rng().fill(&mut bytes[..]);

		Self(bytes)
	}
}
impl Debug for StateKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StateKey(..)")
	}
}

#[derive(Serialize, Deserialize)]
struct Envelope {
	#[serde(rename = "iat")]
	issued_at: i64,
	#[serde(rename = "props")]
	properties: Properties,
}

/// Keyed HMAC-SHA256 state codec producing `payload.mac` envelopes.
///
/// The payload is the base64url-encoded serde_json serialization of the bag plus an issue
/// timestamp; the MAC covers the purpose label and the payload, so states minted for one
/// purpose (scheme) never validate for another.
#[derive(Debug)]
pub struct KeyedStateCodec {
	key: StateKey,
	purpose: String,
	max_age: Option<Duration>,
}
impl KeyedStateCodec {
	/// Creates a codec with the default purpose label and no age limit.
	pub fn new(key: StateKey) -> Self {
		Self { key, purpose: DEFAULT_PURPOSE.into(), max_age: None }
	}

	/// Scopes the codec to a purpose label, typically the authentication scheme.
	pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
		self.purpose = purpose.into();

		self
	}

	/// Rejects payloads older than the given age at `unprotect` time.
	pub fn with_max_age(mut self, max_age: Duration) -> Self {
		self.max_age = Some(max_age);

		self
	}

	fn mac(&self) -> Result<HmacSha256, StateError> {
		HmacSha256::new_from_slice(&self.key.0).map_err(|_| StateError::Key)
	}

	fn seal(&self, envelope: &Envelope) -> Result<String, StateError> {
		let json =
			serde_json::to_vec(envelope).map_err(|source| StateError::Serialize { source })?;
		let payload = URL_SAFE_NO_PAD.encode(json);
		let mut mac = self.mac()?;

		mac.update(self.purpose.as_bytes());
		mac.update(b".");
		mac.update(payload.as_bytes());

		let tag = mac.finalize().into_bytes();

		Ok(format!("{payload}.{}", URL_SAFE_NO_PAD.encode(tag)))
	}
}
impl StateProtector for KeyedStateCodec {
	fn protect(&self, properties: &Properties) -> Result<String, StateError> {
		let envelope = Envelope {
			issued_at: OffsetDateTime::now_utc().unix_timestamp(),
			properties: properties.clone(),
		};

		self.seal(&envelope)
	}

	fn unprotect(&self, value: &str) -> Result<Properties, StateError> {
		let (payload, tag) = value.split_once('.').ok_or(StateError::Rejected)?;
		let presented = URL_SAFE_NO_PAD.decode(tag).map_err(|_| StateError::Rejected)?;
		let mut mac = self.mac()?;

		mac.update(self.purpose.as_bytes());
		mac.update(b".");
		mac.update(payload.as_bytes());
		mac.verify_slice(&presented).map_err(|_| StateError::Rejected)?;

		let json = URL_SAFE_NO_PAD.decode(payload).map_err(|_| StateError::Rejected)?;
		let envelope: Envelope =
			serde_json::from_slice(&json).map_err(|_| StateError::Rejected)?;

		if let Some(max_age) = self.max_age {
			let issued = OffsetDateTime::from_unix_timestamp(envelope.issued_at)
				.map_err(|_| StateError::Rejected)?;

			if OffsetDateTime::now_utc() - issued > max_age {
				return Err(StateError::Rejected);
			}
		}

		Ok(envelope.properties)
	}
}
