//! Handshake outcome tickets.

// self
use crate::auth::{Identity, Properties};

/// Outcome of a handshake attempt: an optional identity plus the original properties bag.
///
/// A ticket with an absent identity is a fully formed value meaning "authentication did not
/// succeed", not an error return. Downstream logic decides what to do with it; the recovered
/// properties survive either way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
	/// Identity vouched for by the portal, absent on any handshake failure.
	pub identity: Option<Identity>,
	/// Properties recovered from the state round trip.
	pub properties: Properties,
}
impl Ticket {
	/// Ticket for a successful handshake.
	pub fn authenticated(identity: Identity, properties: Properties) -> Self {
		Self { identity: Some(identity), properties }
	}

	/// Ticket for a denied or failed handshake.
	pub fn unauthenticated(properties: Properties) -> Self {
		Self { identity: None, properties }
	}

	/// Whether the handshake produced an identity.
	pub fn is_authenticated(&self) -> bool {
		self.identity.is_some()
	}
}
