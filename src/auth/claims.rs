//! Scheme-labeled claims identities asserted by the remote portal.

// self
use crate::_prelude::*;

/// Claim kind for the subject identifier.
pub const CLAIM_SUBJECT: &str = "sub";
/// Claim kind for the display name.
pub const CLAIM_NAME: &str = "name";
/// Claim kind for the email address.
pub const CLAIM_EMAIL: &str = "email";

/// Single (kind, value) attribute asserted about the subject.
///
/// The issuer is implicitly the scheme label of the identity carrying the claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
	/// Claim kind, e.g. [`CLAIM_SUBJECT`].
	pub kind: String,
	/// Claim value.
	pub value: String,
}
impl Claim {
	/// Creates a claim of the given kind.
	pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
		Self { kind: kind.into(), value: value.into() }
	}
}

/// Ordered claim set labeled with the authentication scheme that produced it.
///
/// Built fresh per successful exchange and never mutated afterwards; the one exception is
/// [`relabel`](Identity::relabel), used by dispatch when handing the identity to a different
/// sign-in scheme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	scheme: String,
	claims: Vec<Claim>,
}
impl Identity {
	/// Creates an identity with no claims under the given scheme.
	pub fn new(scheme: impl Into<String>) -> Self {
		Self { scheme: scheme.into(), claims: Vec::new() }
	}

	/// Appends a claim, builder style.
	pub fn with_claim(mut self, claim: Claim) -> Self {
		self.claims.push(claim);

		self
	}

	/// Appends a claim.
	pub fn push(&mut self, claim: Claim) {
		self.claims.push(claim);
	}

	/// Scheme label the identity was issued under.
	pub fn scheme(&self) -> &str {
		&self.scheme
	}

	/// Claims in insertion order.
	pub fn claims(&self) -> &[Claim] {
		&self.claims
	}

	/// First claim value of the given kind, if any.
	pub fn find(&self, kind: &str) -> Option<&str> {
		self.claims.iter().find(|claim| claim.kind == kind).map(|claim| claim.value.as_str())
	}

	/// Same claims under a new scheme label.
	pub fn relabel(self, scheme: impl Into<String>) -> Self {
		Self { scheme: scheme.into(), claims: self.claims }
	}
}
impl Display for Identity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}({} claims)", self.scheme, self.claims.len())
	}
}
