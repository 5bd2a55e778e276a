//! Hosting-pipeline request primitives consumed by the relay.

// crates.io
use url::form_urlencoded;

/// Immutable snapshot of the inbound request, captured by the hosting pipeline.
///
/// The relay never touches the host's request type directly; hosts build a snapshot from
/// whatever primitives their pipeline carries. `path_base` is the mount prefix for hosts that
/// nest the application below the root, and `query` is the raw query string without the
/// leading `?`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestSnapshot {
	/// URI scheme, e.g. `https`.
	pub scheme: String,
	/// Host (and port, when non-default).
	pub host: String,
	/// Base path the application is mounted under, empty at the root.
	pub path_base: String,
	/// Request path within the base path.
	pub path: String,
	/// Raw query string without the leading `?`.
	pub query: String,
}
impl RequestSnapshot {
	/// Creates a snapshot for a request at the application root.
	pub fn new(
		scheme: impl Into<String>,
		host: impl Into<String>,
		path: impl Into<String>,
	) -> Self {
		Self {
			scheme: scheme.into(),
			host: host.into(),
			path_base: String::new(),
			path: path.into(),
			query: String::new(),
		}
	}

	/// Sets the mount prefix.
	pub fn with_path_base(mut self, path_base: impl Into<String>) -> Self {
		self.path_base = path_base.into();

		self
	}

	/// Sets the query string; a leading `?` is tolerated and stripped.
	pub fn with_query(mut self, query: impl Into<String>) -> Self {
		let query = query.into();

		self.query = match query.strip_prefix('?') {
			Some(stripped) => stripped.to_owned(),
			None => query,
		};

		self
	}

	/// Absolute URL prefix of the application: scheme, host, and base path.
	pub fn base_url(&self) -> String {
		format!("{}://{}{}", self.scheme, self.host, self.path_base)
	}

	/// Absolute URL of the current request, including the query string.
	pub fn current_url(&self) -> String {
		let mut url = self.base_url();

		url.push_str(&self.path);

		if !self.query.is_empty() {
			url.push('?');
			url.push_str(&self.query);
		}

		url
	}

	/// Absolute URL of the configured callback path, ignoring the current path and query.
	pub fn callback_url(&self, callback_path: &str) -> String {
		let mut url = self.base_url();

		url.push_str(callback_path);

		url
	}

	/// Decoded value of a query parameter that occurs exactly once.
	///
	/// Zero occurrences and two or more occurrences both yield `None`: ambiguous input is
	/// rejected, not guessed.
	pub fn unique_query_value(&self, name: &str) -> Option<String> {
		let mut found = None;

		for (key, value) in form_urlencoded::parse(self.query.as_bytes()) {
			if key == name {
				if found.is_some() {
					return None;
				}

				found = Some(value.into_owned());
			}
		}

		found
	}
}
