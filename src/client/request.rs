//! Ephemeral request descriptors consumed by [`ApiClient::execute`](crate::client::ApiClient).

// self
use crate::{_prelude::*, error::ConfigError, http::Method};

/// Describes one API call; created per call and discarded after completion.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the configured base URL.
	pub path: String,
	/// Query string pairs.
	pub query: Vec<(String, String)>,
	/// JSON body; write methods send `{}` when absent.
	pub body: Option<Value>,
	/// Per-request deadline overriding the client default.
	pub timeout: Option<Duration>,
}
impl RequestDescriptor {
	/// Creates a descriptor for `method` + `path`.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), query: Vec::new(), body: None, timeout: None }
	}

	/// Shorthand for a `GET` descriptor.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` descriptor.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PUT` descriptor.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Shorthand for a `DELETE` descriptor.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Attaches a JSON body.
	pub fn with_json(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Serializes `body` and attaches it.
	pub fn with_body<B>(self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let value = serde_json::to_value(body).map_err(ConfigError::BodySerialize)?;

		Ok(self.with_json(value))
	}

	/// Appends a query pair.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Overrides the request deadline.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	pub(crate) fn encoded_body(&self) -> Result<Option<Vec<u8>>, ConfigError> {
		match (&self.body, self.method) {
			(Some(body), _) =>
				serde_json::to_vec(body).map(Some).map_err(ConfigError::BodySerialize),
			(None, Method::Post | Method::Put | Method::Patch) => Ok(Some(b"{}".to_vec())),
			(None, Method::Get | Method::Delete) => Ok(None),
		}
	}
}
