//! Client-level error types shared across the executor, controllers, and stores.
//!
//! [`ApiClient::execute`](crate::client::ApiClient::execute) is the only place transport
//! failures are classified; controllers surface these variants unchanged.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// No network connectivity was available for the request.
	#[error("No network connection is available.")]
	Network,
	/// The request did not complete before its deadline.
	#[error("Request timed out after {} ms.", timeout.as_millis())]
	Timeout {
		/// Deadline that elapsed.
		timeout: Duration,
	},
	/// The backend rejected the credentials; local tokens were cleared.
	#[error("Session has expired. Please sign in again.")]
	SessionExpired,
	/// The backend answered with a non-2xx status.
	#[error("HTTP {status}: {reason}.")]
	Http {
		/// HTTP status code.
		status: u16,
		/// Canonical reason phrase for the status.
		reason: String,
	},
	/// The backend answered 2xx but the envelope code signals a logical failure.
	#[error("{message}")]
	Api {
		/// Application code returned by the backend.
		code: i64,
		/// Server-provided message.
		message: String,
	},
	/// Response body could not be decoded into the expected shape.
	#[error("Response body could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response, when one was received.
		status: Option<u16>,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure other than connectivity loss.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// Returns the HTTP status associated with the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http { status, .. } => Some(*status),
			Self::Decode { status, .. } => *status,
			_ => None,
		}
	}

	/// Returns `true` when the failure invalidated the local session.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired)
	}

	pub(crate) fn decode(
		source: serde_path_to_error::Error<serde_json::Error>,
		status: Option<u16>,
	) -> Self {
		Self::Decode { source, status }
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Raw value that failed to parse.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL must be an absolute `http` or `https` URL.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending URL.
		url: String,
	},
	/// Timeout value is zero or unparsable.
	#[error("Timeout `{value}` must be a positive number of milliseconds.")]
	InvalidTimeout {
		/// Raw value supplied.
		value: String,
	},
	/// Request path cannot be appended to the base URL.
	#[error("Request path `{path}` does not form a valid URL.")]
	InvalidPath {
		/// Path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body failed to serialize.
	#[error("Request body could not be serialized.")]
	BodySerialize(#[source] serde_json::Error),
	/// Access token contains bytes that are not valid in an HTTP header.
	#[error("Stored access token is not a valid header value.")]
	InvalidTokenHeader,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The connection could not be established (DNS, refused, unreachable).
	#[error("Connection to the API server could not be established.")]
	Connect {
		/// Transport-specific connect error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported any other network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific connect error.
	pub fn connect(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Connect { source: Box::new(src) }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns `true` when the failure indicates lost connectivity.
	pub fn is_connect(&self) -> bool {
		matches!(self, Self::Connect { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_connect() { Self::connect(e) } else { Self::network(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn taxonomy_messages_surface_context() {
		let http = Error::Http { status: 404, reason: "Not Found".into() };
		let api = Error::Api { code: 1001, message: "bad".into() };
		let timeout = Error::Timeout { timeout: Duration::from_millis(10_000) };

		assert_eq!(http.to_string(), "HTTP 404: Not Found.");
		assert_eq!(http.status(), Some(404));
		assert_eq!(api.to_string(), "bad");
		assert_eq!(api.status(), None);
		assert_eq!(timeout.to_string(), "Request timed out after 10000 ms.");
		assert!(Error::SessionExpired.is_session_expired());
		assert!(!Error::Network.is_session_expired());
	}

	#[test]
	fn transport_error_keeps_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err: Error = TransportError::connect(io).into();
		let source =
			StdError::source(&err).expect("Transport error should expose its underlying source.");

		assert!(matches!(&err, Error::Transport(inner) if inner.is_connect()));
		assert_eq!(source.to_string(), "refused");
	}
}
