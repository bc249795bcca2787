//! Transport primitives for API requests.
//!
//! [`HttpTransport`] is the client's only dependency on an HTTP stack. The executor builds a
//! fully resolved [`TransportRequest`] (URL, headers, body), hands it to the transport, and
//! receives the raw [`TransportResponse`]; status and envelope interpretation stay in
//! [`ApiClient`](crate::client::ApiClient). Dropping the returned future must abort the
//! in-flight call so the executor's deadline can cancel it.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a single request.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves once the full response body is available.
	fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// HTTP methods used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fully resolved request handed to a transport.
#[derive(Clone)]
pub struct TransportRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Header name/value pairs, in insertion order.
	pub headers: Vec<(String, String)>,
	/// Serialized JSON body.
	pub body: Option<Vec<u8>>,
}
impl TransportRequest {
	/// Returns the first header value matching `name`, ignoring ASCII case.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
impl Debug for TransportRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let headers = self
			.headers
			.iter()
			.map(|(key, value)| {
				if key.eq_ignore_ascii_case("authorization") {
					(key.as_str(), "<redacted>")
				} else {
					(key.as_str(), value.as_str())
				}
			})
			.collect::<Vec<_>>();

		f.debug_struct("TransportRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &headers)
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Raw response returned by a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Canonical reason phrase, when the transport knows one.
	pub reason: Option<String>,
	/// Full response body.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Builds a response from a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, reason: None, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The executor owns the deadline, so the wrapped client needs no timeout of its own.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a transport over a freshly configured reqwest client.
	pub fn build() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		Box::pin(send_with_reqwest(self.0.clone(), request))
	}
}

#[cfg(feature = "reqwest")]
async fn send_with_reqwest(
	client: ReqwestClient,
	request: TransportRequest,
) -> Result<TransportResponse, TransportError> {
	let method = match request.method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Patch => reqwest::Method::PATCH,
		Method::Delete => reqwest::Method::DELETE,
	};
	let mut builder = client.request(method, request.url);

	for (name, value) in request.headers {
		builder = builder.header(name, value);
	}
	if let Some(body) = request.body {
		builder = builder.body(body);
	}

	let response = builder.send().await?;
	let status = response.status();
	let body = response.bytes().await?.to_vec();

	Ok(TransportResponse {
		status: status.as_u16(),
		reason: status.canonical_reason().map(str::to_owned),
		body,
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_debug_redacts_authorization() {
		let request = TransportRequest {
			method: Method::Get,
			url: Url::parse("http://localhost:8080/auth/profile")
				.expect("Failed to parse fixture URL."),
			headers: vec![
				("Content-Type".into(), "application/json".into()),
				("Authorization".into(), "Bearer T".into()),
			],
			body: None,
		};
		let rendered = format!("{request:?}");

		assert!(!rendered.contains("Bearer T"));
		assert!(rendered.contains("<redacted>"));
		assert_eq!(request.header("authorization"), Some("Bearer T"));
		assert_eq!(request.header("x-missing"), None);
	}

	#[test]
	fn success_range_is_2xx() {
		assert!(TransportResponse::new(204, Vec::new()).is_success());
		assert!(!TransportResponse::new(302, Vec::new()).is_success());
		assert!(!TransportResponse::new(401, Vec::new()).is_success());
	}
}
