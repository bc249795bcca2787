//! Request executor: header construction, bearer injection, deadline enforcement, envelope
//! validation, and failure normalization.
//!
//! [`ApiClient::execute`] is the single place where transport, status, and envelope failures
//! are classified. Auth failures clear the stored tokens and trigger the
//! [`LoginRedirect`] hook before surfacing as [`Error::SessionExpired`].

pub mod request;

pub use request::*;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	envelope::Envelope,
	error::{ConfigError, TransportError},
	ext::{AssumeOnline, ConnectivityProbe, LogRedirect, LoginRedirect},
	http::{HttpTransport, TransportRequest, TransportResponse},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Session-aware JSON API client.
///
/// Cloning is cheap; clones share the transport, store, and host hooks.
#[derive(Clone)]
pub struct ApiClient {
	config: Arc<ClientConfig>,
	store: CredentialStore,
	transport: Arc<dyn HttpTransport>,
	connectivity: Arc<dyn ConnectivityProbe>,
	redirect: Arc<dyn LoginRedirect>,
}
impl ApiClient {
	/// Creates a client backed by the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(config: ClientConfig, store: CredentialStore) -> Result<Self> {
		let transport = ReqwestTransport::build()?;

		Ok(Self::with_transport(config, store, Arc::new(transport)))
	}

	/// Creates a client that sends requests through the caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: CredentialStore,
		transport: Arc<dyn HttpTransport>,
	) -> Self {
		Self {
			config: Arc::new(config),
			store,
			transport,
			connectivity: Arc::new(AssumeOnline),
			redirect: Arc::new(LogRedirect),
		}
	}

	/// Replaces the connectivity probe consulted when a request fails.
	pub fn with_connectivity(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
		self.connectivity = probe;

		self
	}

	/// Replaces the hook invoked when the session expires.
	pub fn with_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
		self.redirect = redirect;

		self
	}

	/// Active configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Credential store shared with the controllers.
	pub fn store(&self) -> &CredentialStore {
		&self.store
	}

	/// Executes `descriptor` and returns the validated envelope.
	///
	/// Every failure is normalized: offline or unreachable hosts become [`Error::Network`],
	/// an elapsed deadline becomes [`Error::Timeout`], and auth rejections clear both tokens,
	/// redirect to the login route, and become [`Error::SessionExpired`].
	pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<Envelope> {
		let method = descriptor.method;
		let path = descriptor.path.clone();
		let result = self.dispatch(descriptor).await;

		result.map_err(|err| {
			let err = self.normalize(err);

			tracing::debug!(%method, path = %path, error = %err, "API request failed.");

			err
		})
	}

	/// Sends a `GET` request with optional query pairs.
	pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Envelope> {
		let descriptor = query
			.iter()
			.fold(RequestDescriptor::get(path), |descriptor, (key, value)| {
				descriptor.with_query(*key, *value)
			});

		self.execute(descriptor).await
	}

	/// Sends a `POST` request carrying `body` as JSON.
	pub async fn post<B>(&self, path: &str, body: &B) -> Result<Envelope>
	where
		B: ?Sized + Serialize,
	{
		self.execute(RequestDescriptor::post(path).with_body(body)?).await
	}

	/// Sends a `PUT` request carrying `body` as JSON.
	pub async fn put<B>(&self, path: &str, body: &B) -> Result<Envelope>
	where
		B: ?Sized + Serialize,
	{
		self.execute(RequestDescriptor::put(path).with_body(body)?).await
	}

	/// Sends a `DELETE` request.
	pub async fn delete(&self, path: &str) -> Result<Envelope> {
		self.execute(RequestDescriptor::delete(path)).await
	}

	async fn dispatch(&self, descriptor: RequestDescriptor) -> Result<Envelope> {
		let timeout = descriptor.timeout.unwrap_or(self.config.timeout);
		let request = self.build_request(&descriptor)?;

		tracing::debug!(method = %request.method, url = %request.url, "Sending API request.");

		let response = tokio::time::timeout(timeout, self.transport.send(request))
			.await
			.map_err(|_| Error::Timeout { timeout })??;

		self.validate(response)
	}

	fn build_request(
		&self,
		descriptor: &RequestDescriptor,
	) -> Result<TransportRequest, ConfigError> {
		let url = self.config.url_for(&descriptor.path, &descriptor.query)?;
		let mut headers = vec![
			("Content-Type".to_owned(), JSON_CONTENT_TYPE.to_owned()),
			("Accept".to_owned(), JSON_CONTENT_TYPE.to_owned()),
		];

		if let Some(token) = self.store.access_token() {
			if !is_header_safe(token.expose()) {
				return Err(ConfigError::InvalidTokenHeader);
			}

			headers.push(("Authorization".to_owned(), token.bearer()));
		}

		let body = descriptor.encoded_body()?;

		Ok(TransportRequest { method: descriptor.method, url, headers, body })
	}

	fn validate(&self, response: TransportResponse) -> Result<Envelope> {
		if !response.is_success() {
			let reason = response.reason.clone().unwrap_or_else(|| "Unknown Status".into());

			return Err(Error::Http { status: response.status, reason });
		}

		let envelope = Envelope::parse(&response.body, Some(response.status))?;

		if let Some(code) = envelope.failure_code(self.config.success_code) {
			let message = envelope.message().unwrap_or("Request failed").to_owned();

			return Err(Error::Api { code, message });
		}

		Ok(envelope)
	}

	fn normalize(&self, err: Error) -> Error {
		if !self.connectivity.is_online() {
			return Error::Network;
		}

		match err {
			Error::Transport(TransportError::Connect { .. }) => Error::Network,
			err if is_auth_failure(&err) => {
				self.expire_session();

				Error::SessionExpired
			},
			err => err,
		}
	}

	fn expire_session(&self) {
		self.store.clear_tokens();

		tracing::warn!(route = %self.config.login_route, "Credentials rejected; tokens cleared.");

		self.redirect.redirect_to_login(&self.config.login_route);
	}
}
impl Debug for ApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("timeout", &self.config.timeout)
			.finish_non_exhaustive()
	}
}

fn is_auth_failure(err: &Error) -> bool {
	match err {
		Error::Http { status: 401, .. } => true,
		Error::Api { message, .. } => message.to_ascii_lowercase().contains("unauthorized"),
		_ => false,
	}
}

fn is_header_safe(value: &str) -> bool {
	value.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b))
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{auth::TokenSecret, ext::RecordedRedirects, http::TransportFuture, store::keys};

	struct StaticTransport {
		status: u16,
		body: &'static str,
		calls: AtomicUsize,
		seen: RwLock<Vec<TransportRequest>>,
	}
	impl StaticTransport {
		fn new(status: u16, body: &'static str) -> Arc<Self> {
			Arc::new(Self { status, body, calls: AtomicUsize::new(0), seen: RwLock::new(Vec::new()) })
		}
	}
	impl HttpTransport for StaticTransport {
		fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.seen.write().push(request);

			let response = TransportResponse::new(self.status, self.body.as_bytes().to_vec());

			Box::pin(async move { Ok(response) })
		}
	}

	struct PendingTransport;
	impl HttpTransport for PendingTransport {
		fn send(&self, _request: TransportRequest) -> TransportFuture<'_> {
			Box::pin(std::future::pending::<Result<TransportResponse, TransportError>>())
		}
	}

	struct SlowTransport {
		delay: Duration,
		dropped: Arc<AtomicBool>,
		completed: Arc<AtomicBool>,
	}
	impl HttpTransport for SlowTransport {
		fn send(&self, _request: TransportRequest) -> TransportFuture<'_> {
			let delay = self.delay;
			let guard = DropFlag(self.dropped.clone());
			let completed = self.completed.clone();

			Box::pin(async move {
				let _guard = guard;

				tokio::time::sleep(delay).await;
				completed.store(true, Ordering::SeqCst);

				Ok(TransportResponse::new(200, b"[]".to_vec()))
			})
		}
	}

	struct DropFlag(Arc<AtomicBool>);
	impl Drop for DropFlag {
		fn drop(&mut self) {
			self.0.store(true, Ordering::SeqCst);
		}
	}

	struct RefusedTransport;
	impl HttpTransport for RefusedTransport {
		fn send(&self, _request: TransportRequest) -> TransportFuture<'_> {
			let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");

			Box::pin(async move { Err(TransportError::connect(io)) })
		}
	}

	fn client(transport: Arc<dyn HttpTransport>) -> ApiClient {
		ApiClient::with_transport(ClientConfig::default(), CredentialStore::in_memory(), transport)
	}

	#[tokio::test]
	async fn bearer_header_follows_stored_token() {
		let transport = StaticTransport::new(200, r#"{"code":1000,"data":{}}"#);
		let client = client(transport.clone());

		client.get("/auth/profile", &[]).await.expect("Anonymous request should succeed.");
		client.store().set_access_token(&TokenSecret::new("T"));
		client.get("/auth/profile", &[]).await.expect("Authenticated request should succeed.");

		let seen = transport.seen.read();

		assert_eq!(seen[0].header("authorization"), None);
		assert_eq!(seen[0].header("content-type"), Some("application/json"));
		assert_eq!(seen[1].header("authorization"), Some("Bearer T"));
	}

	#[tokio::test]
	async fn failing_code_becomes_api_error() {
		let client = client(StaticTransport::new(200, r#"{"code":1001,"message":"bad"}"#));
		let err = client.get("/posts", &[]).await.expect_err("Code 1001 should fail.");

		assert!(matches!(err, Error::Api { code: 1001, ref message } if message == "bad"));
	}

	#[tokio::test]
	async fn unauthorized_message_expires_session() {
		let redirects = RecordedRedirects::default();
		let client = client(StaticTransport::new(200, r#"{"code":1002,"message":"Unauthorized"}"#))
			.with_redirect(Arc::new(redirects.clone()));

		client.store().set_access_token(&TokenSecret::new("A"));
		client.store().set_refresh_token(&TokenSecret::new("R"));

		let err = client.get("/users/profile", &[]).await.expect_err("Request should fail.");

		assert!(err.is_session_expired());
		assert!(!client.store().has(keys::ACCESS_TOKEN));
		assert!(!client.store().has(keys::REFRESH_TOKEN));
		assert_eq!(redirects.routes(), vec!["/login".to_string()]);
	}

	#[tokio::test]
	async fn failing_code_without_unauthorized_message_keeps_session() {
		let redirects = RecordedRedirects::default();
		let client = client(StaticTransport::new(200, r#"{"code":1002,"message":"Token invalid"}"#))
			.with_redirect(Arc::new(redirects.clone()));

		client.store().set_access_token(&TokenSecret::new("A"));
		client.store().set_refresh_token(&TokenSecret::new("R"));

		let err = client.get("/users/profile", &[]).await.expect_err("Code 1002 should fail.");

		assert!(matches!(err, Error::Api { code: 1002, ref message } if message == "Token invalid"));
		assert!(client.store().has(keys::ACCESS_TOKEN));
		assert!(client.store().has(keys::REFRESH_TOKEN));
		assert!(redirects.routes().is_empty());
	}

	#[tokio::test]
	async fn unauthorized_message_is_case_insensitive() {
		let client = client(StaticTransport::new(200, r#"{"code":1003,"message":"UnAuthorized user"}"#));
		let err = client.get("/users/profile", &[]).await.expect_err("Request should fail.");

		assert!(err.is_session_expired());
	}

	#[tokio::test]
	async fn other_statuses_keep_their_reason() {
		let client = client(StaticTransport::new(404, ""));
		let err = client.delete("/posts/1").await.expect_err("404 should fail.");

		assert!(matches!(err, Error::Http { status: 404, .. }));
	}

	#[tokio::test]
	async fn deadline_produces_timeout() {
		let client = client(Arc::new(PendingTransport));
		let err = client
			.execute(RequestDescriptor::get("/posts").with_timeout(Duration::from_millis(20)))
			.await
			.expect_err("Pending request should time out.");

		assert!(matches!(err, Error::Timeout { timeout } if timeout == Duration::from_millis(20)));
	}

	#[tokio::test]
	async fn deadline_drops_the_pending_call() {
		let dropped = Arc::new(AtomicBool::new(false));
		let completed = Arc::new(AtomicBool::new(false));
		let client = client(Arc::new(SlowTransport {
			delay: Duration::from_millis(200),
			dropped: dropped.clone(),
			completed: completed.clone(),
		}));
		let err = client
			.execute(RequestDescriptor::get("/posts").with_timeout(Duration::from_millis(20)))
			.await
			.expect_err("Slow request should time out.");

		assert!(matches!(err, Error::Timeout { .. }));
		assert!(dropped.load(Ordering::SeqCst));

		tokio::time::sleep(Duration::from_millis(400)).await;

		assert!(!completed.load(Ordering::SeqCst));
	}

	#[tokio::test]
	async fn refused_connection_is_network_error() {
		let client = client(Arc::new(RefusedTransport));
		let err = client.post("/auth/logout", &json!({})).await.expect_err("Refused should fail.");

		assert!(matches!(err, Error::Network));
	}

	#[tokio::test]
	async fn control_characters_in_token_are_rejected_before_sending() {
		let transport = StaticTransport::new(200, "[]");
		let client = client(transport.clone());

		client.store().set_access_token(&TokenSecret::new("bad\ntoken"));

		let err = client.get("/posts", &[]).await.expect_err("Invalid token should fail.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidTokenHeader)));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
	}
}
