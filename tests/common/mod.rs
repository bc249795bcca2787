//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{sync::Arc, time::Duration};
// crates.io
#[cfg(feature = "reqwest")] use httpmock::MockServer;
use parking_lot::Mutex;
use serde_json::Value;
// self
use session_client::{
	client::ApiClient,
	config::ClientConfig,
	error::TransportError,
	ext::RecordedRedirects,
	http::{HttpTransport, TransportFuture, TransportRequest, TransportResponse},
	store::CredentialStore,
};

type Responder = dyn Fn(&TransportRequest) -> (Duration, TransportResponse) + Send + Sync;

/// Transport answering from a closure after a per-request delay.
pub struct ScriptedTransport {
	responder: Box<Responder>,
	requests: Mutex<Vec<TransportRequest>>,
}
impl ScriptedTransport {
	pub fn new<F>(responder: F) -> Arc<Self>
	where
		F: 'static + Fn(&TransportRequest) -> (Duration, TransportResponse) + Send + Sync,
	{
		Arc::new(Self { responder: Box::new(responder), requests: Mutex::new(Vec::new()) })
	}

	pub fn requests(&self) -> Vec<TransportRequest> {
		self.requests.lock().clone()
	}
}
impl HttpTransport for ScriptedTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		let (delay, response) = (self.responder)(&request);

		self.requests.lock().push(request);

		Box::pin(async move {
			tokio::time::sleep(delay).await;

			Ok::<_, TransportError>(response)
		})
	}
}

pub fn json_response(status: u16, body: Value) -> TransportResponse {
	TransportResponse::new(status, body.to_string().into_bytes())
}

pub fn request_json(request: &TransportRequest) -> Value {
	request
		.body
		.as_deref()
		.map(|body| serde_json::from_slice(body).expect("Request body should be JSON."))
		.unwrap_or(Value::Null)
}

pub fn scripted_client(transport: Arc<ScriptedTransport>, store: CredentialStore) -> ApiClient {
	ApiClient::with_transport(ClientConfig::default(), store, transport)
}

/// Builds a reqwest-backed client pointed at `server`, recording login redirects.
#[cfg(feature = "reqwest")]
pub fn mock_client(server: &MockServer, store: CredentialStore) -> (ApiClient, RecordedRedirects) {
	let config = ClientConfig::builder()
		.base_url(server.base_url())
		.build()
		.expect("Mock server URL should form a valid configuration.");
	let redirects = RecordedRedirects::default();
	let client = ApiClient::new(config, store)
		.expect("Failed to build reqwest-backed client for tests.")
		.with_redirect(Arc::new(redirects.clone()));

	(client, redirects)
}
