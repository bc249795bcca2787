//! Session lifecycle controller: login, logout, token refresh, and current-user lookup.
//!
//! [`SessionController`] owns the only [`SessionState`] of a session and publishes every
//! transition on a [`watch`] channel. Each operation moves the status through
//! `Loading` and then `Success` or `Error`; overlapping invocations are not fenced, so the
//! last one to resolve determines the final state.

// crates.io
use serde_json::json;
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	auth::{AuthPayload, LoginCredentials},
	client::{ApiClient, RequestDescriptor},
	envelope::{Envelope, decode_value},
	obs::{self, Operation, OperationOutcome, OperationSpan},
	state::Status,
};

/// Observable authentication state.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionState {
	/// Whether the client currently holds credentials.
	pub is_authenticated: bool,
	/// Signed-in user, once known.
	pub user: Option<Value>,
	/// Status of the latest operation.
	pub status: Status,
	/// Failure message of the latest operation.
	pub error: Option<String>,
	/// Server message of the latest successful operation.
	pub message: Option<String>,
	/// Operation `status` refers to.
	pub operation: Option<Operation>,
}

/// Drives the authentication lifecycle against the backend.
#[derive(Debug)]
pub struct SessionController {
	client: ApiClient,
	state: watch::Sender<SessionState>,
}
impl SessionController {
	/// Creates a controller; `is_authenticated` starts from whether an access token is stored.
	pub fn new(client: ApiClient) -> Self {
		let initial = SessionState {
			is_authenticated: client.store().is_authenticated(),
			..Default::default()
		};
		let (state, _) = watch::channel(initial);

		Self { client, state }
	}

	/// Client used for every request.
	pub fn client(&self) -> &ApiClient {
		&self.client
	}

	/// Returns a receiver notified on every state change.
	pub fn subscribe(&self) -> watch::Receiver<SessionState> {
		self.state.subscribe()
	}

	/// Returns a copy of the current state.
	pub fn snapshot(&self) -> SessionState {
		self.state.borrow().clone()
	}

	/// Returns the status to `Idle` and clears the error and message.
	pub fn reset(&self) {
		self.state.send_modify(|state| {
			state.status = Status::Idle;
			state.error = None;
			state.message = None;
			state.operation = None;
		});
	}

	/// Clears the error message only.
	pub fn clear_error(&self) {
		self.state.send_modify(|state| state.error = None);
	}

	/// Overrides the authenticated flag.
	pub fn set_authenticated(&self, authenticated: bool) {
		self.state.send_modify(|state| state.is_authenticated = authenticated);
	}

	/// Exchanges credentials for tokens and the user profile.
	///
	/// Issued tokens are persisted and the user is cached. On failure the controller leaves
	/// the stored tokens alone and drops the in-memory user.
	pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload> {
		const OP: Operation = Operation::Login;

		let span = OperationSpan::new(OP, "login");

		self.begin(OP);

		let result = span
			.in_span(async {
				let path = &self.client.config().endpoints.login;
				let envelope = self.client.post(path, credentials).await?;

				auth_payload(envelope)
			})
			.await;

		match result {
			Ok((payload, message)) => {
				let store = self.client.store();

				if let Some(token) = payload.issued_access_token() {
					store.set_access_token(token);
				}
				if let Some(token) = payload.issued_refresh_token() {
					store.set_refresh_token(token);
				}
				if let Some(user) = &payload.user {
					store.set_profile(user);
				}

				self.succeed(OP, |state| {
					state.is_authenticated = true;
					state.user = payload.user.clone();
					state.message = message;
				});

				Ok(payload)
			},
			Err(err) => {
				self.fail(OP, &err, |state| {
					state.is_authenticated = false;
					state.user = None;
				});

				Err(err)
			},
		}
	}

	/// Ends the remote session and always removes the local credentials.
	///
	/// The access token, refresh token, and cached profile are removed whether or not the
	/// backend call succeeds; the returned error only reports the remote outcome.
	pub async fn logout(&self) -> Result<()> {
		const OP: Operation = Operation::Logout;

		let span = OperationSpan::new(OP, "logout");

		self.begin(OP);

		let path = self.client.config().endpoints.logout.clone();
		let result = span.in_span(self.client.execute(RequestDescriptor::post(path))).await;

		self.client.store().clear_session();

		match result {
			Ok(envelope) => {
				let message = envelope.message().unwrap_or("Logged out successfully.").to_owned();

				self.succeed(OP, |state| {
					state.is_authenticated = false;
					state.user = None;
					state.message = Some(message);
				});

				Ok(())
			},
			Err(err) => {
				self.fail(OP, &err, |state| {
					state.is_authenticated = false;
					state.user = None;
				});

				Err(err)
			},
		}
	}

	/// Exchanges the stored refresh token for a new access token.
	///
	/// A rotated refresh token is persisted when the backend returns one. On failure both
	/// tokens are removed and the session is marked unauthenticated.
	pub async fn refresh(&self) -> Result<AuthPayload> {
		const OP: Operation = Operation::Refresh;

		let span = OperationSpan::new(OP, "refresh");

		self.begin(OP);

		let body = match self.client.store().refresh_token() {
			Some(token) => json!({ "refreshToken": token.expose() }),
			None => json!({}),
		};
		let result = span
			.in_span(async {
				let path = &self.client.config().endpoints.refresh;
				let envelope = self.client.post(path, &body).await?;

				auth_payload(envelope)
			})
			.await;

		match result {
			Ok((payload, message)) => {
				let store = self.client.store();

				if let Some(token) = payload.issued_access_token() {
					store.set_access_token(token);
				}
				if let Some(token) = payload.issued_refresh_token() {
					store.set_refresh_token(token);
				}

				self.succeed(OP, |state| {
					state.is_authenticated = true;
					state.message = message;
				});

				Ok(payload)
			},
			Err(err) => {
				self.client.store().clear_tokens();
				self.fail(OP, &err, |state| {
					state.is_authenticated = false;
					state.user = None;
				});

				Err(err)
			},
		}
	}

	/// Loads the signed-in user.
	///
	/// Returns `Ok(None)` without a request when no access token is stored, and the held user
	/// without a request when one is already known. A failed lookup records the error and
	/// then logs out.
	pub async fn fetch_current_user(&self) -> Result<Option<Value>> {
		const OP: Operation = Operation::FetchCurrentUser;

		if self.client.store().access_token().is_none() {
			tracing::debug!("No access token stored; skipping current user lookup.");

			return Ok(None);
		}
		if let Some(user) = self.state.borrow().user.clone() {
			return Ok(Some(user));
		}

		let span = OperationSpan::new(OP, "fetch_current_user");

		self.begin(OP);

		let path = self.client.config().endpoints.current_profile.clone();
		let result = span
			.in_span(async {
				let envelope = self.client.get(&path, &[]).await?;

				auth_payload(envelope)
			})
			.await;

		match result {
			Ok((payload, _)) => {
				if let Some(user) = &payload.user {
					self.client.store().set_profile(user);
				}

				self.succeed(OP, |state| {
					state.is_authenticated = true;
					state.user = payload.user.clone();
				});

				Ok(payload.user)
			},
			Err(err) => {
				self.fail(OP, &err, |_| ());

				if let Err(logout_err) = self.logout().await {
					tracing::warn!(error = %logout_err, "Logout after failed lookup also failed.");
				}

				Err(err)
			},
		}
	}

	fn begin(&self, operation: Operation) {
		obs::record_operation_outcome(operation, OperationOutcome::Attempt);

		self.state.send_modify(|state| {
			state.status = Status::Loading;
			state.error = None;
			state.operation = Some(operation);
		});
	}

	fn succeed<F>(&self, operation: Operation, apply: F)
	where
		F: FnOnce(&mut SessionState),
	{
		obs::record_operation_outcome(operation, OperationOutcome::Success);

		self.state.send_modify(|state| {
			apply(state);

			state.status = Status::Success;
			state.error = None;
			state.operation = Some(operation);
		});
	}

	fn fail<F>(&self, operation: Operation, err: &Error, apply: F)
	where
		F: FnOnce(&mut SessionState),
	{
		obs::record_operation_outcome(operation, OperationOutcome::Failure);

		tracing::warn!(operation = operation.as_str(), error = %err, "Session operation failed.");

		self.state.send_modify(|state| {
			apply(state);

			state.status = Status::Error;
			state.error = Some(err.to_string());
			state.operation = Some(operation);
		});
	}
}

fn auth_payload(envelope: Envelope) -> Result<(AuthPayload, Option<String>)> {
	let message = envelope.message().map(str::to_owned);
	let payload = match envelope.into_data() {
		Value::Null => AuthPayload::default(),
		data => decode_value(data, None)?,
	};

	Ok((payload, message))
}
