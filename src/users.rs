//! Profile management for the signed-in user.

// crates.io
use serde_json::Map;
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	envelope::Envelope,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	state::Status,
};

/// Password change request body.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
	current_password: String,
	new_password: String,
}
impl PasswordChange {
	/// Builds a change request from the current and the desired password.
	pub fn new(current_password: impl Into<String>, new_password: impl Into<String>) -> Self {
		Self { current_password: current_password.into(), new_password: new_password.into() }
	}
}
impl Debug for PasswordChange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PasswordChange(<redacted>)")
	}
}

/// Observable profile state.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserState {
	/// Profile returned by the backend.
	pub user: Option<Value>,
	/// Status of the latest operation.
	pub status: Status,
	/// Failure message of the latest operation.
	pub error: Option<String>,
	/// Server message of the latest successful operation.
	pub message: Option<String>,
}

/// Loads and edits the user profile.
#[derive(Debug)]
pub struct UserController {
	client: ApiClient,
	state: watch::Sender<UserState>,
}
impl UserController {
	/// Creates a controller with an empty profile.
	pub fn new(client: ApiClient) -> Self {
		let (state, _) = watch::channel(UserState::default());

		Self { client, state }
	}

	/// Returns a receiver notified on every state change.
	pub fn subscribe(&self) -> watch::Receiver<UserState> {
		self.state.subscribe()
	}

	/// Returns a copy of the current state.
	pub fn snapshot(&self) -> UserState {
		self.state.borrow().clone()
	}

	/// Returns the status to `Idle` and clears the error and message, keeping the profile.
	pub fn reset(&self) {
		self.state.send_modify(|state| {
			state.status = Status::Idle;
			state.error = None;
			state.message = None;
		});
	}

	/// Drops the profile and returns to the initial state.
	pub fn clear(&self) {
		self.state.send_replace(UserState::default());
	}

	/// Shallow-merges `patch` into the held profile.
	///
	/// Does nothing when no profile is held or when either side is not a JSON object.
	pub fn merge_local(&self, patch: &Map<String, Value>) {
		self.state.send_if_modified(|state| match state.user.as_mut() {
			Some(Value::Object(user)) => {
				user.extend(patch.iter().map(|(key, value)| (key.clone(), value.clone())));

				true
			},
			_ => false,
		});
	}

	/// Loads the profile.
	pub async fn get_profile(&self) -> Result<Option<Value>> {
		const OP: Operation = Operation::GetProfile;

		let path = self.client.config().endpoints.user_profile.clone();
		let result = self.run(OP, "get_profile", self.client.get(&path, &[])).await;

		match result {
			Ok(envelope) => {
				let message = envelope.message().map(str::to_owned);
				let user = user_of(envelope);

				self.state.send_modify(|state| {
					state.status = Status::Success;
					state.message = message;
					state.user = user.clone();
				});

				Ok(user)
			},
			Err(err) => {
				self.state.send_modify(|state| {
					state.status = Status::Error;
					state.error = Some(err.to_string());
					state.message = None;
				});

				Err(err)
			},
		}
	}

	/// Submits profile changes; the held profile is replaced only when the backend returns one.
	pub async fn update_profile<P>(&self, patch: &P) -> Result<Option<Value>>
	where
		P: ?Sized + Serialize,
	{
		const OP: Operation = Operation::UpdateProfile;

		let path = self.client.config().endpoints.user_profile.clone();
		let result = self.run(OP, "update_profile", self.client.put(&path, patch)).await;

		match result {
			Ok(envelope) => {
				let message = envelope.message().map(str::to_owned);
				let user = user_of(envelope);

				self.state.send_modify(|state| {
					state.status = Status::Success;
					state.message = message;

					if let Some(user) = user.clone() {
						state.user = Some(user);
					}
				});

				Ok(user)
			},
			Err(err) => {
				self.record_failure(&err);

				Err(err)
			},
		}
	}

	/// Changes the account password.
	pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
		const OP: Operation = Operation::ChangePassword;

		let path = self.client.config().endpoints.change_password.clone();
		let result = self.run(OP, "change_password", self.client.put(&path, change)).await;

		match result {
			Ok(envelope) => {
				let message = envelope.message().map(str::to_owned);

				self.state.send_modify(|state| {
					state.status = Status::Success;
					state.message = message;
				});

				Ok(())
			},
			Err(err) => {
				self.record_failure(&err);

				Err(err)
			},
		}
	}

	async fn run<Fut>(
		&self,
		operation: Operation,
		stage: &'static str,
		call: Fut,
	) -> Result<Envelope>
	where
		Fut: Future<Output = Result<Envelope>>,
	{
		let span = OperationSpan::new(operation, stage);

		obs::record_operation_outcome(operation, OperationOutcome::Attempt);

		self.state.send_modify(|state| {
			state.status = Status::Loading;
			state.error = None;
		});

		let result = span.in_span(call).await;

		match &result {
			Ok(_) => obs::record_operation_outcome(operation, OperationOutcome::Success),
			Err(err) => {
				obs::record_operation_outcome(operation, OperationOutcome::Failure);

				tracing::warn!(
					operation = operation.as_str(),
					error = %err,
					"Profile operation failed."
				);
			},
		}

		result
	}

	fn record_failure(&self, err: &Error) {
		self.state.send_modify(|state| {
			state.status = Status::Error;
			state.error = Some(err.to_string());
		});
	}
}

fn user_of(envelope: Envelope) -> Option<Value> {
	match envelope.into_data() {
		Value::Object(mut data) => data.remove("user").filter(|user| !user.is_null()),
		_ => None,
	}
}
