//! Storage contracts, the infallible [`CredentialStore`] facade, and built-in backends.
//!
//! Backends implement [`KeyValueStore`] and report faults as [`StoreError`]. The facade
//! serializes values with `serde_json`, logs every backend fault, and degrades to a
//! no-op (writes) or the caller's default (reads) so storage never fails a request.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Fixed storage keys shared with other clients of the same origin.
pub mod keys {
	/// Access token issued by login or refresh.
	pub const ACCESS_TOKEN: &str = "access_token";
	/// Refresh token issued by login (and rotated by refresh).
	pub const REFRESH_TOKEN: &str = "refresh_token";
	/// Cached profile of the signed-in user.
	pub const USER_PROFILE: &str = "user_profile";
	/// UI theme preference.
	pub const THEME: &str = "theme_preference";
}

/// Storage backend contract for serialized credential entries.
///
/// Keys are independent; implementations never need multi-key transactions.
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	/// Reads the raw serialized value stored under `key`.
	fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// Persists or replaces the serialized value stored under `key`.
	fn write(&self, key: &str, value: String) -> Result<(), StoreError>;

	/// Deletes the entry stored under `key`; missing keys are not an error.
	fn delete(&self, key: &str) -> Result<(), StoreError>;

	/// Reports whether an entry exists under `key`.
	fn contains(&self, key: &str) -> Result<bool, StoreError> {
		self.read(key).map(|value| value.is_some())
	}

	/// Removes every entry.
	fn clear(&self) -> Result<(), StoreError>;
}

/// Error type produced by [`KeyValueStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend or the facade.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure (quota, disabled storage, I/O).
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// UI theme preference persisted next to the credentials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
	/// Light palette.
	Light,
	/// Dark palette.
	Dark,
	/// Follow the operating system.
	#[default]
	System,
}

/// Infallible, JSON-serializing facade over a [`KeyValueStore`].
///
/// Cloning is cheap; every clone shares the same backend.
#[derive(Clone)]
pub struct CredentialStore(Arc<dyn KeyValueStore>);
impl CredentialStore {
	/// Wraps the provided backend.
	pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
		Self(backend)
	}

	/// Builds a store over a fresh [`MemoryStore`].
	pub fn in_memory() -> Self {
		Self::new(Arc::new(MemoryStore::default()))
	}

	/// Serializes `value` and stores it under `key`. Faults are logged and ignored.
	pub fn save<V>(&self, key: &str, value: &V)
	where
		V: ?Sized + Serialize,
	{
		let serialized = match serde_json::to_string(value) {
			Ok(serialized) => serialized,
			Err(e) => {
				let err = StoreError::Serialization { message: e.to_string() };

				tracing::warn!(key, error = %err, "Failed to save to credential store.");

				return;
			},
		};

		if let Err(err) = self.0.write(key, serialized) {
			tracing::warn!(key, error = %err, "Failed to save to credential store.");
		}
	}

	/// Reads and deserializes the value under `key`, falling back to `default` when the entry
	/// is missing, empty, unreadable, or of a different shape.
	pub fn get<V>(&self, key: &str, default: V) -> V
	where
		V: DeserializeOwned,
	{
		self.fetch(key).unwrap_or(default)
	}

	/// Reads and deserializes the value under `key`, returning `None` on any miss or fault.
	pub fn fetch<V>(&self, key: &str) -> Option<V>
	where
		V: DeserializeOwned,
	{
		let raw = match self.0.read(key) {
			Ok(raw) => raw?,
			Err(err) => {
				tracing::warn!(key, error = %err, "Failed to read from credential store.");

				return None;
			},
		};

		if raw.is_empty() {
			return None;
		}

		match serde_json::from_str(&raw) {
			Ok(value) => Some(value),
			Err(e) => {
				let err = StoreError::Serialization { message: e.to_string() };

				tracing::warn!(key, error = %err, "Failed to read from credential store.");

				None
			},
		}
	}

	/// Removes the entry under `key`. Faults are logged and ignored.
	pub fn remove(&self, key: &str) {
		if let Err(err) = self.0.delete(key) {
			tracing::warn!(key, error = %err, "Failed to remove from credential store.");
		}
	}

	/// Reports whether an entry exists under `key`; faults read as `false`.
	pub fn has(&self, key: &str) -> bool {
		self.0.contains(key).unwrap_or_else(|err| {
			tracing::warn!(key, error = %err, "Failed to check credential store.");

			false
		})
	}

	/// Removes every entry. Faults are logged and ignored.
	pub fn clear(&self) {
		if let Err(err) = self.0.clear() {
			tracing::warn!(error = %err, "Failed to clear credential store.");
		}
	}

	/// Returns the stored access token, treating an empty value as absent.
	pub fn access_token(&self) -> Option<TokenSecret> {
		self.fetch::<TokenSecret>(keys::ACCESS_TOKEN).filter(|secret| !secret.is_empty())
	}

	/// Returns the stored refresh token, treating an empty value as absent.
	pub fn refresh_token(&self) -> Option<TokenSecret> {
		self.fetch::<TokenSecret>(keys::REFRESH_TOKEN).filter(|secret| !secret.is_empty())
	}

	/// Persists the access token.
	pub fn set_access_token(&self, token: &TokenSecret) {
		self.save(keys::ACCESS_TOKEN, token);
	}

	/// Persists the refresh token.
	pub fn set_refresh_token(&self, token: &TokenSecret) {
		self.save(keys::REFRESH_TOKEN, token);
	}

	/// Removes both tokens, leaving the cached profile in place.
	pub fn clear_tokens(&self) {
		self.remove(keys::ACCESS_TOKEN);
		self.remove(keys::REFRESH_TOKEN);
	}

	/// Removes both tokens and the cached profile.
	pub fn clear_session(&self) {
		self.clear_tokens();
		self.remove(keys::USER_PROFILE);
	}

	/// Returns `true` when an access token is stored.
	pub fn is_authenticated(&self) -> bool {
		self.access_token().is_some()
	}

	/// Returns the cached user profile.
	pub fn profile(&self) -> Option<Value> {
		self.fetch(keys::USER_PROFILE)
	}

	/// Caches the user profile.
	pub fn set_profile(&self, profile: &Value) {
		self.save(keys::USER_PROFILE, profile);
	}

	/// Returns the theme preference, defaulting to [`Theme::System`].
	pub fn theme(&self) -> Theme {
		self.get(keys::THEME, Theme::default())
	}

	/// Persists the theme preference.
	pub fn set_theme(&self, theme: Theme) {
		self.save(keys::THEME, &theme);
	}
}
impl Debug for CredentialStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CredentialStore(..)")
	}
}
impl Default for CredentialStore {
	fn default() -> Self {
		Self::in_memory()
	}
}
