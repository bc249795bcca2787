//! Login input and the token-bearing payloads returned by the auth endpoints.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Email/password pair submitted to the login endpoint.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
	/// Account email address.
	pub email: String,
	password: String,
}
impl LoginCredentials {
	/// Builds a credential pair.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for LoginCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginCredentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// `data` object returned by the login, refresh, and profile endpoints.
///
/// Every field is optional: refresh omits the user, profile omits the tokens.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
	/// Authenticated user object.
	#[serde(default)]
	pub user: Option<Value>,
	/// Newly issued access token.
	#[serde(default)]
	pub access_token: Option<TokenSecret>,
	/// Newly issued (or rotated) refresh token.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
}
impl AuthPayload {
	/// Returns the access token when the backend issued a non-empty one.
	pub fn issued_access_token(&self) -> Option<&TokenSecret> {
		self.access_token.as_ref().filter(|secret| !secret.is_empty())
	}

	/// Returns the refresh token when the backend issued a non-empty one.
	pub fn issued_refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref().filter(|secret| !secret.is_empty())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credentials_debug_hides_password() {
		let credentials = LoginCredentials::new("a@example.com", "hunter2");
		let rendered = format!("{credentials:?}");

		assert!(rendered.contains("a@example.com"));
		assert!(!rendered.contains("hunter2"));

		let body = serde_json::to_value(&credentials).expect("Credentials should serialize.");

		assert_eq!(body, serde_json::json!({ "email": "a@example.com", "password": "hunter2" }));
	}

	#[test]
	fn payload_ignores_empty_tokens() {
		let payload: AuthPayload = serde_json::from_value(serde_json::json!({
			"user": { "id": 1 },
			"accessToken": "",
			"refreshToken": "R"
		}))
		.expect("Auth payload should deserialize.");

		assert!(payload.issued_access_token().is_none());
		assert_eq!(payload.issued_refresh_token().map(TokenSecret::expose), Some("R"));
		assert_eq!(payload.user, Some(serde_json::json!({ "id": 1 })));
	}
}
