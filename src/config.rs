//! Client configuration: base URL, request deadline, envelope success code, and endpoint paths.

// self
use crate::{_prelude::*, error::ConfigError};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Request deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Envelope code the backend uses to signal success.
pub const SUCCESS_CODE: i64 = 1000;
/// Client route that hosts the login entry point.
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";
/// Environment variable holding the base URL.
pub const BASE_URL_ENV: &str = "API_BASE_URL";
/// Environment variable holding the request deadline in milliseconds.
pub const TIMEOUT_ENV: &str = "API_TIMEOUT_MS";

/// Paths of the backend endpoints, relative to the base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
	/// `POST` credentials, receive tokens and user.
	pub login: String,
	/// `POST` to end the remote session.
	pub logout: String,
	/// `POST` to exchange for a new access token.
	pub refresh: String,
	/// `GET` the signed-in user.
	pub current_profile: String,
	/// `GET`/`PUT` the editable user profile.
	pub user_profile: String,
	/// `PUT` a password change.
	pub change_password: String,
	/// `GET` the post list.
	pub posts: String,
	/// `GET` the product list.
	pub products: String,
}
impl Default for Endpoints {
	fn default() -> Self {
		Self {
			login: "/auth/login".into(),
			logout: "/auth/logout".into(),
			refresh: "/auth/refresh".into(),
			current_profile: "/auth/profile".into(),
			user_profile: "/users/profile".into(),
			change_password: "/users/change-password".into(),
			posts: "/posts".into(),
			products: "/products".into(),
		}
	}
}

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Absolute `http`/`https` URL every path is appended to.
	pub base_url: Url,
	/// Default request deadline.
	pub timeout: Duration,
	/// Envelope code treated as success.
	pub success_code: i64,
	/// Route handed to [`LoginRedirect`](crate::ext::LoginRedirect) when the session expires.
	pub login_route: String,
	/// Endpoint paths.
	pub endpoints: Endpoints,
}
impl ClientConfig {
	/// Returns a builder seeded with defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Reads [`BASE_URL_ENV`] and [`TIMEOUT_ENV`] from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds a configuration from an arbitrary variable lookup.
	///
	/// Missing or blank variables fall back to the defaults.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let mut builder = Self::builder();

		if let Some(base_url) = read(BASE_URL_ENV) {
			builder = builder.base_url(base_url.trim());
		}
		if let Some(raw) = read(TIMEOUT_ENV) {
			let millis = raw
				.trim()
				.parse::<u64>()
				.ok()
				.filter(|millis| *millis > 0)
				.ok_or(ConfigError::InvalidTimeout { value: raw.clone() })?;

			builder = builder.timeout(Duration::from_millis(millis));
		}

		builder.build()
	}

	/// Resolves `path` (plus optional query pairs) against the base URL.
	///
	/// The path is appended textually so a base path prefix such as `/api` is preserved.
	pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};
		let mut url = Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
		}

		Ok(url)
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: Url::parse(DEFAULT_BASE_URL)
				.unwrap_or_else(|e| unreachable!("default base URL is valid: {e}")),
			timeout: DEFAULT_TIMEOUT,
			success_code: SUCCESS_CODE,
			login_route: DEFAULT_LOGIN_ROUTE.into(),
			endpoints: Endpoints::default(),
		}
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	base_url: Option<String>,
	timeout: Option<Duration>,
	success_code: Option<i64>,
	login_route: Option<String>,
	endpoints: Option<Endpoints>,
}
impl ClientConfigBuilder {
	/// Sets the base URL.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Sets the default request deadline.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Overrides the envelope success code.
	pub fn success_code(mut self, code: i64) -> Self {
		self.success_code = Some(code);

		self
	}

	/// Overrides the login route used for session-expiry redirects.
	pub fn login_route(mut self, route: impl Into<String>) -> Self {
		self.login_route = Some(route.into());

		self
	}

	/// Overrides the endpoint paths.
	pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
		self.endpoints = Some(endpoints);

		self
	}

	/// Validates the collected values and produces a [`ClientConfig`].
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let defaults = ClientConfig::default();
		let base_url = match self.base_url {
			Some(raw) => {
				let url = Url::parse(&raw)
					.map_err(|source| ConfigError::InvalidBaseUrl { value: raw.clone(), source })?;

				if !matches!(url.scheme(), "http" | "https") {
					return Err(ConfigError::UnsupportedScheme { url: url.to_string() });
				}

				url
			},
			None => defaults.base_url,
		};
		let timeout = self.timeout.unwrap_or(defaults.timeout);

		if timeout.is_zero() {
			return Err(ConfigError::InvalidTimeout { value: "0".into() });
		}

		Ok(ClientConfig {
			base_url,
			timeout,
			success_code: self.success_code.unwrap_or(defaults.success_code),
			login_route: self.login_route.unwrap_or(defaults.login_route),
			endpoints: self.endpoints.unwrap_or(defaults.endpoints),
		})
	}
}
